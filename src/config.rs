use crate::core::{DbError, Result};
use serde::{Deserialize, Serialize};

/// How strict persistence fan-out reacts to a member that fails.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailurePolicy {
    /// Visit every member regardless of earlier failures.
    #[default]
    Continue,
    /// Stop at the first member that errors or reports `false`.
    StopOnFirstFailure,
}

/// Collection behaviour configuration
///
/// Copied into every collection derived from the one it was given to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CollectionConfig {
    /// Policy used by `save_each`, `delete_each` and `refresh_each`
    pub failure_policy: FailurePolicy,

    /// Log member failures swallowed by `save`, `delete` and `refresh`
    pub log_member_failures: bool,

    /// Label used in log lines and tracing spans
    pub label: Option<String>,
}

impl Default for CollectionConfig {
    fn default() -> Self {
        Self {
            failure_policy: FailurePolicy::Continue,
            log_member_failures: true,
            label: None,
        }
    }
}

impl CollectionConfig {
    /// Create a configuration with default settings
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the strict fan-out failure policy
    pub fn failure_policy(mut self, policy: FailurePolicy) -> Self {
        self.failure_policy = policy;
        self
    }

    /// Stop strict fan-out at the first failing member
    pub fn stop_on_first_failure(self) -> Self {
        self.failure_policy(FailurePolicy::StopOnFirstFailure)
    }

    /// Enable or disable logging of swallowed member failures
    pub fn log_member_failures(mut self, enabled: bool) -> Self {
        self.log_member_failures = enabled;
        self
    }

    /// Set the label used in diagnostics
    pub fn label(mut self, label: &str) -> Self {
        self.label = Some(label.to_string());
        self
    }

    /// Parse from a JSON document
    ///
    /// Missing fields keep their defaults.
    ///
    /// # Examples
    ///
    /// ```
    /// use memocollection::{CollectionConfig, FailurePolicy};
    ///
    /// let config = CollectionConfig::from_json(r#"{"failure_policy": "stop_on_first_failure"}"#).unwrap();
    /// assert_eq!(config.failure_policy, FailurePolicy::StopOnFirstFailure);
    /// assert!(config.log_member_failures);
    /// ```
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json)
            .map_err(|e| DbError::ConfigError(format!("Invalid collection config: {}", e)))
    }

    pub(crate) fn display_label(&self) -> &str {
        self.label.as_deref().unwrap_or("collection")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = CollectionConfig::new();
        assert_eq!(config.failure_policy, FailurePolicy::Continue);
        assert!(config.log_member_failures);
        assert_eq!(config.display_label(), "collection");
    }

    #[test]
    fn test_builder_pattern() {
        let config = CollectionConfig::new()
            .stop_on_first_failure()
            .log_member_failures(false)
            .label("users");

        assert_eq!(config.failure_policy, FailurePolicy::StopOnFirstFailure);
        assert!(!config.log_member_failures);
        assert_eq!(config.display_label(), "users");
    }

    #[test]
    fn test_from_json() {
        let config = CollectionConfig::from_json(r#"{"label": "orders", "log_member_failures": false}"#)
            .unwrap();
        assert_eq!(config.label.as_deref(), Some("orders"));
        assert!(!config.log_member_failures);
        assert_eq!(config.failure_policy, FailurePolicy::Continue);
    }

    #[test]
    fn test_from_json_invalid() {
        let err = CollectionConfig::from_json(r#"{"failure_policy": "sometimes"}"#).unwrap_err();
        assert!(matches!(err, DbError::ConfigError(_)));
    }
}
