use crate::core::{DbError, Result};

/// Outcome of one member in a strict persistence fan-out.
#[derive(Debug)]
pub struct MemberOutcome {
    pub index: usize,
    pub result: Result<bool>,
}

impl MemberOutcome {
    /// A member succeeds when it returned `Ok(true)`.
    pub fn succeeded(&self) -> bool {
        matches!(self.result, Ok(true))
    }
}

/// Aggregated per-member outcomes of `save_each`, `delete_each` or `refresh_each`.
#[derive(Debug)]
pub struct BulkOutcome {
    pub operation: &'static str,
    pub total: usize,
    pub outcomes: Vec<MemberOutcome>,
}

impl BulkOutcome {
    pub(crate) fn new(operation: &'static str, total: usize) -> Self {
        Self {
            operation,
            total,
            outcomes: Vec::with_capacity(total),
        }
    }

    /// Number of members that were visited.
    pub fn visited(&self) -> usize {
        self.outcomes.len()
    }

    /// `true` when the fan-out stopped before reaching every member.
    pub fn stopped_early(&self) -> bool {
        self.outcomes.len() < self.total
    }

    /// `true` when every member was visited and each one succeeded.
    pub fn all_succeeded(&self) -> bool {
        !self.stopped_early() && self.outcomes.iter().all(MemberOutcome::succeeded)
    }

    pub fn failures(&self) -> impl Iterator<Item = &MemberOutcome> {
        self.outcomes.iter().filter(|outcome| !outcome.succeeded())
    }

    /// Converts into the first failure, if any.
    ///
    /// A member that returned `Ok(false)` becomes an execution error naming its index.
    pub fn into_result(self) -> Result<()> {
        let operation = self.operation;
        for outcome in self.outcomes {
            match outcome.result {
                Ok(true) => {}
                Ok(false) => {
                    return Err(DbError::ExecutionError(format!(
                        "{} reported failure for member {}",
                        operation, outcome.index
                    )));
                }
                Err(err) => return Err(err),
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_succeeded() {
        let mut outcome = BulkOutcome::new("save", 2);
        outcome.outcomes.push(MemberOutcome { index: 0, result: Ok(true) });
        outcome.outcomes.push(MemberOutcome { index: 1, result: Ok(true) });
        assert!(outcome.all_succeeded());
        assert_eq!(outcome.failures().count(), 0);
        assert!(outcome.into_result().is_ok());
    }

    #[test]
    fn test_stopped_early_is_not_success() {
        let mut outcome = BulkOutcome::new("delete", 3);
        outcome.outcomes.push(MemberOutcome { index: 0, result: Ok(false) });
        assert!(outcome.stopped_early());
        assert!(!outcome.all_succeeded());
        assert_eq!(outcome.visited(), 1);

        let err = outcome.into_result().unwrap_err();
        assert!(matches!(err, DbError::ExecutionError(msg) if msg.contains("member 0")));
    }
}
