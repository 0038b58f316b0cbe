use crate::core::{Result, Value};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

/// Full attribute map of a single record.
pub type Attributes = BTreeMap<String, Value>;

/// Cardinality of a declared relation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RelationKind {
    /// This record holds the foreign key pointing at one target record.
    BelongsTo,
    /// One target record holds a foreign key pointing at this record.
    HasOne,
    /// Any number of target records hold a foreign key pointing at this record.
    HasMany,
}

/// Schema-level declaration of a relation between two record types.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelationDef {
    pub kind: RelationKind,
    pub target: String,
    pub foreign_key: String,
}

impl RelationDef {
    pub fn belongs_to(target: impl Into<String>, foreign_key: impl Into<String>) -> Self {
        Self {
            kind: RelationKind::BelongsTo,
            target: target.into(),
            foreign_key: foreign_key.into(),
        }
    }

    pub fn has_one(target: impl Into<String>, foreign_key: impl Into<String>) -> Self {
        Self {
            kind: RelationKind::HasOne,
            target: target.into(),
            foreign_key: foreign_key.into(),
        }
    }

    pub fn has_many(target: impl Into<String>, foreign_key: impl Into<String>) -> Self {
        Self {
            kind: RelationKind::HasMany,
            target: target.into(),
            foreign_key: foreign_key.into(),
        }
    }
}

/// Extra criteria forwarded to relation resolution.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RelationParams {
    pub conditions: Attributes,
    pub limit: Option<usize>,
}

impl RelationParams {
    pub fn new() -> Self {
        Self::default()
    }

    /// Only related records whose `attribute` equals `value` are returned.
    pub fn condition(mut self, attribute: impl Into<String>, value: impl Into<Value>) -> Self {
        self.conditions.insert(attribute.into(), value.into());
        self
    }

    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.conditions.is_empty() && self.limit.is_none()
    }
}

/// Result of resolving one relation on one record.
pub enum Related {
    None,
    One(Box<dyn Record>),
    Many(Vec<Box<dyn Record>>),
}

impl Related {
    pub fn is_none(&self) -> bool {
        matches!(self, Self::None)
    }

    /// Number of records behind this result.
    pub fn len(&self) -> usize {
        match self {
            Self::None => 0,
            Self::One(_) => 1,
            Self::Many(records) => records.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn as_one(&self) -> Option<&dyn Record> {
        match self {
            Self::One(record) => Some(record.as_ref()),
            _ => None,
        }
    }

    pub fn as_many(&self) -> Option<&[Box<dyn Record>]> {
        match self {
            Self::Many(records) => Some(records),
            _ => None,
        }
    }

    /// Attribute maps of every record behind this result.
    pub fn attributes(&self) -> Vec<Attributes> {
        match self {
            Self::None => Vec::new(),
            Self::One(record) => vec![record.attributes()],
            Self::Many(records) => records.iter().map(|record| record.attributes()).collect(),
        }
    }
}

impl fmt::Debug for Related {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::None => write!(f, "Related::None"),
            Self::One(record) => f
                .debug_tuple("Related::One")
                .field(&record.attributes())
                .finish(),
            Self::Many(records) => f
                .debug_tuple("Related::Many")
                .field(&records.iter().map(|r| r.attributes()).collect::<Vec<_>>())
                .finish(),
        }
    }
}

/// Describes a named operation a record accepts through [`Record::invoke`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MethodDescriptor {
    pub name: String,
    pub arg_count: usize,
    pub mutates_state: bool,
}

impl MethodDescriptor {
    pub fn new(name: impl Into<String>, arg_count: usize) -> Self {
        Self {
            name: name.into(),
            arg_count,
            mutates_state: false,
        }
    }

    pub fn mutating(mut self) -> Self {
        self.mutates_state = true;
        self
    }
}

/// Capability contract a Record Store must provide for its records.
///
/// Metadata (`attribute_names`, `relations`) describes the record's schema and is
/// read once by a collection from its exemplar. Everything else operates on the
/// record's own data and is fanned out across collection members.
pub trait Record {
    /// Returns the logical type (table) name of the record.
    fn type_name(&self) -> &str;
    /// Returns the attribute names declared by the record's schema.
    fn attribute_names(&self) -> BTreeSet<String>;
    /// Returns the relations declared by the record's schema.
    fn relations(&self) -> BTreeMap<String, RelationDef>;
    /// Reads one attribute. Unknown names read as `Value::Null`.
    fn get_attribute(&self, name: &str) -> Value;
    /// Writes one attribute in memory without persisting it.
    fn set_attribute(&mut self, name: &str, value: Value) -> Result<()>;
    /// Returns a copy of every attribute.
    fn attributes(&self) -> Attributes;
    /// Resolves a named relation.
    fn get_related(&mut self, name: &str, refresh: bool, params: &RelationParams)
    -> Result<Related>;
    /// Persists the record.
    fn save(&mut self) -> Result<bool>;
    /// Removes the record from the store.
    fn delete(&mut self) -> Result<bool>;
    /// Reloads the record from the store.
    fn refresh(&mut self) -> Result<bool>;
    /// Invokes a named record-specific operation.
    fn invoke(&mut self, method: &str, args: &[Value]) -> Result<Value>;

    /// Lists the operations accepted by [`Record::invoke`].
    fn methods(&self) -> Vec<MethodDescriptor> {
        Vec::new()
    }

    fn supports_method(&self, method: &str) -> bool {
        self.methods().iter().any(|descriptor| descriptor.name == method)
    }
}
