use crate::config::{CollectionConfig, FailurePolicy};
use crate::core::{DbError, Result, Value};
use crate::record::{Attributes, Record, Related, RelationDef, RelationParams};
use log::warn;
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::fmt;
use std::ops::Index;
use tracing::{Level, event, info_span};

mod outcome;

pub use outcome::{BulkOutcome, MemberOutcome};

/// A homogeneous, fixed-size collection of records that behaves like a single
/// virtual record.
///
/// Schema metadata (attribute names and relations) is captured once from an
/// exemplar record at construction time. The exemplar is never treated as a
/// member: every bulk operation visits the members only, in index order.
pub struct RecordCollection<R: Record> {
    exemplar: R,
    records: Vec<R>,
    attribute_names: BTreeSet<String>,
    relations: BTreeMap<String, RelationDef>,
    config: CollectionConfig,
}

/// Result of reading a property by name from a collection.
#[derive(Debug)]
pub enum Property {
    /// The name is a known attribute; one value per member.
    Attributes(Vec<Value>),
    /// The name is a known relation; one result per member.
    Related(Vec<Related>),
    /// The name is neither an attribute nor a relation.
    Empty,
}

impl Property {
    pub fn len(&self) -> usize {
        match self {
            Self::Attributes(values) => values.len(),
            Self::Related(related) => related.len(),
            Self::Empty => 0,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn into_values(self) -> Option<Vec<Value>> {
        match self {
            Self::Attributes(values) => Some(values),
            _ => None,
        }
    }

    pub fn into_related(self) -> Option<Vec<Related>> {
        match self {
            Self::Related(related) => Some(related),
            _ => None,
        }
    }
}

// Keep RecordCollection implementation split by concern.
include!("collection_impl/basics_and_access.rs");
include!("collection_impl/attributes_and_relations.rs");
include!("collection_impl/persistence_fan_out.rs");
include!("collection_impl/dispatch.rs");

impl<R: Record> fmt::Debug for RecordCollection<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RecordCollection")
            .field("type_name", &self.exemplar.type_name())
            .field("len", &self.records.len())
            .field("attribute_names", &self.attribute_names)
            .field("relations", &self.relations.keys().collect::<Vec<_>>())
            .finish()
    }
}

impl<R: Record> Index<usize> for RecordCollection<R> {
    type Output = R;

    fn index(&self, index: usize) -> &Self::Output {
        &self.records[index]
    }
}

impl<'a, R: Record> IntoIterator for &'a RecordCollection<R> {
    type Item = &'a R;
    type IntoIter = std::slice::Iter<'a, R>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}

impl<'a, R: Record> IntoIterator for &'a mut RecordCollection<R> {
    type Item = &'a mut R;
    type IntoIter = std::slice::IterMut<'a, R>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter_mut()
    }
}

impl<R: Record> IntoIterator for RecordCollection<R> {
    type Item = R;
    type IntoIter = std::vec::IntoIter<R>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.into_iter()
    }
}
