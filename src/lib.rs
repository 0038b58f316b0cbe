// ============================================================================
// MemoCollection Library
// ============================================================================

//! Bulk operations over homogeneous collections of active records.
//!
//! A [`RecordCollection`] wraps records that implement the [`Record`] contract
//! and lets callers read and write attributes, resolve relations, filter, and
//! save/delete/refresh every member as if the collection were one record.
//!
//! [`MemoryStore`] is an in-memory Record Store whose [`MemoryRecord`]s
//! implement the contract, handy for tests and prototypes.
//!
//! # Examples
//!
//! ```
//! use memocollection::{Column, DataType, MemoryStore, Record, TableSchema, Value};
//!
//! # fn main() -> memocollection::Result<()> {
//! let store = MemoryStore::new();
//! store.create_table(TableSchema::new(
//!     "tasks",
//!     vec![Column::new("title", DataType::Text), Column::new("done", DataType::Boolean)],
//! ))?;
//!
//! for title in ["write", "review", "ship"] {
//!     let mut task = store.new_record("tasks")?.with("title", title)?.with("done", false)?;
//!     task.save()?;
//! }
//!
//! let mut tasks = store.collection("tasks")?;
//! tasks.set_attribute("done", true)?;
//! tasks.save();
//!
//! let reloaded = store.collection("tasks")?;
//! assert_eq!(reloaded.get_attribute("done"), vec![Value::Boolean(true); 3]);
//! # Ok(())
//! # }
//! ```

pub mod collection;
pub mod config;
pub mod core;
pub mod record;
pub mod store;

// Re-export main types for convenience
pub use collection::{BulkOutcome, MemberOutcome, Property, RecordCollection};
pub use config::{CollectionConfig, FailurePolicy};
pub use crate::core::{Column, DataType, DbError, Result, Schema, Value};
pub use record::{
    Attributes, MethodDescriptor, Record, Related, RelationDef, RelationKind, RelationParams,
};
pub use store::{MemoryRecord, MemoryStore, TableSchema};
