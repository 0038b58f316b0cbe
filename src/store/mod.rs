use crate::collection::RecordCollection;
use crate::config::CollectionConfig;
use crate::core::{DbError, Result, Value};
use crate::record::{Attributes, MethodDescriptor, RelationDef, RelationKind, RelationParams};
use log::debug;
use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, RwLock};

mod record;
mod table;

pub use record::MemoryRecord;
pub use table::{MethodHandler, PRIMARY_KEY, Table, TableSchema};

/// In-memory Record Store.
///
/// Cheap to clone: clones share the same tables. Every table sits behind its
/// own lock, the table map behind a separate one.
#[derive(Clone, Default)]
pub struct MemoryStore {
    tables: Arc<RwLock<HashMap<String, Arc<RwLock<Table>>>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Declares a table.
    pub fn create_table(&self, schema: TableSchema) -> Result<()> {
        let name = schema.name().to_string();
        let mut tables = self.tables.write()?;

        if tables.contains_key(&name) {
            return Err(DbError::TableExists(name));
        }

        debug!("memory store: created table '{}'", name);
        tables.insert(name, Arc::new(RwLock::new(Table::new(schema))));
        Ok(())
    }

    /// Get a handle on a table.
    pub fn get_table(&self, name: &str) -> Result<Arc<RwLock<Table>>> {
        self.tables
            .read()?
            .get(name)
            .cloned()
            .ok_or_else(|| DbError::TableNotFound(name.to_string()))
    }

    pub fn table_exists(&self, name: &str) -> Result<bool> {
        Ok(self.tables.read()?.contains_key(name))
    }

    pub fn table_names(&self) -> Result<Vec<String>> {
        let mut names: Vec<String> = self.tables.read()?.keys().cloned().collect();
        names.sort();
        Ok(names)
    }

    pub fn schema(&self, table: &str) -> Result<Arc<TableSchema>> {
        let handle = self.get_table(table)?;
        let table = handle.read()?;
        Ok(table.schema().clone())
    }

    pub fn row_count(&self, table: &str) -> Result<usize> {
        let handle = self.get_table(table)?;
        let table = handle.read()?;
        Ok(table.len())
    }

    /// Registers a named operation that records of `table` accept through `invoke`.
    ///
    /// The handler runs without any store lock held, so it may use the store.
    pub fn register_method<F>(&self, table: &str, descriptor: MethodDescriptor, handler: F) -> Result<()>
    where
        F: Fn(&mut MemoryRecord, &[Value]) -> Result<Value> + Send + Sync + 'static,
    {
        let handle = self.get_table(table)?;
        let mut table = handle.write()?;
        table.register_method(descriptor, Arc::new(handler));
        Ok(())
    }

    /// Creates an unsaved record with every attribute `NULL`.
    pub fn new_record(&self, table: &str) -> Result<MemoryRecord> {
        let schema = self.schema(table)?;
        Ok(MemoryRecord::new(self.clone(), schema))
    }

    /// Creates a metadata-only record usable as a collection exemplar.
    pub fn exemplar(&self, table: &str) -> Result<MemoryRecord> {
        self.new_record(table)
    }

    pub fn find(&self, table: &str, id: i64) -> Result<Option<MemoryRecord>> {
        let handle = self.get_table(table)?;
        let table = handle.read()?;
        Ok(table
            .get(id)
            .map(|attrs| MemoryRecord::loaded(self.clone(), table.schema().clone(), id, attrs.clone())))
    }

    /// Like [`MemoryStore::find`], but a missing row is an error.
    pub fn load(&self, table: &str, id: i64) -> Result<MemoryRecord> {
        self.find(table, id)?
            .ok_or_else(|| DbError::RecordNotFound(table.to_string(), id))
    }

    pub fn find_all(&self, table: &str) -> Result<Vec<MemoryRecord>> {
        self.find_by(table, &Attributes::new())
    }

    /// Records whose attributes equal every condition, in primary key order.
    pub fn find_by(&self, table: &str, conditions: &Attributes) -> Result<Vec<MemoryRecord>> {
        let handle = self.get_table(table)?;
        let table = handle.read()?;
        let schema = table.schema().clone();
        Ok(table
            .scan(conditions)?
            .into_iter()
            .map(|(id, attrs)| MemoryRecord::loaded(self.clone(), schema.clone(), id, attrs))
            .collect())
    }

    /// Collection of every record in `table`.
    pub fn collection(&self, table: &str) -> Result<RecordCollection<MemoryRecord>> {
        self.collection_by(table, &Attributes::new())
    }

    /// Collection of the records in `table` matching `conditions`.
    pub fn collection_by(
        &self,
        table: &str,
        conditions: &Attributes,
    ) -> Result<RecordCollection<MemoryRecord>> {
        self.collection_with_config(table, conditions, CollectionConfig::new().label(table))
    }

    pub fn collection_with_config(
        &self,
        table: &str,
        conditions: &Attributes,
        config: CollectionConfig,
    ) -> Result<RecordCollection<MemoryRecord>> {
        let exemplar = self.exemplar(table)?;
        let records = self.find_by(table, conditions)?;
        Ok(RecordCollection::with_config(exemplar, records, config))
    }

    pub(crate) fn insert_row(&self, table: &str, attrs: Attributes) -> Result<i64> {
        let handle = self.get_table(table)?;
        let mut table = handle.write()?;
        table.insert(attrs)
    }

    pub(crate) fn update_row(&self, table: &str, id: i64, attrs: Attributes) -> Result<bool> {
        let handle = self.get_table(table)?;
        let mut table = handle.write()?;
        table.update(id, attrs)
    }

    pub(crate) fn delete_row(&self, table: &str, id: i64) -> Result<bool> {
        let handle = self.get_table(table)?;
        let mut table = handle.write()?;
        Ok(table.delete(id))
    }

    pub(crate) fn fetch_row(&self, table: &str, id: i64) -> Result<Option<Attributes>> {
        let handle = self.get_table(table)?;
        let table = handle.read()?;
        Ok(table.get(id).cloned())
    }

    pub(crate) fn method(&self, table: &str, name: &str) -> Result<Option<table::RegisteredMethod>> {
        let handle = self.get_table(table)?;
        let table = handle.read()?;
        Ok(table.method(name))
    }

    pub(crate) fn method_descriptors(&self, table: &str) -> Result<Vec<MethodDescriptor>> {
        let handle = self.get_table(table)?;
        let table = handle.read()?;
        Ok(table.method_descriptors())
    }

    /// Loads the records `relation` points at from `record`.
    pub(crate) fn resolve_relation(
        &self,
        record: &MemoryRecord,
        relation: &RelationDef,
        params: &RelationParams,
    ) -> Result<Vec<MemoryRecord>> {
        let mut conditions = params.conditions.clone();
        match relation.kind {
            RelationKind::BelongsTo => {
                let key = record.get_attribute_value(&relation.foreign_key);
                if key.is_null() {
                    return Ok(Vec::new());
                }
                conditions.insert(PRIMARY_KEY.to_string(), key);
            }
            RelationKind::HasOne | RelationKind::HasMany => {
                let Some(id) = record.id() else {
                    return Ok(Vec::new());
                };
                conditions.insert(relation.foreign_key.clone(), Value::Integer(id));
            }
        }

        let mut related = self.find_by(&relation.target, &conditions)?;
        let limit = match relation.kind {
            RelationKind::HasMany => params.limit,
            RelationKind::BelongsTo | RelationKind::HasOne => Some(1),
        };
        if let Some(limit) = limit {
            related.truncate(limit);
        }
        Ok(related)
    }
}

impl fmt::Debug for MemoryStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MemoryStore")
            .field("tables", &self.table_names().unwrap_or_default())
            .finish()
    }
}
