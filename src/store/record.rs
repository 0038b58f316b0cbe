use crate::core::{DbError, Result, Value};
use crate::record::{Attributes, MethodDescriptor, Record, Related, RelationDef, RelationKind, RelationParams};
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::sync::Arc;

use super::{MemoryStore, PRIMARY_KEY, TableSchema};

const BUILTIN_METHODS: [(&str, usize, bool); 5] = [
    ("delete", 0, true),
    ("get_attribute", 1, false),
    ("refresh", 0, true),
    ("save", 0, true),
    ("set_attribute", 2, true),
];

/// Active-record handle onto one row of a [`MemoryStore`] table.
///
/// Attribute writes stay local until [`Record::save`]. Resolved relations are
/// cached per relation name until refreshed.
#[derive(Debug, Clone)]
pub struct MemoryRecord {
    store: MemoryStore,
    schema: Arc<TableSchema>,
    row_id: Option<i64>,
    attrs: Attributes,
    related: HashMap<String, Vec<MemoryRecord>>,
}

impl MemoryRecord {
    pub(crate) fn new(store: MemoryStore, schema: Arc<TableSchema>) -> Self {
        let attrs = schema.empty_attributes();
        Self {
            store,
            schema,
            row_id: None,
            attrs,
            related: HashMap::new(),
        }
    }

    pub(crate) fn loaded(
        store: MemoryStore,
        schema: Arc<TableSchema>,
        id: i64,
        attrs: Attributes,
    ) -> Self {
        Self {
            store,
            schema,
            row_id: Some(id),
            attrs,
            related: HashMap::new(),
        }
    }

    /// Primary key of the stored row, `None` while the record is new.
    pub fn id(&self) -> Option<i64> {
        self.row_id
    }

    pub fn is_new_record(&self) -> bool {
        self.row_id.is_none()
    }

    pub fn table_name(&self) -> &str {
        self.schema.name()
    }

    pub fn store(&self) -> &MemoryStore {
        &self.store
    }

    /// Sets an attribute and returns the record, for building new rows.
    pub fn with(mut self, name: &str, value: impl Into<Value>) -> Result<Self> {
        self.set_attribute(name, value.into())?;
        Ok(self)
    }

    pub(crate) fn get_attribute_value(&self, name: &str) -> Value {
        self.attrs.get(name).cloned().unwrap_or(Value::Null)
    }

    fn relation(&self, name: &str) -> Result<RelationDef> {
        self.schema.relations().get(name).cloned().ok_or_else(|| {
            DbError::RelationNotFound(name.to_string(), self.schema.name().to_string())
        })
    }

    fn into_related(kind: RelationKind, records: Vec<MemoryRecord>) -> Related {
        match kind {
            RelationKind::HasMany => Related::Many(
                records
                    .into_iter()
                    .map(|record| Box::new(record) as Box<dyn Record>)
                    .collect(),
            ),
            RelationKind::BelongsTo | RelationKind::HasOne => match records.into_iter().next() {
                Some(record) => Related::One(Box::new(record)),
                None => Related::None,
            },
        }
    }

    fn invoke_builtin(&mut self, method: &str, args: &[Value]) -> Option<Result<Value>> {
        let result = match method {
            "save" => self.save().map(Value::Boolean),
            "delete" => self.delete().map(Value::Boolean),
            "refresh" => self.refresh().map(Value::Boolean),
            "get_attribute" => match args {
                [Value::Text(name)] => Ok(self.get_attribute(name)),
                _ => Err(argument_error(method, "an attribute name")),
            },
            "set_attribute" => match args {
                [Value::Text(name), value] => {
                    let name = name.clone();
                    self.set_attribute(&name, value.clone()).map(|_| Value::Null)
                }
                _ => Err(argument_error(method, "an attribute name and a value")),
            },
            _ => return None,
        };
        Some(result)
    }
}

fn argument_error(method: &str, expected: &str) -> DbError {
    DbError::ExecutionError(format!("Method '{}' expects {}", method, expected))
}

impl Record for MemoryRecord {
    fn type_name(&self) -> &str {
        self.schema.name()
    }

    fn attribute_names(&self) -> BTreeSet<String> {
        self.schema.column_names()
    }

    fn relations(&self) -> BTreeMap<String, RelationDef> {
        self.schema.relations().clone()
    }

    fn get_attribute(&self, name: &str) -> Value {
        self.get_attribute_value(name)
    }

    fn set_attribute(&mut self, name: &str, value: Value) -> Result<()> {
        if !self.schema.has_column(name) {
            return Err(DbError::ColumnNotFound(
                name.to_string(),
                self.schema.name().to_string(),
            ));
        }
        self.attrs.insert(name.to_string(), value);
        Ok(())
    }

    fn attributes(&self) -> Attributes {
        self.attrs.clone()
    }

    fn get_related(
        &mut self,
        name: &str,
        refresh: bool,
        params: &RelationParams,
    ) -> Result<Related> {
        let relation = self.relation(name)?;
        let cacheable = params.is_empty();

        if cacheable
            && !refresh
            && let Some(cached) = self.related.get(name)
        {
            return Ok(Self::into_related(relation.kind, cached.clone()));
        }

        let records = self.store.resolve_relation(self, &relation, params)?;
        if cacheable {
            self.related.insert(name.to_string(), records.clone());
        }
        Ok(Self::into_related(relation.kind, records))
    }

    fn save(&mut self) -> Result<bool> {
        let table = self.schema.name().to_string();
        match self.row_id {
            None => {
                let id = self.store.insert_row(&table, self.attrs.clone())?;
                self.attrs.insert(PRIMARY_KEY.to_string(), Value::Integer(id));
                self.row_id = Some(id);
                Ok(true)
            }
            Some(id) => {
                if self.get_attribute_value(PRIMARY_KEY) != Value::Integer(id) {
                    return Err(DbError::ConstraintViolation(format!(
                        "Primary key of record {} in table '{}' cannot change",
                        id, table
                    )));
                }
                self.store.update_row(&table, id, self.attrs.clone())
            }
        }
    }

    fn delete(&mut self) -> Result<bool> {
        let Some(id) = self.row_id else {
            return Err(DbError::ExecutionError(format!(
                "Record in table '{}' cannot be deleted because it is new",
                self.schema.name()
            )));
        };

        let deleted = self.store.delete_row(self.schema.name(), id)?;
        if deleted {
            self.row_id = None;
            self.attrs.insert(PRIMARY_KEY.to_string(), Value::Null);
        }
        Ok(deleted)
    }

    fn refresh(&mut self) -> Result<bool> {
        let Some(id) = self.row_id else {
            return Ok(false);
        };

        match self.store.fetch_row(self.schema.name(), id)? {
            Some(attrs) => {
                self.attrs = attrs;
                self.related.clear();
                Ok(true)
            }
            None => Ok(false),
        }
    }

    fn invoke(&mut self, method: &str, args: &[Value]) -> Result<Value> {
        if let Some(result) = self.invoke_builtin(method, args) {
            return result;
        }

        let registered = self.store.method(self.schema.name(), method)?;
        match registered {
            Some(registered) => (registered.handler)(self, args),
            None => Err(DbError::UnsupportedOperation(format!(
                "Method '{}' is not defined on '{}'",
                method,
                self.schema.name()
            ))),
        }
    }

    fn methods(&self) -> Vec<MethodDescriptor> {
        let mut methods: Vec<MethodDescriptor> = BUILTIN_METHODS
            .iter()
            .map(|(name, arg_count, mutates_state)| MethodDescriptor {
                name: name.to_string(),
                arg_count: *arg_count,
                mutates_state: *mutates_state,
            })
            .collect();
        methods.extend(
            self.store
                .method_descriptors(self.schema.name())
                .unwrap_or_default(),
        );
        methods
    }
}
