use crate::core::{Column, DataType, DbError, Result, Schema, Value};
use crate::record::{Attributes, MethodDescriptor, RelationDef};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::fmt;
use std::sync::Arc;

use super::MemoryRecord;

/// Name of the primary key attribute every table carries.
pub const PRIMARY_KEY: &str = "id";

/// Columns and relations of one in-memory table.
///
/// An integer `id` column is added in front of the declared columns when it is
/// not declared explicitly.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TableSchema {
    name: String,
    schema: Schema,
    relations: BTreeMap<String, RelationDef>,
}

impl TableSchema {
    pub fn new(name: impl Into<String>, columns: Vec<Column>) -> Self {
        let mut columns = columns;
        if !columns.iter().any(|col| col.name == PRIMARY_KEY) {
            columns.insert(0, Column::new(PRIMARY_KEY, DataType::Integer));
        }
        Self {
            name: name.into(),
            schema: Schema::new(columns),
            relations: BTreeMap::new(),
        }
    }

    pub fn with_relation(mut self, name: impl Into<String>, relation: RelationDef) -> Self {
        self.relations.insert(name.into(), relation);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn columns(&self) -> &[Column] {
        self.schema.columns()
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.schema.get_column(name).is_some()
    }

    pub fn column_names(&self) -> BTreeSet<String> {
        self.schema.column_names().map(str::to_string).collect()
    }

    pub fn relations(&self) -> &BTreeMap<String, RelationDef> {
        &self.relations
    }

    /// Attribute map with every column set to `NULL`.
    pub fn empty_attributes(&self) -> Attributes {
        self.schema
            .column_names()
            .map(|name| (name.to_string(), Value::Null))
            .collect()
    }

    pub(crate) fn validate_row(&self, attrs: &Attributes) -> Result<()> {
        for name in attrs.keys() {
            if !self.has_column(name) {
                return Err(DbError::ColumnNotFound(name.clone(), self.name.clone()));
            }
        }
        for column in self.schema.columns() {
            if column.name == PRIMARY_KEY {
                continue;
            }
            column.validate(attrs.get(&column.name).unwrap_or(&Value::Null))?;
        }
        Ok(())
    }

    pub(crate) fn check_conditions(&self, conditions: &Attributes) -> Result<()> {
        match conditions.keys().find(|name| !self.has_column(name)) {
            Some(name) => Err(DbError::ColumnNotFound(name.clone(), self.name.clone())),
            None => Ok(()),
        }
    }
}

pub type MethodHandler = Arc<dyn Fn(&mut MemoryRecord, &[Value]) -> Result<Value> + Send + Sync>;

#[derive(Clone)]
pub(crate) struct RegisteredMethod {
    pub(crate) descriptor: MethodDescriptor,
    pub(crate) handler: MethodHandler,
}

impl fmt::Debug for RegisteredMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RegisteredMethod")
            .field("descriptor", &self.descriptor)
            .finish_non_exhaustive()
    }
}

/// Rows of one table keyed by primary key.
#[derive(Debug)]
pub struct Table {
    schema: Arc<TableSchema>,
    rows: BTreeMap<i64, Attributes>,
    next_id: i64,
    methods: HashMap<String, RegisteredMethod>,
}

impl Table {
    pub fn new(schema: TableSchema) -> Self {
        Self {
            schema: Arc::new(schema),
            rows: BTreeMap::new(),
            next_id: 1,
            methods: HashMap::new(),
        }
    }

    pub fn schema(&self) -> &Arc<TableSchema> {
        &self.schema
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Inserts a row and returns its primary key.
    ///
    /// A `NULL` id gets the next free key; an explicit id must not be taken.
    pub fn insert(&mut self, mut attrs: Attributes) -> Result<i64> {
        self.schema.validate_row(&attrs)?;

        let id = match attrs.get(PRIMARY_KEY) {
            None | Some(Value::Null) => self.next_id,
            Some(Value::Integer(id)) => *id,
            Some(other) => {
                return Err(DbError::TypeMismatch(format!(
                    "Column '{}' expects type INTEGER, got {}",
                    PRIMARY_KEY,
                    other.type_name()
                )));
            }
        };

        if self.rows.contains_key(&id) {
            return Err(DbError::ConstraintViolation(format!(
                "Duplicate primary key {} in table '{}'",
                id,
                self.schema.name()
            )));
        }

        let Some(following) = id.checked_add(1) else {
            return Err(DbError::ConstraintViolation(format!(
                "Primary key {} in table '{}' leaves no room for further keys",
                id,
                self.schema.name()
            )));
        };

        attrs.insert(PRIMARY_KEY.to_string(), Value::Integer(id));
        self.rows.insert(id, attrs);
        self.next_id = self.next_id.max(following);
        Ok(id)
    }

    /// Replaces the row stored under `id`. Returns `false` if there is no such row.
    pub fn update(&mut self, id: i64, mut attrs: Attributes) -> Result<bool> {
        self.schema.validate_row(&attrs)?;
        attrs.insert(PRIMARY_KEY.to_string(), Value::Integer(id));

        match self.rows.get_mut(&id) {
            Some(row) => {
                *row = attrs;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    pub fn delete(&mut self, id: i64) -> bool {
        self.rows.remove(&id).is_some()
    }

    pub fn get(&self, id: i64) -> Option<&Attributes> {
        self.rows.get(&id)
    }

    /// Rows whose attributes equal every condition, in key order.
    pub fn scan(&self, conditions: &Attributes) -> Result<Vec<(i64, Attributes)>> {
        self.schema.check_conditions(conditions)?;
        Ok(self
            .rows
            .iter()
            .filter(|(_, row)| {
                conditions
                    .iter()
                    .all(|(name, expected)| row.get(name).unwrap_or(&Value::Null) == expected)
            })
            .map(|(id, row)| (*id, row.clone()))
            .collect())
    }

    pub(crate) fn register_method(&mut self, descriptor: MethodDescriptor, handler: MethodHandler) {
        self.methods.insert(
            descriptor.name.clone(),
            RegisteredMethod {
                descriptor,
                handler,
            },
        );
    }

    pub(crate) fn method(&self, name: &str) -> Option<RegisteredMethod> {
        self.methods.get(name).cloned()
    }

    pub(crate) fn method_descriptors(&self) -> Vec<MethodDescriptor> {
        let mut descriptors: Vec<_> = self
            .methods
            .values()
            .map(|method| method.descriptor.clone())
            .collect();
        descriptors.sort_by(|a, b| a.name.cmp(&b.name));
        descriptors
    }
}
