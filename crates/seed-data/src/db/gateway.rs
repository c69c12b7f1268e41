//! Storage abstraction the seeder writes through.

use async_trait::async_trait;
use time::{Date, PrimitiveDateTime};

use crate::db::tables::Table;
use crate::error::SeedError;

/// Identifier returned by the store for an inserted row.
pub type RowId = i32;

/// A scalar column value.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Int(i64),
    Id(RowId),
    Float(f64),
    Bool(bool),
    Text(String),
    Date(Date),
    Timestamp(PrimitiveDateTime),
}

impl Value {
    /// The referenced id, for `Id` values.
    pub fn as_id(&self) -> Option<RowId> {
        match self {
            Value::Id(id) => Some(*id),
            _ => None,
        }
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Int(v)
    }
}

impl From<RowId> for Value {
    fn from(v: RowId) -> Self {
        Value::Id(v)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Float(v)
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::Text(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Text(v.to_string())
    }
}

impl From<Date> for Value {
    fn from(v: Date) -> Self {
        Value::Date(v)
    }
}

impl From<PrimitiveDateTime> for Value {
    fn from(v: PrimitiveDateTime) -> Self {
        Value::Timestamp(v)
    }
}

/// Column values of one row, in insertion order.
///
/// Missing optional values are left out entirely so the column takes its
/// default (usually NULL).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Row {
    fields: Vec<(&'static str, Value)>,
}

impl Row {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, field: &'static str, value: impl Into<Value>) -> Self {
        self.fields.push((field, value.into()));
        self
    }

    pub fn with_opt(self, field: &'static str, value: Option<impl Into<Value>>) -> Self {
        match value {
            Some(value) => self.with(field, value),
            None => self,
        }
    }

    /// Replaces `field`, appending it if the row does not have it yet.
    pub fn set(&mut self, field: &'static str, value: Value) {
        match self.fields.iter_mut().find(|(name, _)| *name == field) {
            Some((_, slot)) => *slot = value,
            None => self.fields.push((field, value)),
        }
    }

    pub fn get(&self, field: &str) -> Option<&Value> {
        self.fields
            .iter()
            .find(|(name, _)| *name == field)
            .map(|(_, value)| value)
    }

    pub fn fields(&self) -> &[(&'static str, Value)] {
        &self.fields
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Keeps only `fields`, in row order. `None` keeps everything.
    pub fn project(&self, fields: Option<&[&str]>) -> Row {
        match fields {
            None => self.clone(),
            Some(keep) => Row {
                fields: self
                    .fields
                    .iter()
                    .filter(|(name, _)| keep.contains(name))
                    .cloned()
                    .collect(),
            },
        }
    }
}

/// A relational store the generator can write to.
///
/// Implementations must return ids in the order the rows were given, and no
/// ids for tables without an `id` column.
#[async_trait]
pub trait Gateway: Send {
    /// Inserts `rows`, writing only `fields` when given.
    async fn insert(
        &mut self,
        table: &Table,
        rows: &[Row],
        fields: Option<&[&str]>,
    ) -> Result<Vec<RowId>, SeedError>;

    /// Sets `value_field` to each value on the row whose `key_field` equals the key.
    async fn update(
        &mut self,
        table: &Table,
        values: &[(RowId, Value)],
        key_field: &'static str,
        value_field: &'static str,
    ) -> Result<(), SeedError>;

    /// Removes every row of `table`.
    async fn truncate(&mut self, table: &Table) -> Result<(), SeedError>;

    /// Inserts one row into a keyed table and returns its id.
    async fn insert_one(&mut self, table: &Table, row: Row) -> Result<RowId, SeedError> {
        self.insert(table, &[row], None)
            .await?
            .into_iter()
            .next()
            .ok_or(SeedError::MissingId(table.name))
    }
}
