//! Record store: the persistence client every back-office view reads and
//! writes through.
//!
//! Records are JSON objects addressed by table name and a conjunctive filter,
//! mirroring the hosted database the application grew up on:
//!
//! ```text
//! update(table="properties", filter={id: <property_id>}, fields={status: "sold"})
//! ```
//!
//! Two backends implement [`RecordStore`]: [`InMemoryRecordStore`] for dev and
//! tests, and [`PostgresRecordStore`] for persistent deployments.

use std::cmp::Ordering;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::Value as JsonValue;
use thiserror::Error;

pub mod in_memory;
pub mod postgres;

pub use in_memory::InMemoryRecordStore;
pub use postgres::PostgresRecordStore;

/// One stored row.
pub type Record = serde_json::Map<String, JsonValue>;

/// Fields every record carries and no update may change.
pub const ID_FIELD: &str = "id";
pub const CREATED_AT_FIELD: &str = "created_at";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Table {
    Properties,
    Leads,
    Clients,
    PurchaseOrders,
    Settings,
}

impl Table {
    pub const ALL: [Table; 5] = [
        Table::Properties,
        Table::Leads,
        Table::Clients,
        Table::PurchaseOrders,
        Table::Settings,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Table::Properties => "properties",
            Table::Leads => "leads",
            Table::Clients => "clients",
            Table::PurchaseOrders => "purchase_orders",
            Table::Settings => "settings",
        }
    }

    pub fn from_name(name: &str) -> Option<Table> {
        Self::ALL.into_iter().find(|t| t.as_str() == name)
    }
}

impl core::fmt::Display for Table {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single predicate on a top-level record field.
#[derive(Debug, Clone, PartialEq)]
pub enum Condition {
    Eq(String, JsonValue),
    In(String, Vec<JsonValue>),
}

impl Condition {
    pub fn matches(&self, record: &Record) -> bool {
        match self {
            Condition::Eq(field, value) => record.get(field) == Some(value),
            Condition::In(field, values) => record.get(field).is_some_and(|v| values.contains(v)),
        }
    }
}

/// Conjunction of conditions. The empty filter matches every record.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Filter {
    conditions: Vec<Condition>,
}

impl Filter {
    pub fn all() -> Self {
        Self::default()
    }

    pub fn eq(field: impl Into<String>, value: impl Into<JsonValue>) -> Self {
        Self::all().and_eq(field, value)
    }

    /// Match one record by its id.
    pub fn by_id(id: impl core::fmt::Display) -> Self {
        Self::eq(ID_FIELD, id.to_string())
    }

    pub fn and_eq(mut self, field: impl Into<String>, value: impl Into<JsonValue>) -> Self {
        self.conditions.push(Condition::Eq(field.into(), value.into()));
        self
    }

    pub fn and_in<V: Into<JsonValue>>(
        mut self,
        field: impl Into<String>,
        values: impl IntoIterator<Item = V>,
    ) -> Self {
        let values = values.into_iter().map(Into::into).collect();
        self.conditions.push(Condition::In(field.into(), values));
        self
    }

    pub fn conditions(&self) -> &[Condition] {
        &self.conditions
    }

    pub fn matches(&self, record: &Record) -> bool {
        self.conditions.iter().all(|c| c.matches(record))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Ascending,
    Descending,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Order {
    pub field: String,
    pub direction: Direction,
}

/// Filter + optional ordering + optional row limit.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Query {
    pub filter: Filter,
    pub order: Option<Order>,
    pub limit: Option<usize>,
}

impl Query {
    pub fn all() -> Self {
        Self::default()
    }

    pub fn filtered(filter: Filter) -> Self {
        Self { filter, ..Self::default() }
    }

    pub fn order_by(mut self, field: impl Into<String>, direction: Direction) -> Self {
        self.order = Some(Order { field: field.into(), direction });
        self
    }

    /// Most recently created first, the order every list view uses.
    pub fn newest_first(self) -> Self {
        self.order_by(CREATED_AT_FIELD, Direction::Descending)
    }

    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// The backend could not be reached or rejected the statement.
    #[error("backing store error in {operation}: {message}")]
    Backend {
        operation: &'static str,
        message: String,
    },

    /// A stored record did not match the expected shape.
    #[error("record in '{table}' could not be decoded: {message}")]
    Decode { table: Table, message: String },

    /// Records must be JSON objects carrying a string id.
    #[error("malformed record for '{table}': {message}")]
    MalformedRecord { table: Table, message: String },

    #[error("record '{id}' already exists in '{table}'")]
    Duplicate { table: Table, id: String },
}

impl StoreError {
    pub fn backend(operation: &'static str, message: impl core::fmt::Display) -> Self {
        Self::Backend { operation, message: message.to_string() }
    }
}

/// Persistence client: select/count/insert/update/delete by table and filter.
///
/// Each call is independent; there are no transactions spanning calls.
#[async_trait]
pub trait RecordStore: Send + Sync {
    async fn select(&self, table: Table, query: &Query) -> Result<Vec<Record>, StoreError>;

    async fn count(&self, table: Table, filter: &Filter) -> Result<u64, StoreError>;

    /// Store a new record. `id` is required; `created_at` is stamped when absent.
    async fn insert(&self, table: Table, record: Record) -> Result<Record, StoreError>;

    /// Merge `fields` into every matching record and return the updated records.
    ///
    /// `id` and `created_at` are never overwritten.
    async fn update(&self, table: Table, filter: &Filter, fields: Record) -> Result<Vec<Record>, StoreError>;

    /// Remove every matching record, returning how many were removed.
    async fn delete(&self, table: Table, filter: &Filter) -> Result<u64, StoreError>;
}

#[async_trait]
impl<S> RecordStore for Arc<S>
where
    S: RecordStore + ?Sized,
{
    async fn select(&self, table: Table, query: &Query) -> Result<Vec<Record>, StoreError> {
        (**self).select(table, query).await
    }

    async fn count(&self, table: Table, filter: &Filter) -> Result<u64, StoreError> {
        (**self).count(table, filter).await
    }

    async fn insert(&self, table: Table, record: Record) -> Result<Record, StoreError> {
        (**self).insert(table, record).await
    }

    async fn update(&self, table: Table, filter: &Filter, fields: Record) -> Result<Vec<Record>, StoreError> {
        (**self).update(table, filter, fields).await
    }

    async fn delete(&self, table: Table, filter: &Filter) -> Result<u64, StoreError> {
        (**self).delete(table, filter).await
    }
}

/// Drop the identity fields from an update payload.
pub(crate) fn strip_identity(mut fields: Record) -> Record {
    fields.remove(ID_FIELD);
    fields.remove(CREATED_AT_FIELD);
    fields
}

/// The record's id, which must be a string.
pub(crate) fn record_id(table: Table, record: &Record) -> Result<String, StoreError> {
    match record.get(ID_FIELD) {
        Some(JsonValue::String(id)) if !id.is_empty() => Ok(id.clone()),
        _ => Err(StoreError::MalformedRecord {
            table,
            message: "missing string 'id'".to_string(),
        }),
    }
}

/// Ordering used when sorting records in memory.
///
/// Timestamps stored as RFC 3339 strings compare chronologically; other
/// values compare naturally; missing and null values sort first.
pub(crate) fn compare_json(a: Option<&JsonValue>, b: Option<&JsonValue>) -> Ordering {
    use JsonValue::{Bool, Null, Number, String as Str};

    match (a, b) {
        (None | Some(Null), None | Some(Null)) => Ordering::Equal,
        (None | Some(Null), _) => Ordering::Less,
        (_, None | Some(Null)) => Ordering::Greater,
        (Some(Number(x)), Some(Number(y))) => x
            .as_f64()
            .partial_cmp(&y.as_f64())
            .unwrap_or(Ordering::Equal),
        (Some(Str(x)), Some(Str(y))) => {
            match (x.parse::<DateTime<Utc>>(), y.parse::<DateTime<Utc>>()) {
                (Ok(x), Ok(y)) => x.cmp(&y),
                _ => x.cmp(y),
            }
        }
        (Some(Bool(x)), Some(Bool(y))) => x.cmp(y),
        (Some(x), Some(y)) => x.to_string().cmp(&y.to_string()),
    }
}
