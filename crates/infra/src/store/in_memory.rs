use std::collections::HashMap;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use async_trait::async_trait;
use chrono::Utc;
use serde_json::Value as JsonValue;

use super::{
    compare_json, record_id, strip_identity, Direction, Filter, Query, Record, RecordStore,
    StoreError, Table, CREATED_AT_FIELD,
};

/// In-memory record store for tests/dev.
///
/// Rows are kept per table in insertion order, so records created within the
/// same instant keep a stable relative order.
#[derive(Debug, Default)]
pub struct InMemoryRecordStore {
    inner: RwLock<HashMap<Table, Vec<Record>>>,
}

impl InMemoryRecordStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self, operation: &'static str) -> Result<RwLockReadGuard<'_, HashMap<Table, Vec<Record>>>, StoreError> {
        self.inner
            .read()
            .map_err(|_| StoreError::backend(operation, "lock poisoned"))
    }

    fn write(&self, operation: &'static str) -> Result<RwLockWriteGuard<'_, HashMap<Table, Vec<Record>>>, StoreError> {
        self.inner
            .write()
            .map_err(|_| StoreError::backend(operation, "lock poisoned"))
    }
}

#[async_trait]
impl RecordStore for InMemoryRecordStore {
    async fn select(&self, table: Table, query: &Query) -> Result<Vec<Record>, StoreError> {
        let map = self.read("select")?;
        let mut rows: Vec<Record> = map
            .get(&table)
            .map(|rows| rows.iter().filter(|r| query.filter.matches(r)).cloned().collect())
            .unwrap_or_default();
        drop(map);

        if let Some(order) = &query.order {
            rows.sort_by(|a, b| {
                let ord = compare_json(a.get(&order.field), b.get(&order.field));
                match order.direction {
                    Direction::Ascending => ord,
                    Direction::Descending => ord.reverse(),
                }
            });
        }
        if let Some(limit) = query.limit {
            rows.truncate(limit);
        }
        Ok(rows)
    }

    async fn count(&self, table: Table, filter: &Filter) -> Result<u64, StoreError> {
        let map = self.read("count")?;
        let n = map
            .get(&table)
            .map(|rows| rows.iter().filter(|r| filter.matches(r)).count())
            .unwrap_or(0);
        Ok(n as u64)
    }

    async fn insert(&self, table: Table, mut record: Record) -> Result<Record, StoreError> {
        let id = record_id(table, &record)?;
        if !record.contains_key(CREATED_AT_FIELD) {
            record.insert(
                CREATED_AT_FIELD.to_string(),
                JsonValue::String(Utc::now().to_rfc3339()),
            );
        }

        let mut map = self.write("insert")?;
        let rows = map.entry(table).or_default();
        if rows.iter().any(|r| record_id(table, r).is_ok_and(|existing| existing == id)) {
            return Err(StoreError::Duplicate { table, id });
        }
        rows.push(record.clone());
        Ok(record)
    }

    async fn update(&self, table: Table, filter: &Filter, fields: Record) -> Result<Vec<Record>, StoreError> {
        let fields = strip_identity(fields);
        let mut map = self.write("update")?;
        let Some(rows) = map.get_mut(&table) else {
            return Ok(Vec::new());
        };

        let mut updated = Vec::new();
        for row in rows.iter_mut().filter(|r| filter.matches(r)) {
            for (k, v) in &fields {
                row.insert(k.clone(), v.clone());
            }
            updated.push(row.clone());
        }
        Ok(updated)
    }

    async fn delete(&self, table: Table, filter: &Filter) -> Result<u64, StoreError> {
        let mut map = self.write("delete")?;
        let Some(rows) = map.get_mut(&table) else {
            return Ok(0);
        };
        let before = rows.len();
        rows.retain(|r| !filter.matches(r));
        Ok((before - rows.len()) as u64)
    }
}
