//! Postgres-backed record store.
//!
//! Every table lives in one `records` relation keyed by `(tbl, id)`, with the
//! record body held as `jsonb`:
//!
//! ```sql
//! records(tbl TEXT, id UUID, created_at TIMESTAMPTZ, doc JSONB)
//! ```
//!
//! Filters compile to `doc -> field` comparisons; an `id` equality uses the
//! primary key instead. Ordering on `created_at` uses the indexed column.
//!
//! ## Error Mapping
//!
//! | SQLx Error | PostgreSQL Error Code | StoreError |
//! |------------|----------------------|------------|
//! | Database (unique violation) on insert | `23505` | `Duplicate` |
//! | Database (other) | Any other | `Backend` |
//! | PoolClosed | N/A | `Backend` |
//! | Other | N/A | `Backend` |

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::Value as JsonValue;
use sqlx::postgres::{PgPoolOptions, PgRow};
use sqlx::{PgPool, Postgres, QueryBuilder, Row};
use tracing::{Span, instrument};
use uuid::Uuid;

use super::{
    record_id, strip_identity, Condition, Direction, Filter, Query, Record, RecordStore,
    StoreError, Table, CREATED_AT_FIELD, ID_FIELD,
};

const SCHEMA: [&str; 2] = [
    r#"
    CREATE TABLE IF NOT EXISTS records (
        tbl        TEXT        NOT NULL,
        id         UUID        NOT NULL,
        created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
        doc        JSONB       NOT NULL,
        PRIMARY KEY (tbl, id)
    )
    "#,
    "CREATE INDEX IF NOT EXISTS records_tbl_created_at ON records (tbl, created_at DESC)",
];

const MAX_CONNECTIONS: u32 = 10;

#[derive(Debug, Clone)]
pub struct PostgresRecordStore {
    pool: Arc<PgPool>,
}

impl PostgresRecordStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool: Arc::new(pool) }
    }

    /// Open a pool against `database_url`.
    pub async fn connect(database_url: &str) -> Result<Self, StoreError> {
        let pool = PgPoolOptions::new()
            .max_connections(MAX_CONNECTIONS)
            .connect(database_url)
            .await
            .map_err(|e| map_sqlx_error("connect", e))?;
        Ok(Self::new(pool))
    }

    /// Create the `records` relation and its index when missing.
    pub async fn ensure_schema(&self) -> Result<(), StoreError> {
        for statement in SCHEMA {
            sqlx::query(statement)
                .execute(&*self.pool)
                .await
                .map_err(|e| map_sqlx_error("ensure_schema", e))?;
        }
        Ok(())
    }
}

#[async_trait]
impl RecordStore for PostgresRecordStore {
    #[instrument(skip(self, query), fields(table = %table, rows = tracing::field::Empty), err)]
    async fn select(&self, table: Table, query: &Query) -> Result<Vec<Record>, StoreError> {
        let mut qb = QueryBuilder::<Postgres>::new("SELECT doc FROM records WHERE tbl = ");
        qb.push_bind(table.as_str());
        push_filter(&mut qb, &query.filter);

        if let Some(order) = &query.order {
            let direction = match order.direction {
                Direction::Ascending => " ASC",
                Direction::Descending => " DESC",
            };
            qb.push(" ORDER BY ");
            if order.field == CREATED_AT_FIELD {
                qb.push("created_at");
            } else {
                qb.push("doc -> ").push_bind(order.field.clone());
            }
            qb.push(direction).push(", id").push(direction);
        }
        if let Some(limit) = query.limit {
            qb.push(" LIMIT ").push_bind(i64::try_from(limit).unwrap_or(i64::MAX));
        }

        let rows = qb
            .build()
            .fetch_all(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("select", e))?;

        Span::current().record("rows", rows.len());
        rows.iter().map(|row| decode_doc(table, row)).collect()
    }

    #[instrument(skip(self, filter), fields(table = %table), err)]
    async fn count(&self, table: Table, filter: &Filter) -> Result<u64, StoreError> {
        let mut qb = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM records WHERE tbl = ");
        qb.push_bind(table.as_str());
        push_filter(&mut qb, filter);

        let n: i64 = qb
            .build_query_scalar()
            .fetch_one(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("count", e))?;
        Ok(u64::try_from(n).unwrap_or(0))
    }

    #[instrument(skip(self, record), fields(table = %table, id = tracing::field::Empty), err)]
    async fn insert(&self, table: Table, mut record: Record) -> Result<Record, StoreError> {
        let id = record_id(table, &record)?;
        Span::current().record("id", id.as_str());
        let uuid = Uuid::parse_str(&id).map_err(|e| StoreError::MalformedRecord {
            table,
            message: format!("id '{id}' is not a UUID: {e}"),
        })?;

        let created_at = match record.get(CREATED_AT_FIELD) {
            Some(JsonValue::String(s)) => s.parse::<DateTime<Utc>>().map_err(|e| {
                StoreError::MalformedRecord {
                    table,
                    message: format!("created_at '{s}' is not a timestamp: {e}"),
                }
            })?,
            _ => {
                let now = Utc::now();
                record.insert(CREATED_AT_FIELD.to_string(), JsonValue::String(now.to_rfc3339()));
                now
            }
        };

        let row = sqlx::query(
            r#"
            INSERT INTO records (tbl, id, created_at, doc)
            VALUES ($1, $2, $3, $4)
            RETURNING doc
            "#,
        )
        .bind(table.as_str())
        .bind(uuid)
        .bind(created_at)
        .bind(JsonValue::Object(record))
        .fetch_one(&*self.pool)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                StoreError::Duplicate { table, id: id.clone() }
            } else {
                map_sqlx_error("insert", e)
            }
        })?;

        decode_doc(table, &row)
    }

    #[instrument(skip(self, filter, fields), fields(table = %table, rows = tracing::field::Empty), err)]
    async fn update(&self, table: Table, filter: &Filter, fields: Record) -> Result<Vec<Record>, StoreError> {
        let fields = strip_identity(fields);
        let mut qb = QueryBuilder::<Postgres>::new("UPDATE records SET doc = doc || ");
        qb.push_bind(JsonValue::Object(fields));
        qb.push(" WHERE tbl = ").push_bind(table.as_str());
        push_filter(&mut qb, filter);
        qb.push(" RETURNING doc");

        let rows = qb
            .build()
            .fetch_all(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("update", e))?;

        Span::current().record("rows", rows.len());
        rows.iter().map(|row| decode_doc(table, row)).collect()
    }

    #[instrument(skip(self, filter), fields(table = %table), err)]
    async fn delete(&self, table: Table, filter: &Filter) -> Result<u64, StoreError> {
        let mut qb = QueryBuilder::<Postgres>::new("DELETE FROM records WHERE tbl = ");
        qb.push_bind(table.as_str());
        push_filter(&mut qb, filter);

        let result = qb
            .build()
            .execute(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("delete", e))?;
        Ok(result.rows_affected())
    }
}

/// Append ` AND <condition>` for every filter condition.
fn push_filter(qb: &mut QueryBuilder<'_, Postgres>, filter: &Filter) {
    for condition in filter.conditions() {
        qb.push(" AND ");
        match condition {
            Condition::Eq(field, JsonValue::String(value)) if field == ID_FIELD => {
                match Uuid::parse_str(value) {
                    Ok(uuid) => {
                        qb.push("id = ").push_bind(uuid);
                    }
                    // Not a UUID, so no row can match.
                    Err(_) => {
                        qb.push("FALSE");
                    }
                }
            }
            Condition::Eq(field, value) => {
                qb.push("doc -> ")
                    .push_bind(field.clone())
                    .push(" = ")
                    .push_bind(value.clone());
            }
            Condition::In(field, values) => {
                qb.push("jsonb_build_array(doc -> ")
                    .push_bind(field.clone())
                    .push(") <@ ")
                    .push_bind(JsonValue::Array(values.clone()));
            }
        }
    }
}

fn decode_doc(table: Table, row: &PgRow) -> Result<Record, StoreError> {
    let doc: JsonValue = row.try_get("doc").map_err(|e| StoreError::Decode {
        table,
        message: e.to_string(),
    })?;
    match doc {
        JsonValue::Object(map) => Ok(map),
        other => Err(StoreError::Decode {
            table,
            message: format!("expected a JSON object, found {other}"),
        }),
    }
}

/// Map SQLx errors to StoreError with operation context.
fn map_sqlx_error(operation: &'static str, err: sqlx::Error) -> StoreError {
    match err {
        sqlx::Error::Database(db_err) => {
            let msg = match db_err.code() {
                Some(code) => format!("database error {}: {}", code, db_err.message()),
                None => format!("database error: {}", db_err.message()),
            };
            StoreError::backend(operation, msg)
        }
        sqlx::Error::PoolClosed => StoreError::backend(operation, "connection pool closed"),
        sqlx::Error::PoolTimedOut => StoreError::backend(operation, "timed out waiting for a connection"),
        _ => StoreError::backend(operation, format!("sqlx error: {err}")),
    }
}

fn is_unique_violation(err: &sqlx::Error) -> bool {
    if let sqlx::Error::Database(db_err) = err {
        if let Some(code) = db_err.code() {
            return code.as_ref() == "23505";
        }
    }
    false
}
