//! Executes property status commands against the record store.

use async_trait::async_trait;
use serde_json::Value as JsonValue;
use thiserror::Error;
use tracing::debug;

use realtyops_listings::PropertyId;
use realtyops_purchasing::PropertyStatusUpdate;

use crate::store::{Filter, Record, RecordStore, StoreError, Table};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SyncError {
    #[error("property {0} no longer exists")]
    PropertyMissing(PropertyId),

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Performs the secondary write decided by the synchronizer.
///
/// One attempt per command; callers decide what to do with a failure.
#[async_trait]
pub trait EffectExecutor: Send + Sync {
    async fn apply(&self, update: &PropertyStatusUpdate) -> Result<(), SyncError>;
}

#[async_trait]
impl<E> EffectExecutor for std::sync::Arc<E>
where
    E: EffectExecutor + ?Sized,
{
    async fn apply(&self, update: &PropertyStatusUpdate) -> Result<(), SyncError> {
        (**self).apply(update).await
    }
}

/// Issues `update(properties, {id}, {status})` through a [`RecordStore`].
#[derive(Debug, Clone)]
pub struct StoreEffectExecutor<S> {
    store: S,
}

impl<S> StoreEffectExecutor<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }
}

#[async_trait]
impl<S> EffectExecutor for StoreEffectExecutor<S>
where
    S: RecordStore,
{
    async fn apply(&self, update: &PropertyStatusUpdate) -> Result<(), SyncError> {
        let mut fields = Record::new();
        fields.insert(
            "status".to_string(),
            JsonValue::String(update.status.as_str().to_string()),
        );

        let result = self
            .store
            .update(Table::Properties, &Filter::by_id(update.property_id), fields)
            .await;

        match result {
            Ok(rows) if rows.is_empty() => {
                debug!(property_id = %update.property_id, "no property matched the status update");
                Err(SyncError::PropertyMissing(update.property_id))
            }
            Ok(_) => {
                debug!(property_id = %update.property_id, status = %update.status, "property status written");
                Ok(())
            }
            Err(e) => Err(e.into()),
        }
    }
}
