//! Store backend selection and the service bundle shared by handlers.

use std::sync::Arc;

use realtyops_infra::{
    AppConfig, EffectExecutor, InMemoryRecordStore, OrderService, PostgresRecordStore, RecordStore,
    StoreBackend, StoreEffectExecutor, StoreError,
};

pub type SharedStore = Arc<dyn RecordStore>;
pub type SharedExecutor = Arc<dyn EffectExecutor>;

pub struct AppServices {
    pub store: SharedStore,
    pub orders: OrderService<SharedStore, SharedExecutor>,
}

impl AppServices {
    /// Property synchronization writes through the same store.
    pub fn new(store: SharedStore) -> Self {
        let executor: SharedExecutor = Arc::new(StoreEffectExecutor::new(store.clone()));
        Self::with_executor(store, executor)
    }

    pub fn with_executor(store: SharedStore, executor: SharedExecutor) -> Self {
        Self {
            orders: OrderService::new(store.clone(), executor),
            store,
        }
    }
}

pub async fn build_services(config: &AppConfig) -> Result<AppServices, StoreError> {
    let store: SharedStore = match &config.store {
        StoreBackend::InMemory => {
            tracing::info!("using in-memory record store");
            Arc::new(InMemoryRecordStore::new())
        }
        StoreBackend::Postgres { database_url } => {
            let store = PostgresRecordStore::connect(database_url).await?;
            store.ensure_schema().await?;
            tracing::info!("using postgres record store");
            Arc::new(store)
        }
    };
    Ok(AppServices::new(store))
}
