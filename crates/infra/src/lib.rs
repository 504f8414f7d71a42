//! Infrastructure layer: record store backends, workflows over them, config.

pub mod config;
pub mod dashboard;
pub mod orders;
pub mod repo;
pub mod settings;
pub mod store;
pub mod sync_executor;

pub use config::{AppConfig, ConfigError, StoreBackend};
pub use dashboard::{load_dashboard, DashboardSnapshot};
pub use orders::{OrderChange, OrderDetails, OrderService, OrderServiceError, SyncOutcome};
pub use store::{InMemoryRecordStore, PostgresRecordStore, RecordStore, StoreError, Table};
pub use sync_executor::{EffectExecutor, StoreEffectExecutor, SyncError};
