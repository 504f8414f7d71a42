use axum::{routing::get, Router};

pub mod clients;
pub mod common;
pub mod dashboard;
pub mod leads;
pub mod properties;
pub mod purchase_orders;
pub mod settings;
pub mod system;

/// Router for all authenticated endpoints.
pub fn router() -> Router {
    Router::new()
        .route("/whoami", get(system::whoami))
        .route("/dashboard", get(dashboard::show))
        .nest("/properties", properties::router())
        .nest("/leads", leads::router())
        .nest("/clients", clients::router())
        .nest("/purchase-orders", purchase_orders::router())
        .nest("/settings", settings::router())
}
