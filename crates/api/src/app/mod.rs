//! HTTP API application wiring (Axum router + service wiring).
//!
//! - `services.rs`: store backend selection and the shared service bundle
//! - `routes/`: HTTP routes + handlers (one file per back-office area)
//! - `dto.rs`: request/response DTOs and path parsing helpers
//! - `errors.rs`: consistent error responses

use std::sync::Arc;

use axum::{routing::get, Extension, Router};
use tower::ServiceBuilder;

use realtyops_infra::{AppConfig, InMemoryRecordStore, RecordStore};

use crate::middleware;

pub mod dto;
pub mod errors;
pub mod routes;
pub mod services;

use services::AppServices;

/// Build the router over a fresh in-memory store (dev and tests).
pub fn build_app(jwt_secret: String) -> Router {
    let store: Arc<dyn RecordStore> = Arc::new(InMemoryRecordStore::new());
    build_app_with_services(jwt_secret, AppServices::new(store))
}

/// Build the router for the configured backend (public entrypoint used by `main.rs`).
pub async fn build_app_from_config(config: &AppConfig) -> anyhow::Result<Router> {
    let services = services::build_services(config).await?;
    Ok(build_app_with_services(config.jwt_secret.clone(), services))
}

pub fn build_app_with_services(jwt_secret: String, services: AppServices) -> Router {
    let jwt = Arc::new(realtyops_auth::Hs256JwtValidator::new(jwt_secret.into_bytes()));
    let auth_state = middleware::AuthState { jwt };

    // Protected routes: require a verified principal.
    let protected = routes::router()
        .layer(Extension(Arc::new(services)))
        .layer(axum::middleware::from_fn_with_state(
            auth_state,
            middleware::auth_middleware,
        ));

    Router::new()
        .route("/health", get(routes::system::health))
        .merge(protected)
        .layer(ServiceBuilder::new())
}
