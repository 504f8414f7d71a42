use std::sync::Arc;

use axum::{extract::Extension, response::IntoResponse, Json};

use crate::app::errors;
use crate::app::services::AppServices;

pub async fn show(Extension(services): Extension<Arc<AppServices>>) -> axum::response::Response {
    match realtyops_infra::load_dashboard(&*services.store).await {
        Ok(snapshot) => Json(snapshot).into_response(),
        Err(e) => errors::store_error_to_response(e),
    }
}
