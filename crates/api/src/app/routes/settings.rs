use std::sync::Arc;

use axum::{
    extract::Extension,
    http::HeaderMap,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};

use realtyops_core::ThemePreference;
use realtyops_infra::settings;

use crate::app::dto::{SettingsResponse, UpdateSettingsRequest};
use crate::app::errors;
use crate::app::services::AppServices;
use crate::context::{system_theme, PrincipalContext};

// Settings belong to the caller; any authenticated user may change their own.
pub fn router() -> Router {
    Router::new()
        .route("/", get(get_settings).put(update_settings))
        .route("/theme/toggle", post(toggle_theme))
}

pub async fn get_settings(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    headers: HeaderMap,
) -> axum::response::Response {
    match settings::load_preference(&*services.store, principal.user_id()).await {
        Ok(pref) => Json(SettingsResponse::new(pref, system_theme(&headers))).into_response(),
        Err(e) => errors::store_error_to_response(e),
    }
}

pub async fn update_settings(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    headers: HeaderMap,
    Json(body): Json<UpdateSettingsRequest>,
) -> axum::response::Response {
    let pref = ThemePreference { saved: body.theme };
    match settings::save_preference(&*services.store, principal.user_id(), pref).await {
        Ok(pref) => Json(SettingsResponse::new(pref, system_theme(&headers))).into_response(),
        Err(e) => errors::store_error_to_response(e),
    }
}

pub async fn toggle_theme(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    headers: HeaderMap,
) -> axum::response::Response {
    let system = system_theme(&headers);
    match settings::toggle_theme(&*services.store, principal.user_id(), system).await {
        Ok(pref) => Json(SettingsResponse::new(pref, system)).into_response(),
        Err(e) => errors::store_error_to_response(e),
    }
}
