use std::sync::Arc;

use axum::{
    extract::{Extension, Path, Query as QueryParams},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use chrono::Utc;

use realtyops_auth::Permission;
use realtyops_infra::repo;
use realtyops_infra::store::Query;
use realtyops_listings::{ListingDraft, Property, PropertyId};

use crate::app::routes::common::CmdAuth;
use crate::app::services::AppServices;
use crate::app::{dto, errors};
use crate::context::PrincipalContext;

pub fn router() -> Router {
    Router::new()
        .route("/", get(list_properties).post(create_property))
        .route(
            "/:id",
            get(get_property).put(update_property).delete(delete_property),
        )
}

pub async fn list_properties(
    Extension(services): Extension<Arc<AppServices>>,
    QueryParams(params): QueryParams<dto::ListParams>,
) -> axum::response::Response {
    let mut query = Query::all().newest_first();
    query.limit = params.limit;
    match repo::list::<Property, _>(&*services.store, &query).await {
        Ok(items) => Json(items).into_response(),
        Err(e) => errors::store_error_to_response(e),
    }
}

pub async fn get_property(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let id: PropertyId = match dto::parse_id(&id) {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    match repo::get::<Property, _>(&*services.store, id).await {
        Ok(Some(p)) => Json(p).into_response(),
        Ok(None) => errors::not_found("property"),
        Err(e) => errors::store_error_to_response(e),
    }
}

pub async fn create_property(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    Json(body): Json<ListingDraft>,
) -> axum::response::Response {
    let cmd = CmdAuth::new(body, [Permission::PROPERTIES_CREATE]);
    if let Err(e) = crate::authz::authorize_command(&principal, &cmd) {
        return errors::forbidden(e);
    }

    let draft = match cmd.inner.validate() {
        Ok(d) => d,
        Err(e) => return errors::domain_error_to_response(e),
    };
    let property = draft.into_property(PropertyId::generate(), principal.user_id(), Utc::now());

    match repo::insert(&*services.store, &property).await {
        Ok(saved) => {
            tracing::info!(property_id = %saved.id, "property created");
            (StatusCode::CREATED, Json(saved)).into_response()
        }
        Err(e) => errors::store_error_to_response(e),
    }
}

/// Full replacement of the editable fields. Does not touch linked orders.
pub async fn update_property(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    Path(id): Path<String>,
    Json(body): Json<ListingDraft>,
) -> axum::response::Response {
    let id: PropertyId = match dto::parse_id(&id) {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    let cmd = CmdAuth::new(body, [Permission::PROPERTIES_UPDATE]);
    if let Err(e) = crate::authz::authorize_command(&principal, &cmd) {
        return errors::forbidden(e);
    }

    let draft = match cmd.inner.validate() {
        Ok(d) => d,
        Err(e) => return errors::domain_error_to_response(e),
    };
    let mut property = match repo::get::<Property, _>(&*services.store, id).await {
        Ok(Some(p)) => p,
        Ok(None) => return errors::not_found("property"),
        Err(e) => return errors::store_error_to_response(e),
    };
    draft.apply_to(&mut property);

    match repo::replace(&*services.store, &property).await {
        Ok(Some(saved)) => Json(saved).into_response(),
        Ok(None) => errors::not_found("property"),
        Err(e) => errors::store_error_to_response(e),
    }
}

pub async fn delete_property(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let id: PropertyId = match dto::parse_id(&id) {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    let cmd = CmdAuth::new(id, [Permission::PROPERTIES_DELETE]);
    if let Err(e) = crate::authz::authorize_command(&principal, &cmd) {
        return errors::forbidden(e);
    }

    match repo::delete::<Property, _>(&*services.store, cmd.inner).await {
        Ok(true) => StatusCode::NO_CONTENT.into_response(),
        Ok(false) => errors::not_found("property"),
        Err(e) => errors::store_error_to_response(e),
    }
}
