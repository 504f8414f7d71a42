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
use realtyops_parties::{Lead, LeadDraft, LeadId};

use crate::app::routes::common::CmdAuth;
use crate::app::services::AppServices;
use crate::app::{dto, errors};
use crate::context::PrincipalContext;

pub fn router() -> Router {
    Router::new()
        .route("/", get(list_leads).post(create_lead))
        .route(
            "/:id",
            get(get_lead).put(update_lead).delete(delete_lead),
        )
}

pub async fn list_leads(
    Extension(services): Extension<Arc<AppServices>>,
    QueryParams(params): QueryParams<dto::ListParams>,
) -> axum::response::Response {
    let mut query = Query::all().newest_first();
    query.limit = params.limit;
    match repo::list::<Lead, _>(&*services.store, &query).await {
        Ok(items) => Json(items).into_response(),
        Err(e) => errors::store_error_to_response(e),
    }
}

pub async fn get_lead(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let id: LeadId = match dto::parse_id(&id) {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    match repo::get::<Lead, _>(&*services.store, id).await {
        Ok(Some(lead)) => Json(lead).into_response(),
        Ok(None) => errors::not_found("lead"),
        Err(e) => errors::store_error_to_response(e),
    }
}

pub async fn create_lead(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    Json(body): Json<LeadDraft>,
) -> axum::response::Response {
    let cmd = CmdAuth::new(body, [Permission::LEADS_CREATE]);
    if let Err(e) = crate::authz::authorize_command(&principal, &cmd) {
        return errors::forbidden(e);
    }

    let draft = match cmd.inner.validate() {
        Ok(d) => d,
        Err(e) => return errors::domain_error_to_response(e),
    };
    let lead = draft.into_lead(LeadId::generate(), principal.user_id(), Utc::now());

    match repo::insert(&*services.store, &lead).await {
        Ok(saved) => {
            tracing::info!(lead_id = %saved.id, "lead created");
            (StatusCode::CREATED, Json(saved)).into_response()
        }
        Err(e) => errors::store_error_to_response(e),
    }
}

/// Omitted status and assignee keep their current values.
pub async fn update_lead(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    Path(id): Path<String>,
    Json(body): Json<LeadDraft>,
) -> axum::response::Response {
    let id: LeadId = match dto::parse_id(&id) {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    let cmd = CmdAuth::new(body, [Permission::LEADS_UPDATE]);
    if let Err(e) = crate::authz::authorize_command(&principal, &cmd) {
        return errors::forbidden(e);
    }

    let draft = match cmd.inner.validate() {
        Ok(d) => d,
        Err(e) => return errors::domain_error_to_response(e),
    };
    let mut lead = match repo::get::<Lead, _>(&*services.store, id).await {
        Ok(Some(lead)) => lead,
        Ok(None) => return errors::not_found("lead"),
        Err(e) => return errors::store_error_to_response(e),
    };
    draft.apply_to(&mut lead);

    match repo::replace(&*services.store, &lead).await {
        Ok(Some(saved)) => Json(saved).into_response(),
        Ok(None) => errors::not_found("lead"),
        Err(e) => errors::store_error_to_response(e),
    }
}

pub async fn delete_lead(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let id: LeadId = match dto::parse_id(&id) {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    let cmd = CmdAuth::new(id, [Permission::LEADS_DELETE]);
    if let Err(e) = crate::authz::authorize_command(&principal, &cmd) {
        return errors::forbidden(e);
    }

    match repo::delete::<Lead, _>(&*services.store, cmd.inner).await {
        Ok(true) => StatusCode::NO_CONTENT.into_response(),
        Ok(false) => errors::not_found("lead"),
        Err(e) => errors::store_error_to_response(e),
    }
}
