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
use realtyops_parties::{Client, ClientDraft, ClientId};

use crate::app::routes::common::CmdAuth;
use crate::app::services::AppServices;
use crate::app::{dto, errors};
use crate::context::PrincipalContext;

pub fn router() -> Router {
    Router::new()
        .route("/", get(list_clients).post(create_client))
        .route(
            "/:id",
            get(get_client).put(update_client).delete(delete_client),
        )
}

pub async fn list_clients(
    Extension(services): Extension<Arc<AppServices>>,
    QueryParams(params): QueryParams<dto::ListParams>,
) -> axum::response::Response {
    let mut query = Query::all().newest_first();
    query.limit = params.limit;
    match repo::list::<Client, _>(&*services.store, &query).await {
        Ok(items) => Json(items).into_response(),
        Err(e) => errors::store_error_to_response(e),
    }
}

pub async fn get_client(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let id: ClientId = match dto::parse_id(&id) {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    match repo::get::<Client, _>(&*services.store, id).await {
        Ok(Some(client)) => Json(client).into_response(),
        Ok(None) => errors::not_found("client"),
        Err(e) => errors::store_error_to_response(e),
    }
}

pub async fn create_client(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    Json(body): Json<ClientDraft>,
) -> axum::response::Response {
    let cmd = CmdAuth::new(body, [Permission::CLIENTS_CREATE]);
    if let Err(e) = crate::authz::authorize_command(&principal, &cmd) {
        return errors::forbidden(e);
    }

    let draft = match cmd.inner.validate(Utc::now()) {
        Ok(d) => d,
        Err(e) => return errors::domain_error_to_response(e),
    };
    let client = draft.into_client(ClientId::generate(), principal.user_id(), Utc::now());

    match repo::insert(&*services.store, &client).await {
        Ok(saved) => {
            tracing::info!(client_id = %saved.id, "client created");
            (StatusCode::CREATED, Json(saved)).into_response()
        }
        Err(e) => errors::store_error_to_response(e),
    }
}

pub async fn update_client(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    Path(id): Path<String>,
    Json(body): Json<ClientDraft>,
) -> axum::response::Response {
    let id: ClientId = match dto::parse_id(&id) {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    let cmd = CmdAuth::new(body, [Permission::CLIENTS_UPDATE]);
    if let Err(e) = crate::authz::authorize_command(&principal, &cmd) {
        return errors::forbidden(e);
    }

    let draft = match cmd.inner.validate(Utc::now()) {
        Ok(d) => d,
        Err(e) => return errors::domain_error_to_response(e),
    };
    let mut client = match repo::get::<Client, _>(&*services.store, id).await {
        Ok(Some(client)) => client,
        Ok(None) => return errors::not_found("client"),
        Err(e) => return errors::store_error_to_response(e),
    };
    draft.apply_to(&mut client);

    match repo::replace(&*services.store, &client).await {
        Ok(Some(saved)) => Json(saved).into_response(),
        Ok(None) => errors::not_found("client"),
        Err(e) => errors::store_error_to_response(e),
    }
}

pub async fn delete_client(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let id: ClientId = match dto::parse_id(&id) {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    let cmd = CmdAuth::new(id, [Permission::CLIENTS_DELETE]);
    if let Err(e) = crate::authz::authorize_command(&principal, &cmd) {
        return errors::forbidden(e);
    }

    match repo::delete::<Client, _>(&*services.store, cmd.inner).await {
        Ok(true) => StatusCode::NO_CONTENT.into_response(),
        Ok(false) => errors::not_found("client"),
        Err(e) => errors::store_error_to_response(e),
    }
}
