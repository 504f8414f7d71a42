use std::sync::Arc;

use axum::{
    extract::{Extension, Path, Query as QueryParams},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post, put},
    Json, Router,
};

use realtyops_auth::Permission;
use realtyops_infra::{OrderChange, OrderServiceError};
use realtyops_purchasing::{property_sync, NewPurchaseOrder, PurchaseOrder, PurchaseOrderId, PurchaseOrderStatus};

use crate::app::routes::common::CmdAuth;
use crate::app::services::AppServices;
use crate::app::{dto, errors};
use crate::context::PrincipalContext;

pub fn router() -> Router {
    Router::new()
        .route("/", get(list_purchase_orders).post(create_purchase_order))
        .route("/:id", get(get_purchase_order).delete(delete_purchase_order))
        .route("/:id/status", put(update_purchase_order_status))
        .route("/:id/reconcile", post(reconcile_purchase_order))
}

/// Map an order write to a response. A failed property synchronization is
/// reported even though the order write itself succeeded.
fn change_response(status: StatusCode, result: Result<OrderChange, OrderServiceError>) -> axum::response::Response {
    match result {
        Ok(change) if change.sync.is_failed() => errors::property_sync_failed(change),
        Ok(change) => (status, Json(change)).into_response(),
        Err(e) => errors::order_error_to_response(e),
    }
}

pub async fn list_purchase_orders(
    Extension(services): Extension<Arc<AppServices>>,
    QueryParams(params): QueryParams<dto::ListParams>,
) -> axum::response::Response {
    match services.orders.list(params.limit).await {
        Ok(items) => Json(items).into_response(),
        Err(e) => errors::store_error_to_response(e),
    }
}

pub async fn get_purchase_order(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let id: PurchaseOrderId = match dto::parse_id(&id) {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    match services.orders.get(id).await {
        Ok(details) => Json(details).into_response(),
        Err(e) => errors::order_error_to_response(e),
    }
}

pub async fn create_purchase_order(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    Json(body): Json<NewPurchaseOrder>,
) -> axum::response::Response {
    // Opening an order as sold also writes the property.
    let mut required = vec![Permission::PURCHASE_ORDERS_CREATE];
    if body.status.is_some_and(|s| s.is_sold()) {
        required.push(Permission::PROPERTIES_UPDATE);
    }
    let cmd = CmdAuth::new(body, required);
    if let Err(e) = crate::authz::authorize_command(&principal, &cmd) {
        return errors::forbidden(e);
    }

    let result = services.orders.create(principal.user_id(), cmd.inner).await;
    change_response(StatusCode::CREATED, result)
}

/// A status change needs `properties.update` only when it also writes the property.
fn status_change_permissions(current: &PurchaseOrder, status: PurchaseOrderStatus) -> Vec<Permission> {
    let mut required = vec![Permission::PURCHASE_ORDERS_UPDATE];
    if property_sync(current.status, status, current.property_id).is_some() {
        required.push(Permission::PROPERTIES_UPDATE);
    }
    required
}

pub async fn update_purchase_order_status(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    Path(id): Path<String>,
    Json(body): Json<dto::UpdateOrderStatusRequest>,
) -> axum::response::Response {
    let id: PurchaseOrderId = match dto::parse_id(&id) {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    let current = match services.orders.find(id).await {
        Ok(order) => order,
        Err(e) => return errors::order_error_to_response(e),
    };
    let required = status_change_permissions(&current, body.status);
    let cmd = CmdAuth::new(body, required);
    if let Err(e) = crate::authz::authorize_command(&principal, &cmd) {
        return errors::forbidden(e);
    }

    let result = services.orders.update_status(id, cmd.inner.status).await;
    change_response(StatusCode::OK, result)
}

/// Manual recovery after a failed synchronization.
pub async fn reconcile_purchase_order(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let id: PurchaseOrderId = match dto::parse_id(&id) {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    let cmd = CmdAuth::new(id, [Permission::PROPERTIES_UPDATE]);
    if let Err(e) = crate::authz::authorize_command(&principal, &cmd) {
        return errors::forbidden(e);
    }

    let result = services.orders.reconcile(cmd.inner).await;
    change_response(StatusCode::OK, result)
}

/// Deleting an order leaves its property's status as it is.
pub async fn delete_purchase_order(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let id: PurchaseOrderId = match dto::parse_id(&id) {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    let cmd = CmdAuth::new(id, [Permission::PURCHASE_ORDERS_DELETE]);
    if let Err(e) = crate::authz::authorize_command(&principal, &cmd) {
        return errors::forbidden(e);
    }

    match services.orders.delete(cmd.inner).await {
        Ok(true) => StatusCode::NO_CONTENT.into_response(),
        Ok(false) => errors::not_found("purchase order"),
        Err(e) => errors::store_error_to_response(e),
    }
}
