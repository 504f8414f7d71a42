use axum::http::StatusCode;
use axum::response::IntoResponse;
use serde_json::json;

use realtyops_auth::AuthzError;
use realtyops_core::DomainError;
use realtyops_infra::{OrderChange, OrderServiceError, StoreError, SyncOutcome};

pub fn json_error(
    status: StatusCode,
    code: &'static str,
    message: impl Into<String>,
) -> axum::response::Response {
    (
        status,
        axum::Json(json!({
            "error": code,
            "message": message.into(),
        })),
    )
        .into_response()
}

pub fn domain_error_to_response(err: DomainError) -> axum::response::Response {
    let message = err.to_string();
    match err {
        DomainError::Validation(_) => json_error(StatusCode::BAD_REQUEST, "validation_error", message),
        DomainError::InvalidId(_) => json_error(StatusCode::BAD_REQUEST, "invalid_id", message),
        DomainError::InvariantViolation(_) => {
            json_error(StatusCode::UNPROCESSABLE_ENTITY, "invariant_violation", message)
        }
        DomainError::NotFound(_) => json_error(StatusCode::NOT_FOUND, "not_found", message),
        DomainError::Conflict(_) => json_error(StatusCode::CONFLICT, "conflict", message),
        DomainError::Unauthorized => json_error(StatusCode::FORBIDDEN, "unauthorized", message),
    }
}

/// Backing store failures. Nothing here is fatal to the process.
pub fn store_error_to_response(err: StoreError) -> axum::response::Response {
    tracing::error!(error = %err, "backing store request failed");
    match err {
        StoreError::Duplicate { .. } => json_error(StatusCode::CONFLICT, "conflict", err.to_string()),
        StoreError::Backend { .. } => json_error(StatusCode::BAD_GATEWAY, "store_unavailable", err.to_string()),
        StoreError::Decode { .. } | StoreError::MalformedRecord { .. } => {
            json_error(StatusCode::INTERNAL_SERVER_ERROR, "store_error", err.to_string())
        }
    }
}

pub fn order_error_to_response(err: OrderServiceError) -> axum::response::Response {
    match err {
        OrderServiceError::Domain(e) => domain_error_to_response(e),
        OrderServiceError::Store(e) => store_error_to_response(e),
    }
}

pub fn forbidden(err: AuthzError) -> axum::response::Response {
    json_error(StatusCode::FORBIDDEN, "forbidden", err.to_string())
}

pub fn not_found(entity: &'static str) -> axum::response::Response {
    domain_error_to_response(DomainError::not_found(entity))
}

/// The order write succeeded but its property did not follow.
///
/// The body still carries the order with its new status, plus the command that
/// failed so the caller can reconcile.
pub fn property_sync_failed(change: OrderChange) -> axum::response::Response {
    let message = match &change.sync {
        SyncOutcome::Failed { error, .. } => {
            format!("order saved, but the property status could not be updated: {error}")
        }
        _ => "order saved, but the property status could not be updated".to_string(),
    };
    (
        StatusCode::BAD_GATEWAY,
        axum::Json(json!({
            "error": "property_sync_failed",
            "message": message,
            "order": change.order,
            "sync": change.sync,
        })),
    )
        .into_response()
}
