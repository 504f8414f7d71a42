use std::str::FromStr;

use serde::{Deserialize, Serialize};

use realtyops_core::{DomainError, Theme, ThemePreference, UserId};
use realtyops_purchasing::PurchaseOrderStatus;

use crate::app::errors;
use crate::context::PrincipalContext;

// -------------------------
// Request DTOs
// -------------------------

#[derive(Debug, Default, Deserialize)]
pub struct ListParams {
    pub limit: Option<usize>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateOrderStatusRequest {
    pub status: PurchaseOrderStatus,
}

/// `theme: null` clears the saved choice and falls back to the system hint.
#[derive(Debug, Deserialize)]
pub struct UpdateSettingsRequest {
    pub theme: Option<Theme>,
}

// -------------------------
// Response DTOs
// -------------------------

#[derive(Debug, Serialize)]
pub struct WhoAmIResponse {
    pub user_id: UserId,
    pub email: Option<String>,
    pub roles: Vec<String>,
}

impl From<&PrincipalContext> for WhoAmIResponse {
    fn from(p: &PrincipalContext) -> Self {
        Self {
            user_id: p.user_id(),
            email: p.email().map(str::to_string),
            roles: p.roles().iter().map(|r| r.as_str().to_string()).collect(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct SettingsResponse {
    /// Effective theme for this request.
    pub theme: Theme,
    /// Explicit choice, if the user made one.
    pub saved_theme: Option<Theme>,
}

impl SettingsResponse {
    pub fn new(pref: ThemePreference, system: Option<Theme>) -> Self {
        Self {
            theme: pref.resolve(system),
            saved_theme: pref.saved,
        }
    }
}

// -------------------------
// Helpers
// -------------------------

/// Parse a path id, answering 400 `invalid_id` when malformed.
pub fn parse_id<T>(raw: &str) -> Result<T, axum::response::Response>
where
    T: FromStr<Err = DomainError>,
{
    raw.parse().map_err(errors::domain_error_to_response)
}
