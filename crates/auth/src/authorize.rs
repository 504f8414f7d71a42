use thiserror::Error;

use crate::{Permission, Principal};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AuthzError {
    #[error("forbidden: missing permission '{0}'")]
    Forbidden(String),
}

/// Write-side authorization contract, checked before a write is attempted.
pub trait CommandAuthorization {
    fn required_permissions(&self) -> &[Permission];
}

/// Authorize a principal for one permission.
///
/// No IO, no panics: a pure policy check.
pub fn authorize(principal: &Principal, required: &Permission) -> Result<(), AuthzError> {
    if principal.has_wildcard() || principal.permissions.contains(required) {
        Ok(())
    } else {
        tracing::debug!(user_id = %principal.user_id, permission = %required, "authorization denied");
        Err(AuthzError::Forbidden(required.as_str().to_string()))
    }
}

/// Check every permission a command requires.
pub fn authorize_command<C: CommandAuthorization>(principal: &Principal, command: &C) -> Result<(), AuthzError> {
    command
        .required_permissions()
        .iter()
        .try_for_each(|perm| authorize(principal, perm))
}
