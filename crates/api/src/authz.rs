//! API-side authorization guard for writes.
//!
//! Checked before any store call, keeping domain and infra crates auth-agnostic.

use realtyops_auth::{AuthzError, CommandAuthorization};

use crate::context::PrincipalContext;

/// Check authorization for a write in the current request context.
pub fn authorize_command<C: CommandAuthorization>(
    principal: &PrincipalContext,
    command: &C,
) -> Result<(), AuthzError> {
    realtyops_auth::authorize_command(principal.principal(), command)
}
