use serde::Serialize;

use realtyops_core::UserId;

use crate::{permissions_for, JwtClaims, Permission, Role};

/// The authenticated user behind a request, with resolved permissions.
///
/// Built once per request from verified claims and passed explicitly to
/// whatever needs identity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Principal {
    pub user_id: UserId,
    pub email: Option<String>,
    pub roles: Vec<Role>,
    pub permissions: Vec<Permission>,
}

impl Principal {
    pub fn from_claims(claims: JwtClaims) -> Self {
        let permissions = permissions_for(&claims.roles);
        Self {
            user_id: claims.sub,
            email: claims.email,
            roles: claims.roles,
            permissions,
        }
    }

    pub fn has_wildcard(&self) -> bool {
        self.permissions.iter().any(Permission::is_wildcard)
    }
}
