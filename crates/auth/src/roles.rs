use std::borrow::Cow;

use serde::{Deserialize, Serialize};

use crate::Permission;

/// Role identifier used for RBAC.
///
/// Roles arrive as opaque strings in the token; [`permissions_for`] is the
/// single place that gives them meaning.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Role(Cow<'static, str>);

impl Role {
    /// Full access, including deletes.
    pub const ADMIN: Role = Role(Cow::Borrowed("admin"));
    /// Day-to-day back-office staff: create and edit everything.
    pub const AGENT: Role = Role(Cow::Borrowed("agent"));

    pub fn new(name: impl Into<Cow<'static, str>>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl core::fmt::Display for Role {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Role → permission policy.
///
/// `admin` is granted the wildcard; `agent` every write permission except
/// deletes; unknown roles nothing. Reads only need an authenticated principal.
pub fn permissions_for(roles: &[Role]) -> Vec<Permission> {
    if roles.iter().any(|r| r == &Role::ADMIN) {
        return vec![Permission::new("*")];
    }

    let mut granted = Vec::new();
    if roles.iter().any(|r| r == &Role::AGENT) {
        granted.extend(
            Permission::ALL_WRITES
                .iter()
                .filter(|p| !p.as_str().ends_with(".delete"))
                .cloned(),
        );
    }
    granted
}
