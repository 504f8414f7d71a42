use axum::http::HeaderMap;

use realtyops_auth::{Principal, Role};
use realtyops_core::{Theme, UserId};

/// Principal context for a request (authenticated identity + permissions).
///
/// Inserted by the auth middleware; handlers take it as an extension.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrincipalContext {
    principal: Principal,
}

impl PrincipalContext {
    pub fn new(principal: Principal) -> Self {
        Self { principal }
    }

    pub fn user_id(&self) -> UserId {
        self.principal.user_id
    }

    pub fn email(&self) -> Option<&str> {
        self.principal.email.as_deref()
    }

    pub fn roles(&self) -> &[Role] {
        &self.principal.roles
    }

    pub fn principal(&self) -> &Principal {
        &self.principal
    }
}

/// Client hint carrying the caller's system color scheme.
pub const COLOR_SCHEME_HINT: &str = "sec-ch-prefers-color-scheme";

/// The system theme the client reported, if any.
pub fn system_theme(headers: &HeaderMap) -> Option<Theme> {
    headers
        .get(COLOR_SCHEME_HINT)?
        .to_str()
        .ok()?
        .trim()
        .trim_matches('"')
        .parse()
        .ok()
}
