//! `realtyops-auth` — identity and authorization boundary.
//!
//! Decoupled from HTTP and storage: tokens come in as strings, principals and
//! allow/deny decisions come out.

pub mod authorize;
pub mod claims;
pub mod jwt;
pub mod permissions;
pub mod principal;
pub mod roles;

pub use authorize::{authorize, authorize_command, AuthzError, CommandAuthorization};
pub use claims::{validate_claims, JwtClaims, TokenValidationError};
pub use jwt::{Hs256JwtValidator, JwtError, JwtValidator};
pub use permissions::Permission;
pub use principal::Principal;
pub use roles::{permissions_for, Role};
