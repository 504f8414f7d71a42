//! `realtyops-core` — shared domain building blocks.
//!
//! Pure types only: identifiers, the domain error model, the `Entity` trait and
//! the per-user theme preference. No storage or HTTP concerns live here.

pub mod entity;
pub mod error;
pub mod id;
pub mod settings;

pub use entity::Entity;
pub use error::{DomainError, DomainResult};
pub use id::{RecordId, UserId};
pub use settings::{Theme, ThemePreference};
