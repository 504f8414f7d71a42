//! Listings domain module (properties offered by the agency).
//!
//! Pure record types and input validation; reading and writing listings is the
//! infra layer's job.

pub mod price;
pub mod property;

pub use price::format_compact;
pub use property::{ListingDraft, Property, PropertyId, PropertyStatus};
