//! Entity trait: identity + continuity across edits.

use chrono::{DateTime, Utc};

/// A record with a stable identity, owned by the backing store.
///
/// Every back-office record (listing, lead, client, purchase order) carries an
/// id and the time it was created; list views order by the latter.
pub trait Entity {
    /// Strongly-typed entity identifier.
    type Id: Copy + Eq + core::hash::Hash + core::fmt::Debug + core::fmt::Display;

    /// Returns the entity identifier.
    fn id(&self) -> Self::Id;

    /// When the record was first stored.
    fn created_at(&self) -> DateTime<Utc>;
}
