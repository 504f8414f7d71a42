use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use realtyops_core::{DomainError, DomainResult, Entity, UserId};
use realtyops_listings::PropertyId;
use realtyops_parties::ClientId;

use crate::sync::{property_sync, PropertyStatusUpdate};

realtyops_core::record_id!(
    /// Purchase order identifier.
    PurchaseOrderId,
    "purchase order"
);

/// Purchase order status lifecycle.
///
/// Any status may be set from any other; only moves into or out of `Sold`
/// carry a side effect on the linked property.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PurchaseOrderStatus {
    #[default]
    #[serde(alias = "Pendente")]
    Pending,
    #[serde(alias = "Vendido")]
    Sold,
    #[serde(alias = "Cancelado")]
    Cancelled,
}

impl PurchaseOrderStatus {
    pub const ALL: [PurchaseOrderStatus; 3] = [
        PurchaseOrderStatus::Pending,
        PurchaseOrderStatus::Sold,
        PurchaseOrderStatus::Cancelled,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            PurchaseOrderStatus::Pending => "pending",
            PurchaseOrderStatus::Sold => "sold",
            PurchaseOrderStatus::Cancelled => "cancelled",
        }
    }

    pub fn is_sold(self) -> bool {
        self == PurchaseOrderStatus::Sold
    }
}

impl core::fmt::Display for PurchaseOrderStatus {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl core::str::FromStr for PurchaseOrderStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|status| status.as_str() == s.trim())
            .ok_or_else(|| DomainError::field("status", format!("unknown purchase order status '{s}'")))
    }
}

/// A purchase order as stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PurchaseOrder {
    pub id: PurchaseOrderId,
    #[serde(default)]
    pub status: PurchaseOrderStatus,
    pub client_id: ClientId,
    pub property_id: PropertyId,
    #[serde(default)]
    pub user_id: Option<UserId>,
    pub created_at: DateTime<Utc>,
}

impl PurchaseOrder {
    /// Move the order to `status`, returning the property write that keeps the
    /// linked listing in step (if any).
    pub fn set_status(&mut self, status: PurchaseOrderStatus) -> Option<PropertyStatusUpdate> {
        let previous = core::mem::replace(&mut self.status, status);
        property_sync(previous, status, self.property_id)
    }
}

impl Entity for PurchaseOrder {
    type Id = PurchaseOrderId;

    fn id(&self) -> PurchaseOrderId {
        self.id
    }

    fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}

/// Input for opening a purchase order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewPurchaseOrder {
    pub client_id: ClientId,
    pub property_id: PropertyId,
    #[serde(default)]
    pub status: Option<PurchaseOrderStatus>,
}

impl NewPurchaseOrder {
    /// Build the order record plus the property write its initial status implies.
    ///
    /// A new order is treated as coming from `Pending`, so opening one directly
    /// as `Sold` marks the property sold exactly like a later edit would.
    pub fn open(
        self,
        id: PurchaseOrderId,
        owner: UserId,
        now: DateTime<Utc>,
    ) -> (PurchaseOrder, Option<PropertyStatusUpdate>) {
        let mut order = PurchaseOrder {
            id,
            status: PurchaseOrderStatus::Pending,
            client_id: self.client_id,
            property_id: self.property_id,
            user_id: Some(owner),
            created_at: now,
        };
        let update = order.set_status(self.status.unwrap_or_default());
        (order, update)
    }
}

/// Reject an order whose references could not be resolved.
pub fn ensure_references(client_exists: bool, property_exists: bool) -> DomainResult<()> {
    if !client_exists {
        return Err(DomainError::invariant("purchase order references an unknown client"));
    }
    if !property_exists {
        return Err(DomainError::invariant("purchase order references an unknown property"));
    }
    Ok(())
}
