//! Order → property status synchronization.
//!
//! An order becoming `Sold` marks its property `Sold`; an order leaving `Sold`
//! puts the property back on sale. Every other edit leaves the property alone.
//!
//! Both functions here only *decide*. The write itself goes through whatever
//! executor the caller injects, after the order write has completed. The two
//! writes are independent: if the property write fails the order keeps its new
//! status and the failure is reported, not compensated.

use serde::{Deserialize, Serialize};

use realtyops_listings::{PropertyId, PropertyStatus};

use crate::order::PurchaseOrderStatus;

/// Table every synchronization command targets.
pub const PROPERTIES_TABLE: &str = "properties";

/// Command: set the status of one property, matched by id.
///
/// Shape on the wire:
/// `update(table="properties", filter={id: <property_id>}, fields={status: <value>})`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PropertyStatusUpdate {
    pub property_id: PropertyId,
    pub status: PropertyStatus,
}

impl PropertyStatusUpdate {
    pub fn table(&self) -> &'static str {
        PROPERTIES_TABLE
    }
}

/// Decide the property write implied by an order moving from `old` to `new`.
pub fn property_sync(
    old: PurchaseOrderStatus,
    new: PurchaseOrderStatus,
    property_id: PropertyId,
) -> Option<PropertyStatusUpdate> {
    let status = match (old.is_sold(), new.is_sold()) {
        (false, true) => PropertyStatus::Sold,
        (true, false) => PropertyStatus::ForSale,
        _ => return None,
    };
    Some(PropertyStatusUpdate { property_id, status })
}

/// Decide the write that makes a property agree with its order's current status.
///
/// Used for manual reconciliation after a failed synchronization: unlike
/// [`property_sync`] it looks at the property's actual status, so running it
/// on records that already agree is a no-op.
pub fn reconcile(
    order: PurchaseOrderStatus,
    property: PropertyStatus,
    property_id: PropertyId,
) -> Option<PropertyStatusUpdate> {
    let status = match (order.is_sold(), property == PropertyStatus::Sold) {
        (true, false) => PropertyStatus::Sold,
        (false, true) => PropertyStatus::ForSale,
        _ => return None,
    };
    Some(PropertyStatusUpdate { property_id, status })
}
