//! Purchasing domain module (purchase orders linking a client to a property).
//!
//! Besides the order record itself this crate owns the rule that keeps a
//! property's status in step with its order. The rule is pure: it only decides
//! which property write is needed and leaves performing it to the caller.

pub mod order;
pub mod sync;

pub use order::{ensure_references, NewPurchaseOrder, PurchaseOrder, PurchaseOrderId, PurchaseOrderStatus};
pub use sync::{property_sync, reconcile, PropertyStatusUpdate, PROPERTIES_TABLE};
