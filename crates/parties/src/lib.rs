//! Parties domain module: the people the agency deals with.
//!
//! - `Lead`: a prospect moving through the sales funnel.
//! - `Client`: a buyer who can be named on purchase orders.

pub mod client;
pub mod contact;
pub mod lead;

pub use client::{Client, ClientDraft, ClientId};
pub use contact::ContactInfo;
pub use lead::{Lead, LeadDraft, LeadId, LeadStatus, DEFAULT_ASSIGNEE};
