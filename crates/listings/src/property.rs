use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use realtyops_core::{DomainError, DomainResult, Entity, UserId};

realtyops_core::record_id!(
    /// Property (listing) identifier.
    PropertyId,
    "property"
);

/// Listing status lifecycle.
///
/// The backing store historically held Portuguese labels; those are accepted on
/// read and rewritten in the canonical form on the next write.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PropertyStatus {
    #[default]
    #[serde(alias = "À Venda")]
    ForSale,
    #[serde(alias = "Pendente")]
    Pending,
    #[serde(alias = "Vendido")]
    Sold,
}

impl PropertyStatus {
    /// Statuses counted as "active" inventory on the dashboard.
    pub const ACTIVE: [PropertyStatus; 2] = [PropertyStatus::ForSale, PropertyStatus::Pending];

    pub fn as_str(self) -> &'static str {
        match self {
            PropertyStatus::ForSale => "for_sale",
            PropertyStatus::Pending => "pending",
            PropertyStatus::Sold => "sold",
        }
    }

    /// Every label the status may be stored under, canonical first.
    pub fn stored_labels(self) -> &'static [&'static str] {
        match self {
            PropertyStatus::ForSale => &["for_sale", "À Venda"],
            PropertyStatus::Pending => &["pending", "Pendente"],
            PropertyStatus::Sold => &["sold", "Vendido"],
        }
    }

    pub fn is_active(self) -> bool {
        Self::ACTIVE.contains(&self)
    }
}

impl core::fmt::Display for PropertyStatus {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A listed property, as stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Property {
    pub id: PropertyId,
    #[serde(default)]
    pub name: Option<String>,
    pub address: String,
    /// Asking price in whole BRL.
    pub price: u64,
    pub beds: u32,
    pub baths: u32,
    /// Floor area in square metres.
    pub sqft: u32,
    #[serde(default)]
    pub status: PropertyStatus,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub user_id: Option<UserId>,
    pub created_at: DateTime<Utc>,
}

impl Property {
    /// Card title: the listing name, falling back to its address.
    pub fn title(&self) -> &str {
        self.name.as_deref().unwrap_or(&self.address)
    }
}

impl Entity for Property {
    type Id = PropertyId;

    fn id(&self) -> PropertyId {
        self.id
    }

    fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}

const MAX_ADDRESS_LEN: usize = 500;
/// R$ 1 trillion. Keeps dashboard sums far from `u64` limits.
pub const MAX_PRICE: u64 = 1_000_000_000_000;
pub const MAX_ROOMS: u32 = 100;
pub const MAX_SQFT: u32 = 1_000_000;

/// Editable listing fields, as submitted by the add/edit forms.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListingDraft {
    #[serde(default)]
    pub name: Option<String>,
    pub address: String,
    #[serde(default)]
    pub price: u64,
    #[serde(default)]
    pub beds: u32,
    #[serde(default)]
    pub baths: u32,
    #[serde(default)]
    pub sqft: u32,
    #[serde(default)]
    pub status: Option<PropertyStatus>,
    #[serde(default)]
    pub image_url: Option<String>,
}

impl ListingDraft {
    /// Trim text fields, drop blank optionals and check what's left.
    pub fn validate(mut self) -> DomainResult<Self> {
        self.address = self.address.trim().to_string();
        if self.address.is_empty() {
            return Err(DomainError::field("address", "must not be empty"));
        }
        if self.address.chars().count() > MAX_ADDRESS_LEN {
            return Err(DomainError::field(
                "address",
                format!("must be at most {MAX_ADDRESS_LEN} characters"),
            ));
        }

        if self.price > MAX_PRICE {
            return Err(DomainError::field("price", format!("must be at most {MAX_PRICE}")));
        }
        check_at_most("beds", self.beds, MAX_ROOMS)?;
        check_at_most("baths", self.baths, MAX_ROOMS)?;
        check_at_most("sqft", self.sqft, MAX_SQFT)?;

        self.name = non_blank(self.name);
        self.image_url = non_blank(self.image_url);
        if let Some(url) = &self.image_url {
            if !(url.starts_with("http://") || url.starts_with("https://")) {
                return Err(DomainError::field("image_url", "must be an http(s) URL"));
            }
        }

        Ok(self)
    }

    /// Build a new listing from a validated draft.
    pub fn into_property(self, id: PropertyId, owner: UserId, now: DateTime<Utc>) -> Property {
        Property {
            id,
            name: self.name,
            address: self.address,
            price: self.price,
            beds: self.beds,
            baths: self.baths,
            sqft: self.sqft,
            status: self.status.unwrap_or_default(),
            image_url: self.image_url,
            user_id: Some(owner),
            created_at: now,
        }
    }

    /// Replace every editable field of `property` (the edit form resubmits all of them).
    ///
    /// A draft without a status keeps the current one.
    pub fn apply_to(self, property: &mut Property) {
        property.name = self.name;
        property.address = self.address;
        property.price = self.price;
        property.beds = self.beds;
        property.baths = self.baths;
        property.sqft = self.sqft;
        if let Some(status) = self.status {
            property.status = status;
        }
        property.image_url = self.image_url;
    }
}

fn check_at_most(field: &'static str, value: u32, max: u32) -> DomainResult<()> {
    if value > max {
        return Err(DomainError::field(field, format!("must be at most {max}")));
    }
    Ok(())
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
