use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use realtyops_core::{DomainError, DomainResult, Entity, UserId};

use crate::contact::ContactInfo;

realtyops_core::record_id!(
    /// Client identifier.
    ClientId,
    "client"
);

/// A buyer on record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Client {
    pub id: ClientId,
    pub name: String,
    #[serde(flatten)]
    pub contact: ContactInfo,
    #[serde(default, alias = "lastContact")]
    pub last_contact: Option<DateTime<Utc>>,
    #[serde(default)]
    pub user_id: Option<UserId>,
    pub created_at: DateTime<Utc>,
}

impl Entity for Client {
    type Id = ClientId;

    fn id(&self) -> ClientId {
        self.id
    }

    fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}

/// Editable client fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientDraft {
    pub name: String,
    #[serde(flatten)]
    pub contact: ContactInfo,
    #[serde(default, alias = "lastContact")]
    pub last_contact: Option<DateTime<Utc>>,
}

impl ClientDraft {
    pub fn validate(mut self, now: DateTime<Utc>) -> DomainResult<Self> {
        self.name = self.name.trim().to_string();
        if self.name.is_empty() {
            return Err(DomainError::field("name", "must not be empty"));
        }
        if matches!(self.last_contact, Some(at) if at > now) {
            return Err(DomainError::field("last_contact", "cannot be in the future"));
        }
        self.contact = self.contact.normalized()?;
        Ok(self)
    }

    pub fn into_client(self, id: ClientId, owner: UserId, now: DateTime<Utc>) -> Client {
        Client {
            id,
            name: self.name,
            contact: self.contact,
            last_contact: self.last_contact,
            user_id: Some(owner),
            created_at: now,
        }
    }

    pub fn apply_to(self, client: &mut Client) {
        client.name = self.name;
        client.contact = self.contact;
        client.last_contact = self.last_contact;
    }
}
