use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use realtyops_core::{DomainError, DomainResult, Entity, UserId};

use crate::contact::{non_blank, ContactInfo};

realtyops_core::record_id!(
    /// Lead identifier.
    LeadId,
    "lead"
);

/// Assignee recorded when the form leaves it blank.
pub const DEFAULT_ASSIGNEE: &str = "You";

/// Funnel stage of a lead.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LeadStatus {
    #[default]
    #[serde(alias = "New")]
    New,
    #[serde(alias = "Contacted")]
    Contacted,
    #[serde(alias = "Qualified")]
    Qualified,
    #[serde(alias = "Lost")]
    Lost,
}

impl LeadStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            LeadStatus::New => "new",
            LeadStatus::Contacted => "contacted",
            LeadStatus::Qualified => "qualified",
            LeadStatus::Lost => "lost",
        }
    }

    /// Whether the lead is still worth working.
    pub fn is_open(self) -> bool {
        self != LeadStatus::Lost
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Lead {
    pub id: LeadId,
    pub name: String,
    #[serde(flatten)]
    pub contact: ContactInfo,
    #[serde(default)]
    pub status: LeadStatus,
    /// Where the lead came from (portal, referral, walk-in...).
    #[serde(default)]
    pub source: String,
    #[serde(default, alias = "assignedTo")]
    pub assigned_to: String,
    #[serde(default)]
    pub user_id: Option<UserId>,
    pub created_at: DateTime<Utc>,
}

impl Entity for Lead {
    type Id = LeadId;

    fn id(&self) -> LeadId {
        self.id
    }

    fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}

/// Editable lead fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeadDraft {
    pub name: String,
    #[serde(flatten)]
    pub contact: ContactInfo,
    #[serde(default)]
    pub status: Option<LeadStatus>,
    #[serde(default)]
    pub source: Option<String>,
    #[serde(default, alias = "assignedTo")]
    pub assigned_to: Option<String>,
}

impl LeadDraft {
    pub fn validate(mut self) -> DomainResult<Self> {
        self.name = self.name.trim().to_string();
        if self.name.is_empty() {
            return Err(DomainError::field("name", "must not be empty"));
        }
        self.contact = self.contact.normalized()?;
        self.source = non_blank(self.source);
        self.assigned_to = non_blank(self.assigned_to);
        Ok(self)
    }

    pub fn into_lead(self, id: LeadId, owner: UserId, now: DateTime<Utc>) -> Lead {
        Lead {
            id,
            name: self.name,
            contact: self.contact,
            status: self.status.unwrap_or_default(),
            source: self.source.unwrap_or_default(),
            assigned_to: self
                .assigned_to
                .unwrap_or_else(|| DEFAULT_ASSIGNEE.to_string()),
            user_id: Some(owner),
            created_at: now,
        }
    }

    /// Overwrite the lead's editable fields; omitted status/assignee keep their value.
    pub fn apply_to(self, lead: &mut Lead) {
        lead.name = self.name;
        lead.contact = self.contact;
        if let Some(status) = self.status {
            lead.status = status;
        }
        lead.source = self.source.unwrap_or_default();
        if let Some(assignee) = self.assigned_to {
            lead.assigned_to = assignee;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn draft(name: &str) -> LeadDraft {
        LeadDraft {
            name: name.to_string(),
            contact: ContactInfo::default(),
            status: None,
            source: Some("Portal".into()),
            assigned_to: None,
        }
    }

    #[test]
    fn new_lead_gets_defaults() {
        let lead = draft(" Ana ")
            .validate()
            .unwrap()
            .into_lead(LeadId::generate(), UserId::new(), Utc::now());
        assert_eq!(lead.name, "Ana");
        assert_eq!(lead.status, LeadStatus::New);
        assert_eq!(lead.assigned_to, DEFAULT_ASSIGNEE);
    }

    #[test]
    fn nameless_lead_is_rejected() {
        assert_eq!(
            draft("").validate().unwrap_err(),
            DomainError::field("name", "must not be empty")
        );
    }

    #[test]
    fn update_keeps_assignee_when_omitted() {
        let mut lead = draft("Ana")
            .validate()
            .unwrap()
            .into_lead(LeadId::generate(), UserId::new(), Utc::now());
        lead.assigned_to = "Carlos".into();

        let mut edit = draft("Ana Souza");
        edit.status = Some(LeadStatus::Qualified);
        edit.validate().unwrap().apply_to(&mut lead);

        assert_eq!(lead.assigned_to, "Carlos");
        assert_eq!(lead.status, LeadStatus::Qualified);
        assert_eq!(lead.name, "Ana Souza");
    }

    #[test]
    fn stored_shape_is_flat_and_accepts_legacy_keys() {
        let raw = serde_json::json!({
            "id": LeadId::generate(),
            "name": "Ana",
            "email": "ana@example.com",
            "phone": "123",
            "status": "Contacted",
            "source": "Referral",
            "assignedTo": "Carlos",
            "created_at": "2024-05-01T12:00:00Z",
        });
        let lead: Lead = serde_json::from_value(raw).unwrap();
        assert_eq!(lead.contact.email.as_deref(), Some("ana@example.com"));
        assert_eq!(lead.status, LeadStatus::Contacted);
        assert_eq!(lead.assigned_to, "Carlos");
        assert!(lead.status.is_open());

        let back = serde_json::to_value(&lead).unwrap();
        assert_eq!(back["assigned_to"], "Carlos");
        assert_eq!(back["email"], "ana@example.com");
    }
}
