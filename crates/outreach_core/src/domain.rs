//! crates/outreach_core/src/domain.rs
//!
//! Defines the core data structures of the contact intake and campaign pipeline.
//! The campaign types derive serde because the persisted snapshot is exactly
//! the serialized `Campaign`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

//=========================================================================================
// Intake Types
//=========================================================================================

/// A contact row as produced by an import, before validation or deduplication.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct RawContactRow {
    pub name: Option<String>,
    pub email: String,
    pub company: Option<String>,
    pub role: Option<String>,
}

/// The outcome of validating a single email address.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct ValidationResult {
    pub is_valid: bool,
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
}

/// A contact that passed validation.
///
/// The email keeps its original casing; uniqueness is decided on the
/// trimmed, lower-cased form (see [`Contact::dedup_key`]).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct Contact {
    pub name: Option<String>,
    pub email: String,
    pub company: Option<String>,
    pub role: Option<String>,
    /// Non-blocking validation warnings (disposable, role-based, long domain).
    #[serde(default)]
    pub warnings: Vec<String>,
}

impl Contact {
    /// Builds a contact from a raw row and the warnings its validation produced.
    pub fn from_row(row: RawContactRow, warnings: Vec<String>) -> Self {
        Self {
            name: row.name,
            email: row.email,
            company: row.company,
            role: row.role,
            warnings,
        }
    }

    /// The grouping key used for deduplication.
    pub fn dedup_key(&self) -> String {
        self.email.trim().to_lowercase()
    }

    /// Number of populated optional fields among name, company and role (0..=3).
    pub fn completeness_score(&self) -> usize {
        [&self.name, &self.company, &self.role]
            .into_iter()
            .filter(|field| field.as_deref().is_some_and(|v| !v.trim().is_empty()))
            .count()
    }
}

//=========================================================================================
// Campaign Types
//=========================================================================================

/// Lifecycle status of a single contact's outreach email.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub enum EmailStatus {
    #[default]
    Pending,
    Draft,
    Done,
}

/// Campaign-level status, always derived from the contacts' `EmailStatus` values.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub enum CampaignStatus {
    #[default]
    Draft,
    Composing,
    Ready,
}

/// A contact scoped to one campaign, carrying its own draft and status.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct CampaignContact {
    pub id: Uuid,
    #[serde(flatten)]
    pub contact: Contact,
    pub email_subject: Option<String>,
    pub email_body: Option<String>,
    pub email_status: EmailStatus,
}

impl CampaignContact {
    /// Wraps a validated contact with a fresh campaign-scoped id in the `Pending` state.
    pub fn new(contact: Contact) -> Self {
        Self {
            id: Uuid::new_v4(),
            contact,
            email_subject: None,
            email_body: None,
            email_status: EmailStatus::Pending,
        }
    }

    pub fn is_done(&self) -> bool {
        self.email_status == EmailStatus::Done
    }
}

/// A named batch of outreach contacts moving through a shared compose workflow.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct Campaign {
    pub id: Uuid,
    pub name: String,
    pub status: CampaignStatus,
    pub contacts: Vec<CampaignContact>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Campaign {
    /// Creates a campaign in the `Draft` state with every contact `Pending`.
    pub fn new(name: impl Into<String>, contacts: Vec<Contact>) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            status: CampaignStatus::Draft,
            contacts: contacts.into_iter().map(CampaignContact::new).collect(),
            created_at: now,
            updated_at: now,
        }
    }

    pub fn contact(&self, contact_id: Uuid) -> Option<&CampaignContact> {
        self.contacts.iter().find(|c| c.id == contact_id)
    }

    pub fn completed_count(&self) -> usize {
        self.contacts.iter().filter(|c| c.is_done()).count()
    }

    pub fn total_count(&self) -> usize {
        self.contacts.len()
    }
}

//=========================================================================================
// Reporting Types
//=========================================================================================

/// A group of contacts sharing the same normalized email.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct DuplicateGroup {
    /// The normalized (trimmed, lower-cased) email shared by the group.
    pub email: String,
    pub count: usize,
    pub contacts: Vec<Contact>,
}

/// Result of [`crate::dedup::find_duplicates`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct DuplicateReport {
    pub unique_contacts: Vec<Contact>,
    pub duplicates: Vec<DuplicateGroup>,
}

/// Completed versus total contacts in the current campaign.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct Progress {
    pub completed_count: usize,
    pub total_count: usize,
}
