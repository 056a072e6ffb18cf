//! services/api/src/web/protocol.rs
//!
//! Defines the JSON payloads exchanged between the dashboard and the API server.

use outreach_core::domain::{Campaign, RawContactRow};
use outreach_core::intake::IntakeReport;
use outreach_core::store::CampaignStore;
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

//=========================================================================================
// Requests
//=========================================================================================

/// Query flags for `POST /imports/csv`.
#[derive(Deserialize, Debug, Default, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct IntakeQuery {
    /// Drop duplicate emails, keeping the most complete contact.
    #[serde(default)]
    pub dedupe: bool,
}

#[derive(Deserialize, Debug, ToSchema)]
pub struct SheetImportRequest {
    pub url: String,
    #[serde(default)]
    pub dedupe: bool,
}

/// Contacts arrive as raw rows; validation fills in their warnings.
#[derive(Deserialize, Debug, ToSchema)]
pub struct CreateCampaignRequest {
    pub name: String,
    pub contacts: Vec<RawContactRow>,
}

#[derive(Deserialize, Debug, ToSchema)]
pub struct AddContactsRequest {
    pub contacts: Vec<RawContactRow>,
}

#[derive(Deserialize, Debug, ToSchema)]
pub struct UpdateEmailRequest {
    pub subject: String,
    pub body: String,
}

//=========================================================================================
// Responses
//=========================================================================================

/// A campaign snapshot together with the compose pointer and progress counts.
#[derive(Serialize, Debug, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CampaignView {
    pub campaign: Campaign,
    pub current_contact_id: Option<Uuid>,
    pub completed_count: usize,
    pub total_count: usize,
}

impl CampaignView {
    pub fn from_store(store: &CampaignStore) -> Option<Self> {
        let campaign = store.campaign()?.clone();
        Some(Self {
            campaign,
            current_contact_id: store.current_contact_id(),
            completed_count: store.completed_count(),
            total_count: store.total_count(),
        })
    }
}

/// Response of `POST /campaign/import-sheet`.
#[derive(Serialize, Debug, ToSchema)]
pub struct SheetIntoCampaignResponse {
    pub report: IntakeReport,
    pub campaign: CampaignView,
}
