//! crates/outreach_core/src/store.rs
//!
//! The campaign aggregate store: owns the single in-memory `Campaign`, applies
//! lifecycle transitions to it and persists a snapshot after every successful
//! mutation through the injected `CampaignRepository`.

use std::sync::Arc;

use chrono::Utc;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use crate::domain::{Campaign, CampaignContact, Contact, Progress};
use crate::lifecycle::{derive_campaign_status, LifecycleEvent};
use crate::ports::CampaignRepository;

pub const DEFAULT_CAMPAIGN_NAME: &str = "Untitled Campaign";

/// Errors from operations that target an existing campaign or contact.
/// A failed operation never mutates state.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum CampaignError {
    #[error("No campaign is loaded")]
    NoCampaign,
    #[error("Contact {0} is not part of the campaign")]
    ContactNotFound(Uuid),
    #[error("Campaign name must not be empty")]
    EmptyName,
}

//=========================================================================================
// The Store
//=========================================================================================

pub struct CampaignStore {
    repository: Arc<dyn CampaignRepository>,
    campaign: Option<Campaign>,
    current_contact: Option<Uuid>,
    default_name: String,
}

impl CampaignStore {
    /// Creates an empty store without touching the repository.
    pub fn new(repository: Arc<dyn CampaignRepository>) -> Self {
        Self {
            repository,
            campaign: None,
            current_contact: None,
            default_name: DEFAULT_CAMPAIGN_NAME.to_string(),
        }
    }

    /// Name used when `add_contacts` has to create a campaign.
    pub fn with_default_name(mut self, name: impl Into<String>) -> Self {
        self.default_name = name.into();
        self
    }

    /// Loads the saved snapshot, if any.
    ///
    /// Unreadable or corrupt snapshots are logged and the store starts empty.
    pub async fn restore(repository: Arc<dyn CampaignRepository>) -> Self {
        let mut store = Self::new(repository);
        match store.repository.load().await {
            Ok(Some(campaign)) => {
                info!(
                    campaign_id = %campaign.id,
                    contacts = campaign.contacts.len(),
                    "Restored saved campaign"
                );
                store.current_contact = campaign
                    .contacts
                    .iter()
                    .find(|c| !c.is_done())
                    .or_else(|| campaign.contacts.first())
                    .map(|c| c.id);
                store.campaign = Some(campaign);
            }
            Ok(None) => debug!("No saved campaign found"),
            Err(e) => error!("Failed to load saved campaign, starting empty: {}", e),
        }
        store
    }

    //=====================================================================================
    // Read access
    //=====================================================================================

    pub fn campaign(&self) -> Option<&Campaign> {
        self.campaign.as_ref()
    }

    pub fn current_contact_id(&self) -> Option<Uuid> {
        self.current_contact
    }

    pub fn current_contact(&self) -> Option<&CampaignContact> {
        let id = self.current_contact?;
        self.campaign.as_ref()?.contact(id)
    }

    pub fn completed_count(&self) -> usize {
        self.campaign.as_ref().map_or(0, Campaign::completed_count)
    }

    pub fn total_count(&self) -> usize {
        self.campaign.as_ref().map_or(0, Campaign::total_count)
    }

    pub fn progress(&self) -> Progress {
        Progress {
            completed_count: self.completed_count(),
            total_count: self.total_count(),
        }
    }

    //=====================================================================================
    // Mutations
    //=====================================================================================

    /// Replaces any existing campaign with a fresh one holding `contacts`.
    pub async fn create_or_replace(
        &mut self,
        name: &str,
        contacts: Vec<Contact>,
    ) -> Result<&Campaign, CampaignError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(CampaignError::EmptyName);
        }

        let campaign = Campaign::new(name, contacts);
        info!(campaign_id = %campaign.id, contacts = campaign.contacts.len(), "Campaign created");
        self.current_contact = campaign.contacts.first().map(|c| c.id);
        self.campaign = Some(campaign);

        Ok(self.commit().await)
    }

    /// Appends contacts to the campaign, creating one under the default name if needed.
    ///
    /// No deduplication against existing contacts happens here.
    pub async fn add_contacts(&mut self, contacts: Vec<Contact>) -> &Campaign {
        let added: Vec<CampaignContact> = contacts.into_iter().map(CampaignContact::new).collect();
        let first_added = added.first().map(|c| c.id);
        let count = added.len();

        match self.campaign.as_mut() {
            Some(campaign) => {
                campaign.contacts.extend(added);
                campaign.status = derive_campaign_status(campaign.contacts.iter().map(|c| c.email_status));
            }
            None => {
                let mut campaign = Campaign::new(self.default_name.clone(), Vec::new());
                campaign.contacts = added;
                self.campaign = Some(campaign);
            }
        }
        if first_added.is_some() {
            self.current_contact = first_added;
        }
        debug!(count, "Contacts added to campaign");

        self.commit().await
    }

    /// Saves a draft on a contact, re-opening it if it was `Done`.
    pub async fn update_contact_email(
        &mut self,
        contact_id: Uuid,
        subject: &str,
        body: &str,
    ) -> Result<&Campaign, CampaignError> {
        let campaign = self.campaign.as_mut().ok_or(CampaignError::NoCampaign)?;
        let contact = campaign
            .contacts
            .iter_mut()
            .find(|c| c.id == contact_id)
            .ok_or(CampaignError::ContactNotFound(contact_id))?;

        contact.email_subject = Some(subject.to_string());
        contact.email_body = Some(body.to_string());
        contact.email_status = contact.email_status.apply(LifecycleEvent::DraftSaved);
        campaign.status = derive_campaign_status(campaign.contacts.iter().map(|c| c.email_status));
        debug!(%contact_id, "Draft saved");

        Ok(self.commit().await)
    }

    /// Marks a contact `Done` and moves the pointer to the next unfinished contact.
    ///
    /// When every other contact is already `Done` the pointer is left unchanged.
    pub async fn mark_contact_done(&mut self, contact_id: Uuid) -> Result<&Campaign, CampaignError> {
        let campaign = self.campaign.as_mut().ok_or(CampaignError::NoCampaign)?;
        let contact = campaign
            .contacts
            .iter_mut()
            .find(|c| c.id == contact_id)
            .ok_or(CampaignError::ContactNotFound(contact_id))?;

        contact.email_status = contact.email_status.apply(LifecycleEvent::MarkedDone);
        campaign.status = derive_campaign_status(campaign.contacts.iter().map(|c| c.email_status));

        if let Some(next) = campaign
            .contacts
            .iter()
            .find(|c| c.id != contact_id && !c.is_done())
        {
            self.current_contact = Some(next.id);
        }
        info!(
            %contact_id,
            completed = campaign.completed_count(),
            total = campaign.total_count(),
            status = ?campaign.status,
            "Contact marked done"
        );

        Ok(self.commit().await)
    }

    /// Drops the in-memory campaign and erases the saved snapshot.
    pub async fn reset(&mut self) {
        self.campaign = None;
        self.current_contact = None;
        if let Err(e) = self.repository.clear().await {
            warn!("Failed to erase saved campaign: {}", e);
        }
        info!("Campaign reset");
    }

    /// Stamps `updated_at`, persists the snapshot and hands back the campaign.
    ///
    /// Persistence is best-effort: a failed save is logged, the in-memory
    /// mutation stands.
    async fn commit(&mut self) -> &Campaign {
        // Every caller has just stored a campaign.
        let campaign = self.campaign.get_or_insert_with(|| Campaign::new(DEFAULT_CAMPAIGN_NAME, Vec::new()));
        campaign.updated_at = Utc::now();
        if let Err(e) = self.repository.save(campaign).await {
            warn!(campaign_id = %campaign.id, "Failed to persist campaign: {}", e);
        }
        campaign
    }
}
