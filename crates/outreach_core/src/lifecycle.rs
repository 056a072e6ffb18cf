//! Per-contact lifecycle and the campaign status derived from it.
//!
//! `Pending -> Draft -> Done`, with one way back: saving a draft on a `Done`
//! contact re-opens it as `Draft`. Nothing ever returns to `Pending`.

use crate::domain::{CampaignStatus, EmailStatus};

/// Events that move a contact through its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleEvent {
    /// A subject/body was written or edited for the contact.
    DraftSaved,
    /// The contact's email was finalized.
    MarkedDone,
}

impl EmailStatus {
    /// The status reached from `self` when `event` happens.
    pub fn apply(self, event: LifecycleEvent) -> EmailStatus {
        match event {
            LifecycleEvent::DraftSaved => EmailStatus::Draft,
            LifecycleEvent::MarkedDone => EmailStatus::Done,
        }
    }
}

/// Derives the campaign status from its contacts' statuses.
///
/// - `Draft` while no contact has left `Pending` (including an empty campaign)
/// - `Ready` when every contact is `Done`
/// - `Composing` otherwise
pub fn derive_campaign_status<I>(statuses: I) -> CampaignStatus
where
    I: IntoIterator<Item = EmailStatus>,
{
    let mut any = false;
    let mut all_done = true;
    let mut all_pending = true;

    for status in statuses {
        any = true;
        all_done &= status == EmailStatus::Done;
        all_pending &= status == EmailStatus::Pending;
    }

    if !any || all_pending {
        CampaignStatus::Draft
    } else if all_done {
        CampaignStatus::Ready
    } else {
        CampaignStatus::Composing
    }
}
