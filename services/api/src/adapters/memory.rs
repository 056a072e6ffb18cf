//! services/api/src/adapters/memory.rs
//!
//! An in-process `CampaignRepository`. The snapshot is still kept in its
//! serialized form so that loads go through the same decoding as on disk.

use async_trait::async_trait;
use outreach_core::domain::Campaign;
use outreach_core::ports::{CampaignRepository, PortError, PortResult};
use tokio::sync::Mutex;

#[derive(Debug, Default)]
pub struct InMemoryCampaignRepository {
    snapshot: Mutex<Option<String>>,
}

impl InMemoryCampaignRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seeds the repository with a raw blob, e.g. to simulate corrupt storage.
    pub fn with_raw_snapshot(raw: impl Into<String>) -> Self {
        Self {
            snapshot: Mutex::new(Some(raw.into())),
        }
    }
}

#[async_trait]
impl CampaignRepository for InMemoryCampaignRepository {
    async fn load(&self) -> PortResult<Option<Campaign>> {
        match self.snapshot.lock().await.as_deref() {
            None => Ok(None),
            Some(raw) => serde_json::from_str(raw)
                .map(Some)
                .map_err(|e| PortError::Corrupt(e.to_string())),
        }
    }

    async fn save(&self, campaign: &Campaign) -> PortResult<()> {
        let raw = serde_json::to_string(campaign).map_err(|e| PortError::Unexpected(e.to_string()))?;
        *self.snapshot.lock().await = Some(raw);
        Ok(())
    }

    async fn clear(&self) -> PortResult<()> {
        *self.snapshot.lock().await = None;
        Ok(())
    }
}
