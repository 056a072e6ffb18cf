//! services/api/src/adapters/file_store.rs
//!
//! A `CampaignRepository` that keeps the snapshot as a JSON file named after
//! the storage key. This is the default, local-only backend.

use async_trait::async_trait;
use outreach_core::domain::Campaign;
use outreach_core::ports::{CampaignRepository, PortError, PortResult};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::debug;

#[derive(Clone, Debug)]
pub struct FileCampaignRepository {
    path: PathBuf,
}

impl FileCampaignRepository {
    /// Stores the snapshot at `<data_dir>/<storage_key>.json`.
    pub fn new(data_dir: impl AsRef<Path>, storage_key: &str) -> Self {
        Self {
            path: data_dir.as_ref().join(format!("{}.json", storage_key)),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl CampaignRepository for FileCampaignRepository {
    async fn load(&self) -> PortResult<Option<Campaign>> {
        let contents = match tokio::fs::read_to_string(&self.path).await {
            Ok(contents) => contents,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(PortError::Unexpected(e.to_string())),
        };

        serde_json::from_str(&contents)
            .map(Some)
            .map_err(|e| PortError::Corrupt(format!("{}: {}", self.path.display(), e)))
    }

    async fn save(&self, campaign: &Campaign) -> PortResult<()> {
        let json = serde_json::to_string_pretty(campaign)
            .map_err(|e| PortError::Unexpected(e.to_string()))?;

        if let Some(parent) = self.path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| PortError::Unexpected(e.to_string()))?;
        }
        tokio::fs::write(&self.path, json)
            .await
            .map_err(|e| PortError::Unexpected(e.to_string()))?;

        debug!(path = %self.path.display(), "Campaign snapshot written");
        Ok(())
    }

    async fn clear(&self) -> PortResult<()> {
        match tokio::fs::remove_file(&self.path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(PortError::Unexpected(e.to_string())),
        }
    }
}
