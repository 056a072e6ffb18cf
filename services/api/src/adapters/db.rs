//! services/api/src/adapters/db.rs
//!
//! This module contains the Postgres adapter, a concrete implementation of the
//! `CampaignRepository` port from the `core` crate. The campaign is stored as a
//! single JSONB blob under a fixed storage key.

use async_trait::async_trait;
use outreach_core::domain::Campaign;
use outreach_core::ports::{CampaignRepository, PortError, PortResult};
use sqlx::types::Json;
use sqlx::{FromRow, PgPool};
use tracing::debug;

//=========================================================================================
// The Main Adapter Struct
//=========================================================================================

/// A database adapter that implements the `CampaignRepository` port.
#[derive(Clone)]
pub struct PgCampaignRepository {
    pool: PgPool,
    storage_key: String,
}

impl PgCampaignRepository {
    /// Creates a new `PgCampaignRepository`.
    pub fn new(pool: PgPool, storage_key: impl Into<String>) -> Self {
        Self {
            pool,
            storage_key: storage_key.into(),
        }
    }

    /// A helper function to run database migrations at startup.
    pub async fn run_migrations(&self) -> Result<(), sqlx::migrate::MigrateError> {
        sqlx::migrate!("./migrations").run(&self.pool).await?;
        Ok(())
    }
}

//=========================================================================================
// "Impure" Database Record Structs
//=========================================================================================

#[derive(FromRow)]
struct SnapshotRecord {
    payload: Json<serde_json::Value>,
}
impl SnapshotRecord {
    fn to_domain(self) -> PortResult<Campaign> {
        serde_json::from_value(self.payload.0).map_err(|e| PortError::Corrupt(e.to_string()))
    }
}

//=========================================================================================
// `CampaignRepository` Trait Implementation
//=========================================================================================

#[async_trait]
impl CampaignRepository for PgCampaignRepository {
    async fn load(&self) -> PortResult<Option<Campaign>> {
        let record = sqlx::query_as::<_, SnapshotRecord>(
            "SELECT payload FROM campaign_snapshots WHERE storage_key = $1",
        )
        .bind(&self.storage_key)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| PortError::Unexpected(e.to_string()))?;

        record.map(SnapshotRecord::to_domain).transpose()
    }

    async fn save(&self, campaign: &Campaign) -> PortResult<()> {
        sqlx::query(
            "INSERT INTO campaign_snapshots (storage_key, payload, updated_at) VALUES ($1, $2, now()) \
             ON CONFLICT (storage_key) DO UPDATE SET payload = EXCLUDED.payload, updated_at = now()",
        )
        .bind(&self.storage_key)
        .bind(Json(campaign))
        .execute(&self.pool)
        .await
        .map_err(|e| PortError::Unexpected(e.to_string()))?;
        debug!(storage_key = %self.storage_key, "Campaign snapshot saved to Postgres");
        Ok(())
    }

    async fn clear(&self) -> PortResult<()> {
        sqlx::query("DELETE FROM campaign_snapshots WHERE storage_key = $1")
            .bind(&self.storage_key)
            .execute(&self.pool)
            .await
            .map_err(|e| PortError::Unexpected(e.to_string()))?;
        Ok(())
    }
}
