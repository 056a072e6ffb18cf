//! crates/outreach_core/src/ports.rs
//!
//! Defines the service contracts (traits) for the pipeline's core logic.
//! These traits form the boundary of the hexagonal architecture, allowing the core
//! to be independent of the concrete storage backend and HTTP client.

use async_trait::async_trait;
use crate::domain::Campaign;

//=========================================================================================
// Generic Port Error and Result Types
//=========================================================================================

/// A generic error type for all port operations.
/// This abstracts away the specific errors from external services (e.g., database, network).
#[derive(Debug, thiserror::Error)]
pub enum PortError {
    /// Stored data exists but could not be decoded.
    #[error("Stored data is corrupt: {0}")]
    Corrupt(String),
    #[error("An unexpected error occurred: {0}")]
    Unexpected(String),
}

/// A convenience type alias for `Result<T, PortError>`.
pub type PortResult<T> = Result<T, PortError>;

//=========================================================================================
// Service Ports (Traits)
//=========================================================================================

/// Durable storage for the single campaign snapshot.
///
/// Implementations hold one serialized `Campaign` under a fixed storage key.
#[async_trait]
pub trait CampaignRepository: Send + Sync {
    /// Returns the saved campaign, `Ok(None)` when nothing is stored, or
    /// `PortError::Corrupt` when the stored blob cannot be deserialized.
    async fn load(&self) -> PortResult<Option<Campaign>>;

    /// Replaces the stored snapshot with `campaign`.
    async fn save(&self, campaign: &Campaign) -> PortResult<()>;

    /// Erases the stored snapshot. Clearing an empty store is not an error.
    async fn clear(&self) -> PortResult<()>;
}

/// A raw HTTP response as seen by the importer.
#[derive(Debug, Clone)]
pub struct FetchedBody {
    pub status: u16,
    pub body: String,
}

impl FetchedBody {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

#[async_trait]
pub trait SheetFetcher: Send + Sync {
    /// Performs an unauthenticated GET of a CSV export URL.
    ///
    /// Non-success statuses are returned as `Ok`; only transport failures are errors.
    async fn fetch_csv(&self, export_url: &str) -> PortResult<FetchedBody>;
}
