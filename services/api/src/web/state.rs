//! services/api/src/web/state.rs
//!
//! Defines the application's shared state.

use crate::config::Config;
use outreach_core::import::ImportSequencer;
use outreach_core::ports::{CampaignRepository, SheetFetcher};
use outreach_core::store::CampaignStore;
use std::sync::Arc;
use tokio::sync::Mutex;

//=========================================================================================
// AppState (Shared Across All Requests)
//=========================================================================================

/// The shared application state, created once at startup and passed to all handlers.
///
/// The campaign store sits behind a mutex so each mutation runs to completion
/// (including its persistence write) before the next one starts.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<Mutex<CampaignStore>>,
    pub fetcher: Arc<dyn SheetFetcher>,
    pub imports: Arc<ImportSequencer>,
    pub config: Arc<Config>,
}

impl AppState {
    /// Builds the state, restoring any campaign saved in `repository`.
    pub async fn new(
        config: Arc<Config>,
        repository: Arc<dyn CampaignRepository>,
        fetcher: Arc<dyn SheetFetcher>,
    ) -> Self {
        let store = CampaignStore::restore(repository)
            .await
            .with_default_name(config.default_campaign_name.clone());

        Self {
            store: Arc::new(Mutex::new(store)),
            fetcher,
            imports: Arc::new(ImportSequencer::new()),
            config,
        }
    }
}
