//! services/api/src/bin/api.rs

use api_lib::{
    adapters::{
        FileCampaignRepository, HttpSheetFetcher, InMemoryCampaignRepository,
        PgCampaignRepository,
    },
    config::{Config, StorageBackend},
    error::ApiError,
    web::{self, rest::ApiDoc, state::AppState},
};
use outreach_core::ports::{CampaignRepository, SheetFetcher};
use sqlx::postgres::PgPoolOptions;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

#[tokio::main]
async fn main() -> Result<(), ApiError> {
    // --- 1. Load Configuration & Set Up Logging ---
    let config = Arc::new(Config::from_env()?);
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(config.log_level.to_string()))
        .with(tracing_subscriber::fmt::layer())
        .init();
    info!("Configuration loaded. Starting server...");

    // --- 2. Select the Campaign Storage Backend ---
    let repository: Arc<dyn CampaignRepository> = match &config.storage {
        StorageBackend::File => {
            let repo = FileCampaignRepository::new(&config.data_dir, &config.storage_key);
            info!("Storing campaign snapshots in {}", repo.path().display());
            Arc::new(repo)
        }
        StorageBackend::Postgres { database_url } => {
            info!("Connecting to database...");
            let db_pool = PgPoolOptions::new()
                .max_connections(5)
                .connect(database_url)
                .await?;
            let repo = PgCampaignRepository::new(db_pool, config.storage_key.clone());
            info!("Running database migrations...");
            repo.run_migrations().await?;
            info!("Database migrations complete.");
            Arc::new(repo)
        }
        StorageBackend::Memory => {
            info!("Campaign snapshots are kept in memory only");
            Arc::new(InMemoryCampaignRepository::new())
        }
    };

    // --- 3. Initialize the Sheet Fetcher ---
    let fetcher: Arc<dyn SheetFetcher> =
        Arc::new(HttpSheetFetcher::new(config.sheet_fetch_timeout)?);

    // --- 4. Build the Shared AppState (restores the saved campaign) ---
    let app_state = Arc::new(AppState::new(config.clone(), repository, fetcher).await);

    // --- 5. Create the Web Router ---
    let app = web::router(app_state)?
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()));

    // --- 6. Start the Server ---
    info!("Starting server on {}", config.bind_address);
    info!(
        "Swagger UI available at http://{}/swagger-ui",
        config.bind_address
    );
    let listener = tokio::net::TcpListener::bind(&config.bind_address).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
