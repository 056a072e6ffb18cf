use std::sync::{Arc, Mutex};
use std::time::Duration;

use api_lib::adapters::InMemoryCampaignRepository;
use api_lib::config::{Config, StorageBackend};
use api_lib::web::{self, AppState};
use async_trait::async_trait;
use axum::body::Body;
use axum::http::{header::CONTENT_TYPE, Method, Request};
use axum::Router;
use outreach_core::ports::{CampaignRepository, FetchedBody, PortResult, SheetFetcher};

/// Build a test `Config` with safe defaults.
pub fn test_config() -> Config {
    Config {
        bind_address: "127.0.0.1:0".parse().unwrap(),
        log_level: tracing::Level::INFO,
        storage: StorageBackend::Memory,
        data_dir: "./data".into(),
        storage_key: "outreach_campaign".to_string(),
        sheet_fetch_timeout: Duration::from_secs(5),
        cors_origin: "http://localhost:3000".to_string(),
        default_campaign_name: "Test Campaign".to_string(),
    }
}

/// Serves a fixed response and records requested URLs.
pub struct StubFetcher {
    pub status: u16,
    pub body: String,
    pub requested: Mutex<Vec<String>>,
}

impl StubFetcher {
    pub fn new(status: u16, body: &str) -> Self {
        Self {
            status,
            body: body.to_string(),
            requested: Mutex::new(Vec::new()),
        }
    }
}

#[async_trait]
impl SheetFetcher for StubFetcher {
    async fn fetch_csv(&self, export_url: &str) -> PortResult<FetchedBody> {
        self.requested.lock().unwrap().push(export_url.to_string());
        Ok(FetchedBody {
            status: self.status,
            body: self.body.clone(),
        })
    }
}

/// Build the application router over the given repository and fetcher.
pub async fn build_test_app(
    repository: Arc<dyn CampaignRepository>,
    fetcher: Arc<dyn SheetFetcher>,
) -> Router {
    let state = AppState::new(Arc::new(test_config()), repository, fetcher).await;
    web::router(Arc::new(state)).unwrap()
}

pub async fn default_app() -> Router {
    build_test_app(
        Arc::new(InMemoryCampaignRepository::new()),
        Arc::new(StubFetcher::new(200, "email\nsheet@x.com\n")),
    )
    .await
}

pub fn json_request(method: Method, uri: &str, body: serde_json::Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

pub fn empty_request(method: Method, uri: &str) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}
