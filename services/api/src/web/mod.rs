pub mod protocol;
pub mod rest;
pub mod state;

pub use rest::ApiDoc;
pub use state::AppState;

use crate::error::ApiError;
use axum::{
    extract::DefaultBodyLimit,
    http::{header::{ACCEPT, CONTENT_TYPE}, HeaderValue, Method},
    routing::{get, post, put},
    Router,
};
use std::sync::Arc;
use tower_http::cors::CorsLayer;

/// Builds the API router with CORS and body-size limits applied.
pub fn router(app_state: Arc<AppState>) -> Result<Router, ApiError> {
    let origin = app_state
        .config
        .cors_origin
        .parse::<HeaderValue>()
        .map_err(|e| ApiError::Internal(format!("Invalid CORS_ORIGIN: {}", e)))?;
    let cors = CorsLayer::new()
        .allow_origin(origin)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE, Method::OPTIONS])
        .allow_headers([CONTENT_TYPE, ACCEPT]);

    let router = Router::new()
        .route("/imports/csv", post(rest::import_csv_handler))
        .route("/imports/sheet", post(rest::import_sheet_handler))
        .route(
            "/campaign",
            get(rest::get_campaign_handler)
                .put(rest::create_campaign_handler)
                .delete(rest::reset_campaign_handler),
        )
        .route("/campaign/contacts", post(rest::add_contacts_handler))
        .route("/campaign/import-sheet", post(rest::import_sheet_into_campaign_handler))
        .route("/campaign/contacts/{contact_id}/email", put(rest::update_contact_email_handler))
        .route("/campaign/contacts/{contact_id}/done", post(rest::mark_contact_done_handler))
        .layer(DefaultBodyLimit::max(10 * 1024 * 1024))
        .layer(cors)
        .with_state(app_state);

    Ok(router)
}
