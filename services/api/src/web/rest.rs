//! services/api/src/web/rest.rs
//!
//! Contains the Axum handlers for the REST API endpoints and the master
//! definition for the OpenAPI specification.

use crate::web::protocol::{
    AddContactsRequest, CampaignView, CreateCampaignRequest, IntakeQuery, SheetImportRequest,
    SheetIntoCampaignResponse, UpdateEmailRequest,
};
use crate::web::state::AppState;
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use outreach_core::domain::{
    Campaign, CampaignContact, CampaignStatus, Contact, DuplicateGroup, EmailStatus, RawContactRow,
};
use outreach_core::import::{import_from_sheet_url, parse_contacts_csv, ImportError};
use outreach_core::intake::{run_intake, IntakeReport, RejectedRow};
use outreach_core::store::{CampaignError, CampaignStore};
use std::sync::Arc;
use tracing::{error, info, warn};
use utoipa::OpenApi;
use uuid::Uuid;

type HandlerError = (StatusCode, String);

//=========================================================================================
// OpenAPI Master Definition
//=========================================================================================

#[derive(OpenApi)]
#[openapi(
    paths(
        import_csv_handler,
        import_sheet_handler,
        get_campaign_handler,
        create_campaign_handler,
        add_contacts_handler,
        import_sheet_into_campaign_handler,
        update_contact_email_handler,
        mark_contact_done_handler,
        reset_campaign_handler,
    ),
    components(
        schemas(
            IntakeReport, RejectedRow, DuplicateGroup, RawContactRow, Contact, Campaign, CampaignContact,
            CampaignStatus, EmailStatus, CampaignView, SheetImportRequest, CreateCampaignRequest,
            AddContactsRequest, UpdateEmailRequest, SheetIntoCampaignResponse
        )
    ),
    tags(
        (name = "Outreach API", description = "Contact intake and campaign lifecycle endpoints.")
    )
)]
pub struct ApiDoc;

//=========================================================================================
// Error Mapping
//=========================================================================================

fn import_failure(e: ImportError) -> HandlerError {
    let status = match e {
        ImportError::FetchFailed { .. } | ImportError::Transport(_) => StatusCode::BAD_GATEWAY,
        ImportError::InvalidUrlFormat
        | ImportError::EmptySheet
        | ImportError::MissingDataRows
        | ImportError::MissingEmailColumn
        | ImportError::NoValidContacts => StatusCode::UNPROCESSABLE_ENTITY,
    };
    warn!("Import failed: {}", e);
    (status, e.to_string())
}

fn campaign_failure(e: CampaignError) -> HandlerError {
    let status = match e {
        CampaignError::NoCampaign | CampaignError::ContactNotFound(_) => StatusCode::NOT_FOUND,
        CampaignError::EmptyName => StatusCode::BAD_REQUEST,
    };
    (status, e.to_string())
}

/// 422 carrying the intake report, so the caller can see which rows failed.
fn rejected_rows(report: IntakeReport) -> Response {
    warn!(
        total_rows = report.total_rows,
        invalid = report.invalid_count,
        "Contacts rejected by validation"
    );
    (StatusCode::UNPROCESSABLE_ENTITY, Json(report)).into_response()
}

/// Validates client-supplied rows. One invalid row rejects the whole batch.
fn validated_contacts(rows: Vec<RawContactRow>) -> Result<Vec<Contact>, Response> {
    let report = run_intake(rows, false);
    if report.invalid_count > 0 {
        return Err(rejected_rows(report));
    }
    Ok(report.contacts)
}

fn view_of(store: &CampaignStore) -> Result<Json<CampaignView>, HandlerError> {
    CampaignView::from_store(store)
        .map(Json)
        .ok_or_else(|| campaign_failure(CampaignError::NoCampaign))
}

//=========================================================================================
// Import Handlers
//=========================================================================================

/// Validate an uploaded or pasted CSV file.
///
/// The body is the raw CSV text. Invalid rows are reported, not fatal.
#[utoipa::path(
    post,
    path = "/imports/csv",
    request_body(content = String, content_type = "text/csv", description = "CSV with an email column."),
    params(IntakeQuery),
    responses(
        (status = 200, description = "Intake report", body = IntakeReport),
        (status = 422, description = "The CSV could not be used")
    )
)]
pub async fn import_csv_handler(
    Query(query): Query<IntakeQuery>,
    body: String,
) -> Result<Json<IntakeReport>, HandlerError> {
    let rows = parse_contacts_csv(&body).map_err(import_failure)?;
    Ok(Json(run_intake(rows, query.dedupe)))
}

/// Import and validate a public spreadsheet without touching the campaign.
#[utoipa::path(
    post,
    path = "/imports/sheet",
    request_body = SheetImportRequest,
    responses(
        (status = 200, description = "Intake report", body = IntakeReport),
        (status = 422, description = "Bad URL or unusable sheet"),
        (status = 502, description = "The sheet could not be downloaded")
    )
)]
pub async fn import_sheet_handler(
    State(app_state): State<Arc<AppState>>,
    Json(req): Json<SheetImportRequest>,
) -> Result<Json<IntakeReport>, HandlerError> {
    let rows = import_from_sheet_url(app_state.fetcher.as_ref(), &req.url)
        .await
        .map_err(import_failure)?;
    Ok(Json(run_intake(rows, req.dedupe)))
}

//=========================================================================================
// Campaign Handlers
//=========================================================================================

/// Get the current campaign snapshot.
#[utoipa::path(
    get,
    path = "/campaign",
    responses(
        (status = 200, description = "Current campaign", body = CampaignView),
        (status = 404, description = "No campaign")
    )
)]
pub async fn get_campaign_handler(
    State(app_state): State<Arc<AppState>>,
) -> Result<Json<CampaignView>, HandlerError> {
    let store = app_state.store.lock().await;
    view_of(&store)
}

/// Create a campaign, replacing any existing one.
#[utoipa::path(
    put,
    path = "/campaign",
    request_body = CreateCampaignRequest,
    responses(
        (status = 201, description = "Campaign created", body = CampaignView),
        (status = 400, description = "Empty campaign name"),
        (status = 422, description = "Some contacts failed validation", body = IntakeReport)
    )
)]
pub async fn create_campaign_handler(
    State(app_state): State<Arc<AppState>>,
    Json(req): Json<CreateCampaignRequest>,
) -> Result<impl IntoResponse, Response> {
    let contacts = validated_contacts(req.contacts)?;
    let mut store = app_state.store.lock().await;
    store
        .create_or_replace(&req.name, contacts)
        .await
        .map_err(|e| campaign_failure(e).into_response())?;
    let view = view_of(&store).map_err(IntoResponse::into_response)?;
    Ok((StatusCode::CREATED, view))
}

/// Append contacts to the campaign, creating one if none exists.
///
/// Contacts are not deduplicated against those already in the campaign.
#[utoipa::path(
    post,
    path = "/campaign/contacts",
    request_body = AddContactsRequest,
    responses(
        (status = 200, description = "Updated campaign", body = CampaignView),
        (status = 422, description = "Some contacts failed validation", body = IntakeReport)
    )
)]
pub async fn add_contacts_handler(
    State(app_state): State<Arc<AppState>>,
    Json(req): Json<AddContactsRequest>,
) -> Result<Json<CampaignView>, Response> {
    let contacts = validated_contacts(req.contacts)?;
    let mut store = app_state.store.lock().await;
    store.add_contacts(contacts).await;
    view_of(&store).map_err(IntoResponse::into_response)
}

/// Import a public spreadsheet and append its valid contacts to the campaign.
///
/// If another import starts while this one is downloading, this result is
/// discarded and 409 is returned. A sheet without a single valid row leaves
/// the campaign untouched and returns 422 with the intake report.
#[utoipa::path(
    post,
    path = "/campaign/import-sheet",
    request_body = SheetImportRequest,
    responses(
        (status = 200, description = "Contacts added", body = SheetIntoCampaignResponse),
        (status = 409, description = "Superseded by a newer import"),
        (status = 422, description = "Bad URL, unusable sheet or no valid rows"),
        (status = 502, description = "The sheet could not be downloaded")
    )
)]
pub async fn import_sheet_into_campaign_handler(
    State(app_state): State<Arc<AppState>>,
    Json(req): Json<SheetImportRequest>,
) -> Result<Json<SheetIntoCampaignResponse>, Response> {
    let ticket = app_state.imports.begin();
    let rows = import_from_sheet_url(app_state.fetcher.as_ref(), &req.url)
        .await
        .map_err(|e| import_failure(e).into_response())?;
    let report = run_intake(rows, req.dedupe);
    if report.contacts.is_empty() {
        return Err(rejected_rows(report));
    }

    let mut store = app_state.store.lock().await;
    if !app_state.imports.is_current(ticket) {
        info!("Discarding sheet import superseded by a newer one");
        return Err((
            StatusCode::CONFLICT,
            "A newer import was started; this result was discarded".to_string(),
        )
            .into_response());
    }
    store.add_contacts(report.contacts.clone()).await;

    let campaign = CampaignView::from_store(&store).ok_or_else(|| {
        error!("Campaign missing right after adding contacts");
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            "Failed to update campaign".to_string(),
        )
            .into_response()
    })?;
    Ok(Json(SheetIntoCampaignResponse { report, campaign }))
}

/// Save the email draft for a contact.
#[utoipa::path(
    put,
    path = "/campaign/contacts/{contact_id}/email",
    request_body = UpdateEmailRequest,
    params(("contact_id" = Uuid, Path, description = "Campaign-scoped contact id")),
    responses(
        (status = 200, description = "Updated campaign", body = CampaignView),
        (status = 404, description = "No campaign or unknown contact")
    )
)]
pub async fn update_contact_email_handler(
    State(app_state): State<Arc<AppState>>,
    Path(contact_id): Path<Uuid>,
    Json(req): Json<UpdateEmailRequest>,
) -> Result<Json<CampaignView>, HandlerError> {
    let mut store = app_state.store.lock().await;
    store
        .update_contact_email(contact_id, &req.subject, &req.body)
        .await
        .map_err(campaign_failure)?;
    view_of(&store)
}

/// Mark a contact's email as done.
#[utoipa::path(
    post,
    path = "/campaign/contacts/{contact_id}/done",
    params(("contact_id" = Uuid, Path, description = "Campaign-scoped contact id")),
    responses(
        (status = 200, description = "Updated campaign", body = CampaignView),
        (status = 404, description = "No campaign or unknown contact")
    )
)]
pub async fn mark_contact_done_handler(
    State(app_state): State<Arc<AppState>>,
    Path(contact_id): Path<Uuid>,
) -> Result<Json<CampaignView>, HandlerError> {
    let mut store = app_state.store.lock().await;
    store
        .mark_contact_done(contact_id)
        .await
        .map_err(campaign_failure)?;
    view_of(&store)
}

/// Discard the campaign and its saved snapshot.
#[utoipa::path(
    delete,
    path = "/campaign",
    responses(
        (status = 204, description = "Campaign cleared")
    )
)]
pub async fn reset_campaign_handler(State(app_state): State<Arc<AppState>>) -> StatusCode {
    app_state.store.lock().await.reset().await;
    StatusCode::NO_CONTENT
}
