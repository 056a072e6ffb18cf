mod common;

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use api_lib::adapters::InMemoryCampaignRepository;
use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Method, Request, StatusCode};
use axum::response::Response;
use axum::Router;
use common::{build_test_app, default_app, empty_request, json_request, StubFetcher};
use http_body_util::BodyExt;
use outreach_core::ports::{FetchedBody, PortResult, SheetFetcher};
use serde_json::{json, Value};
use tokio::sync::Notify;
use tower::ServiceExt;

async fn body_json(response: Response) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

async fn send(app: &Router, request: Request<Body>) -> Response {
    app.clone().oneshot(request).await.unwrap()
}

fn contact_ids(view: &Value) -> Vec<String> {
    view["campaign"]["contacts"]
        .as_array()
        .unwrap()
        .iter()
        .map(|c| c["id"].as_str().unwrap().to_string())
        .collect()
}

// ---------------------------------------------------------------------------
// Test: CSV intake reports valid, invalid and duplicate rows
// ---------------------------------------------------------------------------

#[tokio::test]
async fn csv_import_returns_intake_report() {
    let app = default_app().await;
    let csv = "Name,Email,Company\nJo,jo@x.com,Acme\nBad,not-an-email,\n,JO@x.com,\n";
    let request = Request::builder()
        .method(Method::POST)
        .uri("/imports/csv?dedupe=true")
        .header("content-type", "text/csv")
        .body(Body::from(csv))
        .unwrap();

    let response = send(&app, request).await;

    assert_eq!(response.status(), StatusCode::OK);
    let report = body_json(response).await;
    assert_eq!(report["totalRows"], 3);
    assert_eq!(report["validCount"], 2);
    assert_eq!(report["invalidCount"], 1);
    assert_eq!(report["contacts"].as_array().unwrap().len(), 1);
    assert_eq!(report["contacts"][0]["name"], "Jo");
    assert_eq!(report["duplicates"][0]["count"], 2);
}

#[tokio::test]
async fn csv_without_email_column_is_unprocessable() {
    let app = default_app().await;
    let request = Request::builder()
        .method(Method::POST)
        .uri("/imports/csv")
        .body(Body::from("name,company\nJo,Acme\n"))
        .unwrap();

    let response = send(&app, request).await;

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
}

// ---------------------------------------------------------------------------
// Test: sheet imports
// ---------------------------------------------------------------------------

#[tokio::test]
async fn sheet_import_uses_export_url() {
    let fetcher = Arc::new(StubFetcher::new(200, "Email,Role\nann@x.com,CTO\n"));
    let app = build_test_app(Arc::new(InMemoryCampaignRepository::new()), fetcher.clone()).await;

    let response = send(
        &app,
        json_request(
            Method::POST,
            "/imports/sheet",
            json!({"url": "https://docs.google.com/spreadsheets/d/abc/edit#gid=9"}),
        ),
    )
    .await;

    assert_eq!(response.status(), StatusCode::OK);
    let report = body_json(response).await;
    assert_eq!(report["contacts"][0]["role"], "CTO");
    assert_eq!(
        fetcher.requested.lock().unwrap().as_slice(),
        ["https://docs.google.com/spreadsheets/d/abc/export?format=csv&gid=9"]
    );
}

#[tokio::test]
async fn private_sheet_is_bad_gateway() {
    let app = build_test_app(
        Arc::new(InMemoryCampaignRepository::new()),
        Arc::new(StubFetcher::new(401, "")),
    )
    .await;

    let response = send(
        &app,
        json_request(
            Method::POST,
            "/imports/sheet",
            json!({"url": "https://docs.google.com/spreadsheets/d/abc"}),
        ),
    )
    .await;

    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
}

#[tokio::test]
async fn sheet_import_into_campaign_appends_contacts() {
    let app = default_app().await;

    let response = send(
        &app,
        json_request(
            Method::POST,
            "/campaign/import-sheet",
            json!({"url": "https://docs.google.com/spreadsheets/d/abc"}),
        ),
    )
    .await;

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["report"]["validCount"], 1);
    assert_eq!(body["campaign"]["campaign"]["name"], "Test Campaign");
    assert_eq!(body["campaign"]["totalCount"], 1);
}

#[tokio::test]
async fn sheet_without_valid_rows_leaves_campaign_untouched() {
    let repository = Arc::new(InMemoryCampaignRepository::new());
    let app = build_test_app(
        repository.clone(),
        Arc::new(StubFetcher::new(200, "email\nnot-an-email\nalso bad\n")),
    )
    .await;

    let response = send(
        &app,
        json_request(
            Method::POST,
            "/campaign/import-sheet",
            json!({"url": "https://docs.google.com/spreadsheets/d/abc"}),
        ),
    )
    .await;

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let report = body_json(response).await;
    assert_eq!(report["invalidCount"], 2);
    assert_eq!(report["validCount"], 0);

    let response = send(&app, empty_request(Method::GET, "/campaign")).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let reloaded = build_test_app(repository, Arc::new(StubFetcher::new(200, ""))).await;
    let response = send(&reloaded, empty_request(Method::GET, "/campaign")).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

/// Holds the first fetch until `release` is notified; later fetches answer at once.
struct GatedFetcher {
    calls: AtomicUsize,
    started: Notify,
    release: Notify,
}

#[async_trait]
impl SheetFetcher for GatedFetcher {
    async fn fetch_csv(&self, _export_url: &str) -> PortResult<FetchedBody> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst);
        let body = if call == 0 {
            self.started.notify_one();
            self.release.notified().await;
            "email\nfirst@x.com\n"
        } else {
            "email\nsecond@x.com\n"
        };
        Ok(FetchedBody {
            status: 200,
            body: body.to_string(),
        })
    }
}

#[tokio::test]
async fn superseded_sheet_import_is_discarded() {
    let fetcher = Arc::new(GatedFetcher {
        calls: AtomicUsize::new(0),
        started: Notify::new(),
        release: Notify::new(),
    });
    let app = build_test_app(Arc::new(InMemoryCampaignRepository::new()), fetcher.clone()).await;
    let import = || {
        json_request(
            Method::POST,
            "/campaign/import-sheet",
            json!({"url": "https://docs.google.com/spreadsheets/d/abc"}),
        )
    };

    let first = tokio::spawn(app.clone().oneshot(import()));
    fetcher.started.notified().await;

    let second = send(&app, import()).await;
    assert_eq!(second.status(), StatusCode::OK);

    fetcher.release.notify_one();
    let first = first.await.unwrap().unwrap();
    assert_eq!(first.status(), StatusCode::CONFLICT);

    let view = body_json(send(&app, empty_request(Method::GET, "/campaign")).await).await;
    assert_eq!(view["totalCount"], 1);
    assert_eq!(view["campaign"]["contacts"][0]["email"], "second@x.com");
}

// ---------------------------------------------------------------------------
// Test: campaign lifecycle over HTTP
// ---------------------------------------------------------------------------

#[tokio::test]
async fn get_campaign_without_one_is_not_found() {
    let app = default_app().await;

    let response = send(&app, empty_request(Method::GET, "/campaign")).await;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn full_lifecycle_reaches_ready() {
    let app = default_app().await;

    let created = send(
        &app,
        json_request(
            Method::PUT,
            "/campaign",
            json!({
                "name": "Test",
                "contacts": [
                    {"name": "A", "email": "a@x.com"},
                    {"name": "B", "email": "b@x.com", "company": "Beta"}
                ]
            }),
        ),
    )
    .await;
    assert_eq!(created.status(), StatusCode::CREATED);
    let view = body_json(created).await;
    assert_eq!(view["campaign"]["status"], "draft");
    let ids = contact_ids(&view);
    assert_eq!(view["currentContactId"], ids[0].as_str());

    let drafted = send(
        &app,
        json_request(
            Method::PUT,
            &format!("/campaign/contacts/{}/email", ids[0]),
            json!({"subject": "Hi A", "body": "Hello"}),
        ),
    )
    .await;
    assert_eq!(drafted.status(), StatusCode::OK);
    let view = body_json(drafted).await;
    assert_eq!(view["campaign"]["status"], "composing");
    assert_eq!(view["campaign"]["contacts"][0]["emailStatus"], "draft");

    for id in &ids {
        let done = send(
            &app,
            empty_request(Method::POST, &format!("/campaign/contacts/{}/done", id)),
        )
        .await;
        assert_eq!(done.status(), StatusCode::OK);
    }

    let view = body_json(send(&app, empty_request(Method::GET, "/campaign")).await).await;
    assert_eq!(view["campaign"]["status"], "ready");
    assert_eq!(view["completedCount"], 2);
    assert_eq!(view["totalCount"], 2);
}

#[tokio::test]
async fn unknown_contact_is_not_found() {
    let app = default_app().await;
    send(
        &app,
        json_request(
            Method::PUT,
            "/campaign",
            json!({"name": "Test", "contacts": [{"email": "a@x.com"}]}),
        ),
    )
    .await;

    let response = send(
        &app,
        empty_request(
            Method::POST,
            "/campaign/contacts/00000000-0000-0000-0000-000000000000/done",
        ),
    )
    .await;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn blank_campaign_name_is_bad_request() {
    let app = default_app().await;

    let response = send(
        &app,
        json_request(Method::PUT, "/campaign", json!({"name": " ", "contacts": []})),
    )
    .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn invalid_contacts_are_rejected_with_report() {
    let app = default_app().await;

    let response = send(
        &app,
        json_request(
            Method::PUT,
            "/campaign",
            json!({
                "name": "Test",
                "contacts": [
                    {"email": "ok@x.com"},
                    {"email": "not-an-email"},
                    {"email": ""}
                ]
            }),
        ),
    )
    .await;

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let report = body_json(response).await;
    assert_eq!(report["invalidCount"], 2);
    assert_eq!(report["rejected"][0]["row"], 1);

    let added = send(
        &app,
        json_request(
            Method::POST,
            "/campaign/contacts",
            json!({"contacts": [{"email": "not-an-email"}]}),
        ),
    )
    .await;
    assert_eq!(added.status(), StatusCode::UNPROCESSABLE_ENTITY);

    let response = send(&app, empty_request(Method::GET, "/campaign")).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn contact_warnings_come_from_validation() {
    let app = default_app().await;

    let created = send(
        &app,
        json_request(
            Method::PUT,
            "/campaign",
            json!({
                "name": "Test",
                "contacts": [
                    {"email": "ann@x.com", "warnings": ["forged"]},
                    {"email": "info@x.com"}
                ]
            }),
        ),
    )
    .await;

    assert_eq!(created.status(), StatusCode::CREATED);
    let view = body_json(created).await;
    let contacts = &view["campaign"]["contacts"];
    assert_eq!(contacts[0]["warnings"], json!([]));
    assert!(!contacts[1]["warnings"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn add_contacts_then_reset() {
    let repository = Arc::new(InMemoryCampaignRepository::new());
    let app = build_test_app(repository.clone(), Arc::new(StubFetcher::new(200, ""))).await;

    let added = send(
        &app,
        json_request(
            Method::POST,
            "/campaign/contacts",
            json!({"contacts": [{"email": "a@x.com"}, {"email": "a@x.com"}]}),
        ),
    )
    .await;
    assert_eq!(added.status(), StatusCode::OK);
    assert_eq!(body_json(added).await["totalCount"], 2);

    // A fresh app over the same repository sees the saved campaign.
    let reloaded = build_test_app(repository.clone(), Arc::new(StubFetcher::new(200, ""))).await;
    let view = body_json(send(&reloaded, empty_request(Method::GET, "/campaign")).await).await;
    assert_eq!(view["totalCount"], 2);

    let reset = send(&app, empty_request(Method::DELETE, "/campaign")).await;
    assert_eq!(reset.status(), StatusCode::NO_CONTENT);

    let after = build_test_app(repository, Arc::new(StubFetcher::new(200, ""))).await;
    let response = send(&after, empty_request(Method::GET, "/campaign")).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn corrupt_snapshot_starts_without_campaign() {
    let app = build_test_app(
        Arc::new(InMemoryCampaignRepository::with_raw_snapshot("not json")),
        Arc::new(StubFetcher::new(200, "")),
    )
    .await;

    let response = send(&app, empty_request(Method::GET, "/campaign")).await;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
