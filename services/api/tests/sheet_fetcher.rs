use std::time::Duration;

use api_lib::adapters::HttpSheetFetcher;
use axum::routing::get;
use axum::Router;
use outreach_core::ports::SheetFetcher;

/// Serves `body` at `/export` on an ephemeral port and returns the base URL.
async fn serve_export(body: String) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let app = Router::new().route(
        "/export",
        get(move || {
            let body = body.clone();
            async move { body }
        }),
    );
    tokio::spawn(async move { axum::serve(listener, app).await.unwrap() });
    format!("http://{addr}")
}

fn fetcher() -> HttpSheetFetcher {
    HttpSheetFetcher::new(Duration::from_secs(5)).unwrap()
}

#[tokio::test]
async fn downloads_small_export() {
    let base = serve_export("email\na@x.com\n".to_string()).await;

    let fetched = fetcher().fetch_csv(&format!("{base}/export")).await.unwrap();

    assert_eq!(fetched.status, 200);
    assert_eq!(fetched.body, "email\na@x.com\n");
}

#[tokio::test]
async fn non_success_status_is_returned_not_raised() {
    let base = serve_export(String::new()).await;

    let fetched = fetcher().fetch_csv(&format!("{base}/missing")).await.unwrap();

    assert_eq!(fetched.status, 404);
    assert!(!fetched.is_success());
}

#[tokio::test]
async fn export_over_the_limit_is_refused() {
    let base = serve_export("x".repeat(64)).await;

    let err = fetcher()
        .with_max_bytes(16)
        .fetch_csv(&format!("{base}/export"))
        .await
        .unwrap_err();

    assert!(err.to_string().contains("larger than 16 bytes"));
}
