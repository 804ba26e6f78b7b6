//! Integration tests for the liveness endpoint and routing basics.

mod common;

use axum::http::StatusCode;
use common::Caller;

#[tokio::test]
async fn test_health_reports_ok_without_credentials() {
    let app = common::build_test_app();

    let (status, json) = app.get("/health", &Caller::Anonymous).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["status"], "ok");
    assert_eq!(json["service"], "taleweave-api");
    assert_eq!(json["version"], env!("CARGO_PKG_VERSION"));
}

#[tokio::test]
async fn test_unknown_route_returns_404() {
    let app = common::build_test_app();

    let (status, _) = app.get("/api/v1/nowhere", &Caller::Anonymous).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
}
