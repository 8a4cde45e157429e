//! Health, readiness and documentation endpoint tests.

mod helpers;

use axum::http::StatusCode;
use helpers::{api_path, setup_test_app};

#[tokio::test]
async fn test_health_check() {
    let app = setup_test_app().await;

    let response = app.client().get(&api_path("/health")).await;
    response.assert_status_ok();
    assert_eq!(response.header("content-type"), "application/health+json");
    assert_eq!(response.header("cache-control"), "max-age=3600");

    let body: serde_json::Value = response.json();
    assert_eq!(body["status"], "pass");
    assert_eq!(body["version"], "1.0");
    assert_eq!(body["release_id"], "0.1");
}

#[tokio::test]
async fn test_readiness_check() {
    let app = setup_test_app().await;

    let response = app.client().get(&api_path("/health/ready")).await;
    response.assert_status_ok();
    let body: serde_json::Value = response.json();
    assert_eq!(body["status"], "pass");
    assert_eq!(body["database"], "pass");
    assert_eq!(body["storage"], "pass");
}

#[tokio::test]
async fn test_readiness_fails_without_video_directory() {
    let app = setup_test_app().await;
    tokio::fs::remove_dir_all(app.storage.base_path())
        .await
        .unwrap();

    let response = app.client().get(&api_path("/health/ready")).await;
    response.assert_status(StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(response.header("content-type"), "application/health+json");
    let body: serde_json::Value = response.json();
    assert_eq!(body["status"], "fail");
    assert_eq!(body["database"], "pass");
    assert!(body["storage"].as_str().unwrap().starts_with("fail"));
}

#[tokio::test]
async fn test_request_id_echoed() {
    let app = setup_test_app().await;

    let response = app
        .client()
        .get(&api_path("/health"))
        .add_header("X-Request-ID", "trace-me-123")
        .await;
    assert_eq!(response.header("x-request-id"), "trace-me-123");
}

#[tokio::test]
async fn test_root_redirects_to_docs() {
    let app = setup_test_app().await;

    let response = app.client().get("/").await;
    response.assert_status(StatusCode::TEMPORARY_REDIRECT);
    assert_eq!(response.header("location"), "/docs");
}

#[tokio::test]
async fn test_openapi_document_served() {
    let app = setup_test_app().await;

    let response = app.client().get("/api-docs/openapi.json").await;
    response.assert_status_ok();
    let doc: serde_json::Value = response.json();
    assert!(doc["paths"]["/api/v1/videos"].is_object());
}
