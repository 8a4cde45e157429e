//! Health check handlers and response types.

use axum::{
    extract::State,
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use std::fmt::Display;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use utoipa::ToSchema;

use crate::constants::{HEALTH_CACHE_CONTROL, HEALTH_CONTENT_TYPE, READINESS_TIMEOUT};
use crate::state::AppState;

const PASS: &str = "pass";
const FAIL: &str = "fail";

#[derive(Debug, Serialize, ToSchema)]
pub struct HealthResponse {
    #[schema(example = "pass")]
    pub status: String,
    pub version: String,
    pub release_id: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ReadinessResponse {
    pub status: String,
    pub database: String,
    pub storage: String,
}

/// Run an async check with timeout; returns "pass", "fail: timeout" or "fail: {error}".
async fn run_check<F, E>(timeout: Duration, f: F) -> String
where
    F: Future<Output = Result<(), E>>,
    E: Display,
{
    match tokio::time::timeout(timeout, f).await {
        Ok(Ok(())) => PASS.to_string(),
        Ok(Err(e)) => format!("{}: {}", FAIL, e),
        Err(_) => format!("{}: timeout", FAIL),
    }
}

fn health_json<T: Serialize>(status: StatusCode, body: T) -> Response {
    let mut response = (status, Json(body)).into_response();
    response.headers_mut().insert(
        header::CONTENT_TYPE,
        HeaderValue::from_static(HEALTH_CONTENT_TYPE),
    );
    response
}

/// Liveness probe.
#[utoipa::path(
    get,
    path = "/api/v1/health",
    tag = "health",
    responses(
        (status = 200, description = "Service is running", body = HealthResponse, content_type = "application/health+json")
    )
)]
pub async fn health(State(state): State<Arc<AppState>>) -> Response {
    let mut response = health_json(
        StatusCode::OK,
        HealthResponse {
            status: PASS.to_string(),
            version: state.config.server.version.clone(),
            release_id: state.config.server.release_id.clone(),
        },
    );
    response.headers_mut().insert(
        header::CACHE_CONTROL,
        HeaderValue::from_static(HEALTH_CACHE_CONTROL),
    );
    response
}

/// Readiness probe - catalog and storage must both answer in time.
#[utoipa::path(
    get,
    path = "/api/v1/health/ready",
    tag = "health",
    responses(
        (status = 200, description = "Dependencies reachable", body = ReadinessResponse, content_type = "application/health+json"),
        (status = 503, description = "A dependency is failing", body = ReadinessResponse, content_type = "application/health+json")
    )
)]
pub async fn ready(State(state): State<Arc<AppState>>) -> Response {
    let videos = state.videos.clone();
    let database = run_check(READINESS_TIMEOUT, async move { videos.ping().await }).await;

    let storage = state.storage.clone();
    let storage = run_check(READINESS_TIMEOUT, async move { storage.health_check().await }).await;

    let overall = database == PASS && storage == PASS;
    if !overall {
        tracing::warn!(database = %database, storage = %storage, "Readiness check failed");
    }

    health_json(
        if overall {
            StatusCode::OK
        } else {
            StatusCode::SERVICE_UNAVAILABLE
        },
        ReadinessResponse {
            status: if overall { PASS } else { FAIL }.to_string(),
            database,
            storage,
        },
    )
}
