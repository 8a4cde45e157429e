//! HTTP-layer constants

use std::time::Duration;

pub use themtube_core::constants::{API_V1_STR, STREAM_PREFIX};

pub const DOCS_PATH: &str = "/docs";
pub const OPENAPI_JSON_PATH: &str = "/api-docs/openapi.json";

pub const HEALTH_CONTENT_TYPE: &str = "application/health+json";
pub const HEALTH_CACHE_CONTROL: &str = "max-age=3600";

/// Upper bound for each dependency check in the readiness probe.
pub const READINESS_TIMEOUT: Duration = Duration::from_secs(5);

/// Headroom on top of the max video size for the other multipart fields.
pub const MULTIPART_OVERHEAD_BYTES: usize = 1024 * 1024;

/// Build a versioned API path, e.g. `api_path("/videos")` -> `/api/v1/videos`.
pub fn api_path(path: &str) -> String {
    format!("{}{}", API_V1_STR, path)
}
