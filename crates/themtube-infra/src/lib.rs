//! ThemTube Infrastructure Library
//!
//! Tracing initialisation and the request-id middleware shared by the HTTP layer.

pub mod middleware;
pub mod telemetry;

pub use middleware::{get_request_id, request_id_middleware, RequestId, REQUEST_ID_HEADER};
pub use telemetry::{init_telemetry, LogFormat, TelemetryGuard};
