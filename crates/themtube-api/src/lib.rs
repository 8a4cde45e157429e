//! ThemTube API Library
//!
//! HTTP handlers, authentication, the transcode job queue and application setup.

pub mod api_doc;
pub mod auth;
pub mod constants;
pub mod error;
pub mod handlers;
pub mod job_queue;
pub mod setup;
pub mod state;
pub mod utils;

pub use error::{ErrorResponse, HttpAppError};
pub use job_queue::{JobQueueConfig, VideoJob, VideoJobQueue};
pub use state::AppState;
