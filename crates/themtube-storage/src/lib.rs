//! ThemTube Storage Library
//!
//! Key-addressed storage for uploaded sources and their HLS renditions.
//!
//! # Storage key format
//!
//! Every file belonging to a video lives under `{video_id}/`:
//!
//! - source: `{video_id}/{video_id}.mp4`
//! - master playlist: `{video_id}/master.m3u8`
//! - renditions: `{video_id}/stream_{n}/playlist.m3u8` and `data{nnn}.ts`
//!
//! Keys must not contain `..` or a leading `/`.

pub mod local;
pub mod traits;

// Re-export commonly used types
pub use local::LocalStorage;
pub use traits::{Storage, StorageError, StorageResult};

use themtube_core::AppError;

impl From<StorageError> for AppError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::NotFound(msg) => AppError::NotFound(msg),
            StorageError::InvalidKey(msg) => AppError::InvalidInput(msg),
            StorageError::UploadFailed(msg)
            | StorageError::DownloadFailed(msg)
            | StorageError::DeleteFailed(msg) => AppError::Storage(msg),
            StorageError::IoError(err) => AppError::Internal(format!("IO error: {}", err)),
            StorageError::ConfigError(msg) => AppError::Internal(msg),
        }
    }
}
