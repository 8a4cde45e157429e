//! Storage abstraction trait

use async_trait::async_trait;
use std::path::Path;
use thiserror::Error;

/// Storage operation errors
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Upload failed: {0}")]
    UploadFailed(String),

    #[error("Download failed: {0}")]
    DownloadFailed(String),

    #[error("Delete failed: {0}")]
    DeleteFailed(String),

    #[error("File not found: {0}")]
    NotFound(String),

    #[error("Invalid storage key: {0}")]
    InvalidKey(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    ConfigError(String),
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Storage abstraction trait
///
/// The upload handler and the transcode orchestrator only talk to storage
/// through this trait, addressing files by key (see the crate docs for the layout).
#[async_trait]
pub trait Storage: Send + Sync {
    /// Write `data` at `storage_key`, replacing any existing file.
    async fn upload_with_key(
        &self,
        storage_key: &str,
        data: Vec<u8>,
        content_type: &str,
    ) -> StorageResult<()>;

    /// Copy a local file to `storage_key` without buffering it in memory.
    async fn upload_from_path(&self, storage_key: &str, source: &Path) -> StorageResult<u64>;

    /// Copy the file at `storage_key` to a local path.
    async fn download_to_path(&self, storage_key: &str, destination: &Path) -> StorageResult<u64>;

    /// Delete every file under `prefix`. Missing prefixes are not an error.
    async fn delete_prefix(&self, prefix: &str) -> StorageResult<()>;

    async fn exists(&self, storage_key: &str) -> StorageResult<bool>;

    /// Fail unless the backend can currently be written to.
    async fn health_check(&self) -> StorageResult<()>;
}
