use crate::traits::{Storage, StorageError, StorageResult};
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::io::AsyncWriteExt;

/// Written and removed again by `health_check`.
const HEALTH_CHECK_FILE: &str = ".health-check";

/// Local filesystem storage rooted at the video directory.
///
/// The same directory is served read-only under `/stream`, so keys map
/// one-to-one onto public paths.
#[derive(Clone, Debug)]
pub struct LocalStorage {
    base_path: PathBuf,
}

impl LocalStorage {
    /// Create the storage, creating `base_path` if needed.
    pub async fn new(base_path: impl Into<PathBuf>) -> StorageResult<Self> {
        let base_path = base_path.into();

        fs::create_dir_all(&base_path).await.map_err(|e| {
            StorageError::ConfigError(format!(
                "Failed to create storage directory {}: {}",
                base_path.display(),
                e
            ))
        })?;

        Ok(LocalStorage { base_path })
    }

    pub fn base_path(&self) -> &Path {
        &self.base_path
    }

    /// Convert storage key to filesystem path, rejecting keys that escape the base directory.
    fn key_to_path(&self, storage_key: &str) -> StorageResult<PathBuf> {
        if storage_key.is_empty() || storage_key.contains("..") || storage_key.starts_with('/') {
            return Err(StorageError::InvalidKey(
                "Storage key contains invalid characters".to_string(),
            ));
        }

        let path = self.base_path.join(storage_key);

        if let (Ok(canonical), Ok(base_canonical)) =
            (path.canonicalize(), self.base_path.canonicalize())
        {
            if canonical.strip_prefix(&base_canonical).is_err() {
                return Err(StorageError::InvalidKey(
                    "Storage key resolves outside storage directory".to_string(),
                ));
            }
        }

        Ok(path)
    }

    async fn ensure_parent_dir(&self, path: &Path) -> StorageResult<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).await?;
        }
        Ok(())
    }
}

#[async_trait]
impl Storage for LocalStorage {
    async fn upload_with_key(
        &self,
        storage_key: &str,
        data: Vec<u8>,
        _content_type: &str,
    ) -> StorageResult<()> {
        let path = self.key_to_path(storage_key)?;
        let size = data.len();

        self.ensure_parent_dir(&path).await?;

        let start = std::time::Instant::now();

        let mut file = fs::File::create(&path).await.map_err(|e| {
            StorageError::UploadFailed(format!("Failed to create file {}: {}", path.display(), e))
        })?;

        file.write_all(&data).await.map_err(|e| {
            StorageError::UploadFailed(format!("Failed to write file {}: {}", path.display(), e))
        })?;

        file.sync_all().await.map_err(|e| {
            StorageError::UploadFailed(format!("Failed to sync file {}: {}", path.display(), e))
        })?;

        tracing::debug!(
            key = %storage_key,
            size_bytes = size,
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "Local storage upload successful"
        );

        Ok(())
    }

    async fn upload_from_path(&self, storage_key: &str, source: &Path) -> StorageResult<u64> {
        let path = self.key_to_path(storage_key)?;
        self.ensure_parent_dir(&path).await?;

        let bytes = fs::copy(source, &path).await.map_err(|e| {
            StorageError::UploadFailed(format!(
                "Failed to copy {} to {}: {}",
                source.display(),
                path.display(),
                e
            ))
        })?;

        tracing::debug!(key = %storage_key, size_bytes = bytes, "Local storage file upload successful");
        Ok(bytes)
    }

    async fn download_to_path(&self, storage_key: &str, destination: &Path) -> StorageResult<u64> {
        let path = self.key_to_path(storage_key)?;

        if !fs::try_exists(&path).await.unwrap_or(false) {
            return Err(StorageError::NotFound(storage_key.to_string()));
        }

        fs::copy(&path, destination).await.map_err(|e| {
            StorageError::DownloadFailed(format!(
                "Failed to copy {} to {}: {}",
                path.display(),
                destination.display(),
                e
            ))
        })
    }

    async fn delete_prefix(&self, prefix: &str) -> StorageResult<()> {
        let path = self.key_to_path(prefix.trim_end_matches('/'))?;

        if !fs::try_exists(&path).await.unwrap_or(false) {
            return Ok(());
        }

        let start = std::time::Instant::now();
        fs::remove_dir_all(&path).await.map_err(|e| {
            StorageError::DeleteFailed(format!(
                "Failed to delete directory {}: {}",
                path.display(),
                e
            ))
        })?;

        tracing::info!(
            prefix = %prefix,
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "Local storage prefix delete successful"
        );
        Ok(())
    }

    async fn exists(&self, storage_key: &str) -> StorageResult<bool> {
        let path = self.key_to_path(storage_key)?;
        Ok(fs::try_exists(&path).await.unwrap_or(false))
    }

    async fn health_check(&self) -> StorageResult<()> {
        let metadata = fs::metadata(&self.base_path).await.map_err(|e| {
            StorageError::ConfigError(format!(
                "Storage directory {} unavailable: {}",
                self.base_path.display(),
                e
            ))
        })?;
        if !metadata.is_dir() {
            return Err(StorageError::ConfigError(format!(
                "Storage path {} is not a directory",
                self.base_path.display()
            )));
        }

        let marker = self.base_path.join(HEALTH_CHECK_FILE);
        fs::write(&marker, b"ok").await.map_err(|e| {
            StorageError::UploadFailed(format!("Storage directory not writable: {}", e))
        })?;
        fs::remove_file(&marker).await.map_err(|e| {
            StorageError::DeleteFailed(format!("Failed to remove {}: {}", marker.display(), e))
        })?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[tokio::test]
    async fn test_local_storage_upload_with_key() {
        let dir = tempdir().unwrap();
        let storage = LocalStorage::new(dir.path()).await.unwrap();

        let data = b"#EXTM3U\n".to_vec();
        storage
            .upload_with_key("abc/master.m3u8", data.clone(), "application/vnd.apple.mpegurl")
            .await
            .unwrap();

        assert_eq!(
            tokio::fs::read(dir.path().join("abc/master.m3u8")).await.unwrap(),
            data
        );
        assert!(storage.exists("abc/master.m3u8").await.unwrap());
    }

    #[tokio::test]
    async fn test_path_traversal_rejected() {
        let dir = tempdir().unwrap();
        let storage = LocalStorage::new(dir.path()).await.unwrap();

        let result = storage
            .download_to_path("../../../etc/passwd", &dir.path().join("out"))
            .await;
        assert!(matches!(result, Err(StorageError::InvalidKey(_))));

        let result = storage.delete_prefix("../etc").await;
        assert!(matches!(result, Err(StorageError::InvalidKey(_))));

        let result = storage.exists("/etc/passwd").await;
        assert!(matches!(result, Err(StorageError::InvalidKey(_))));

        let result = storage.delete_prefix("").await;
        assert!(matches!(result, Err(StorageError::InvalidKey(_))));
    }

    #[tokio::test]
    async fn test_missing_file_is_not_found() {
        let dir = tempdir().unwrap();
        let storage = LocalStorage::new(dir.path()).await.unwrap();

        let result = storage
            .download_to_path("nope/nope.mp4", &dir.path().join("out.mp4"))
            .await;
        assert!(matches!(result, Err(StorageError::NotFound(_))));
        assert!(!storage.exists("nope/nope.mp4").await.unwrap());
        assert!(storage.delete_prefix("nope").await.is_ok());
    }

    #[tokio::test]
    async fn test_path_round_trip_and_prefix_delete() {
        let dir = tempdir().unwrap();
        let storage = LocalStorage::new(dir.path().join("videos")).await.unwrap();

        let source = dir.path().join("input.mp4");
        tokio::fs::write(&source, b"fake video").await.unwrap();

        let written = storage
            .upload_from_path("vid/vid.mp4", &source)
            .await
            .unwrap();
        assert_eq!(written, 10);
        storage
            .upload_with_key("vid/stream_0/data000.ts", b"ts".to_vec(), "video/mp2t")
            .await
            .unwrap();

        let copy = dir.path().join("copy.mp4");
        storage.download_to_path("vid/vid.mp4", &copy).await.unwrap();
        assert_eq!(tokio::fs::read(&copy).await.unwrap(), b"fake video");

        storage.delete_prefix("vid/").await.unwrap();
        assert!(!storage.exists("vid/vid.mp4").await.unwrap());
        assert!(!storage.exists("vid/stream_0/data000.ts").await.unwrap());
        assert!(storage.base_path().exists());
    }

    #[tokio::test]
    async fn test_health_check_requires_writable_directory() {
        let dir = tempdir().unwrap();
        let storage = LocalStorage::new(dir.path().join("videos")).await.unwrap();

        storage.health_check().await.unwrap();
        assert!(!storage.base_path().join(HEALTH_CHECK_FILE).exists());

        tokio::fs::remove_dir_all(storage.base_path()).await.unwrap();
        assert!(matches!(
            storage.health_check().await,
            Err(StorageError::ConfigError(_))
        ));
    }
}
