use anyhow::{Context, Result};
use std::sync::Arc;
use themtube_core::Config;
use themtube_storage::{LocalStorage, Storage};

/// Local storage rooted at `VIDEO_DIRECTORY`, the same tree served under `/stream`.
pub async fn setup_storage(config: &Config) -> Result<Arc<dyn Storage>> {
    let storage = LocalStorage::new(config.video_directory())
        .await
        .context("Failed to initialize video storage")?;

    tracing::info!(video_directory = %config.video_directory(), "Local video storage ready");
    Ok(Arc::new(storage))
}
