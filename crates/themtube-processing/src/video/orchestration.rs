//! Video transcoding orchestration: download → probe → transcode → upload HLS → mark available.

use anyhow::{anyhow, Context, Result};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tempfile::TempDir;
use uuid::Uuid;

use themtube_core::constants::MASTER_PLAYLIST;
use themtube_db::VideoCatalog;
use themtube_storage::Storage;

use crate::traits::{HlsTranscoder, VideoProbe};

/// Result of a successful pipeline run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProcessOutcome {
    /// Every HLS file is stored and the record is marked available.
    Available,
    /// The record disappeared before or during processing.
    Missing,
}

/// Orchestrates full video processing and reconciles the catalog with the outcome.
#[derive(Clone)]
pub struct VideoOrchestrator {
    catalog: Arc<dyn VideoCatalog>,
    storage: Arc<dyn Storage>,
    probe: Arc<dyn VideoProbe>,
    transcoder: Arc<dyn HlsTranscoder>,
}

impl VideoOrchestrator {
    pub fn new(
        catalog: Arc<dyn VideoCatalog>,
        storage: Arc<dyn Storage>,
        probe: Arc<dyn VideoProbe>,
        transcoder: Arc<dyn HlsTranscoder>,
    ) -> Self {
        Self {
            catalog,
            storage,
            probe,
            transcoder,
        }
    }

    /// Run the full pipeline for a video.
    pub async fn process_video(&self, video_id: Uuid) -> Result<ProcessOutcome> {
        let start = std::time::Instant::now();
        tracing::info!(video_id = %video_id, "Starting video processing");

        let Some(video) = self
            .catalog
            .get_video(video_id)
            .await
            .map_err(|e| anyhow!("{}", e))
            .context("Failed to load video record")?
        else {
            tracing::warn!(video_id = %video_id, "Video record gone, skipping transcode");
            return Ok(ProcessOutcome::Missing);
        };

        let temp_dir = TempDir::new().context("Failed to create temp directory")?;
        let input_path = temp_dir.path().join("input.mp4");

        tracing::info!(video_id = %video_id, key = %video.source_key(), "Downloading source from storage");
        self.storage
            .download_to_path(&video.source_key(), &input_path)
            .await
            .context("Failed to download video from storage")?;

        let metadata = self
            .probe
            .probe(&input_path)
            .await
            .context("Failed to probe video")?;

        tracing::info!(
            video_id = %video_id,
            duration = metadata.duration,
            resolution = %format!("{}x{}", metadata.width, metadata.height),
            has_audio = metadata.has_audio,
            "Video metadata extracted"
        );

        let output_dir = temp_dir.path().join("hls");
        tokio::fs::create_dir_all(&output_dir)
            .await
            .context("Failed to create HLS output directory")?;

        self.transcoder
            .transcode(&input_path, &output_dir, metadata.has_audio)
            .await
            .context("Failed to generate HLS ladder")?;

        if !tokio::fs::try_exists(output_dir.join(MASTER_PLAYLIST))
            .await
            .unwrap_or(false)
        {
            return Err(anyhow!("Transcoder did not produce {}", MASTER_PLAYLIST));
        }

        let prefix = video.storage_prefix();
        let uploaded = self
            .upload_directory(&output_dir, &prefix)
            .await
            .context("Failed to upload HLS files")?;

        tracing::info!(video_id = %video_id, file_count = uploaded, "HLS files uploaded");

        let marked = self
            .catalog
            .mark_available(video_id)
            .await
            .map_err(|e| anyhow!("{}", e))
            .context("Failed to mark video available")?;

        if !marked {
            // Deleted while transcoding; drop what we just stored.
            tracing::warn!(video_id = %video_id, "Video deleted during processing, removing files");
            self.storage
                .delete_prefix(&prefix)
                .await
                .context("Failed to remove orphaned files")?;
            return Ok(ProcessOutcome::Missing);
        }

        tracing::info!(
            video_id = %video_id,
            duration_ms = start.elapsed().as_millis(),
            "Video processing completed successfully"
        );
        Ok(ProcessOutcome::Available)
    }

    /// Remove every stored file and the record of a video whose transcode failed.
    ///
    /// Files go first so a missing record always means the files are gone too.
    pub async fn reconcile_failure(&self, video_id: Uuid) -> Result<()> {
        self.storage
            .delete_prefix(&video_id.to_string())
            .await
            .context("Failed to delete video files")?;

        let removed = self
            .catalog
            .delete_video_unchecked(video_id)
            .await
            .map_err(|e| anyhow!("{}", e))
            .context("Failed to delete video record")?;

        tracing::info!(video_id = %video_id, record_removed = removed, "Failed video reconciled");
        Ok(())
    }

    /// Upload every file below `dir` to `{prefix}/{relative path}`.
    async fn upload_directory(&self, dir: &Path, prefix: &str) -> Result<usize> {
        let mut pending: Vec<PathBuf> = vec![dir.to_path_buf()];
        let mut count = 0;

        while let Some(current) = pending.pop() {
            let mut entries = tokio::fs::read_dir(&current).await?;
            while let Some(entry) = entries.next_entry().await? {
                let path = entry.path();
                if entry.file_type().await?.is_dir() {
                    pending.push(path);
                    continue;
                }

                let relative = path
                    .strip_prefix(dir)
                    .context("Output file outside HLS directory")?;
                let relative = relative
                    .components()
                    .map(|c| c.as_os_str().to_string_lossy())
                    .collect::<Vec<_>>()
                    .join("/");
                let key = format!("{}/{}", prefix, relative);

                self.storage
                    .upload_from_path(&key, &path)
                    .await
                    .with_context(|| format!("Failed to upload {}", key))?;
                count += 1;
            }
        }

        Ok(count)
    }
}
