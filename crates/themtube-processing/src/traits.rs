//! Seams between the pipeline and the external ffmpeg tools.

use anyhow::{Context, Result};
use async_trait::async_trait;
use std::path::Path;

use crate::metadata::VideoMetadata;

/// Extracts media properties from a file on disk.
#[async_trait]
pub trait VideoProbe: Send + Sync {
    async fn probe(&self, path: &Path) -> Result<VideoMetadata>;

    /// Probe in-memory data by spilling it to a temporary file first.
    async fn probe_bytes(&self, data: &[u8]) -> Result<VideoMetadata> {
        let temp_file = tempfile::NamedTempFile::new().context("Failed to create temp file")?;
        tokio::fs::write(temp_file.path(), data)
            .await
            .context("Failed to write probe input")?;
        self.probe(temp_file.path()).await
    }
}

/// Produces the HLS rendition ladder for a source file.
///
/// Implementations write `master.m3u8` and one `stream_N/` directory per
/// rendition into `output_dir`.
#[async_trait]
pub trait HlsTranscoder: Send + Sync {
    async fn transcode(&self, input: &Path, output_dir: &Path, has_audio: bool) -> Result<()>;
}
