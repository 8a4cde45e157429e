//! Fake prober and transcoders standing in for ffprobe/ffmpeg.

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use std::path::Path;
use std::sync::atomic::{AtomicU32, Ordering};
use std::time::Duration;
use themtube_core::constants::MASTER_PLAYLIST;
use themtube_processing::{HlsTranscoder, VideoMetadata, VideoProbe};

/// Upload payload the fake prober accepts.
pub const VALID_VIDEO: &[u8] = b"FAKEMP4 with audio track";
/// Upload payload the fake prober rejects.
pub const INVALID_VIDEO: &[u8] = b"definitely not a video";
pub const FAKE_DURATION: f64 = 12.5;

/// Accepts files starting with `FAKEMP4`; audio is present when the file mentions it.
pub struct FakeProbe;

#[async_trait]
impl VideoProbe for FakeProbe {
    async fn probe(&self, path: &Path) -> Result<VideoMetadata> {
        let data = tokio::fs::read(path).await?;
        if !data.starts_with(b"FAKEMP4") {
            return Err(anyhow!("No video stream found"));
        }
        let has_audio = data.windows(5).any(|w| w == b"audio");

        Ok(VideoMetadata {
            duration: FAKE_DURATION,
            width: 1920,
            height: 1080,
            codec: "h264".to_string(),
            bitrate: None,
            framerate: Some(30.0),
            has_audio,
        })
    }
}

/// Writes a master playlist plus one playlist and segment per rendition.
pub struct FakeTranscoder;

#[async_trait]
impl HlsTranscoder for FakeTranscoder {
    async fn transcode(&self, _input: &Path, output_dir: &Path, _has_audio: bool) -> Result<()> {
        tokio::fs::write(output_dir.join(MASTER_PLAYLIST), "#EXTM3U\n").await?;
        for i in 0..3 {
            let dir = output_dir.join(format!("stream_{}", i));
            tokio::fs::create_dir_all(&dir).await?;
            tokio::fs::write(dir.join("playlist.m3u8"), "#EXTM3U\n").await?;
            tokio::fs::write(dir.join("data000.ts"), b"segment").await?;
        }
        Ok(())
    }
}

pub struct FailingTranscoder;

#[async_trait]
impl HlsTranscoder for FailingTranscoder {
    async fn transcode(&self, _input: &Path, _output_dir: &Path, _has_audio: bool) -> Result<()> {
        Err(anyhow!("FFmpeg failed (exit status: 1)"))
    }
}

/// Succeeds like [`FakeTranscoder`] after holding the worker for `delay`.
pub struct SlowTranscoder {
    pub delay: Duration,
}

#[async_trait]
impl HlsTranscoder for SlowTranscoder {
    async fn transcode(&self, input: &Path, output_dir: &Path, has_audio: bool) -> Result<()> {
        tokio::time::sleep(self.delay).await;
        FakeTranscoder.transcode(input, output_dir, has_audio).await
    }
}

/// Fails the first `failures` runs, then behaves like [`FakeTranscoder`].
pub struct FlakyTranscoder {
    pub failures: u32,
    pub calls: AtomicU32,
}

impl FlakyTranscoder {
    pub fn failing(failures: u32) -> Self {
        Self {
            failures,
            calls: AtomicU32::new(0),
        }
    }

    pub fn calls(&self) -> u32 {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl HlsTranscoder for FlakyTranscoder {
    async fn transcode(&self, input: &Path, output_dir: &Path, has_audio: bool) -> Result<()> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst);
        if call < self.failures {
            return Err(anyhow!("FFmpeg failed (exit status: 1): attempt {}", call + 1));
        }
        FakeTranscoder.transcode(input, output_dir, has_audio).await
    }
}
