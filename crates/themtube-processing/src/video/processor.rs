//! Video processor - ffprobe metadata extraction

use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tokio::process::Command;

use crate::metadata::VideoMetadata;
use crate::traits::VideoProbe;

/// Validate that a path doesn't contain shell metacharacters or dangerous sequences
pub(crate) fn validate_path(path: &str) -> Result<()> {
    let dangerous_chars = [';', '|', '&', '$', '`', '(', ')', '<', '>', '\n', '\r'];
    if path.chars().any(|c| dangerous_chars.contains(&c)) {
        return Err(anyhow!("Path contains dangerous characters: {}", path));
    }

    if path.contains("..") {
        return Err(anyhow!("Path contains directory traversal: {}", path));
    }

    Ok(())
}

/// Validate an executable setting such as `FFPROBE_PATH`.
pub(crate) fn validate_executable(path: &str) -> Result<()> {
    validate_path(path)?;

    if path.is_empty()
        || !path.chars().all(|c| {
            c.is_alphanumeric() || c == '/' || c == '-' || c == '_' || c == '.' || c == '\\'
        })
    {
        return Err(anyhow!("Executable path contains unsafe characters: {}", path));
    }
    Ok(())
}

pub(crate) fn validate_and_canonicalize_path(path: &Path) -> Result<PathBuf> {
    validate_path(&path.to_string_lossy())?;
    path.canonicalize()
        .map_err(|e| anyhow!("Failed to canonicalize path {}: {}", path.display(), e))
}

pub struct VideoProcessor {
    ffprobe_path: String,
}

impl VideoProcessor {
    pub fn new(ffprobe_path: impl Into<String>) -> Result<Self> {
        let ffprobe_path = ffprobe_path.into();
        validate_executable(&ffprobe_path).context("Invalid ffprobe_path")?;
        Ok(Self { ffprobe_path })
    }
}

/// Parse `ffprobe -show_format -show_streams -print_format json` output.
///
/// The first video stream supplies dimensions and codec; any stream with
/// `codec_type == "audio"` marks the file as having audio.
pub fn parse_probe_output(stdout: &[u8]) -> Result<VideoMetadata> {
    let probe_data: serde_json::Value =
        serde_json::from_slice(stdout).context("Failed to parse ffprobe output")?;

    let streams = probe_data["streams"]
        .as_array()
        .ok_or_else(|| anyhow!("ffprobe output has no streams"))?;

    let stream = streams
        .iter()
        .find(|s| s["codec_type"].as_str() == Some("video"))
        .ok_or_else(|| anyhow!("No video stream found"))?;

    let has_audio = streams
        .iter()
        .any(|s| s["codec_type"].as_str() == Some("audio"));

    let format = &probe_data["format"];

    let duration = format["duration"]
        .as_str()
        .and_then(|d| d.parse::<f64>().ok())
        .ok_or_else(|| anyhow!("Could not parse duration"))?;

    let width = stream["width"]
        .as_u64()
        .ok_or_else(|| anyhow!("Could not parse width"))? as u32;

    let height = stream["height"]
        .as_u64()
        .ok_or_else(|| anyhow!("Could not parse height"))? as u32;

    let codec = stream["codec_name"]
        .as_str()
        .unwrap_or("unknown")
        .to_string();

    let bitrate = format["bit_rate"]
        .as_str()
        .and_then(|b| b.parse::<u64>().ok());

    let framerate = stream["r_frame_rate"].as_str().and_then(|r| {
        let (num, den) = r.split_once('/')?;
        let num: f32 = num.parse().ok()?;
        let den: f32 = den.parse().ok()?;
        (den != 0.0).then(|| num / den)
    });

    Ok(VideoMetadata {
        duration,
        width,
        height,
        codec,
        bitrate,
        framerate,
        has_audio,
    })
}

#[async_trait]
impl VideoProbe for VideoProcessor {
    #[tracing::instrument(skip(self), fields(
        process.executable.name = "ffprobe",
        process.executable.path = %self.ffprobe_path,
        ffmpeg.operation = "probe"
    ))]
    async fn probe(&self, video_path: &Path) -> Result<VideoMetadata> {
        let start = std::time::Instant::now();

        let validated_path =
            validate_and_canonicalize_path(video_path).context("Invalid video path")?;

        let output = Command::new(&self.ffprobe_path)
            .args([
                "-v",
                "error",
                "-show_format",
                "-show_streams",
                "-print_format",
                "json",
            ])
            .arg(&validated_path)
            .output()
            .await
            .context("Failed to execute ffprobe")?;

        if !output.status.success() {
            return Err(anyhow!(
                "ffprobe failed: {}",
                String::from_utf8_lossy(&output.stderr)
            ));
        }

        let metadata = parse_probe_output(&output.stdout)?;

        tracing::info!(
            duration_ms = start.elapsed().as_millis(),
            video_duration = metadata.duration,
            width = metadata.width,
            height = metadata.height,
            codec = %metadata.codec,
            has_audio = metadata.has_audio,
            "Video probe completed"
        );

        Ok(metadata)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PROBE_WITH_AUDIO: &str = r#"{
        "streams": [
            {"index": 0, "codec_name": "h264", "codec_type": "video", "width": 1280, "height": 720, "r_frame_rate": "30000/1001"},
            {"index": 1, "codec_name": "aac", "codec_type": "audio", "channels": 2}
        ],
        "format": {"filename": "in.mp4", "duration": "42.133000", "bit_rate": "2483012"}
    }"#;

    #[test]
    fn test_parse_probe_output_with_audio() {
        let metadata = parse_probe_output(PROBE_WITH_AUDIO.as_bytes()).unwrap();
        assert_eq!(metadata.width, 1280);
        assert_eq!(metadata.height, 720);
        assert_eq!(metadata.codec, "h264");
        assert!((metadata.duration - 42.133).abs() < 1e-9);
        assert_eq!(metadata.bitrate, Some(2_483_012));
        assert!((metadata.framerate.unwrap() - 29.97).abs() < 0.01);
        assert!(metadata.has_audio);
    }

    #[test]
    fn test_parse_probe_output_silent_video() {
        let json = r#"{
            "streams": [{"codec_name": "vp9", "codec_type": "video", "width": 640, "height": 360, "r_frame_rate": "0/0"}],
            "format": {"duration": "3.0"}
        }"#;
        let metadata = parse_probe_output(json.as_bytes()).unwrap();
        assert!(!metadata.has_audio);
        assert_eq!(metadata.framerate, None);
        assert_eq!(metadata.bitrate, None);
    }

    #[test]
    fn test_parse_probe_output_rejects_audio_only() {
        let json = r#"{
            "streams": [{"codec_name": "mp3", "codec_type": "audio"}],
            "format": {"duration": "3.0"}
        }"#;
        let err = parse_probe_output(json.as_bytes()).unwrap_err();
        assert!(err.to_string().contains("No video stream"));
    }

    #[test]
    fn test_parse_probe_output_requires_duration() {
        let json = r#"{
            "streams": [{"codec_type": "video", "width": 1, "height": 1}],
            "format": {}
        }"#;
        assert!(parse_probe_output(json.as_bytes()).is_err());
        assert!(parse_probe_output(b"not json").is_err());
    }

    #[test]
    fn test_executable_validation() {
        assert!(VideoProcessor::new("ffprobe").is_ok());
        assert!(VideoProcessor::new("/usr/local/bin/ffprobe").is_ok());
        assert!(VideoProcessor::new("ffprobe; rm -rf /").is_err());
        assert!(VideoProcessor::new("").is_err());
    }
}
