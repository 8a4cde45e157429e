//! FFmpegService - single-pass HLS ladder transcoding.

use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use std::path::Path;
use std::process::Stdio;
use tokio::process::Command;

use themtube_core::constants::MASTER_PLAYLIST;

use super::processor::{validate_and_canonicalize_path, validate_executable, validate_path};
use crate::traits::HlsTranscoder;

/// One bitrate/resolution variant of the ladder.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rendition {
    pub width: u32,
    pub height: u32,
    pub video_bitrate_kbps: u32,
    pub maxrate_kbps: u32,
    pub bufsize_kbps: u32,
    pub audio_bitrate_kbps: u32,
}

pub const HLS_LADDER: [Rendition; 3] = [
    Rendition {
        width: 1920,
        height: 1080,
        video_bitrate_kbps: 5000,
        maxrate_kbps: 5350,
        bufsize_kbps: 7500,
        audio_bitrate_kbps: 192,
    },
    Rendition {
        width: 1280,
        height: 720,
        video_bitrate_kbps: 2800,
        maxrate_kbps: 2996,
        bufsize_kbps: 4200,
        audio_bitrate_kbps: 128,
    },
    Rendition {
        width: 854,
        height: 480,
        video_bitrate_kbps: 1400,
        maxrate_kbps: 1498,
        bufsize_kbps: 2100,
        audio_bitrate_kbps: 96,
    },
];

#[derive(Debug, Clone)]
pub struct FFmpegService {
    ffmpeg_path: String,
    segment_duration: u64,
}

impl FFmpegService {
    pub fn new(ffmpeg_path: impl Into<String>, segment_duration: u64) -> Result<Self> {
        let ffmpeg_path = ffmpeg_path.into();
        validate_executable(&ffmpeg_path).context("Invalid ffmpeg_path")?;

        Ok(Self {
            ffmpeg_path,
            segment_duration,
        })
    }

    /// Build the ffmpeg argument list for the full ladder.
    pub fn ladder_args(&self, input: &Path, output_dir: &Path, has_audio: bool) -> Vec<String> {
        let labels: Vec<String> = (1..=HLS_LADDER.len()).map(|i| format!("v{}", i)).collect();

        let mut filter = format!(
            "[0:v]split={}{}",
            HLS_LADDER.len(),
            labels.iter().map(|l| format!("[{}]", l)).collect::<String>()
        );
        for (label, rendition) in labels.iter().zip(HLS_LADDER.iter()) {
            filter.push_str(&format!(
                "; [{}]scale=w={}:h={}[{}out]",
                label, rendition.width, rendition.height, label
            ));
        }

        let mut args = vec![
            "-i".to_string(),
            input.to_string_lossy().to_string(),
            "-filter_complex".to_string(),
            filter,
        ];

        for (i, (label, rendition)) in labels.iter().zip(HLS_LADDER.iter()).enumerate() {
            args.extend([
                "-map".to_string(),
                format!("[{}out]", label),
                format!("-c:v:{}", i),
                "libx264".to_string(),
                format!("-b:v:{}", i),
                format!("{}k", rendition.video_bitrate_kbps),
                format!("-maxrate:v:{}", i),
                format!("{}k", rendition.maxrate_kbps),
                format!("-bufsize:v:{}", i),
                format!("{}k", rendition.bufsize_kbps),
            ]);
        }

        if has_audio {
            for (i, rendition) in HLS_LADDER.iter().enumerate() {
                args.extend([
                    "-map".to_string(),
                    "a:0".to_string(),
                    format!("-c:a:{}", i),
                    "aac".to_string(),
                    format!("-b:a:{}", i),
                    format!("{}k", rendition.audio_bitrate_kbps),
                    "-ac".to_string(),
                    "2".to_string(),
                ]);
            }
        }

        let var_stream_map = (0..HLS_LADDER.len())
            .map(|i| {
                if has_audio {
                    format!("v:{},a:{}", i, i)
                } else {
                    format!("v:{}", i)
                }
            })
            .collect::<Vec<_>>()
            .join(" ");

        args.extend([
            "-f".to_string(),
            "hls".to_string(),
            "-hls_time".to_string(),
            self.segment_duration.to_string(),
            "-hls_playlist_type".to_string(),
            "vod".to_string(),
            "-hls_flags".to_string(),
            "independent_segments".to_string(),
            "-hls_segment_type".to_string(),
            "mpegts".to_string(),
            "-hls_segment_filename".to_string(),
            output_dir
                .join("stream_%v")
                .join("data%03d.ts")
                .to_string_lossy()
                .to_string(),
            "-master_pl_name".to_string(),
            MASTER_PLAYLIST.to_string(),
            "-var_stream_map".to_string(),
            var_stream_map,
            output_dir
                .join("stream_%v")
                .join("playlist.m3u8")
                .to_string_lossy()
                .to_string(),
        ]);

        args
    }
}

#[async_trait]
impl HlsTranscoder for FFmpegService {
    #[tracing::instrument(skip(self), fields(
        process.executable.name = "ffmpeg",
        process.executable.path = %self.ffmpeg_path,
        ffmpeg.operation = "hls_ladder"
    ))]
    async fn transcode(&self, input: &Path, output_dir: &Path, has_audio: bool) -> Result<()> {
        let start = std::time::Instant::now();

        let input = validate_and_canonicalize_path(input).context("Invalid input path")?;
        validate_path(&output_dir.to_string_lossy()).context("Invalid output directory")?;

        for i in 0..HLS_LADDER.len() {
            tokio::fs::create_dir_all(output_dir.join(format!("stream_{}", i)))
                .await
                .context("Failed to create rendition directory")?;
        }

        let args = self.ladder_args(&input, output_dir, has_audio);

        let output = Command::new(&self.ffmpeg_path)
            .args(&args)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .output()
            .await
            .context("Failed to execute ffmpeg")?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            let tail: String = stderr
                .lines()
                .rev()
                .take(10)
                .collect::<Vec<_>>()
                .into_iter()
                .rev()
                .collect::<Vec<_>>()
                .join("\n");
            return Err(anyhow!("FFmpeg failed ({}): {}", output.status, tail));
        }

        tracing::info!(
            duration_ms = start.elapsed().as_millis(),
            has_audio,
            "HLS ladder generated"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn value_after<'a>(args: &'a [String], flag: &str) -> Vec<&'a str> {
        args.windows(2)
            .filter(|w| w[0] == flag)
            .map(|w| w[1].as_str())
            .collect()
    }

    #[test]
    fn test_ladder_without_audio() {
        let service = FFmpegService::new("ffmpeg", 10).unwrap();
        let args = service.ladder_args(
            &PathBuf::from("/tmp/in.mp4"),
            &PathBuf::from("/tmp/out"),
            false,
        );

        assert_eq!(
            value_after(&args, "-filter_complex"),
            vec!["[0:v]split=3[v1][v2][v3]; [v1]scale=w=1920:h=1080[v1out]; [v2]scale=w=1280:h=720[v2out]; [v3]scale=w=854:h=480[v3out]"]
        );
        assert_eq!(value_after(&args, "-b:v:0"), vec!["5000k"]);
        assert_eq!(value_after(&args, "-maxrate:v:1"), vec!["2996k"]);
        assert_eq!(value_after(&args, "-bufsize:v:2"), vec!["2100k"]);
        assert_eq!(value_after(&args, "-var_stream_map"), vec!["v:0 v:1 v:2"]);
        assert!(!args.iter().any(|a| a == "a:0"));
        assert_eq!(value_after(&args, "-hls_time"), vec!["10"]);
        assert_eq!(value_after(&args, "-hls_playlist_type"), vec!["vod"]);
        assert_eq!(value_after(&args, "-hls_flags"), vec!["independent_segments"]);
        assert_eq!(value_after(&args, "-hls_segment_type"), vec!["mpegts"]);
        assert_eq!(value_after(&args, "-master_pl_name"), vec!["master.m3u8"]);
        assert_eq!(
            value_after(&args, "-hls_segment_filename"),
            vec!["/tmp/out/stream_%v/data%03d.ts"]
        );
        assert_eq!(args.last().unwrap(), "/tmp/out/stream_%v/playlist.m3u8");
    }

    #[test]
    fn test_ladder_with_audio() {
        let service = FFmpegService::new("ffmpeg", 6).unwrap();
        let args = service.ladder_args(
            &PathBuf::from("/tmp/in.mp4"),
            &PathBuf::from("/tmp/out"),
            true,
        );

        assert_eq!(value_after(&args, "-map").len(), 6);
        assert_eq!(value_after(&args, "-b:a:0"), vec!["192k"]);
        assert_eq!(value_after(&args, "-b:a:1"), vec!["128k"]);
        assert_eq!(value_after(&args, "-b:a:2"), vec!["96k"]);
        assert_eq!(value_after(&args, "-ac"), vec!["2", "2", "2"]);
        assert_eq!(
            value_after(&args, "-var_stream_map"),
            vec!["v:0,a:0 v:1,a:1 v:2,a:2"]
        );
        assert_eq!(value_after(&args, "-hls_time"), vec!["6"]);
    }

    #[test]
    fn test_rejects_unsafe_ffmpeg_path() {
        assert!(FFmpegService::new("ffmpeg && curl evil", 10).is_err());
    }
}
