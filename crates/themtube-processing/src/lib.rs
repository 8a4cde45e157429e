//! ThemTube video ingestion pipeline
//!
//! Probing with ffprobe, the ffmpeg HLS ladder, and the orchestrator that
//! reconciles the catalog with the outcome of a transcode.

pub mod metadata;
pub mod traits;
pub mod video;

pub use metadata::VideoMetadata;
pub use traits::{HlsTranscoder, VideoProbe};
pub use video::{FFmpegService, ProcessOutcome, Rendition, VideoOrchestrator, VideoProcessor};
