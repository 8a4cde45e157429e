//! Video processing module

pub mod orchestration;
pub mod processor;
pub mod service;

pub use orchestration::{ProcessOutcome, VideoOrchestrator};
pub use processor::VideoProcessor;
pub use service::{FFmpegService, Rendition};
