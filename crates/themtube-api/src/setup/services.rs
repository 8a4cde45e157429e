//! Service wiring: stores, media tools, orchestrator and job queue.

use anyhow::{Context, Result};
use sqlx::PgPool;
use std::sync::Arc;
use themtube_core::Config;
use themtube_db::{UserRepository, UserStore, VideoCatalog, VideoRepository};
use themtube_processing::{FFmpegService, HlsTranscoder, VideoOrchestrator, VideoProbe, VideoProcessor};
use themtube_storage::Storage;

use crate::auth::JwtService;
use crate::job_queue::{JobQueueConfig, VideoJobQueue};
use crate::state::AppState;

/// Backends the application state is assembled from.
pub struct Backends {
    pub users: Arc<dyn UserStore>,
    pub videos: Arc<dyn VideoCatalog>,
    pub storage: Arc<dyn Storage>,
    pub probe: Arc<dyn VideoProbe>,
    pub transcoder: Arc<dyn HlsTranscoder>,
}

/// Production wiring on PostgreSQL and the ffmpeg toolchain.
pub fn initialize_services(
    config: &Config,
    pool: PgPool,
    storage: Arc<dyn Storage>,
) -> Result<Arc<AppState>> {
    let probe = VideoProcessor::new(config.video.ffprobe_path.clone())?;
    let transcoder =
        FFmpegService::new(config.video.ffmpeg_path.clone(), config.video.hls_segment_duration)?;

    tracing::info!(
        ffprobe_path = %config.video.ffprobe_path,
        ffmpeg_path = %config.video.ffmpeg_path,
        hls_segment_duration = config.video.hls_segment_duration,
        "Media tools configured"
    );

    build_state(
        config,
        Backends {
            users: Arc::new(UserRepository::new(pool.clone())),
            videos: Arc::new(VideoRepository::new(pool)),
            storage,
            probe: Arc::new(probe),
            transcoder: Arc::new(transcoder),
        },
    )
}

/// Assemble `AppState` and start the transcode worker pool.
pub fn build_state(config: &Config, backends: Backends) -> Result<Arc<AppState>> {
    let jwt = JwtService::new(
        &config.auth.secret_key,
        &config.auth.jwt_algorithm,
        config.auth.access_token_expire_days,
    )
    .context("Invalid JWT configuration")?;

    let orchestrator = VideoOrchestrator::new(
        backends.videos.clone(),
        backends.storage.clone(),
        backends.probe.clone(),
        backends.transcoder,
    );

    let jobs = VideoJobQueue::new(
        orchestrator,
        JobQueueConfig {
            queue_size: config.video.job_queue_size,
            max_concurrent: config.video.max_concurrent_transcodes,
            max_attempts: config.video.transcode_max_attempts,
            retry_base_delay: config.transcode_retry_base_delay(),
        },
    );

    Ok(Arc::new(AppState {
        config: config.clone(),
        users: backends.users,
        videos: backends.videos,
        storage: backends.storage,
        probe: backends.probe,
        jwt,
        jobs,
    }))
}
