use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, Semaphore};
use uuid::Uuid;

use themtube_core::models::VideoFilter;
use themtube_core::AppError;
use themtube_db::VideoCatalog;
use themtube_processing::{ProcessOutcome, VideoOrchestrator};

#[derive(Debug, Clone)]
pub enum VideoJob {
    TranscodeVideo { video_id: Uuid },
}

#[derive(Debug, Clone)]
pub struct JobQueueConfig {
    pub queue_size: usize,
    pub max_concurrent: usize,
    /// Total tries per job, including the first
    pub max_attempts: u32,
    /// Delay before the second try; doubles after each further failure
    pub retry_base_delay: Duration,
}

/// Bounded transcode queue drained by a semaphore-limited worker pool.
#[derive(Clone)]
pub struct VideoJobQueue {
    tx: mpsc::Sender<VideoJob>,
    orchestrator: VideoOrchestrator,
}

impl VideoJobQueue {
    /// Create the queue and spawn its worker pool. Must be called inside a tokio runtime.
    pub fn new(orchestrator: VideoOrchestrator, config: JobQueueConfig) -> Self {
        let queue_size = config.queue_size.max(1);
        let (tx, rx) = mpsc::channel(queue_size);

        tracing::info!(
            queue_size = queue_size,
            max_concurrent = config.max_concurrent,
            max_attempts = config.max_attempts,
            "Video job queue initialized with bounded channel"
        );

        let workers = orchestrator.clone();
        tokio::spawn(async move {
            Self::worker_pool(rx, workers, config).await;
        });

        Self { tx, orchestrator }
    }

    /// Requeue every video that never became available.
    ///
    /// Queued and running jobs do not survive a restart, so this runs once at
    /// startup before the server accepts uploads. Videos that cannot be
    /// requeued are removed with their files.
    pub async fn resume_unfinished(&self, catalog: &dyn VideoCatalog) -> Result<usize, AppError> {
        let filter = VideoFilter {
            only_available: false,
            ..VideoFilter::default()
        };
        let unfinished: Vec<Uuid> = catalog
            .list_videos(&filter)
            .await?
            .into_iter()
            .filter(|video| !video.available)
            .map(|video| video.id)
            .collect();

        let mut resumed = 0;
        for video_id in unfinished {
            match self.submit(VideoJob::TranscodeVideo { video_id }) {
                Ok(()) => resumed += 1,
                Err(e) => {
                    tracing::warn!(video_id = %video_id, error = %e, "Could not requeue unfinished video, removing it");
                    self.orchestrator
                        .reconcile_failure(video_id)
                        .await
                        .map_err(AppError::from)?;
                }
            }
        }

        if resumed > 0 {
            tracing::info!(resumed, "Requeued unfinished video transcodes");
        }
        Ok(resumed)
    }

    /// Enqueue without waiting. A full queue is reported as `ServiceUnavailable`.
    #[tracing::instrument(skip(self), fields(job.type = "transcode"))]
    pub fn submit(&self, job: VideoJob) -> Result<(), AppError> {
        match &job {
            VideoJob::TranscodeVideo { video_id } => {
                tracing::info!(video_id = %video_id, "Enqueuing video transcode job");
            }
        }
        self.tx.try_send(job).map_err(|e| match e {
            mpsc::error::TrySendError::Full(_) => {
                tracing::warn!("Video job queue is full, rejecting job");
                AppError::ServiceUnavailable(
                    "Video job queue is full, please try again later".to_string(),
                )
            }
            mpsc::error::TrySendError::Closed(_) => {
                AppError::Internal("Video job queue is closed".to_string())
            }
        })
    }

    async fn worker_pool(
        mut rx: mpsc::Receiver<VideoJob>,
        orchestrator: VideoOrchestrator,
        config: JobQueueConfig,
    ) {
        let semaphore = Arc::new(Semaphore::new(config.max_concurrent.max(1)));

        while let Some(job) = rx.recv().await {
            let Ok(permit) = semaphore.clone().acquire_owned().await else {
                break;
            };
            let orchestrator = orchestrator.clone();
            let config = config.clone();

            tokio::spawn(async move {
                let _permit = permit;
                Self::process_job(job, &orchestrator, &config).await;
            });
        }

        tracing::info!("Video job queue closed, worker pool exiting");
    }

    async fn process_job(job: VideoJob, orchestrator: &VideoOrchestrator, config: &JobQueueConfig) {
        match job {
            VideoJob::TranscodeVideo { video_id } => {
                Self::process_transcode_job(video_id, orchestrator, config).await
            }
        }
    }

    #[tracing::instrument(skip(orchestrator, config), fields(video.id = %video_id, job.status = tracing::field::Empty))]
    async fn process_transcode_job(
        video_id: Uuid,
        orchestrator: &VideoOrchestrator,
        config: &JobQueueConfig,
    ) {
        let start = std::time::Instant::now();
        let max_attempts = config.max_attempts.max(1);

        for attempt in 1..=max_attempts {
            match orchestrator.process_video(video_id).await {
                Ok(ProcessOutcome::Available) => {
                    tracing::Span::current().record("job.status", "success");
                    tracing::info!(
                        video_id = %video_id,
                        attempt,
                        duration_ms = start.elapsed().as_millis(),
                        "Video transcode completed successfully"
                    );
                    return;
                }
                Ok(ProcessOutcome::Missing) => {
                    tracing::Span::current().record("job.status", "skipped");
                    return;
                }
                Err(e) if attempt < max_attempts => {
                    let delay = retry_delay(config.retry_base_delay, attempt);
                    tracing::warn!(
                        video_id = %video_id,
                        attempt,
                        max_attempts,
                        retry_in_ms = delay.as_millis(),
                        error = %format!("{:#}", e),
                        "Video transcode attempt failed, retrying"
                    );
                    tokio::time::sleep(delay).await;
                }
                Err(e) => {
                    tracing::Span::current().record("job.status", "failed");
                    tracing::error!(
                        video_id = %video_id,
                        attempts = max_attempts,
                        error = %format!("{:#}", e),
                        duration_ms = start.elapsed().as_millis(),
                        "Video transcode failed"
                    );
                }
            }
        }

        if let Err(e) = orchestrator.reconcile_failure(video_id).await {
            tracing::error!(
                video_id = %video_id,
                error = %format!("{:#}", e),
                "Failed to clean up after transcode failure"
            );
        }
    }
}

/// Exponential backoff: `base * 2^(attempt - 1)`.
fn retry_delay(base: Duration, attempt: u32) -> Duration {
    base.saturating_mul(2u32.saturating_pow(attempt.saturating_sub(1)))
}
