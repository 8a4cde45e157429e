use anyhow::{anyhow, Context};
use axum::{
    extract::{Multipart, State},
    Json,
};
use std::sync::Arc;
use themtube_core::models::{NewVideo, Video};
use themtube_core::AppError;

use crate::auth::AuthUser;
use crate::error::{ErrorResponse, HttpAppError};
use crate::job_queue::VideoJob;
use crate::state::AppState;
use crate::utils::upload::{extract_video_upload, VideoUploadForm};

/// Upload a video. The record stays unavailable until the HLS ladder is stored.
#[utoipa::path(
    post,
    path = "/api/v1/videos",
    tag = "videos",
    security(("bearer" = [])),
    request_body(content = inline(Object), content_type = "multipart/form-data",
        description = "Fields: video_file (file), title, description, tags (repeated or comma-separated)"),
    responses(
        (status = 200, description = "Video accepted for processing", body = Video),
        (status = 400, description = "Invalid input", body = ErrorResponse),
        (status = 401, description = "Not authenticated", body = ErrorResponse),
        (status = 413, description = "File too large", body = ErrorResponse),
        (status = 500, description = "Unable to upload video", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip(state, auth_user, multipart), fields(user_id = %auth_user.id(), video_id = tracing::field::Empty, operation = "upload_video"))]
pub async fn upload_video(
    State(state): State<Arc<AppState>>,
    auth_user: AuthUser,
    multipart: Multipart,
) -> Result<Json<Video>, HttpAppError> {
    let VideoUploadForm {
        data,
        content_type,
        title,
        description,
        tags,
    } = extract_video_upload(multipart, state.config.video.max_video_size_bytes).await?;

    let file_size = data.len();
    let video = state
        .videos
        .create_video(NewVideo {
            user_id: auth_user.id(),
            title,
            description,
            tags,
        })
        .await?;
    tracing::Span::current().record("video_id", tracing::field::display(video.id));

    match ingest(&state, &video, data, &content_type).await {
        Ok(video) => {
            tracing::info!(video_id = %video.id, file_size, duration = video.duration_in_sec, "Video uploaded");
            Ok(Json(video))
        }
        Err(e) => {
            rollback(&state, &video).await;
            Err(AppError::UploadFailed(e).into())
        }
    }
}

/// Store the source, record its duration and queue the transcode.
async fn ingest(
    state: &AppState,
    video: &Video,
    data: Vec<u8>,
    content_type: &str,
) -> anyhow::Result<Video> {
    let metadata = state
        .probe
        .probe_bytes(&data)
        .await
        .context("Failed to probe uploaded video")?;

    state
        .storage
        .upload_with_key(&video.source_key(), data, content_type)
        .await
        .context("Failed to store uploaded video")?;

    let updated = state
        .videos
        .set_duration(video.user_id, video.id, metadata.duration)
        .await
        .context("Failed to record video duration")?
        .ok_or_else(|| anyhow!("Video record disappeared during upload"))?;

    state
        .jobs
        .submit(VideoJob::TranscodeVideo { video_id: video.id })
        .context("Failed to queue transcode job")?;

    Ok(updated)
}

/// Files go first so a missing record always means the files are gone too.
async fn rollback(state: &AppState, video: &Video) {
    if let Err(e) = state.storage.delete_prefix(&video.storage_prefix()).await {
        tracing::error!(video_id = %video.id, error = %e, "Failed to remove video files after upload error");
    }
    if let Err(e) = state.videos.delete_video_unchecked(video.id).await {
        tracing::error!(video_id = %video.id, error = %e, "Failed to remove video record after upload error");
    }
}
