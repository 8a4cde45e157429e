use axum::{
    extract::{Path, Query, State},
    Json,
};
use std::sync::Arc;
use themtube_core::models::{Video, VideoFilter, VideoPage};
use themtube_core::AppError;
use uuid::Uuid;

use crate::error::{ErrorResponse, HttpAppError};
use crate::state::AppState;

#[utoipa::path(
    get,
    path = "/api/v1/videos/{id}",
    tag = "videos",
    params(
        ("id" = Uuid, Path, description = "Video ID")
    ),
    responses(
        (status = 200, description = "Video found", body = Video),
        (status = 404, description = "Video not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip(state), fields(video_id = %id, operation = "get_video"))]
pub async fn get_video(
    Path(id): Path<Uuid>,
    State(state): State<Arc<AppState>>,
) -> Result<Json<Video>, HttpAppError> {
    let video = state
        .videos
        .get_video(id)
        .await?
        .ok_or_else(|| AppError::NotFound("Video not found".to_string()))?;

    Ok(Json(video))
}

/// Cursor-paginated listing, ascending by id.
#[utoipa::path(
    get,
    path = "/api/v1/videos",
    tag = "videos",
    params(VideoFilter),
    responses(
        (status = 200, description = "Page of videos", body = VideoPage),
        (status = 400, description = "Invalid query", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip(state), fields(operation = "list_videos"))]
pub async fn list_videos(
    Query(filter): Query<VideoFilter>,
    State(state): State<Arc<AppState>>,
) -> Result<Json<VideoPage>, HttpAppError> {
    if filter.limit < 0 {
        return Err(AppError::InvalidInput("limit must not be negative".to_string()).into());
    }

    let videos = state.videos.list_videos(&filter).await?;
    Ok(Json(VideoPage::new(videos, filter.limit)))
}
