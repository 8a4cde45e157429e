use axum::{
    extract::{Path, State},
    Json,
};
use std::sync::Arc;
use themtube_core::models::{Video, VideoUpdate};
use themtube_core::AppError;
use uuid::Uuid;

use crate::auth::AuthUser;
use crate::error::{ErrorResponse, HttpAppError, ValidatedJson};
use crate::state::AppState;

/// Partial update of an owned video. Omitted fields are left untouched.
#[utoipa::path(
    patch,
    path = "/api/v1/videos/{id}",
    tag = "videos",
    security(("bearer" = [])),
    params(
        ("id" = Uuid, Path, description = "Video ID")
    ),
    request_body = VideoUpdate,
    responses(
        (status = 200, description = "Updated video", body = Video),
        (status = 401, description = "Not authenticated", body = ErrorResponse),
        (status = 404, description = "Video not found", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip(state, auth_user, update), fields(user_id = %auth_user.id(), video_id = %id, operation = "update_video"))]
pub async fn update_video(
    State(state): State<Arc<AppState>>,
    auth_user: AuthUser,
    Path(id): Path<Uuid>,
    ValidatedJson(update): ValidatedJson<VideoUpdate>,
) -> Result<Json<Video>, HttpAppError> {
    let video = state
        .videos
        .update_video(auth_user.id(), id, &update)
        .await?
        .ok_or_else(|| AppError::NotFound("Video not found".to_string()))?;

    Ok(Json(video))
}
