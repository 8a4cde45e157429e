use axum::{
    extract::{Path, State},
    Json,
};
use std::sync::Arc;
use themtube_core::models::MessageResponse;
use themtube_core::AppError;
use uuid::Uuid;

use crate::auth::AuthUser;
use crate::error::{ErrorResponse, HttpAppError};
use crate::state::AppState;

#[utoipa::path(
    delete,
    path = "/api/v1/videos/{id}",
    tag = "videos",
    security(("bearer" = [])),
    params(
        ("id" = Uuid, Path, description = "Video ID")
    ),
    responses(
        (status = 200, description = "Video deleted", body = MessageResponse),
        (status = 401, description = "Not authenticated", body = ErrorResponse),
        (status = 404, description = "Video not found", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip(state, auth_user), fields(user_id = %auth_user.id(), video_id = %id, operation = "delete_video"))]
pub async fn delete_video(
    State(state): State<Arc<AppState>>,
    auth_user: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<MessageResponse>, HttpAppError> {
    if !state.videos.delete_video(auth_user.id(), id).await? {
        return Err(AppError::NotFound("Video not found".to_string()).into());
    }

    // A transcode still in flight sees the missing record and drops its own output.
    state.storage.delete_prefix(&id.to_string()).await?;

    tracing::info!(video_id = %id, "Video deleted");
    Ok(Json(MessageResponse {
        message: "Video deleted successfully".to_string(),
    }))
}
