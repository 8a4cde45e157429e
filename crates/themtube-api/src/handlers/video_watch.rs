use axum::{
    extract::{Path, State},
    response::Html,
};
use std::sync::Arc;
use themtube_core::constants::{MASTER_PLAYLIST, STREAM_PREFIX};
use themtube_core::AppError;
use uuid::Uuid;

use crate::error::{ErrorResponse, HttpAppError};
use crate::state::AppState;

const WATCH_TEMPLATE: &str = include_str!("../../templates/watch.html");
const URL_PLACEHOLDER: &str = "VIDEO_URL";

/// Public URL of a video's master playlist.
pub fn master_playlist_url(public_base_url: &str, id: Uuid) -> String {
    format!(
        "{}{}/{}/{}",
        public_base_url.trim_end_matches('/'),
        STREAM_PREFIX,
        id,
        MASTER_PLAYLIST
    )
}

pub fn render_watch_page(playlist_url: &str) -> String {
    WATCH_TEMPLATE.replace(URL_PLACEHOLDER, playlist_url)
}

/// HTML player page for a video.
#[utoipa::path(
    get,
    path = "/api/v1/videos/{id}/watch",
    tag = "videos",
    params(
        ("id" = Uuid, Path, description = "Video ID")
    ),
    responses(
        (status = 200, description = "Player page", body = String, content_type = "text/html"),
        (status = 404, description = "Video not found", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip(state), fields(video_id = %id, operation = "watch_video"))]
pub async fn watch_video(
    Path(id): Path<Uuid>,
    State(state): State<Arc<AppState>>,
) -> Result<Html<String>, HttpAppError> {
    let video = state
        .videos
        .get_video(id)
        .await?
        .ok_or_else(|| AppError::NotFound("Video not found".to_string()))?;

    let url = master_playlist_url(&state.config.server.public_base_url, video.id);
    Ok(Html(render_watch_page(&url)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_master_playlist_url() {
        let id = Uuid::nil();
        assert_eq!(
            master_playlist_url("http://localhost:8000/", id),
            format!("http://localhost:8000/stream/{}/master.m3u8", id)
        );
    }

    #[test]
    fn test_render_replaces_placeholder() {
        let page = render_watch_page("http://cdn.example/stream/x/master.m3u8");
        assert!(page.contains("\"http://cdn.example/stream/x/master.m3u8\""));
        assert!(!page.contains(URL_PLACEHOLDER));
    }
}
