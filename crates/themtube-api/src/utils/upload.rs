//! Multipart parsing for video uploads

use axum::extract::multipart::{Field, MultipartError};
use axum::extract::Multipart;
use axum::http::StatusCode;
use themtube_core::AppError;

pub const VIDEO_FILE_FIELD: &str = "video_file";
const DEFAULT_CONTENT_TYPE: &str = "video/mp4";

/// Fields of a `POST /videos` form.
#[derive(Debug)]
pub struct VideoUploadForm {
    pub data: Vec<u8>,
    pub content_type: String,
    pub title: String,
    pub description: Option<String>,
    pub tags: Vec<String>,
}

fn multipart_error(e: MultipartError) -> AppError {
    if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
        AppError::PayloadTooLarge("Request body too large".to_string())
    } else {
        AppError::InvalidInput(format!("Failed to read multipart: {}", e.body_text()))
    }
}

async fn read_text(field: Field<'_>) -> Result<String, AppError> {
    field.text().await.map_err(multipart_error)
}

/// Read the file part chunk by chunk, failing as soon as it exceeds `max_size`.
async fn read_file(mut field: Field<'_>, max_size: usize) -> Result<Vec<u8>, AppError> {
    let mut data = Vec::new();
    while let Some(chunk) = field.chunk().await.map_err(multipart_error)? {
        validate_file_size(data.len() + chunk.len(), max_size)?;
        data.extend_from_slice(&chunk);
    }
    Ok(data)
}

/// Parse an upload form. Exactly one `video_file` part is accepted; unknown parts are ignored.
pub async fn extract_video_upload(
    mut multipart: Multipart,
    max_size: usize,
) -> Result<VideoUploadForm, AppError> {
    let mut data: Option<Vec<u8>> = None;
    let mut content_type: Option<String> = None;
    let mut title: Option<String> = None;
    let mut description: Option<String> = None;
    let mut tags: Vec<String> = Vec::new();

    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        let name = field.name().map(|s| s.to_string()).unwrap_or_default();

        match name.as_str() {
            VIDEO_FILE_FIELD => {
                if data.is_some() {
                    return Err(AppError::InvalidInput(
                        "Multiple video_file fields are not allowed".to_string(),
                    ));
                }
                content_type = field.content_type().map(|s| s.to_string());
                data = Some(read_file(field, max_size).await?);
            }
            "title" => title = Some(read_text(field).await?),
            "description" => {
                let text = read_text(field).await?;
                description = (!text.trim().is_empty()).then_some(text);
            }
            "tags" => tags.extend(parse_tags(&read_text(field).await?)),
            other => {
                tracing::debug!(field = %other, "Ignoring unknown multipart field");
            }
        }
    }

    let data = data.ok_or_else(|| AppError::InvalidInput("No video_file provided".to_string()))?;
    if data.is_empty() {
        return Err(AppError::InvalidInput("Uploaded file is empty".to_string()));
    }

    let title = title
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty())
        .ok_or_else(|| AppError::InvalidInput("Title is required".to_string()))?;

    Ok(VideoUploadForm {
        data,
        content_type: content_type.unwrap_or_else(|| DEFAULT_CONTENT_TYPE.to_string()),
        title,
        description,
        tags,
    })
}

/// Validate file size
pub fn validate_file_size(file_size: usize, max_size: usize) -> Result<(), AppError> {
    if file_size > max_size {
        return Err(AppError::PayloadTooLarge(format!(
            "File size exceeds maximum allowed size of {} MB",
            max_size / 1024 / 1024
        )));
    }
    Ok(())
}

/// Split a comma-separated tag value, trimming whitespace and dropping empties.
pub fn parse_tags(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(String::from)
        .collect()
}
