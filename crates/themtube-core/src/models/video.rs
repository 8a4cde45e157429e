use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

/// Video catalog record
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, ToSchema)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Video {
    pub id: Uuid,
    pub user_id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub tags: Vec<String>,
    /// True once every HLS rendition has been stored
    pub available: bool,
    pub duration_in_sec: f64,
    pub date_created: DateTime<Utc>,
    pub date_modified: DateTime<Utc>,
}

impl Video {
    /// Storage key of the uploaded source file.
    pub fn source_key(&self) -> String {
        format!("{}/{}.mp4", self.id, self.id)
    }

    /// Storage prefix holding the source and every HLS output.
    pub fn storage_prefix(&self) -> String {
        self.id.to_string()
    }
}

/// Fields required to insert a video. The store assigns id and timestamps.
#[derive(Debug, Clone)]
pub struct NewVideo {
    pub user_id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub tags: Vec<String>,
}

/// Partial update. `None` leaves a field untouched.
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct VideoUpdate {
    pub title: Option<String>,
    pub description: Option<String>,
    pub tags: Option<Vec<String>>,
}

impl VideoUpdate {
    /// Apply set fields to `video` and bump its modification time.
    pub fn apply_to(&self, video: &mut Video, now: DateTime<Utc>) {
        if let Some(title) = &self.title {
            video.title = title.clone();
        }
        if let Some(description) = &self.description {
            video.description = Some(description.clone());
        }
        if let Some(tags) = &self.tags {
            video.tags = tags.clone();
        }
        video.date_modified = now;
    }
}

/// Listing query for `GET /videos`
#[derive(Debug, Clone, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct VideoFilter {
    /// Return only videos whose id sorts after this one
    pub cursor: Option<Uuid>,
    /// Page size; 0 returns everything
    #[serde(default)]
    pub limit: i64,
    #[serde(default = "default_only_available")]
    pub only_available: bool,
}

fn default_only_available() -> bool {
    true
}

impl Default for VideoFilter {
    fn default() -> Self {
        Self {
            cursor: None,
            limit: 0,
            only_available: true,
        }
    }
}

impl VideoFilter {
    /// Whether `video` passes the availability and cursor filters.
    pub fn matches(&self, video: &Video) -> bool {
        if self.only_available && !video.available {
            return false;
        }
        match self.cursor {
            Some(cursor) => video.id > cursor,
            None => true,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct VideoPage {
    pub items: Vec<Video>,
    /// Pass back as `cursor` to fetch the next page
    pub next_cursor: Option<Uuid>,
}

impl VideoPage {
    /// Build a page; the cursor is only set when a positive limit was filled.
    pub fn new(items: Vec<Video>, limit: i64) -> Self {
        let next_cursor = if limit > 0 && items.len() as i64 == limit {
            items.last().map(|v| v.id)
        } else {
            None
        };
        Self { items, next_cursor }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct MessageResponse {
    pub message: String,
}
