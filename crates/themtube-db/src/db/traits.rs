//! Store traits the API and pipeline are written against.

use async_trait::async_trait;
use themtube_core::models::{NewUser, NewVideo, User, Video, VideoFilter, VideoUpdate};
use themtube_core::AppError;
use uuid::Uuid;

#[async_trait]
pub trait UserStore: Send + Sync {
    /// Insert a user. A duplicate email yields `AppError::BadRequest("Email already taken")`.
    async fn create_user(&self, new_user: NewUser) -> Result<User, AppError>;

    async fn get_user(&self, id: Uuid) -> Result<Option<User>, AppError>;

    async fn get_user_by_email(&self, email: &str) -> Result<Option<User>, AppError>;

    async fn list_users(&self) -> Result<Vec<User>, AppError>;
}

#[async_trait]
pub trait VideoCatalog: Send + Sync {
    async fn create_video(&self, new_video: NewVideo) -> Result<Video, AppError>;

    async fn get_video(&self, id: Uuid) -> Result<Option<Video>, AppError>;

    /// Ascending by id, honouring availability, cursor and limit (0 = unlimited).
    async fn list_videos(&self, filter: &VideoFilter) -> Result<Vec<Video>, AppError>;

    /// Owner-filtered partial update. `None` when no owned record matches.
    async fn update_video(
        &self,
        owner_id: Uuid,
        id: Uuid,
        update: &VideoUpdate,
    ) -> Result<Option<Video>, AppError>;

    /// Owner-filtered duration update after probing.
    async fn set_duration(
        &self,
        owner_id: Uuid,
        id: Uuid,
        duration_in_sec: f64,
    ) -> Result<Option<Video>, AppError>;

    /// Flag a video as streamable. Returns false when the record is gone.
    async fn mark_available(&self, id: Uuid) -> Result<bool, AppError>;

    /// Owner-filtered delete. Returns whether a record was removed.
    async fn delete_video(&self, owner_id: Uuid, id: Uuid) -> Result<bool, AppError>;

    /// Delete without an owner filter. Used by pipeline reconciliation.
    async fn delete_video_unchecked(&self, id: Uuid) -> Result<bool, AppError>;

    /// Cheap round trip used by readiness checks.
    async fn ping(&self) -> Result<(), AppError>;
}
