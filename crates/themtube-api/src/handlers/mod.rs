pub mod health;
pub mod users;
pub mod video_delete;
pub mod video_get;
pub mod video_update;
pub mod video_upload;
pub mod video_watch;
