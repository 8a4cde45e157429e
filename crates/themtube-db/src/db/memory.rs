//! In-memory store for testing
//!
//! Implements both store traits over `Arc<Mutex<..>>` maps so handlers and the
//! pipeline can be exercised without PostgreSQL.

use async_trait::async_trait;
use chrono::Utc;
use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, MutexGuard};
use themtube_core::models::{NewUser, NewVideo, User, Video, VideoFilter, VideoUpdate};
use themtube_core::AppError;
use uuid::Uuid;

use super::traits::{UserStore, VideoCatalog};

#[derive(Clone, Default)]
pub struct MemoryStore {
    users: Arc<Mutex<BTreeMap<Uuid, User>>>,
    // BTreeMap keeps videos in id order, matching `ORDER BY id`.
    videos: Arc<Mutex<BTreeMap<Uuid, Video>>>,
}

fn lock<T>(mutex: &Mutex<T>) -> Result<MutexGuard<'_, T>, AppError> {
    mutex
        .lock()
        .map_err(|_| AppError::Internal("memory store lock poisoned".to_string()))
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a user as-is (test setup).
    pub fn put_user(&self, user: User) {
        if let Ok(mut users) = self.users.lock() {
            users.insert(user.id, user);
        }
    }

    /// Insert or replace a video as-is (test setup).
    pub fn put_video(&self, video: Video) {
        if let Ok(mut videos) = self.videos.lock() {
            videos.insert(video.id, video);
        }
    }

    pub fn video_count(&self) -> usize {
        self.videos.lock().map(|v| v.len()).unwrap_or(0)
    }
}

#[async_trait]
impl UserStore for MemoryStore {
    async fn create_user(&self, new_user: NewUser) -> Result<User, AppError> {
        let mut users = lock(&self.users)?;
        if users.values().any(|u| u.email == new_user.email) {
            return Err(AppError::BadRequest("Email already taken".to_string()));
        }

        let now = Utc::now();
        let user = User {
            id: Uuid::new_v4(),
            username: new_user.username,
            email: new_user.email,
            password_hash: new_user.password_hash,
            role: new_user.role,
            sign_in_type: new_user.sign_in_type,
            verified: new_user.verified,
            status: new_user.status,
            date_created: now,
            date_modified: now,
        };
        users.insert(user.id, user.clone());
        Ok(user)
    }

    async fn get_user(&self, id: Uuid) -> Result<Option<User>, AppError> {
        Ok(lock(&self.users)?.get(&id).cloned())
    }

    async fn get_user_by_email(&self, email: &str) -> Result<Option<User>, AppError> {
        Ok(lock(&self.users)?
            .values()
            .find(|u| u.email == email)
            .cloned())
    }

    async fn list_users(&self) -> Result<Vec<User>, AppError> {
        let mut users: Vec<User> = lock(&self.users)?.values().cloned().collect();
        users.sort_by_key(|u| u.date_created);
        Ok(users)
    }
}

#[async_trait]
impl VideoCatalog for MemoryStore {
    async fn create_video(&self, new_video: NewVideo) -> Result<Video, AppError> {
        let now = Utc::now();
        let video = Video {
            id: Uuid::now_v7(),
            user_id: new_video.user_id,
            title: new_video.title,
            description: new_video.description,
            tags: new_video.tags,
            available: false,
            duration_in_sec: 0.0,
            date_created: now,
            date_modified: now,
        };
        lock(&self.videos)?.insert(video.id, video.clone());
        Ok(video)
    }

    async fn get_video(&self, id: Uuid) -> Result<Option<Video>, AppError> {
        Ok(lock(&self.videos)?.get(&id).cloned())
    }

    async fn list_videos(&self, filter: &VideoFilter) -> Result<Vec<Video>, AppError> {
        let videos = lock(&self.videos)?;
        let matching = videos.values().filter(|v| filter.matches(v)).cloned();
        Ok(if filter.limit > 0 {
            matching.take(filter.limit as usize).collect()
        } else {
            matching.collect()
        })
    }

    async fn update_video(
        &self,
        owner_id: Uuid,
        id: Uuid,
        update: &VideoUpdate,
    ) -> Result<Option<Video>, AppError> {
        let mut videos = lock(&self.videos)?;
        match videos.get_mut(&id) {
            Some(video) if video.user_id == owner_id => {
                update.apply_to(video, Utc::now());
                Ok(Some(video.clone()))
            }
            _ => Ok(None),
        }
    }

    async fn set_duration(
        &self,
        owner_id: Uuid,
        id: Uuid,
        duration_in_sec: f64,
    ) -> Result<Option<Video>, AppError> {
        let mut videos = lock(&self.videos)?;
        match videos.get_mut(&id) {
            Some(video) if video.user_id == owner_id => {
                video.duration_in_sec = duration_in_sec;
                video.date_modified = Utc::now();
                Ok(Some(video.clone()))
            }
            _ => Ok(None),
        }
    }

    async fn mark_available(&self, id: Uuid) -> Result<bool, AppError> {
        let mut videos = lock(&self.videos)?;
        match videos.get_mut(&id) {
            Some(video) => {
                video.available = true;
                video.date_modified = Utc::now();
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn delete_video(&self, owner_id: Uuid, id: Uuid) -> Result<bool, AppError> {
        let mut videos = lock(&self.videos)?;
        if videos.get(&id).is_some_and(|v| v.user_id == owner_id) {
            videos.remove(&id);
            return Ok(true);
        }
        Ok(false)
    }

    async fn delete_video_unchecked(&self, id: Uuid) -> Result<bool, AppError> {
        Ok(lock(&self.videos)?.remove(&id).is_some())
    }

    async fn ping(&self) -> Result<(), AppError> {
        Ok(())
    }
}
