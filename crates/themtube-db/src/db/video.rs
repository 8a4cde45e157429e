use async_trait::async_trait;
use chrono::Utc;
use sqlx::{PgPool, Postgres, QueryBuilder};
use themtube_core::models::{NewVideo, Video, VideoFilter, VideoUpdate};
use themtube_core::AppError;
use uuid::Uuid;

use super::traits::VideoCatalog;

#[derive(Clone)]
pub struct VideoRepository {
    pool: PgPool,
}

impl VideoRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl VideoCatalog for VideoRepository {
    #[tracing::instrument(skip(self, new_video), fields(db.table = "videos", db.operation = "insert", user_id = %new_video.user_id))]
    async fn create_video(&self, new_video: NewVideo) -> Result<Video, AppError> {
        let now = Utc::now();
        let video = sqlx::query_as::<Postgres, Video>(
            r#"
            INSERT INTO videos (id, user_id, title, description, tags, available, duration_in_sec, date_created, date_modified)
            VALUES ($1, $2, $3, $4, $5, FALSE, 0, $6, $6)
            RETURNING *
            "#,
        )
        .bind(Uuid::now_v7())
        .bind(new_video.user_id)
        .bind(&new_video.title)
        .bind(&new_video.description)
        .bind(&new_video.tags)
        .bind(now)
        .fetch_one(&self.pool)
        .await?;

        Ok(video)
    }

    #[tracing::instrument(skip(self), fields(db.table = "videos", db.operation = "select", db.record_id = %id))]
    async fn get_video(&self, id: Uuid) -> Result<Option<Video>, AppError> {
        let video = sqlx::query_as::<Postgres, Video>("SELECT * FROM videos WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(video)
    }

    #[tracing::instrument(skip(self), fields(db.table = "videos", db.operation = "select"))]
    async fn list_videos(&self, filter: &VideoFilter) -> Result<Vec<Video>, AppError> {
        let mut query: QueryBuilder<Postgres> = QueryBuilder::new("SELECT * FROM videos WHERE TRUE");

        if filter.only_available {
            query.push(" AND available = TRUE");
        }
        if let Some(cursor) = filter.cursor {
            query.push(" AND id > ").push_bind(cursor);
        }
        query.push(" ORDER BY id ASC");
        if filter.limit > 0 {
            query.push(" LIMIT ").push_bind(filter.limit);
        }

        let videos = query
            .build_query_as::<Video>()
            .fetch_all(&self.pool)
            .await?;
        Ok(videos)
    }

    #[tracing::instrument(skip(self, update), fields(db.table = "videos", db.operation = "update", db.record_id = %id))]
    async fn update_video(
        &self,
        owner_id: Uuid,
        id: Uuid,
        update: &VideoUpdate,
    ) -> Result<Option<Video>, AppError> {
        let video = sqlx::query_as::<Postgres, Video>(
            r#"
            UPDATE videos
            SET title = COALESCE($3, title),
                description = COALESCE($4, description),
                tags = COALESCE($5, tags),
                date_modified = NOW()
            WHERE id = $1 AND user_id = $2
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(owner_id)
        .bind(&update.title)
        .bind(&update.description)
        .bind(&update.tags)
        .fetch_optional(&self.pool)
        .await?;
        Ok(video)
    }

    #[tracing::instrument(skip(self), fields(db.table = "videos", db.operation = "update", db.record_id = %id))]
    async fn set_duration(
        &self,
        owner_id: Uuid,
        id: Uuid,
        duration_in_sec: f64,
    ) -> Result<Option<Video>, AppError> {
        let video = sqlx::query_as::<Postgres, Video>(
            r#"
            UPDATE videos
            SET duration_in_sec = $3, date_modified = NOW()
            WHERE id = $1 AND user_id = $2
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(owner_id)
        .bind(duration_in_sec)
        .fetch_optional(&self.pool)
        .await?;
        Ok(video)
    }

    #[tracing::instrument(skip(self), fields(db.table = "videos", db.operation = "update", db.record_id = %id))]
    async fn mark_available(&self, id: Uuid) -> Result<bool, AppError> {
        let rows_affected = sqlx::query(
            "UPDATE videos SET available = TRUE, date_modified = NOW() WHERE id = $1",
        )
        .bind(id)
        .execute(&self.pool)
        .await?
        .rows_affected();
        Ok(rows_affected > 0)
    }

    #[tracing::instrument(skip(self), fields(db.table = "videos", db.operation = "delete", db.record_id = %id))]
    async fn delete_video(&self, owner_id: Uuid, id: Uuid) -> Result<bool, AppError> {
        let rows_affected = sqlx::query("DELETE FROM videos WHERE id = $1 AND user_id = $2")
            .bind(id)
            .bind(owner_id)
            .execute(&self.pool)
            .await?
            .rows_affected();
        Ok(rows_affected > 0)
    }

    #[tracing::instrument(skip(self), fields(db.table = "videos", db.operation = "delete", db.record_id = %id))]
    async fn delete_video_unchecked(&self, id: Uuid) -> Result<bool, AppError> {
        let rows_affected = sqlx::query("DELETE FROM videos WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?
            .rows_affected();
        Ok(rows_affected > 0)
    }

    #[tracing::instrument(skip(self), fields(db.table = "videos", db.operation = "ping"))]
    async fn ping(&self) -> Result<(), AppError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}
