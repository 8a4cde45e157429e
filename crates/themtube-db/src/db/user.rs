use async_trait::async_trait;
use chrono::Utc;
use sqlx::{PgPool, Postgres};
use themtube_core::models::{NewUser, User};
use themtube_core::AppError;
use uuid::Uuid;

use super::map_unique_violation;
use super::traits::UserStore;

#[derive(Clone)]
pub struct UserRepository {
    pool: PgPool,
}

impl UserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserStore for UserRepository {
    #[tracing::instrument(skip(self, new_user), fields(db.table = "users", db.operation = "insert"))]
    async fn create_user(&self, new_user: NewUser) -> Result<User, AppError> {
        let now = Utc::now();
        let user = sqlx::query_as::<Postgres, User>(
            r#"
            INSERT INTO users (id, username, email, password_hash, role, sign_in_type, verified, status, date_created, date_modified)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $9)
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(&new_user.username)
        .bind(&new_user.email)
        .bind(&new_user.password_hash)
        .bind(new_user.role)
        .bind(new_user.sign_in_type)
        .bind(new_user.verified)
        .bind(new_user.status)
        .bind(now)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| map_unique_violation(e, "Email already taken"))?;

        tracing::info!(user_id = %user.id, "User created");
        Ok(user)
    }

    #[tracing::instrument(skip(self), fields(db.table = "users", db.operation = "select", db.record_id = %id))]
    async fn get_user(&self, id: Uuid) -> Result<Option<User>, AppError> {
        let user = sqlx::query_as::<Postgres, User>("SELECT * FROM users WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(user)
    }

    #[tracing::instrument(skip(self, email), fields(db.table = "users", db.operation = "select"))]
    async fn get_user_by_email(&self, email: &str) -> Result<Option<User>, AppError> {
        let user = sqlx::query_as::<Postgres, User>("SELECT * FROM users WHERE email = $1")
            .bind(email)
            .fetch_optional(&self.pool)
            .await?;
        Ok(user)
    }

    #[tracing::instrument(skip(self), fields(db.table = "users", db.operation = "select"))]
    async fn list_users(&self) -> Result<Vec<User>, AppError> {
        let users =
            sqlx::query_as::<Postgres, User>("SELECT * FROM users ORDER BY date_created ASC")
                .fetch_all(&self.pool)
                .await?;
        Ok(users)
    }
}
