use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use serde::{Deserialize, Serialize};
use themtube_core::models::{User, UserRole};
use themtube_core::AppError;
use uuid::Uuid;

use crate::error::HttpAppError;

/// JWT claims structure
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Claims {
    /// Email address of the subject
    pub sub: String,
    pub id: Uuid,
    pub role: UserRole,
    #[serde(rename = "type")]
    pub token_type: String,
    pub iat: i64,
    pub exp: i64,
}

/// Authenticated user, inserted into request extensions by `auth_middleware`.
#[derive(Debug, Clone)]
pub struct AuthUser(pub User);

impl AuthUser {
    pub fn id(&self) -> Uuid {
        self.0.id
    }

    /// 403 unless the user holds one of `roles`.
    pub fn require_any_role(&self, roles: &[UserRole]) -> Result<(), AppError> {
        if roles.contains(&self.0.role) {
            Ok(())
        } else {
            tracing::debug!(user_id = %self.0.id, role = %self.0.role, "Role check failed");
            Err(AppError::Forbidden("Unauthorized action".to_string()))
        }
    }
}

// Extension<AuthUser> cannot be combined with Multipart, so extract from parts directly.
impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
{
    type Rejection = HttpAppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AuthUser>()
            .cloned()
            .ok_or_else(|| HttpAppError(AppError::Unauthorized("Not authenticated".to_string())))
    }
}
