use axum::{
    extract::{Request, State},
    http::header,
    middleware::Next,
    response::Response,
};
use std::sync::Arc;
use themtube_core::constants::BEARER_TOKEN_TYPE;
use themtube_core::models::UserStatus;
use themtube_core::AppError;

use crate::auth::models::AuthUser;
use crate::error::HttpAppError;
use crate::state::AppState;

fn bearer_token(request: &Request) -> Option<&str> {
    let value = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok())?;
    let (scheme, token) = value.split_once(' ')?;
    let token = token.trim();
    (scheme.eq_ignore_ascii_case("bearer") && !token.is_empty()).then_some(token)
}

/// Resolve the bearer token to an active user and attach it as [`AuthUser`].
pub async fn auth_middleware(
    State(state): State<Arc<AppState>>,
    mut request: Request,
    next: Next,
) -> Result<Response, HttpAppError> {
    let token = bearer_token(&request)
        .ok_or_else(|| AppError::Unauthorized("Not authenticated".to_string()))?;

    let claims = state.jwt.verify(token)?;

    if claims.token_type != BEARER_TOKEN_TYPE {
        return Err(AppError::BadRequest("Invalid token type".to_string()).into());
    }

    let user = state
        .users
        .get_user_by_email(&claims.sub)
        .await?
        .ok_or_else(|| AppError::Unauthorized("Could not validate credentials".to_string()))?;

    if !user.verified {
        return Err(AppError::Forbidden("User account not activated".to_string()).into());
    }
    if user.status == UserStatus::Disabled {
        return Err(AppError::Forbidden("User account disabled".to_string()).into());
    }

    tracing::debug!(user_id = %user.id, "Request authenticated");

    request.extensions_mut().insert(AuthUser(user));
    Ok(next.run(request).await)
}
