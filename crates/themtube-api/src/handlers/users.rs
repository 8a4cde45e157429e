use axum::{extract::State, Json};
use std::sync::Arc;
use themtube_core::constants::{BEARER_TOKEN_TYPE, MIN_PASSWORD_LENGTH};
use themtube_core::models::{
    LoginForm, NewUser, RegisterRequest, SignInType, TokenResponse, UserResponse, UserRole,
    UserStatus,
};
use themtube_core::AppError;

use crate::auth::password::{hash_password, verify_password};
use crate::auth::AuthUser;
use crate::error::{ErrorResponse, HttpAppError, ValidatedForm, ValidatedJson};
use crate::state::AppState;

const ADMIN_ROLES: [UserRole; 2] = [UserRole::Admin, UserRole::SuperAdmin];

/// Create a verified, enabled account with the `user` role.
#[utoipa::path(
    post,
    path = "/api/v1/register",
    tag = "users",
    request_body = RegisterRequest,
    responses(
        (status = 200, description = "User created", body = UserResponse),
        (status = 400, description = "Email taken or password too short", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip(state, request), fields(email = %request.email, operation = "register"))]
pub async fn register(
    State(state): State<Arc<AppState>>,
    ValidatedJson(request): ValidatedJson<RegisterRequest>,
) -> Result<Json<UserResponse>, HttpAppError> {
    if state.users.get_user_by_email(&request.email).await?.is_some() {
        return Err(AppError::BadRequest("Email already taken".to_string()).into());
    }

    if request.password.chars().count() < MIN_PASSWORD_LENGTH {
        return Err(AppError::BadRequest(format!(
            "Invalid password length. Password length must be at least {} characters",
            MIN_PASSWORD_LENGTH
        ))
        .into());
    }

    let password_hash = hash_password(&request.password)?;

    let user = state
        .users
        .create_user(NewUser {
            username: request.username,
            email: request.email,
            password_hash,
            role: UserRole::User,
            sign_in_type: SignInType::Normal,
            verified: true,
            status: UserStatus::Enabled,
        })
        .await?;

    tracing::info!(user_id = %user.id, "User registered");
    Ok(Json(UserResponse::from(user)))
}

/// OAuth2 password flow. The `username` form field carries the email address.
#[utoipa::path(
    post,
    path = "/api/v1/login",
    tag = "users",
    request_body(content = LoginForm, content_type = "application/x-www-form-urlencoded"),
    responses(
        (status = 200, description = "Token issued", body = TokenResponse),
        (status = 401, description = "Wrong password", body = ErrorResponse),
        (status = 403, description = "Account not verified", body = ErrorResponse),
        (status = 404, description = "User not found", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip(state, form), fields(email = %form.username, operation = "login"))]
pub async fn login(
    State(state): State<Arc<AppState>>,
    ValidatedForm(form): ValidatedForm<LoginForm>,
) -> Result<Json<TokenResponse>, HttpAppError> {
    let user = state
        .users
        .get_user_by_email(&form.username)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

    if !verify_password(&form.password, &user.password_hash)? {
        return Err(AppError::Unauthorized("Could not validate credentials".to_string()).into());
    }

    if !user.verified {
        return Err(AppError::Forbidden("User account not verified".to_string()).into());
    }

    let access_token = state.jwt.issue(&user)?;

    tracing::info!(user_id = %user.id, "User logged in");
    Ok(Json(TokenResponse {
        access_token,
        token_type: BEARER_TOKEN_TYPE.to_string(),
        username: user.username,
        email: user.email,
        user_id: user.id,
    }))
}

#[utoipa::path(
    get,
    path = "/api/v1/users/me",
    tag = "users",
    security(("bearer" = [])),
    responses(
        (status = 200, description = "Current user", body = UserResponse),
        (status = 401, description = "Not authenticated", body = ErrorResponse)
    )
)]
pub async fn me(AuthUser(user): AuthUser) -> Json<UserResponse> {
    Json(UserResponse::from(user))
}

#[utoipa::path(
    get,
    path = "/api/v1/users",
    tag = "users",
    security(("bearer" = [])),
    responses(
        (status = 200, description = "All users", body = [UserResponse]),
        (status = 403, description = "Caller is not an admin", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip(state, auth_user), fields(user_id = %auth_user.id(), operation = "list_users"))]
pub async fn list_users(
    State(state): State<Arc<AppState>>,
    auth_user: AuthUser,
) -> Result<Json<Vec<UserResponse>>, HttpAppError> {
    auth_user.require_any_role(&ADMIN_ROLES)?;

    let users = state.users.list_users().await?;
    Ok(Json(users.into_iter().map(UserResponse::from).collect()))
}
