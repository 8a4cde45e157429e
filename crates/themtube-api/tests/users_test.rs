//! Registration, login and bearer-auth integration tests.

mod helpers;

use axum::http::StatusCode;
use helpers::auth::{self, register, register_test_user, TEST_PASSWORD};
use helpers::{api_path, setup_test_app};
use themtube_core::models::{TokenResponse, UserResponse};

#[tokio::test]
async fn test_register_returns_user_without_password() {
    let app = setup_test_app().await;

    let response = register(app.client(), "alice@example.com", TEST_PASSWORD).await;
    response.assert_status_ok();

    let body: serde_json::Value = response.json();
    assert_eq!(body["email"], "alice@example.com");
    assert_eq!(body["username"], "alice");
    assert_eq!(body["role"], "user");
    assert_eq!(body["sign_in_type"], "NORMAL");
    assert_eq!(body["verified"], true);
    assert_eq!(body["status"], "enabled");
    assert!(body.get("password_hash").is_none());
    assert!(body.get("password").is_none());
}

#[tokio::test]
async fn test_register_duplicate_email() {
    let app = setup_test_app().await;
    register(app.client(), "dup@example.com", TEST_PASSWORD)
        .await
        .assert_status_ok();

    let response = register(app.client(), "dup@example.com", TEST_PASSWORD).await;
    response.assert_status(StatusCode::BAD_REQUEST);
    let body: serde_json::Value = response.json();
    assert_eq!(body["error"], "Email already taken");
}

#[tokio::test]
async fn test_register_short_password() {
    let app = setup_test_app().await;

    let response = register(app.client(), "short@example.com", "1234567").await;
    response.assert_status(StatusCode::BAD_REQUEST);
    let body: serde_json::Value = response.json();
    assert_eq!(
        body["error"],
        "Invalid password length. Password length must be at least 8 characters"
    );
}

#[tokio::test]
async fn test_login_issues_bearer_token() {
    let app = setup_test_app().await;
    register(app.client(), "bob@example.com", TEST_PASSWORD)
        .await
        .assert_status_ok();

    let response = auth::login(app.client(), "bob@example.com", TEST_PASSWORD).await;
    response.assert_status_ok();
    let token: TokenResponse = response.json();
    assert_eq!(token.token_type, "bearer");
    assert_eq!(token.email, "bob@example.com");
    assert_eq!(token.username, "bob");

    let claims = app.state.jwt.verify(&token.access_token).unwrap();
    assert_eq!(claims.sub, "bob@example.com");
    assert_eq!(claims.id, token.user_id);
}

#[tokio::test]
async fn test_login_unknown_user() {
    let app = setup_test_app().await;

    let response = auth::login(app.client(), "ghost@example.com", TEST_PASSWORD).await;
    response.assert_status(StatusCode::NOT_FOUND);
    let body: serde_json::Value = response.json();
    assert_eq!(body["error"], "User not found");
}

#[tokio::test]
async fn test_login_wrong_password() {
    let app = setup_test_app().await;
    register(app.client(), "carol@example.com", TEST_PASSWORD)
        .await
        .assert_status_ok();

    let response = auth::login(app.client(), "carol@example.com", "wrong-password").await;
    response.assert_status(StatusCode::UNAUTHORIZED);
    assert_eq!(response.header("www-authenticate"), "Bearer");
    let body: serde_json::Value = response.json();
    assert_eq!(body["error"], "Could not validate credentials");
}

#[tokio::test]
async fn test_login_unverified_user() {
    let app = setup_test_app().await;
    register(app.client(), "dave@example.com", TEST_PASSWORD)
        .await
        .assert_status_ok();
    auth::update_user(&app.store, "dave@example.com", |u| u.verified = false).await;

    let response = auth::login(app.client(), "dave@example.com", TEST_PASSWORD).await;
    response.assert_status(StatusCode::FORBIDDEN);
    let body: serde_json::Value = response.json();
    assert_eq!(body["error"], "User account not verified");
}

#[tokio::test]
async fn test_me_returns_current_user() {
    let app = setup_test_app().await;
    let user = register_test_user(app.client(), "erin@example.com").await;

    let response = app
        .client()
        .get(&api_path("/users/me"))
        .add_header("Authorization", user.bearer())
        .await;
    response.assert_status_ok();
    let me: UserResponse = response.json();
    assert_eq!(me.id, user.user_id);
    assert_eq!(me.email, user.email);
}

#[tokio::test]
async fn test_me_without_token() {
    let app = setup_test_app().await;

    let response = app.client().get(&api_path("/users/me")).await;
    response.assert_status(StatusCode::UNAUTHORIZED);
    assert_eq!(response.header("www-authenticate"), "Bearer");
    let body: serde_json::Value = response.json();
    assert_eq!(body["error"], "Not authenticated");
}

#[tokio::test]
async fn test_me_with_garbage_token() {
    let app = setup_test_app().await;

    let response = app
        .client()
        .get(&api_path("/users/me"))
        .add_header("Authorization", "Bearer not.a.token")
        .await;
    response.assert_status(StatusCode::UNAUTHORIZED);
    let body: serde_json::Value = response.json();
    assert_eq!(body["error"], "Could not validate credentials");
}

#[tokio::test]
async fn test_token_for_deleted_user_rejected() {
    let app = setup_test_app().await;
    let user = register_test_user(app.client(), "frank@example.com").await;
    auth::update_user(&app.store, "frank@example.com", |u| {
        u.email = "renamed@example.com".to_string()
    })
    .await;

    let response = app
        .client()
        .get(&api_path("/users/me"))
        .add_header("Authorization", user.bearer())
        .await;
    response.assert_status(StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_disabled_user_forbidden() {
    let app = setup_test_app().await;
    let user = register_test_user(app.client(), "gina@example.com").await;
    auth::disable(&app.store, "gina@example.com").await;

    let response = app
        .client()
        .get(&api_path("/users/me"))
        .add_header("Authorization", user.bearer())
        .await;
    response.assert_status(StatusCode::FORBIDDEN);
    let body: serde_json::Value = response.json();
    assert_eq!(body["error"], "User account disabled");
}

#[tokio::test]
async fn test_unactivated_user_forbidden() {
    let app = setup_test_app().await;
    let user = register_test_user(app.client(), "hank@example.com").await;
    auth::update_user(&app.store, "hank@example.com", |u| u.verified = false).await;

    let response = app
        .client()
        .get(&api_path("/users/me"))
        .add_header("Authorization", user.bearer())
        .await;
    response.assert_status(StatusCode::FORBIDDEN);
    let body: serde_json::Value = response.json();
    assert_eq!(body["error"], "User account not activated");
}

#[tokio::test]
async fn test_list_users_requires_admin() {
    let app = setup_test_app().await;
    let user = register_test_user(app.client(), "ivy@example.com").await;
    register_test_user(app.client(), "jack@example.com").await;

    let response = app
        .client()
        .get(&api_path("/users"))
        .add_header("Authorization", user.bearer())
        .await;
    response.assert_status(StatusCode::FORBIDDEN);
    let body: serde_json::Value = response.json();
    assert_eq!(body["error"], "Unauthorized action");

    auth::make_admin(&app.store, "ivy@example.com").await;
    let response = app
        .client()
        .get(&api_path("/users"))
        .add_header("Authorization", user.bearer())
        .await;
    response.assert_status_ok();
    let users: Vec<UserResponse> = response.json();
    assert_eq!(users.len(), 2);
}
