use axum_test::TestServer;
use serde_json::json;
use themtube_core::models::{User, UserRole, UserStatus};
use themtube_db::{MemoryStore, UserStore};
use uuid::Uuid;

use super::api_path;

pub const TEST_PASSWORD: &str = "correct-horse-battery";

pub struct TestUser {
    pub email: String,
    pub user_id: Uuid,
    pub token: String,
}

impl TestUser {
    pub fn bearer(&self) -> String {
        format!("Bearer {}", self.token)
    }
}

pub async fn register(client: &TestServer, email: &str, password: &str) -> axum_test::TestResponse {
    client
        .post(&api_path("/register"))
        .json(&json!({
            "username": email.split('@').next().unwrap_or(email),
            "email": email,
            "password": password,
        }))
        .await
}

pub async fn login(client: &TestServer, email: &str, password: &str) -> axum_test::TestResponse {
    client
        .post(&api_path("/login"))
        .form(&[("username", email), ("password", password)])
        .await
}

/// Register and log in; panics on any failure.
pub async fn register_test_user(client: &TestServer, email: &str) -> TestUser {
    register(client, email, TEST_PASSWORD).await.assert_status_ok();

    let response = login(client, email, TEST_PASSWORD).await;
    response.assert_status_ok();
    let body: serde_json::Value = response.json();

    TestUser {
        email: email.to_string(),
        user_id: body["user_id"]
            .as_str()
            .and_then(|s| s.parse().ok())
            .expect("login response has user_id"),
        token: body["access_token"]
            .as_str()
            .expect("login response has access_token")
            .to_string(),
    }
}

/// Rewrite a stored user in place.
pub async fn update_user(store: &MemoryStore, email: &str, change: impl FnOnce(&mut User)) {
    let mut user = store
        .get_user_by_email(email)
        .await
        .expect("store read failed")
        .expect("user exists");
    change(&mut user);
    store.put_user(user);
}

pub async fn make_admin(store: &MemoryStore, email: &str) {
    update_user(store, email, |u| u.role = UserRole::Admin).await;
}

pub async fn disable(store: &MemoryStore, email: &str) {
    update_user(store, email, |u| u.status = UserStatus::Disabled).await;
}
