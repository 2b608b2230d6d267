//! Shared fixtures for integration tests
//!
//! Everything runs against `MemoryStore`, `MemoryMediaUploader` and
//! `LogNotifier`, so no external services are needed.

#![allow(dead_code)]

use std::sync::Arc;

use axum_test::TestServer;
use serde_json::{json, Value};
use uuid::Uuid;
use wishhub::backend::auth::users::User;
use wishhub::backend::auth::AuthResponse;
use wishhub::backend::media::MemoryMediaUploader;
use wishhub::backend::notify::LogNotifier;
use wishhub::backend::routes::create_router;
use wishhub::backend::server::{AppConfig, AppState};
use wishhub::backend::store::{EntityStore, MemoryStore};
use wishhub::shared::friends::{FriendRequest, FriendRequestStatus};

/// Lowest cost bcrypt accepts; keeps signup fast in tests
pub const TEST_BCRYPT_COST: u32 = 4;

pub struct TestApp {
    pub state: AppState,
    pub store: Arc<MemoryStore>,
    pub uploader: Arc<MemoryMediaUploader>,
}

pub fn test_app() -> TestApp {
    let config = AppConfig::builder()
        .jwt_secret("integration-test-secret")
        .bcrypt_cost(TEST_BCRYPT_COST)
        .build()
        .expect("valid test config");
    let store = Arc::new(MemoryStore::new());
    let uploader = Arc::new(MemoryMediaUploader::new("https://cdn.test"));
    let state = AppState::new(config, store.clone(), uploader.clone(), Arc::new(LogNotifier));
    TestApp {
        state,
        store,
        uploader,
    }
}

/// Insert a user directly, bypassing signup
pub async fn create_user(store: &MemoryStore, username: &str) -> User {
    let user = User::new(
        username.to_string(),
        format!("{}@example.com", username),
        "not-a-real-hash".to_string(),
    );
    store.create_user(&user).await.expect("create user");
    user
}

/// Record an accepted friendship between two users
pub async fn befriend(store: &MemoryStore, a: &User, b: &User) {
    let request = FriendRequest::new(a.id, b.id, a.username.clone());
    store.create_friend_request(&request).await.expect("create request");
    store
        .set_friend_request_status(request.id, b.id, FriendRequestStatus::Accepted, chrono::Utc::now())
        .await
        .expect("accept request");
}

pub fn test_server(app: &TestApp) -> TestServer {
    TestServer::new(create_router(app.state.clone())).expect("test server")
}

/// Sign up through the API and return `(token, user_id)`
pub async fn signup(server: &TestServer, username: &str) -> (String, Uuid) {
    let response = server
        .post("/api/auth/signup")
        .json(&json!({
            "username": username,
            "email": format!("{}@example.com", username),
            "password": "password123",
        }))
        .await;
    response.assert_status_ok();
    let auth: AuthResponse = response.json();
    (auth.token, auth.user.id)
}

pub fn id_of(body: &Value) -> Uuid {
    body["id"]
        .as_str()
        .and_then(|s| Uuid::parse_str(s).ok())
        .expect("response has an id")
}
