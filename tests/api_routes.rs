//! HTTP-level tests through the full router

mod support;

use axum::body::Bytes;
use axum::http::StatusCode;
use pretty_assertions::assert_eq;
use serde_json::{json, Value};
use support::{id_of, signup, test_app, test_server};

#[tokio::test]
async fn test_health_is_public() {
    let app = test_app();
    let server = test_server(&app);

    let response = server.get("/health").await;
    response.assert_status_ok();
    assert_eq!(response.json::<Value>()["status"], "ok");
}

#[tokio::test]
async fn test_protected_routes_require_token() {
    let app = test_app();
    let server = test_server(&app);

    server
        .get("/api/wishlists")
        .expect_failure()
        .await
        .assert_status(StatusCode::UNAUTHORIZED);
    server
        .get("/api/auth/me")
        .authorization_bearer("not-a-token")
        .expect_failure()
        .await
        .assert_status(StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_signup_login_me() {
    let app = test_app();
    let server = test_server(&app);
    let (token, user_id) = signup(&server, "alice").await;

    let me: Value = server.get("/api/auth/me").authorization_bearer(&token).await.json();
    assert_eq!(me["id"], user_id.to_string());
    assert_eq!(me["username"], "alice");

    server
        .post("/api/auth/login")
        .json(&json!({ "username": "alice@example.com", "password": "password123" }))
        .await
        .assert_status_ok();
    server
        .post("/api/auth/login")
        .json(&json!({ "username": "alice", "password": "wrong-password" }))
        .expect_failure()
        .await
        .assert_status(StatusCode::UNAUTHORIZED);
    server
        .post("/api/auth/signup")
        .json(&json!({
            "username": "alice",
            "email": "other@example.com",
            "password": "password123",
        }))
        .expect_failure()
        .await
        .assert_status(StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_share_accept_and_reserve_over_http() {
    let app = test_app();
    let server = test_server(&app);
    let (owner, _) = signup(&server, "owner").await;
    let (guest, guest_id) = signup(&server, "guest").await;

    let response = server
        .post("/api/wishlists")
        .authorization_bearer(&owner)
        .json(&json!({ "title": "Holidays" }))
        .await;
    response.assert_status(StatusCode::CREATED);
    let wishlist_id = id_of(&response.json());

    let item: Value = server
        .post(&format!("/api/wishlists/{}/items", wishlist_id))
        .authorization_bearer(&owner)
        .json(&json!({ "name": "Board game", "price_cents": 3999, "currency": "usd" }))
        .await
        .json();
    let item_id = id_of(&item);
    assert_eq!(item["currency"], "USD");

    server
        .get(&format!("/api/wishlists/{}", wishlist_id))
        .authorization_bearer(&guest)
        .expect_failure()
        .await
        .assert_status(StatusCode::FORBIDDEN);

    let entry: Value = server
        .post(&format!("/api/wishlists/{}/share", wishlist_id))
        .authorization_bearer(&owner)
        .json(&json!({ "email": "guest@example.com", "permission": "read" }))
        .await
        .json();
    assert_eq!(entry["status"], "pending");

    let invitations: Value = server
        .get("/api/wishlists/invitations")
        .authorization_bearer(&guest)
        .await
        .json();
    assert_eq!(invitations["invitations"].as_array().map(Vec::len), Some(1));

    server
        .post(&format!("/api/wishlists/{}/respond", wishlist_id))
        .authorization_bearer(&guest)
        .json(&json!({ "accept": true }))
        .await
        .assert_status(StatusCode::NO_CONTENT);

    let seen: Value = server
        .get(&format!("/api/wishlists/{}", wishlist_id))
        .authorization_bearer(&guest)
        .await
        .json();
    assert_eq!(seen["is_owner"], false);
    assert_eq!(seen["can_write"], false);
    assert_eq!(seen["shared_with"], json!([]));

    server
        .post(&format!("/api/items/{}/reservation", item_id))
        .authorization_bearer(&owner)
        .json(&json!({ "reserve": true }))
        .expect_failure()
        .await
        .assert_status(StatusCode::FORBIDDEN);

    let reserved: Value = server
        .post(&format!("/api/items/{}/reservation", item_id))
        .authorization_bearer(&guest)
        .json(&json!({ "reserve": true }))
        .await
        .json();
    assert_eq!(reserved["is_reserved"], true);
    assert_eq!(reserved["reserved_by"], guest_id.to_string());

    server
        .delete(&format!("/api/wishlists/{}/share/{}", wishlist_id, guest_id))
        .authorization_bearer(&owner)
        .await
        .assert_status(StatusCode::NO_CONTENT);
    server
        .get(&format!("/api/items/{}", item_id))
        .authorization_bearer(&guest)
        .expect_failure()
        .await
        .assert_status(StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_error_body_shape() {
    let app = test_app();
    let server = test_server(&app);
    let (token, _) = signup(&server, "alice").await;

    let response = server
        .get(&format!("/api/wishlists/{}", uuid::Uuid::new_v4()))
        .authorization_bearer(&token)
        .expect_failure()
        .await;
    response.assert_status(StatusCode::NOT_FOUND);
    let body: Value = response.json();
    assert_eq!(body["status"], 404);
    assert!(body["error"].as_str().is_some());
}

#[tokio::test]
async fn test_friends_and_stories_over_http() {
    let app = test_app();
    let server = test_server(&app);
    let (alice, alice_id) = signup(&server, "alice").await;
    let (bob, _) = signup(&server, "bob").await;

    let sent: Value = server
        .post("/api/friends/request")
        .authorization_bearer(&alice)
        .json(&json!({ "to_email": "bob@example.com" }))
        .await
        .json();
    let request_id = sent["request_id"].clone();

    server
        .post("/api/friends/respond")
        .authorization_bearer(&bob)
        .json(&json!({ "request_id": request_id, "accept": true }))
        .await
        .assert_status(StatusCode::NO_CONTENT);

    let friends: Value = server.get("/api/friends").authorization_bearer(&bob).await.json();
    assert_eq!(friends["friends"][0]["username"], "alice");

    let response = server
        .post("/api/stories/upload")
        .authorization_bearer(&alice)
        .content_type("image/png")
        .bytes(Bytes::from_static(b"\x89PNG\r\n"))
        .await;
    response.assert_status(StatusCode::CREATED);
    let story_id = id_of(&response.json());
    assert_eq!(app.uploader.len().await, 1);

    let tray: Value = server
        .get("/api/stories/friends")
        .authorization_bearer(&bob)
        .await
        .json();
    assert_eq!(tray["friends"][0]["has_unviewed"], true);

    server
        .post(&format!("/api/stories/{}/view", story_id))
        .authorization_bearer(&bob)
        .await
        .assert_status(StatusCode::NO_CONTENT);
    let viewed: Value = server
        .get(&format!("/api/stories/{}/viewed", story_id))
        .authorization_bearer(&bob)
        .await
        .json();
    assert_eq!(viewed["viewed"], true);

    let listed: Value = server
        .get(&format!("/api/users/{}/stories", alice_id))
        .authorization_bearer(&bob)
        .await
        .json();
    assert_eq!(listed["stories"].as_array().map(Vec::len), Some(1));

    server
        .get(&format!("/api/stories/{}/viewers", story_id))
        .authorization_bearer(&bob)
        .expect_failure()
        .await
        .assert_status(StatusCode::FORBIDDEN);

    server
        .post("/api/media")
        .authorization_bearer(&alice)
        .content_type("text/plain")
        .bytes(Bytes::from_static(b"hello"))
        .expect_failure()
        .await
        .assert_status(StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_item_image_upload_over_http() {
    let app = test_app();
    let server = test_server(&app);
    let (owner, owner_id) = signup(&server, "owner").await;

    let wishlist: Value = server
        .post("/api/wishlists")
        .authorization_bearer(&owner)
        .json(&json!({ "title": "  Kitchen  " }))
        .await
        .json();
    assert_eq!(wishlist["title"], "Kitchen");
    let item: Value = server
        .post(&format!("/api/wishlists/{}/items", id_of(&wishlist)))
        .authorization_bearer(&owner)
        .json(&json!({ "name": "Teapot" }))
        .await
        .json();

    let updated: Value = server
        .post(&format!("/api/items/{}/image", id_of(&item)))
        .authorization_bearer(&owner)
        .content_type("IMAGE/PNG")
        .bytes(Bytes::from_static(b"\x89PNG\r\n"))
        .await
        .json();
    let url = updated["image_url"].as_str().unwrap_or_default();
    assert!(url.starts_with(&format!("https://cdn.test/items/{}/", owner_id)));
    assert!(url.ends_with(".png"));

    server
        .post(&format!("/api/items/{}/image", id_of(&item)))
        .authorization_bearer(&owner)
        .content_type("text/plain")
        .bytes(Bytes::from_static(b"hello"))
        .expect_failure()
        .await
        .assert_status(StatusCode::BAD_REQUEST);
}
