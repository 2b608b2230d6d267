/**
 * API Route Configuration
 *
 * # Public
 * - `GET /health`
 * - `POST /api/auth/signup`
 * - `POST /api/auth/login`
 *
 * # Protected (bearer token)
 * Everything else: current user, friends, wishlists and sharing, items and
 * reservations, media upload, stories.
 */

use axum::{
    extract::DefaultBodyLimit,
    routing::{delete, get, post},
    Json, Router,
};
use serde_json::{json, Value};

use crate::backend::auth::{get_me, login, signup};
use crate::backend::friends::handlers as friends;
use crate::backend::items::handlers as items;
use crate::backend::media::handlers::upload_media;
use crate::backend::server::state::AppState;
use crate::backend::stories::handlers as stories;
use crate::backend::wishlists::handlers as wishlists;

/// Largest accepted upload body
pub const MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

/// Routes reachable without a token
pub fn configure_public_routes(router: Router<AppState>) -> Router<AppState> {
    router
        .route("/health", get(health))
        .route("/api/auth/signup", post(signup))
        .route("/api/auth/login", post(login))
}

/// Routes that require an authenticated user
///
/// The caller is responsible for layering `auth_middleware` over the result.
pub fn configure_protected_routes(router: Router<AppState>) -> Router<AppState> {
    let uploads = Router::new()
        .route("/api/items/{id}/image", post(items::upload_item_image))
        .route("/api/media", post(upload_media))
        .route("/api/stories/upload", post(stories::upload_story))
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES));

    router
        .route("/api/auth/me", get(get_me))
        // Friends
        .route("/api/friends", get(friends::list_friends))
        .route("/api/friends/request", post(friends::send_friend_request))
        .route("/api/friends/requests", get(friends::get_friend_requests))
        .route("/api/friends/respond", post(friends::respond_to_friend_request))
        // Wishlists and sharing
        .route(
            "/api/wishlists",
            post(wishlists::create_wishlist).get(wishlists::list_my_wishlists),
        )
        .route("/api/wishlists/shared", get(wishlists::list_shared_wishlists))
        .route("/api/wishlists/invitations", get(wishlists::list_invitations))
        .route(
            "/api/wishlists/{id}",
            get(wishlists::get_wishlist)
                .patch(wishlists::update_wishlist)
                .delete(wishlists::delete_wishlist),
        )
        .route("/api/wishlists/{id}/share", post(wishlists::share_wishlist))
        .route(
            "/api/wishlists/{id}/share/{user_id}",
            delete(wishlists::remove_sharing),
        )
        .route("/api/wishlists/{id}/respond", post(wishlists::respond_to_invitation))
        // Items
        .route(
            "/api/wishlists/{id}/items",
            post(items::create_item).get(items::list_items),
        )
        .route(
            "/api/items/{id}",
            get(items::get_item)
                .patch(items::update_item)
                .delete(items::delete_item),
        )
        .route("/api/items/{id}/reservation", post(items::set_reservation))
        // Stories
        .route(
            "/api/stories",
            post(stories::create_story).get(stories::list_my_stories),
        )
        .route("/api/stories/friends", get(stories::friends_stories))
        .route("/api/stories/{id}", delete(stories::delete_story))
        .route("/api/stories/{id}/view", post(stories::mark_viewed))
        .route("/api/stories/{id}/viewed", get(stories::has_viewed))
        .route("/api/stories/{id}/viewers", get(stories::list_viewers))
        .route("/api/users/{id}/stories", get(stories::list_user_stories))
        .merge(uploads)
}
