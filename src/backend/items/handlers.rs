/**
 * Item HTTP Handlers
 *
 * # Routes
 *
 * - `POST|GET /api/wishlists/{id}/items` - create / list items
 * - `GET|PATCH|DELETE /api/items/{id}`
 * - `POST /api/items/{id}/reservation` - `{"reserve": bool}`
 * - `POST /api/items/{id}/image` - raw image body, an image `Content-Type`
 */

use axum::{
    body::Bytes,
    extract::{Path, State},
    http::{header, HeaderMap, StatusCode},
    response::Json,
};
use uuid::Uuid;

use crate::backend::error::BackendError;
use crate::backend::middleware::AuthUser;
use crate::backend::server::state::AppState;
use crate::shared::wishlist::{
    CreateItemRequest, ListItemsResponse, ReservationRequest, UpdateItemRequest, WishItem,
};

/// Content type of a raw upload body; missing headers read as empty
pub fn content_type_of(headers: &HeaderMap) -> &str {
    headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
}

pub async fn create_item(
    State(state): State<AppState>,
    AuthUser(auth): AuthUser,
    Path(wishlist_id): Path<Uuid>,
    Json(request): Json<CreateItemRequest>,
) -> Result<(StatusCode, Json<WishItem>), BackendError> {
    let item = state.items.create(wishlist_id, auth.user_id, request).await?;
    Ok((StatusCode::CREATED, Json(item)))
}

pub async fn list_items(
    State(state): State<AppState>,
    AuthUser(auth): AuthUser,
    Path(wishlist_id): Path<Uuid>,
) -> Result<Json<ListItemsResponse>, BackendError> {
    let items = state.items.list(wishlist_id, auth.user_id).await?;
    Ok(Json(ListItemsResponse { items }))
}

pub async fn get_item(
    State(state): State<AppState>,
    AuthUser(auth): AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<WishItem>, BackendError> {
    Ok(Json(state.items.get(id, auth.user_id).await?))
}

pub async fn update_item(
    State(state): State<AppState>,
    AuthUser(auth): AuthUser,
    Path(id): Path<Uuid>,
    Json(patch): Json<UpdateItemRequest>,
) -> Result<Json<WishItem>, BackendError> {
    Ok(Json(state.items.update(id, auth.user_id, patch).await?))
}

pub async fn delete_item(
    State(state): State<AppState>,
    AuthUser(auth): AuthUser,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, BackendError> {
    state.items.delete(id, auth.user_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Reserve or release an item
///
/// # Errors
///
/// * `403 Forbidden` - creator reserving, or non-holder releasing
/// * `409 Conflict` - already reserved
pub async fn set_reservation(
    State(state): State<AppState>,
    AuthUser(auth): AuthUser,
    Path(id): Path<Uuid>,
    Json(request): Json<ReservationRequest>,
) -> Result<Json<WishItem>, BackendError> {
    let item = state
        .items
        .set_reservation(id, auth.user_id, request.reserve)
        .await?;
    Ok(Json(item))
}

pub async fn upload_item_image(
    State(state): State<AppState>,
    AuthUser(auth): AuthUser,
    Path(id): Path<Uuid>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<WishItem>, BackendError> {
    let item = state
        .items
        .upload_image(id, auth.user_id, body, content_type_of(&headers))
        .await?;
    Ok(Json(item))
}
