/**
 * Wishlist HTTP Handlers
 *
 * Thin adapters from axum extractors onto `WishlistService`. All routes here
 * sit behind the auth middleware.
 *
 * # Routes
 *
 * - `POST /api/wishlists` / `GET /api/wishlists` - create / list mine
 * - `GET /api/wishlists/shared` - wishlists shared with me (accepted)
 * - `GET /api/wishlists/invitations` - my pending invitations
 * - `GET|PATCH|DELETE /api/wishlists/{id}`
 * - `POST /api/wishlists/{id}/share`
 * - `POST /api/wishlists/{id}/respond`
 * - `DELETE /api/wishlists/{id}/share/{user_id}`
 */

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Json,
};
use uuid::Uuid;

use crate::backend::error::BackendError;
use crate::backend::middleware::AuthUser;
use crate::backend::server::state::AppState;
use crate::shared::wishlist::{
    CreateWishlistRequest, ListInvitationsResponse, ListWishlistsResponse,
    RespondInvitationRequest, ShareWishlistRequest, SharedWith, UpdateWishlistRequest,
    WishlistResponse,
};

pub async fn create_wishlist(
    State(state): State<AppState>,
    AuthUser(auth): AuthUser,
    Json(request): Json<CreateWishlistRequest>,
) -> Result<(StatusCode, Json<WishlistResponse>), BackendError> {
    let wishlist = state.wishlists.create(auth.user_id, request).await?;
    Ok((StatusCode::CREATED, Json(wishlist)))
}

pub async fn list_my_wishlists(
    State(state): State<AppState>,
    AuthUser(auth): AuthUser,
) -> Result<Json<ListWishlistsResponse>, BackendError> {
    let wishlists = state.wishlists.list_mine(auth.user_id).await?;
    Ok(Json(ListWishlistsResponse { wishlists }))
}

pub async fn list_shared_wishlists(
    State(state): State<AppState>,
    AuthUser(auth): AuthUser,
) -> Result<Json<ListWishlistsResponse>, BackendError> {
    let wishlists = state.wishlists.list_shared_with(auth.user_id).await?;
    Ok(Json(ListWishlistsResponse { wishlists }))
}

pub async fn list_invitations(
    State(state): State<AppState>,
    AuthUser(auth): AuthUser,
) -> Result<Json<ListInvitationsResponse>, BackendError> {
    let invitations = state.wishlists.pending_invitations(auth.user_id).await?;
    Ok(Json(ListInvitationsResponse { invitations }))
}

/// # Errors
///
/// * `404 Not Found` - no such wishlist
/// * `403 Forbidden` - caller cannot read it
pub async fn get_wishlist(
    State(state): State<AppState>,
    AuthUser(auth): AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<WishlistResponse>, BackendError> {
    Ok(Json(state.wishlists.get(id, auth.user_id).await?))
}

pub async fn update_wishlist(
    State(state): State<AppState>,
    AuthUser(auth): AuthUser,
    Path(id): Path<Uuid>,
    Json(patch): Json<UpdateWishlistRequest>,
) -> Result<Json<WishlistResponse>, BackendError> {
    Ok(Json(state.wishlists.update(id, auth.user_id, patch).await?))
}

pub async fn delete_wishlist(
    State(state): State<AppState>,
    AuthUser(auth): AuthUser,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, BackendError> {
    state.wishlists.delete(id, auth.user_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Share handler
///
/// # Errors
///
/// * `400 Bad Request` - no target given, or the target is the owner
/// * `403 Forbidden` - caller is not the owner
/// * `404 Not Found` - wishlist or target user missing
pub async fn share_wishlist(
    State(state): State<AppState>,
    AuthUser(auth): AuthUser,
    Path(id): Path<Uuid>,
    Json(request): Json<ShareWishlistRequest>,
) -> Result<Json<SharedWith>, BackendError> {
    Ok(Json(state.wishlists.share(id, auth.user_id, request).await?))
}

pub async fn respond_to_invitation(
    State(state): State<AppState>,
    AuthUser(auth): AuthUser,
    Path(id): Path<Uuid>,
    Json(request): Json<RespondInvitationRequest>,
) -> Result<StatusCode, BackendError> {
    state
        .wishlists
        .respond_to_invitation(id, auth.user_id, request.accept)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn remove_sharing(
    State(state): State<AppState>,
    AuthUser(auth): AuthUser,
    Path((id, user_id)): Path<(Uuid, Uuid)>,
) -> Result<StatusCode, BackendError> {
    state.wishlists.remove_sharing(id, auth.user_id, user_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
