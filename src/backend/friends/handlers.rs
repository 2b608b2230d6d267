/**
 * Friend HTTP Handlers
 *
 * # Routes
 *
 * - `POST /api/friends/request` - send a friend request by email
 * - `GET /api/friends/requests` - pending requests addressed to me
 * - `POST /api/friends/respond` - accept or reject
 * - `GET /api/friends` - my friends
 */

use axum::{extract::State, http::StatusCode, response::Json};

use crate::backend::error::BackendError;
use crate::backend::middleware::AuthUser;
use crate::backend::server::state::AppState;
use crate::shared::friends::{
    ListFriendRequestsResponse, ListFriendsResponse, RespondFriendRequestRequest,
    SendFriendRequestRequest, SendFriendRequestResponse,
};

/// Send a friend request
///
/// # Errors
///
/// * `404 Not Found` - no user with that email
/// * `400 Bad Request` - request to yourself
/// * `409 Conflict` - already friends, or a request is pending
pub async fn send_friend_request(
    State(state): State<AppState>,
    AuthUser(auth): AuthUser,
    Json(request): Json<SendFriendRequestRequest>,
) -> Result<(StatusCode, Json<SendFriendRequestResponse>), BackendError> {
    let created = state.friends.send_request(auth.user_id, &request.to_email).await?;
    Ok((
        StatusCode::CREATED,
        Json(SendFriendRequestResponse {
            request_id: created.id,
        }),
    ))
}

pub async fn get_friend_requests(
    State(state): State<AppState>,
    AuthUser(auth): AuthUser,
) -> Result<Json<ListFriendRequestsResponse>, BackendError> {
    let requests = state.friends.pending_requests(auth.user_id).await?;
    Ok(Json(ListFriendRequestsResponse { requests }))
}

pub async fn respond_to_friend_request(
    State(state): State<AppState>,
    AuthUser(auth): AuthUser,
    Json(request): Json<RespondFriendRequestRequest>,
) -> Result<StatusCode, BackendError> {
    state
        .friends
        .respond(request.request_id, auth.user_id, request.accept)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn list_friends(
    State(state): State<AppState>,
    AuthUser(auth): AuthUser,
) -> Result<Json<ListFriendsResponse>, BackendError> {
    let friends = state.friends.list_friends(auth.user_id).await?;
    Ok(Json(ListFriendsResponse { friends }))
}
