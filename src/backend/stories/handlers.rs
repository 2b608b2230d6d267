/**
 * Story HTTP Handlers
 *
 * # Routes
 *
 * - `POST|GET /api/stories` - create / list my active stories
 * - `POST /api/stories/upload` - raw image body, creates an image story
 * - `GET /api/stories/friends` - friends with active stories
 * - `GET /api/users/{id}/stories` - a user's active stories
 * - `DELETE /api/stories/{id}`
 * - `POST /api/stories/{id}/view`
 * - `GET /api/stories/{id}/viewed`
 * - `GET /api/stories/{id}/viewers` - owner only
 */

use axum::{
    body::Bytes,
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    response::Json,
};
use uuid::Uuid;

use crate::backend::error::BackendError;
use crate::backend::items::handlers::content_type_of;
use crate::backend::middleware::AuthUser;
use crate::backend::server::state::AppState;
use crate::shared::story::{
    CreateStoryRequest, FriendsStoriesResponse, HasViewedResponse, ListStoriesResponse,
    ListViewersResponse, Story,
};

pub async fn create_story(
    State(state): State<AppState>,
    AuthUser(auth): AuthUser,
    Json(request): Json<CreateStoryRequest>,
) -> Result<(StatusCode, Json<Story>), BackendError> {
    let story = state.stories.create_story(auth.user_id, request).await?;
    Ok((StatusCode::CREATED, Json(story)))
}

pub async fn upload_story(
    State(state): State<AppState>,
    AuthUser(auth): AuthUser,
    headers: HeaderMap,
    body: Bytes,
) -> Result<(StatusCode, Json<Story>), BackendError> {
    let story = state
        .stories
        .upload_story(auth.user_id, body, content_type_of(&headers))
        .await?;
    Ok((StatusCode::CREATED, Json(story)))
}

pub async fn list_my_stories(
    State(state): State<AppState>,
    AuthUser(auth): AuthUser,
) -> Result<Json<ListStoriesResponse>, BackendError> {
    let stories = state
        .stories
        .list_active_stories(auth.user_id, auth.user_id)
        .await?;
    Ok(Json(ListStoriesResponse { stories }))
}

/// # Errors
///
/// * `404 Not Found` - unknown user
/// * `403 Forbidden` - caller is neither the user nor a friend
pub async fn list_user_stories(
    State(state): State<AppState>,
    AuthUser(auth): AuthUser,
    Path(user_id): Path<Uuid>,
) -> Result<Json<ListStoriesResponse>, BackendError> {
    if state.store.get_user_by_id(user_id).await?.is_none() {
        return Err(BackendError::not_found("User not found"));
    }
    let stories = state.stories.list_active_stories(user_id, auth.user_id).await?;
    Ok(Json(ListStoriesResponse { stories }))
}

pub async fn friends_stories(
    State(state): State<AppState>,
    AuthUser(auth): AuthUser,
) -> Result<Json<FriendsStoriesResponse>, BackendError> {
    let friends = state.stories.friends_with_active_stories(auth.user_id).await?;
    Ok(Json(FriendsStoriesResponse { friends }))
}

pub async fn delete_story(
    State(state): State<AppState>,
    AuthUser(auth): AuthUser,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, BackendError> {
    state.stories.delete_story(id, auth.user_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn mark_viewed(
    State(state): State<AppState>,
    AuthUser(auth): AuthUser,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, BackendError> {
    state.stories.mark_viewed(id, auth.user_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn has_viewed(
    State(state): State<AppState>,
    AuthUser(auth): AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<HasViewedResponse>, BackendError> {
    let viewed = state.stories.has_viewed(id, auth.user_id).await?;
    Ok(Json(HasViewedResponse { viewed }))
}

pub async fn list_viewers(
    State(state): State<AppState>,
    AuthUser(auth): AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<ListViewersResponse>, BackendError> {
    let viewers = state.stories.list_viewers(id, auth.user_id).await?;
    Ok(Json(ListViewersResponse { viewers }))
}
