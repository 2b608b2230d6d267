/**
 * Friend Service
 *
 * 1. A user sends a request to another user, found by email
 * 2. The recipient accepts or rejects it
 * 3. Accepted requests make both users friends
 */

use std::sync::Arc;

use chrono::Utc;
use uuid::Uuid;

use crate::backend::auth::users::{normalize_email, User};
use crate::backend::error::BackendError;
use crate::backend::notify::{dispatch, Notifier, Recipient, TemplateKind};
use crate::backend::store::EntityStore;
use crate::shared::friends::{Friend, FriendRequest, FriendRequestStatus};

#[derive(Clone)]
pub struct FriendService {
    store: Arc<dyn EntityStore>,
    notifier: Arc<dyn Notifier>,
}

impl FriendService {
    pub fn new(store: Arc<dyn EntityStore>, notifier: Arc<dyn Notifier>) -> Self {
        Self { store, notifier }
    }

    async fn user(&self, id: Uuid) -> Result<User, BackendError> {
        self.store
            .get_user_by_id(id)
            .await?
            .ok_or_else(|| BackendError::not_found("User not found"))
    }

    /// Send a friend request to the user registered under `to_email`
    pub async fn send_request(&self, caller: Uuid, to_email: &str) -> Result<FriendRequest, BackendError> {
        let from = self.user(caller).await?;
        let to = self
            .store
            .get_user_by_email(&normalize_email(to_email))
            .await?
            .ok_or_else(|| BackendError::not_found("User not found"))?;

        if to.id == from.id {
            return Err(BackendError::invalid_input(
                "Cannot send a friend request to yourself",
            ));
        }
        if self.store.friend_ids(from.id).await?.contains(&to.id) {
            return Err(BackendError::conflict("Already friends"));
        }
        if self.store.pending_request_between(from.id, to.id).await? {
            return Err(BackendError::conflict("Friend request already pending"));
        }

        let request = FriendRequest::new(from.id, to.id, from.username.clone());
        self.store.create_friend_request(&request).await?;
        tracing::info!("Friend request {} from {} to {}", request.id, from.id, to.id);

        dispatch(
            self.notifier.clone(),
            Recipient {
                user_id: to.id,
                username: to.username,
                email: to.email,
            },
            TemplateKind::FriendRequestReceived,
            serde_json::json!({ "from": from.username }),
        );
        Ok(request)
    }

    /// Pending requests addressed to `user_id`
    pub async fn pending_requests(&self, user_id: Uuid) -> Result<Vec<FriendRequest>, BackendError> {
        Ok(self.store.pending_friend_requests_for(user_id).await?)
    }

    /// Accept or reject a request; only its recipient may respond
    pub async fn respond(&self, request_id: Uuid, caller: Uuid, accept: bool) -> Result<(), BackendError> {
        let request = self
            .store
            .get_friend_request(request_id)
            .await?
            .ok_or_else(|| BackendError::not_found("Friend request not found"))?;

        if request.to_user_id != caller {
            tracing::warn!("User {} tried to answer friend request {}", caller, request_id);
            return Err(BackendError::permission_denied(
                "Only the recipient can respond to a friend request",
            ));
        }

        let status = if accept {
            FriendRequestStatus::Accepted
        } else {
            FriendRequestStatus::Rejected
        };
        let changed = self
            .store
            .set_friend_request_status(request_id, caller, status, Utc::now())
            .await?;
        if !changed {
            return Err(BackendError::not_found("Friend request is no longer pending"));
        }
        tracing::info!("Friend request {} {}", request_id, status.as_str());

        if accept {
            let sender = self.user(request.from_user_id).await?;
            let recipient = self.user(caller).await?;
            dispatch(
                self.notifier.clone(),
                Recipient {
                    user_id: sender.id,
                    username: sender.username,
                    email: sender.email,
                },
                TemplateKind::FriendRequestAccepted,
                serde_json::json!({ "from": recipient.username }),
            );
        }
        Ok(())
    }

    /// Accepted friends of `user_id`, by username
    pub async fn list_friends(&self, user_id: Uuid) -> Result<Vec<Friend>, BackendError> {
        let mut friends = Vec::new();
        for friend_id in self.store.friend_ids(user_id).await? {
            if let Some(user) = self.store.get_user_by_id(friend_id).await? {
                friends.push(Friend {
                    user_id: user.id,
                    username: user.username,
                });
            }
        }
        friends.sort_by(|a, b| a.username.cmp(&b.username));
        Ok(friends)
    }
}
