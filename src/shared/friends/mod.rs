//! Friends Module
//!
//! Friend requests and the friend list. Two users are friends once a request
//! between them has been accepted.

pub mod friend_request;

pub use friend_request::{
    Friend, FriendRequest, FriendRequestStatus, ListFriendRequestsResponse, ListFriendsResponse,
    RespondFriendRequestRequest, SendFriendRequestRequest, SendFriendRequestResponse,
};
