/**
 * Application State Management
 *
 * `AppState` is the single state type behind the router. It holds the
 * immutable configuration, the adapters (store, media uploader, notifier)
 * and one cloneable handle per service. Every field is cheap to clone;
 * services share the same `Arc`ed adapters.
 *
 * # Example
 *
 * ```rust,no_run
 * use axum::extract::State;
 * use wishhub::backend::server::state::AppState;
 *
 * async fn handler(State(state): State<AppState>) {
 *     let _port = state.config.port;
 * }
 * ```
 */

use std::sync::Arc;

use crate::backend::auth::JwtKeys;
use crate::backend::friends::FriendService;
use crate::backend::items::ItemService;
use crate::backend::media::MediaUploader;
use crate::backend::notify::Notifier;
use crate::backend::server::config::AppConfig;
use crate::backend::stories::StoryService;
use crate::backend::store::EntityStore;
use crate::backend::wishlists::WishlistService;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub store: Arc<dyn EntityStore>,
    /// Token signing and verification keys
    pub jwt: JwtKeys,
    pub uploader: Arc<dyn MediaUploader>,
    pub notifier: Arc<dyn Notifier>,
    pub wishlists: WishlistService,
    pub items: ItemService,
    pub stories: StoryService,
    pub friends: FriendService,
}

impl AppState {
    /// Wire the services on top of the given adapters
    pub fn new(
        config: AppConfig,
        store: Arc<dyn EntityStore>,
        uploader: Arc<dyn MediaUploader>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        let jwt = JwtKeys::new(&config.jwt_secret, config.token_ttl_days);
        Self {
            jwt,
            wishlists: WishlistService::new(store.clone(), notifier.clone()),
            items: ItemService::new(store.clone(), uploader.clone()),
            stories: StoryService::new(store.clone(), uploader.clone()),
            friends: FriendService::new(store.clone(), notifier.clone()),
            config: Arc::new(config),
            store,
            uploader,
            notifier,
        }
    }
}
