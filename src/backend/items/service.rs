/**
 * Item Service
 *
 * Item CRUD and image upload. Reads need can_read on the parent wishlist,
 * writes need can_write.
 */

use std::sync::Arc;

use bytes::Bytes;
use uuid::Uuid;

use crate::backend::error::BackendError;
use crate::backend::media::{destination_path, ensure_image_content_type, MediaUploader};
use crate::backend::store::EntityStore;
use crate::shared::access::{can_read, can_write};
use crate::shared::wishlist::{CreateItemRequest, UpdateItemRequest, WishItem, Wishlist};

#[derive(Clone)]
pub struct ItemService {
    pub(super) store: Arc<dyn EntityStore>,
    uploader: Arc<dyn MediaUploader>,
}

impl ItemService {
    pub fn new(store: Arc<dyn EntityStore>, uploader: Arc<dyn MediaUploader>) -> Self {
        Self { store, uploader }
    }

    pub(super) async fn load_wishlist(&self, id: Uuid) -> Result<Wishlist, BackendError> {
        self.store
            .get_wishlist(id)
            .await?
            .ok_or_else(|| BackendError::not_found("Wishlist not found"))
    }

    /// Load an item together with its parent wishlist
    pub(super) async fn load_with_parent(&self, id: Uuid) -> Result<(WishItem, Wishlist), BackendError> {
        let item = self
            .store
            .get_item(id)
            .await?
            .ok_or_else(|| BackendError::not_found("Item not found"))?;
        let wishlist = self.load_wishlist(item.wishlist_id).await?;
        Ok((item, wishlist))
    }

    pub(super) fn require_read(wishlist: &Wishlist, caller: Uuid) -> Result<(), BackendError> {
        if can_read(wishlist, caller) {
            Ok(())
        } else {
            tracing::warn!("User {} denied read on wishlist {}", caller, wishlist.id);
            Err(BackendError::permission_denied("You do not have access to this wishlist"))
        }
    }

    fn require_write(wishlist: &Wishlist, caller: Uuid) -> Result<(), BackendError> {
        if can_write(wishlist, caller) {
            Ok(())
        } else {
            tracing::warn!("User {} denied write on wishlist {}", caller, wishlist.id);
            Err(BackendError::permission_denied("You cannot modify this wishlist"))
        }
    }

    /// Add an item; the caller becomes its creator
    pub async fn create(
        &self,
        wishlist_id: Uuid,
        caller: Uuid,
        request: CreateItemRequest,
    ) -> Result<WishItem, BackendError> {
        request.validate()?;
        let wishlist = self.load_wishlist(wishlist_id).await?;
        Self::require_write(&wishlist, caller)?;

        let item = WishItem::new(wishlist_id, caller, request);
        self.store.insert_item(&item).await?;
        tracing::info!("Item {} added to wishlist {} by {}", item.id, wishlist_id, caller);
        Ok(item)
    }

    pub async fn get(&self, id: Uuid, caller: Uuid) -> Result<WishItem, BackendError> {
        let (item, wishlist) = self.load_with_parent(id).await?;
        Self::require_read(&wishlist, caller)?;
        Ok(item)
    }

    /// Items of a wishlist, oldest first
    pub async fn list(&self, wishlist_id: Uuid, caller: Uuid) -> Result<Vec<WishItem>, BackendError> {
        let wishlist = self.load_wishlist(wishlist_id).await?;
        Self::require_read(&wishlist, caller)?;
        Ok(self.store.items_for_wishlist(wishlist_id).await?)
    }

    pub async fn update(
        &self,
        id: Uuid,
        caller: Uuid,
        patch: UpdateItemRequest,
    ) -> Result<WishItem, BackendError> {
        patch.validate()?;
        let (mut item, wishlist) = self.load_with_parent(id).await?;
        Self::require_write(&wishlist, caller)?;

        patch.apply_to(&mut item);
        self.store.update_item(&item).await?;
        Ok(item)
    }

    pub async fn delete(&self, id: Uuid, caller: Uuid) -> Result<(), BackendError> {
        let (_, wishlist) = self.load_with_parent(id).await?;
        Self::require_write(&wishlist, caller)?;

        if !self.store.delete_item(id).await? {
            return Err(BackendError::not_found("Item not found"));
        }
        tracing::info!("Item {} deleted by {}", id, caller);
        Ok(())
    }

    /// Upload an image for an item and store its public URL on the item
    pub async fn upload_image(
        &self,
        id: Uuid,
        caller: Uuid,
        bytes: Bytes,
        content_type: &str,
    ) -> Result<WishItem, BackendError> {
        ensure_image_content_type(content_type)?;
        if bytes.is_empty() {
            return Err(BackendError::invalid_input("Image body is empty"));
        }
        let (mut item, wishlist) = self.load_with_parent(id).await?;
        Self::require_write(&wishlist, caller)?;

        let path = destination_path("items", wishlist.owner_id, content_type);
        let url = self.uploader.upload(bytes, content_type, &path).await?;

        item.image_url = Some(url);
        item.updated_at = chrono::Utc::now();
        self.store.update_item(&item).await?;
        tracing::info!("Image uploaded for item {}", id);
        Ok(item)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::media::MemoryMediaUploader;
    use crate::backend::store::MemoryStore;
    use assert_matches::assert_matches;

    fn request(name: &str) -> CreateItemRequest {
        CreateItemRequest {
            name: name.into(),
            price_cents: None,
            currency: None,
            image_url: None,
            is_favorite: None,
        }
    }

    async fn setup() -> (ItemService, Arc<MemoryMediaUploader>, Wishlist) {
        let store = Arc::new(MemoryStore::new());
        let uploader = Arc::new(MemoryMediaUploader::new("https://cdn.test"));
        let wishlist = Wishlist::new(Uuid::new_v4(), "Gifts".into(), String::new(), false);
        store.insert_wishlist(&wishlist).await.unwrap();
        (ItemService::new(store, uploader.clone()), uploader, wishlist)
    }

    #[tokio::test]
    async fn test_owner_crud() {
        let (service, _, wishlist) = setup().await;
        let owner = wishlist.owner_id;

        let item = service.create(wishlist.id, owner, request("Lamp")).await.unwrap();
        assert_eq!(item.creator_id, owner);

        let patch = UpdateItemRequest {
            name: Some("Desk lamp".into()),
            ..Default::default()
        };
        let updated = service.update(item.id, owner, patch).await.unwrap();
        assert_eq!(updated.name, "Desk lamp");
        assert_eq!(service.list(wishlist.id, owner).await.unwrap().len(), 1);

        service.delete(item.id, owner).await.unwrap();
        assert_matches!(service.get(item.id, owner).await, Err(BackendError::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_stranger_is_denied() {
        let (service, _, wishlist) = setup().await;
        let item = service
            .create(wishlist.id, wishlist.owner_id, request("Lamp"))
            .await
            .unwrap();
        let stranger = Uuid::new_v4();

        assert_matches!(
            service.create(wishlist.id, stranger, request("Mine")).await,
            Err(BackendError::PermissionDenied { .. })
        );
        assert_matches!(
            service.get(item.id, stranger).await,
            Err(BackendError::PermissionDenied { .. })
        );
    }

    #[tokio::test]
    async fn test_upload_image_sets_url() {
        let (service, uploader, wishlist) = setup().await;
        let item = service
            .create(wishlist.id, wishlist.owner_id, request("Lamp"))
            .await
            .unwrap();

        let updated = service
            .upload_image(item.id, wishlist.owner_id, Bytes::from_static(b"\x89PNG"), "image/png")
            .await
            .unwrap();
        let url = updated.image_url.unwrap();
        assert!(url.starts_with("https://cdn.test/items/"));
        assert_eq!(uploader.len().await, 1);
    }

    #[tokio::test]
    async fn test_upload_rejects_non_image() {
        let (service, uploader, wishlist) = setup().await;
        let item = service
            .create(wishlist.id, wishlist.owner_id, request("Lamp"))
            .await
            .unwrap();

        assert_matches!(
            service
                .upload_image(item.id, wishlist.owner_id, Bytes::from_static(b"%PDF"), "application/pdf")
                .await,
            Err(BackendError::InvalidInput { .. })
        );
        assert_eq!(uploader.len().await, 0);
    }
}
