//! Clothing item manager: upload, listing and owner-scoped deletion

use std::sync::Arc;
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::blob::BlobStore;
use crate::error::{WardrobeError, WardrobeResult};
use crate::models::{ClothingItem, NewClothingItem, NewItemRequest};
use crate::store::WardrobeStore;
use crate::validation::{normalize_clothing_name, validate_category, validate_image};

/// Item manager
#[derive(Clone)]
pub struct ItemManager {
    store: Arc<dyn WardrobeStore>,
    blobs: Arc<dyn BlobStore>,
}

impl ItemManager {
    pub fn new(store: Arc<dyn WardrobeStore>, blobs: Arc<dyn BlobStore>) -> Self {
        Self { store, blobs }
    }

    /// Validate the upload, store the image, then persist the item. If the
    /// insert fails the uploaded object is removed again.
    pub async fn add(
        &self,
        caller_id: Uuid,
        request: NewItemRequest,
    ) -> WardrobeResult<ClothingItem> {
        let category =
            validate_category(request.category.as_deref()).map_err(WardrobeError::Validation)?;
        let extension =
            validate_image(request.image.as_ref()).map_err(WardrobeError::Validation)?;
        let clothing_name = normalize_clothing_name(request.clothing_name);

        if !self.store.user_exists(caller_id).await? {
            return Err(WardrobeError::OwnerNotFound(caller_id));
        }

        // validate_image guarantees presence and a content type
        let image = request.image.unwrap_or_default();
        let content_type = image.content_type.unwrap_or_default();

        let id = Uuid::new_v4();
        let key = format!("clothing/{}/{}.{}", caller_id, id, extension);
        let uri = self.blobs.put(&key, image.bytes, &content_type).await?;

        let new_item = NewClothingItem {
            id,
            owner_id: caller_id,
            clothing_name,
            category,
            image: uri.clone(),
        };

        match self.store.insert_item(&new_item).await {
            Ok(item) => {
                info!("Added clothing item {} for owner {}", item.id, caller_id);
                Ok(item)
            }
            Err(e) => {
                error!("Failed to insert clothing item {}: {}", id, e);
                if let Err(cleanup) = self.blobs.delete(&uri).await {
                    warn!("Failed to remove orphaned image {}: {}", uri, cleanup);
                }
                Err(e.into())
            }
        }
    }

    /// List the caller's items, newest first, optionally by category
    pub async fn list(
        &self,
        caller_id: Uuid,
        category: Option<&str>,
    ) -> WardrobeResult<Vec<ClothingItem>> {
        let category = category
            .map(|c| validate_category(Some(c)))
            .transpose()
            .map_err(WardrobeError::Validation)?;

        if !self.store.user_exists(caller_id).await? {
            return Err(WardrobeError::OwnerNotFound(caller_id));
        }

        Ok(self.store.list_items(caller_id, category).await?)
    }

    /// Delete one of the caller's items. A missing item and an item owned by
    /// someone else both report `NotFound`. Collections keep their
    /// references to the deleted item.
    pub async fn delete(&self, caller_id: Uuid, item_id: &str) -> WardrobeResult<()> {
        let item_id = Uuid::parse_str(item_id).map_err(|_| WardrobeError::NotFound)?;

        let item = self
            .store
            .find_item(item_id)
            .await?
            .ok_or(WardrobeError::NotFound)?;

        if !self.store.delete_item(caller_id, item_id).await? {
            return Err(WardrobeError::NotFound);
        }

        info!("Deleted clothing item {} of owner {}", item_id, caller_id);

        if let Err(e) = self.blobs.delete(&item.image).await {
            warn!("Failed to remove image {} of item {}: {}", item.image, item_id, e);
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use common::error::{DatabaseError, DatabaseResult};

    use crate::blob::MemoryBlobStore;
    use crate::models::{Category, Collection, CollectionUpsert, ImageUpload};
    use crate::store::MemoryWardrobeStore;

    /// Memory store whose item inserts always fail
    struct RejectingInserts(MemoryWardrobeStore);

    #[async_trait]
    impl WardrobeStore for RejectingInserts {
        async fn health_check(&self) -> DatabaseResult<bool> {
            self.0.health_check().await
        }

        async fn user_exists(&self, user_id: Uuid) -> DatabaseResult<bool> {
            self.0.user_exists(user_id).await
        }

        async fn insert_item(&self, _item: &NewClothingItem) -> DatabaseResult<ClothingItem> {
            Err(DatabaseError::Decode("insert rejected".into()))
        }

        async fn find_item(&self, item_id: Uuid) -> DatabaseResult<Option<ClothingItem>> {
            self.0.find_item(item_id).await
        }

        async fn list_items(
            &self,
            owner_id: Uuid,
            category: Option<Category>,
        ) -> DatabaseResult<Vec<ClothingItem>> {
            self.0.list_items(owner_id, category).await
        }

        async fn find_owned_items(
            &self,
            owner_id: Uuid,
            item_ids: &[Uuid],
        ) -> DatabaseResult<Vec<ClothingItem>> {
            self.0.find_owned_items(owner_id, item_ids).await
        }

        async fn delete_item(&self, owner_id: Uuid, item_id: Uuid) -> DatabaseResult<bool> {
            self.0.delete_item(owner_id, item_id).await
        }

        async fn upsert_collection(
            &self,
            owner_id: Uuid,
            collection_name: &str,
            item_ids: &[Uuid],
        ) -> DatabaseResult<CollectionUpsert> {
            self.0
                .upsert_collection(owner_id, collection_name, item_ids)
                .await
        }

        async fn list_collections(&self, owner_id: Uuid) -> DatabaseResult<Vec<Collection>> {
            self.0.list_collections(owner_id).await
        }

        async fn delete_collection(
            &self,
            owner_id: Uuid,
            collection_id: Uuid,
        ) -> DatabaseResult<bool> {
            self.0.delete_collection(owner_id, collection_id).await
        }
    }

    fn png() -> Option<ImageUpload> {
        Some(ImageUpload {
            file_name: Some("tee.png".into()),
            content_type: Some("image/png".into()),
            bytes: vec![0x89, 0x50, 0x4e, 0x47],
        })
    }

    #[tokio::test]
    async fn test_add_uploads_then_persists() {
        let store = MemoryWardrobeStore::new();
        let blobs = MemoryBlobStore::new();
        let owner = store.add_user().await;
        let manager = ItemManager::new(Arc::new(store.clone()), Arc::new(blobs.clone()));

        let item = manager
            .add(
                owner,
                NewItemRequest {
                    clothing_name: Some(" Tee ".into()),
                    category: Some("Top".into()),
                    image: png(),
                },
            )
            .await
            .unwrap();

        assert_eq!(item.owner_id, owner);
        assert_eq!(item.category, Category::Top);
        assert_eq!(item.clothing_name.as_deref(), Some("Tee"));
        assert_eq!(
            item.image,
            format!("memory://clothing/{}/{}.png", owner, item.id)
        );
        assert_eq!(blobs.describe(&item.image).await, Some(("image/png".into(), 4)));
    }

    #[tokio::test]
    async fn test_add_for_unknown_owner_uploads_nothing() {
        let store = MemoryWardrobeStore::new();
        let blobs = MemoryBlobStore::new();
        let manager = ItemManager::new(Arc::new(store), Arc::new(blobs.clone()));

        let result = manager
            .add(
                Uuid::new_v4(),
                NewItemRequest {
                    clothing_name: None,
                    category: Some("Shoes".into()),
                    image: png(),
                },
            )
            .await;

        assert!(matches!(result, Err(WardrobeError::OwnerNotFound(_))));
        assert!(blobs.is_empty().await);
    }

    #[tokio::test]
    async fn test_failed_insert_removes_uploaded_image() {
        let store = MemoryWardrobeStore::new();
        let blobs = MemoryBlobStore::new();
        let owner = store.add_user().await;
        let manager = ItemManager::new(
            Arc::new(RejectingInserts(store.clone())),
            Arc::new(blobs.clone()),
        );

        let result = manager
            .add(
                owner,
                NewItemRequest {
                    clothing_name: Some("Tee".into()),
                    category: Some("Top".into()),
                    image: png(),
                },
            )
            .await;

        assert!(matches!(result, Err(WardrobeError::Store(_))));
        assert!(blobs.is_empty().await);
        assert!(store.list_items(owner, None).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_list_rejects_unknown_category_filter() {
        let store = MemoryWardrobeStore::new();
        let owner = store.add_user().await;
        let manager = ItemManager::new(Arc::new(store), Arc::new(MemoryBlobStore::new()));

        let result = manager.list(owner, Some("Hats")).await;
        assert!(matches!(result, Err(WardrobeError::Validation(_))));
    }
}
