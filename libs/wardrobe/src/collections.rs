//! Collection manager: create-or-merge, list with item expansion, delete
//!
//! The caller id is trusted as handed over by the access gateway; the manager
//! only checks that the user record still exists.

use std::collections::HashMap;
use std::sync::Arc;
use tracing::info;
use uuid::Uuid;

use crate::error::{WardrobeError, WardrobeResult};
use crate::models::collection::dedupe_ids;
use crate::models::{CollectionUpsert, CollectionView, CreateCollectionRequest};
use crate::store::WardrobeStore;
use crate::validation::{parse_item_ids, validate_collection_name};

/// Collection manager
#[derive(Clone)]
pub struct CollectionManager {
    store: Arc<dyn WardrobeStore>,
}

impl CollectionManager {
    pub fn new(store: Arc<dyn WardrobeStore>) -> Self {
        Self { store }
    }

    /// Create the caller's collection with this name, or merge the given ids
    /// into it. Input is fully validated before the store is touched, and at
    /// most one write happens.
    pub async fn create_or_merge(
        &self,
        caller_id: Uuid,
        request: CreateCollectionRequest,
    ) -> WardrobeResult<CollectionUpsert> {
        let name = validate_collection_name(request.collection_name.as_deref())
            .map_err(WardrobeError::Validation)?;

        let raw_ids = request.item_ids.map(|ids| ids.into_vec()).unwrap_or_default();
        let item_ids = parse_item_ids(&raw_ids).map_err(WardrobeError::Validation)?;
        let item_ids = dedupe_ids(&item_ids);

        self.ensure_owner(caller_id).await?;

        let upsert = self
            .store
            .upsert_collection(caller_id, name, &item_ids)
            .await?;

        info!(
            "Collection '{}' ({}) of owner {}: {}",
            name,
            upsert.collection.id,
            caller_id,
            upsert.status.as_str()
        );

        Ok(upsert)
    }

    /// List the caller's collections with their references expanded.
    ///
    /// A reference whose item is missing, or is not owned by the caller,
    /// becomes `None` in its slot instead of failing the listing.
    pub async fn list(&self, caller_id: Uuid) -> WardrobeResult<Vec<CollectionView>> {
        self.ensure_owner(caller_id).await?;

        let collections = self.store.list_collections(caller_id).await?;

        let referenced: Vec<Uuid> = dedupe_ids(
            &collections
                .iter()
                .flat_map(|c| c.item_ids.iter().copied())
                .collect::<Vec<_>>(),
        );
        let items: HashMap<Uuid, _> = self
            .store
            .find_owned_items(caller_id, &referenced)
            .await?
            .into_iter()
            .map(|item| (item.id, item))
            .collect();

        Ok(collections
            .into_iter()
            .map(|collection| CollectionView {
                id: collection.id,
                items: collection
                    .item_ids
                    .iter()
                    .map(|id| items.get(id).cloned())
                    .collect(),
                name: collection.collection_name,
                created_at: collection.created_at,
                updated_at: collection.updated_at,
            })
            .collect())
    }

    /// Delete one of the caller's collections. Malformed ids, missing
    /// collections and other users' collections all report `NotFound`.
    pub async fn delete(&self, caller_id: Uuid, collection_id: &str) -> WardrobeResult<()> {
        let collection_id = Uuid::parse_str(collection_id).map_err(|_| WardrobeError::NotFound)?;

        if !self
            .store
            .delete_collection(caller_id, collection_id)
            .await?
        {
            return Err(WardrobeError::NotFound);
        }

        info!("Deleted collection {} of owner {}", collection_id, caller_id);
        Ok(())
    }

    async fn ensure_owner(&self, caller_id: Uuid) -> WardrobeResult<()> {
        if self.store.user_exists(caller_id).await? {
            Ok(())
        } else {
            Err(WardrobeError::OwnerNotFound(caller_id))
        }
    }
}
