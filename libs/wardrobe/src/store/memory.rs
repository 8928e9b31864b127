//! MemoryWardrobeStore - in-process store for tests and local development.
//!
//! All state sits behind one async mutex, so each trait call (including the
//! collection upsert's read-decide-write) is atomic.

use async_trait::async_trait;
use chrono::Utc;
use common::error::DatabaseResult;
use std::collections::HashSet;
use std::sync::Arc;
use tokio::sync::Mutex;
use uuid::Uuid;

use super::WardrobeStore;
use crate::models::collection::{dedupe_ids, missing_ids};
use crate::models::{
    Category, ClothingItem, Collection, CollectionUpsert, NewClothingItem, UpsertStatus,
};

#[derive(Default)]
struct MemoryState {
    users: HashSet<Uuid>,
    /// Insertion order
    items: Vec<ClothingItem>,
    /// Insertion order
    collections: Vec<Collection>,
    writes: u64,
}

/// In-memory wardrobe store. Clone-friendly via Arc.
#[derive(Clone, Default)]
pub struct MemoryWardrobeStore {
    state: Arc<Mutex<MemoryState>>,
}

impl MemoryWardrobeStore {
    /// Create a new empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a user and return its id
    pub async fn add_user(&self) -> Uuid {
        let id = Uuid::new_v4();
        self.state.lock().await.users.insert(id);
        id
    }

    /// Remove a user record, leaving its items and collections in place
    pub async fn remove_user(&self, user_id: Uuid) {
        self.state.lock().await.users.remove(&user_id);
    }

    /// Number of mutations applied so far
    pub async fn write_count(&self) -> u64 {
        self.state.lock().await.writes
    }

    /// Snapshot of every stored collection, all owners included
    pub async fn all_collections(&self) -> Vec<Collection> {
        self.state.lock().await.collections.clone()
    }
}

#[async_trait]
impl WardrobeStore for MemoryWardrobeStore {
    async fn health_check(&self) -> DatabaseResult<bool> {
        Ok(true)
    }

    async fn user_exists(&self, user_id: Uuid) -> DatabaseResult<bool> {
        Ok(self.state.lock().await.users.contains(&user_id))
    }

    async fn insert_item(&self, item: &NewClothingItem) -> DatabaseResult<ClothingItem> {
        let mut state = self.state.lock().await;
        let now = Utc::now();
        let stored = ClothingItem {
            id: item.id,
            owner_id: item.owner_id,
            clothing_name: item.clothing_name.clone(),
            category: item.category,
            image: item.image.clone(),
            created_at: now,
            updated_at: now,
        };
        state.items.push(stored.clone());
        state.writes += 1;
        Ok(stored)
    }

    async fn find_item(&self, item_id: Uuid) -> DatabaseResult<Option<ClothingItem>> {
        let state = self.state.lock().await;
        Ok(state.items.iter().find(|item| item.id == item_id).cloned())
    }

    async fn list_items(
        &self,
        owner_id: Uuid,
        category: Option<Category>,
    ) -> DatabaseResult<Vec<ClothingItem>> {
        let state = self.state.lock().await;
        Ok(state
            .items
            .iter()
            .rev()
            .filter(|item| item.owner_id == owner_id)
            .filter(|item| category.is_none_or(|c| item.category == c))
            .cloned()
            .collect())
    }

    async fn find_owned_items(
        &self,
        owner_id: Uuid,
        item_ids: &[Uuid],
    ) -> DatabaseResult<Vec<ClothingItem>> {
        let wanted: HashSet<&Uuid> = item_ids.iter().collect();
        let state = self.state.lock().await;
        Ok(state
            .items
            .iter()
            .filter(|item| item.owner_id == owner_id && wanted.contains(&item.id))
            .cloned()
            .collect())
    }

    async fn delete_item(&self, owner_id: Uuid, item_id: Uuid) -> DatabaseResult<bool> {
        let mut state = self.state.lock().await;
        let before = state.items.len();
        state
            .items
            .retain(|item| !(item.id == item_id && item.owner_id == owner_id));
        let deleted = state.items.len() < before;
        if deleted {
            state.writes += 1;
        }
        Ok(deleted)
    }

    async fn upsert_collection(
        &self,
        owner_id: Uuid,
        collection_name: &str,
        item_ids: &[Uuid],
    ) -> DatabaseResult<CollectionUpsert> {
        let mut state = self.state.lock().await;
        let now = Utc::now();

        let existing = state
            .collections
            .iter_mut()
            .find(|c| c.owner_id == owner_id && c.collection_name == collection_name);

        let (status, collection) = match existing {
            None => {
                let collection = Collection {
                    id: Uuid::new_v4(),
                    owner_id,
                    collection_name: collection_name.to_string(),
                    item_ids: dedupe_ids(item_ids),
                    created_at: now,
                    updated_at: now,
                };
                state.collections.push(collection.clone());
                (UpsertStatus::Created, collection)
            }
            Some(collection) => {
                let added = missing_ids(&collection.item_ids, item_ids);
                if added.is_empty() {
                    return Ok(CollectionUpsert {
                        status: UpsertStatus::NoOp,
                        collection: collection.clone(),
                    });
                }
                collection.item_ids.extend(added);
                collection.updated_at = now;
                (UpsertStatus::Merged, collection.clone())
            }
        };

        state.writes += 1;
        Ok(CollectionUpsert { status, collection })
    }

    async fn list_collections(&self, owner_id: Uuid) -> DatabaseResult<Vec<Collection>> {
        let state = self.state.lock().await;
        Ok(state
            .collections
            .iter()
            .filter(|c| c.owner_id == owner_id)
            .cloned()
            .collect())
    }

    async fn delete_collection(
        &self,
        owner_id: Uuid,
        collection_id: Uuid,
    ) -> DatabaseResult<bool> {
        let mut state = self.state.lock().await;
        let before = state.collections.len();
        state
            .collections
            .retain(|c| !(c.id == collection_id && c.owner_id == owner_id));
        let deleted = state.collections.len() < before;
        if deleted {
            state.writes += 1;
        }
        Ok(deleted)
    }
}
