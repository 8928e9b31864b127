//! Persistence seam for users, clothing items and collections

use async_trait::async_trait;
use common::error::DatabaseResult;
use uuid::Uuid;

use crate::models::{Category, ClothingItem, Collection, CollectionUpsert, NewClothingItem};

pub mod memory;
pub mod postgres;

pub use memory::MemoryWardrobeStore;
pub use postgres::PgWardrobeStore;

/// Storage backend the managers depend on.
///
/// Every item and collection method is scoped by owner except
/// [`WardrobeStore::find_item`], which resolves an item regardless of owner.
#[async_trait]
pub trait WardrobeStore: Send + Sync {
    /// Whether the backend is reachable.
    async fn health_check(&self) -> DatabaseResult<bool>;

    // ───────────────────────────────────── Users ──────────────────────────────────────────

    /// Whether a user record with this id exists.
    async fn user_exists(&self, user_id: Uuid) -> DatabaseResult<bool>;

    // ───────────────────────────────────── Items ──────────────────────────────────────────

    /// Insert a validated clothing item.
    async fn insert_item(&self, item: &NewClothingItem) -> DatabaseResult<ClothingItem>;

    /// Get an item by id.
    async fn find_item(&self, item_id: Uuid) -> DatabaseResult<Option<ClothingItem>>;

    /// List an owner's items, newest first.
    async fn list_items(
        &self,
        owner_id: Uuid,
        category: Option<Category>,
    ) -> DatabaseResult<Vec<ClothingItem>>;

    /// Fetch the subset of `item_ids` that exist and belong to the owner (any order).
    async fn find_owned_items(
        &self,
        owner_id: Uuid,
        item_ids: &[Uuid],
    ) -> DatabaseResult<Vec<ClothingItem>>;

    /// Delete an item if the owner matches. Returns whether a row was removed.
    async fn delete_item(&self, owner_id: Uuid, item_id: Uuid) -> DatabaseResult<bool>;

    // ───────────────────────────────────── Collections ────────────────────────────────────

    /// Atomically insert the (owner, name) collection or append the ids it
    /// does not already reference. `item_ids` must be free of duplicates.
    /// Performs no write when nothing would change.
    async fn upsert_collection(
        &self,
        owner_id: Uuid,
        collection_name: &str,
        item_ids: &[Uuid],
    ) -> DatabaseResult<CollectionUpsert>;

    /// List an owner's collections in creation order.
    async fn list_collections(&self, owner_id: Uuid) -> DatabaseResult<Vec<Collection>>;

    /// Delete a collection if the owner matches. Returns whether a row was removed.
    async fn delete_collection(&self, owner_id: Uuid, collection_id: Uuid)
    -> DatabaseResult<bool>;
}
