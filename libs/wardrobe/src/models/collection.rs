//! Collection model and the reference-set rules it obeys

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use uuid::Uuid;

use super::clothing::ClothingItem;

/// Collection entity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Collection {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub collection_name: String,
    /// Reference set: no duplicates, insertion order preserved
    pub item_ids: Vec<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// `item_ids` as sent by clients: a single id or a list of ids
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum ItemIdsInput {
    One(String),
    Many(Vec<String>),
}

impl ItemIdsInput {
    /// Normalize into an ordered sequence
    pub fn into_vec(self) -> Vec<String> {
        match self {
            ItemIdsInput::One(id) => vec![id],
            ItemIdsInput::Many(ids) => ids,
        }
    }
}

/// Create-or-merge collection request
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CreateCollectionRequest {
    pub collection_name: Option<String>,
    #[serde(default, alias = "clothing_id")]
    pub item_ids: Option<ItemIdsInput>,
}

/// What a create-or-merge call did
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum UpsertStatus {
    /// A new collection was inserted
    Created,
    /// New references were appended to an existing collection
    Merged,
    /// Nothing new to add; no write happened
    NoOp,
}

impl UpsertStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            UpsertStatus::Created => "created",
            UpsertStatus::Merged => "merged",
            UpsertStatus::NoOp => "no-op",
        }
    }
}

/// Result of a create-or-merge call
#[derive(Debug, Clone, Serialize)]
pub struct CollectionUpsert {
    pub status: UpsertStatus,
    pub collection: Collection,
}

/// Collection with its references expanded. A slot is `None` when the
/// referenced item is gone or not visible to the owner.
#[derive(Debug, Clone, Serialize)]
pub struct CollectionView {
    pub id: Uuid,
    pub name: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub items: Vec<Option<ClothingItem>>,
}

/// Remove duplicates, keeping the first occurrence of each id
pub fn dedupe_ids(ids: &[Uuid]) -> Vec<Uuid> {
    let mut seen = HashSet::with_capacity(ids.len());
    ids.iter().copied().filter(|id| seen.insert(*id)).collect()
}

/// Ids from `incoming` not already in `existing`, in input order, without
/// duplicates
pub fn missing_ids(existing: &[Uuid], incoming: &[Uuid]) -> Vec<Uuid> {
    let mut seen: HashSet<Uuid> = existing.iter().copied().collect();
    incoming
        .iter()
        .copied()
        .filter(|id| seen.insert(*id))
        .collect()
}
