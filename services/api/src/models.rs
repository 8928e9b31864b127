//! API models for request and response payloads

use serde::{Deserialize, Serialize};
use wardrobe::models::{Collection, CollectionUpsert, UpsertStatus};

/// Response for `createCollection`
#[derive(Debug, Serialize)]
pub struct CollectionUpsertResponse {
    pub status: UpsertStatus,
    pub message: &'static str,
    pub collection: Collection,
}

impl From<CollectionUpsert> for CollectionUpsertResponse {
    fn from(upsert: CollectionUpsert) -> Self {
        let message = match upsert.status {
            UpsertStatus::Created => "Collection created",
            UpsertStatus::Merged => "Clothing items added to collection",
            UpsertStatus::NoOp => "Collection already contains these items",
        };

        Self {
            status: upsert.status,
            message,
            collection: upsert.collection,
        }
    }
}

/// Query string for `getClothing`
#[derive(Debug, Default, Deserialize)]
pub struct ClothingQuery {
    pub category: Option<String>,
}

/// Response for successful deletions
#[derive(Debug, Serialize)]
pub struct DeletedResponse {
    pub status: &'static str,
}

impl DeletedResponse {
    pub const DELETED: Self = Self { status: "deleted" };
}
