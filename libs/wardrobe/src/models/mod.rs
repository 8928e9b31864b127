//! Wardrobe domain models

pub mod clothing;
pub mod collection;

// Re-export for convenience
pub use clothing::{Category, ClothingItem, ImageUpload, NewClothingItem, NewItemRequest};
pub use collection::{
    Collection, CollectionUpsert, CollectionView, CreateCollectionRequest, ItemIdsInput,
    UpsertStatus,
};
