//! Wardrobe domain library
//!
//! Users own clothing items and named collections of item references. This
//! crate holds the models, the storage and blob-store seams with their
//! PostgreSQL and in-memory implementations, and the two managers the HTTP
//! layer calls into:
//!
//! - [`CollectionManager`]: create-or-merge by (owner, name), listing with
//!   item expansion, owner-scoped deletion
//! - [`ItemManager`]: image-validated item creation, listing, owner-scoped
//!   deletion
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use wardrobe::{CollectionManager, models::CreateCollectionRequest, store::MemoryWardrobeStore};
//!
//! # async fn demo() -> Result<(), wardrobe::WardrobeError> {
//! let store = MemoryWardrobeStore::new();
//! let owner = store.add_user().await;
//! let manager = CollectionManager::new(Arc::new(store));
//! let upsert = manager
//!     .create_or_merge(
//!         owner,
//!         CreateCollectionRequest {
//!             collection_name: Some("Summer".into()),
//!             item_ids: None,
//!         },
//!     )
//!     .await?;
//! println!("{}", upsert.status.as_str());
//! # Ok(())
//! # }
//! ```

pub mod blob;
pub mod collections;
pub mod error;
pub mod items;
pub mod models;
pub mod store;
pub mod validation;

pub use blob::{BlobError, BlobStore, MemoryBlobStore};
pub use collections::CollectionManager;
pub use error::{WardrobeError, WardrobeResult};
pub use items::ItemManager;
pub use store::{MemoryWardrobeStore, PgWardrobeStore, WardrobeStore};
