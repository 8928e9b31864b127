//! Application state shared across handlers

use std::sync::Arc;

use common::auth::RevocationList;
use wardrobe::{BlobStore, CollectionManager, ItemManager, WardrobeStore};

use crate::middleware::JwtVerifier;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn WardrobeStore>,
    pub collections: CollectionManager,
    pub items: ItemManager,
    pub jwt: JwtVerifier,
    /// Checked for revoked token ids when present
    pub revocations: Option<RevocationList>,
    pub max_upload_bytes: usize,
}

impl AppState {
    pub fn new(
        store: Arc<dyn WardrobeStore>,
        blobs: Arc<dyn BlobStore>,
        jwt: JwtVerifier,
        revocations: Option<RevocationList>,
        max_upload_bytes: usize,
    ) -> Self {
        Self {
            collections: CollectionManager::new(store.clone()),
            items: ItemManager::new(store.clone(), blobs),
            store,
            jwt,
            revocations,
            max_upload_bytes,
        }
    }
}
