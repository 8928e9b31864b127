//! Object storage seam for clothing images

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::Mutex;

/// Errors raised by a blob store
#[derive(Error, Debug)]
pub enum BlobError {
    #[error("Blob upload failed: {0}")]
    Upload(String),

    #[error("Blob delete failed: {0}")]
    Delete(String),

    #[error("Unrecognised blob reference: {0}")]
    UnknownReference(String),
}

/// Durable storage for binary objects, addressed by key on write and by the
/// returned URI afterwards
#[async_trait]
pub trait BlobStore: Send + Sync {
    /// Store `body` under `key` and return a durable reference URI
    async fn put(&self, key: &str, body: Vec<u8>, content_type: &str) -> Result<String, BlobError>;

    /// Remove the object a URI returned by [`BlobStore::put`] points to
    async fn delete(&self, uri: &str) -> Result<(), BlobError>;
}

struct StoredObject {
    content_type: String,
    body: Vec<u8>,
}

/// Process-local blob store, used by tests and local development
#[derive(Clone, Default)]
pub struct MemoryBlobStore {
    objects: Arc<Mutex<HashMap<String, StoredObject>>>,
}

impl MemoryBlobStore {
    const SCHEME: &'static str = "memory://";

    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored objects
    pub async fn len(&self) -> usize {
        self.objects.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.objects.lock().await.is_empty()
    }

    /// Content type and size of the object behind `uri`, if present
    pub async fn describe(&self, uri: &str) -> Option<(String, usize)> {
        let key = uri.strip_prefix(Self::SCHEME)?;
        self.objects
            .lock()
            .await
            .get(key)
            .map(|object| (object.content_type.clone(), object.body.len()))
    }
}

#[async_trait]
impl BlobStore for MemoryBlobStore {
    async fn put(&self, key: &str, body: Vec<u8>, content_type: &str) -> Result<String, BlobError> {
        self.objects.lock().await.insert(
            key.to_string(),
            StoredObject {
                content_type: content_type.to_string(),
                body,
            },
        );
        Ok(format!("{}{}", Self::SCHEME, key))
    }

    async fn delete(&self, uri: &str) -> Result<(), BlobError> {
        let key = uri
            .strip_prefix(Self::SCHEME)
            .ok_or_else(|| BlobError::UnknownReference(uri.to_string()))?;
        self.objects.lock().await.remove(key);
        Ok(())
    }
}
