//! Error taxonomy for the wardrobe domain

use common::error::DatabaseError;
use thiserror::Error;
use uuid::Uuid;

use crate::blob::BlobError;

/// Errors returned by the collection and item managers
#[derive(Error, Debug)]
pub enum WardrobeError {
    /// Malformed or missing caller input; nothing was touched
    #[error("Validation error: {0}")]
    Validation(String),

    /// The authenticated caller no longer has a user record
    #[error("Owner not found: {0}")]
    OwnerNotFound(Uuid),

    /// The resource does not exist or belongs to someone else
    #[error("Not found")]
    NotFound,

    /// Underlying persistence failure
    #[error("Store error: {0}")]
    Store(#[from] DatabaseError),

    /// Object store failure while handling an image
    #[error("Blob store error: {0}")]
    Blob(#[from] BlobError),
}

/// Type alias for results of wardrobe operations
pub type WardrobeResult<T> = Result<T, WardrobeError>;
