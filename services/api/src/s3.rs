//! S3-backed image storage

use async_trait::async_trait;
use aws_sdk_s3::{Client, error::DisplayErrorContext, primitives::ByteStream};
use tracing::debug;
use wardrobe::{BlobError, BlobStore};

/// Stores clothing images in one S3 bucket
#[derive(Clone)]
pub struct S3BlobStore {
    client: Client,
    bucket: String,
    public_base_url: Option<String>,
}

impl S3BlobStore {
    pub fn new(client: Client, bucket: String, public_base_url: Option<String>) -> Self {
        Self {
            client,
            bucket,
            public_base_url,
        }
    }
}

/// Reference handed back for an uploaded key
fn object_uri(bucket: &str, public_base_url: Option<&str>, key: &str) -> String {
    match public_base_url {
        Some(base) => format!("{}/{}", base.trim_end_matches('/'), key),
        None => format!("s3://{}/{}", bucket, key),
    }
}

/// Inverse of [`object_uri`]
fn object_key<'a>(bucket: &str, public_base_url: Option<&str>, uri: &'a str) -> Option<&'a str> {
    if let Some(base) = public_base_url {
        if let Some(key) = uri.strip_prefix(base.trim_end_matches('/')) {
            return key.strip_prefix('/').filter(|k| !k.is_empty());
        }
    }

    uri.strip_prefix("s3://")
        .and_then(|rest| rest.strip_prefix(bucket))
        .and_then(|rest| rest.strip_prefix('/'))
        .filter(|k| !k.is_empty())
}

#[async_trait]
impl BlobStore for S3BlobStore {
    async fn put(&self, key: &str, body: Vec<u8>, content_type: &str) -> Result<String, BlobError> {
        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(key)
            .content_type(content_type)
            .body(ByteStream::from(body))
            .send()
            .await
            .map_err(|e| BlobError::Upload(DisplayErrorContext(&e).to_string()))?;

        debug!("Uploaded s3://{}/{}", self.bucket, key);
        Ok(object_uri(&self.bucket, self.public_base_url.as_deref(), key))
    }

    async fn delete(&self, uri: &str) -> Result<(), BlobError> {
        let key = object_key(&self.bucket, self.public_base_url.as_deref(), uri)
            .ok_or_else(|| BlobError::UnknownReference(uri.to_string()))?;

        self.client
            .delete_object()
            .bucket(&self.bucket)
            .key(key)
            .send()
            .await
            .map_err(|e| BlobError::Delete(DisplayErrorContext(&e).to_string()))?;

        debug!("Deleted s3://{}/{}", self.bucket, key);
        Ok(())
    }
}
