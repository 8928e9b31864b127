//! API service settings

use config::{Config, ConfigError, Environment};
use serde::Deserialize;

/// API service configuration
///
/// # Environment Variables
/// - `API_BIND_ADDRESS`: listen address (default: "0.0.0.0:3001")
/// - `API_IMAGE_BUCKET`: S3 bucket for clothing images (default: "wardrobe-images")
/// - `API_IMAGE_PUBLIC_BASE_URL`: public URL prefix for stored images; when
///   unset, images are referenced as `s3://bucket/key`
/// - `API_MAX_UPLOAD_BYTES`: request body limit for uploads (default: 10 MiB)
#[derive(Debug, Clone, Deserialize)]
pub struct ApiConfig {
    pub bind_address: String,
    pub image_bucket: String,
    pub image_public_base_url: Option<String>,
    pub max_upload_bytes: usize,
}

impl ApiConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Config::builder()
            .set_default("bind_address", "0.0.0.0:3001")?
            .set_default("image_bucket", "wardrobe-images")?
            .set_default("max_upload_bytes", 10 * 1024 * 1024)?
            .add_source(Environment::with_prefix("API").try_parsing(true))
            .build()?
            .try_deserialize()
    }
}
