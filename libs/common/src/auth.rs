//! Token types shared by the auth service (which issues tokens) and the API
//! service (which verifies them)

use anyhow::Result;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::cache::RedisPool;

/// JWT claims structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// User ID
    pub sub: Uuid,
    /// Username, when the account has one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    /// Unique token id, used for revocation
    pub jti: Uuid,
    /// Issued at time
    pub iat: u64,
    /// Expiration time
    pub exp: u64,
    /// Token type
    pub token_type: TokenType,
}

/// Token type enum
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
pub enum TokenType {
    /// Access token
    Access,
}

/// Read a PEM key from an environment variable.
///
/// The variable holds either the PEM text itself (escaped `\n` sequences are
/// accepted) or a path to a PEM file.
pub fn read_pem_from_env(var: &str) -> Result<String> {
    let value = std::env::var(var)
        .map_err(|_| anyhow::anyhow!("{} environment variable not set", var))?;

    if value.trim_start().starts_with("-----BEGIN") {
        return Ok(value.replace("\\n", "\n"));
    }

    let pem = std::fs::read_to_string(&value)
        .map_err(|e| anyhow::anyhow!("Failed to read key file {}: {}", value, e))?;
    Ok(pem.trim().to_string())
}

/// Redis key under which a revoked token id is stored
pub fn revoked_token_key(jti: &Uuid) -> String {
    format!("revoked_token:{}", jti)
}

/// Revoked token ids, kept in Redis until the token would have expired anyway
#[derive(Clone)]
pub struct RevocationList {
    redis: RedisPool,
}

impl RevocationList {
    pub fn new(redis: RedisPool) -> Self {
        Self { redis }
    }

    /// Revoke a token id for `ttl_seconds`. Already expired tokens are skipped.
    pub async fn revoke(&self, jti: &Uuid, ttl_seconds: u64) -> Result<()> {
        if ttl_seconds == 0 {
            return Ok(());
        }
        self.redis
            .set(&revoked_token_key(jti), "1", Some(ttl_seconds))
            .await
    }

    pub async fn is_revoked(&self, jti: &Uuid) -> Result<bool> {
        self.redis.exists(&revoked_token_key(jti)).await
    }
}
