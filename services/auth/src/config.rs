//! Authentication service settings

use config::{Config, ConfigError, Environment};
use serde::Deserialize;

use crate::rate_limiter::RateLimiterConfig;

/// Authentication service configuration
///
/// # Environment Variables
/// - `AUTH_BIND_ADDRESS`: listen address (default: "0.0.0.0:3000")
/// - `AUTH_GOOGLE_CLIENT_ID`: OAuth client id; Google sign-in is disabled without it
/// - `AUTH_GOOGLE_CLIENT_SECRET`: client secret for the code exchange
/// - `AUTH_GOOGLE_REDIRECT_URL`: default redirect URI for the code exchange
/// - `AUTH_LOGIN_MAX_ATTEMPTS`: login attempts per email and window (default: 5)
/// - `AUTH_LOGIN_WINDOW_SECONDS`: attempt window (default: 300)
/// - `AUTH_LOGIN_BAN_SECONDS`: lockout once the limit is hit (default: 900)
#[derive(Debug, Clone, Deserialize)]
pub struct AuthConfig {
    pub bind_address: String,
    pub google_client_id: Option<String>,
    pub google_client_secret: Option<String>,
    pub google_redirect_url: Option<String>,
    pub login_max_attempts: u32,
    pub login_window_seconds: u64,
    pub login_ban_seconds: u64,
}

impl AuthConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Config::builder()
            .set_default("bind_address", "0.0.0.0:3000")?
            .set_default("login_max_attempts", 5)?
            .set_default("login_window_seconds", 300)?
            .set_default("login_ban_seconds", 900)?
            .add_source(Environment::with_prefix("AUTH").try_parsing(true))
            .build()?
            .try_deserialize()
    }

    pub fn rate_limiter(&self) -> RateLimiterConfig {
        RateLimiterConfig {
            max_attempts: self.login_max_attempts,
            window_seconds: self.login_window_seconds,
            ban_duration_seconds: self.login_ban_seconds,
        }
    }
}
