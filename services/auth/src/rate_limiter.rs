//! Login attempt limiter, keyed by normalized email

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;
use tracing::warn;

/// Rate limiter configuration
#[derive(Debug, Clone)]
pub struct RateLimiterConfig {
    /// Attempts allowed per window
    pub max_attempts: u32,
    /// Time window in seconds
    pub window_seconds: u64,
    /// Lockout duration in seconds
    pub ban_duration_seconds: u64,
}

impl Default for RateLimiterConfig {
    fn default() -> Self {
        Self {
            max_attempts: 5,
            window_seconds: 300,
            ban_duration_seconds: 900,
        }
    }
}

#[derive(Debug)]
struct Attempts {
    count: u32,
    window_started: Instant,
    banned_until: Option<Instant>,
}

/// In-process limiter shared by all login requests
#[derive(Debug, Clone)]
pub struct RateLimiter {
    config: RateLimiterConfig,
    entries: Arc<Mutex<HashMap<String, Attempts>>>,
}

impl RateLimiter {
    pub fn new(config: RateLimiterConfig) -> Self {
        Self {
            config,
            entries: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    fn normalize(key: &str) -> String {
        key.trim().to_lowercase()
    }

    /// Record an attempt for `key` and report whether it may proceed
    pub async fn check(&self, key: &str) -> bool {
        let key = Self::normalize(key);
        let now = Instant::now();
        let window = Duration::from_secs(self.config.window_seconds);

        let mut entries = self.entries.lock().await;
        // Keys whose ban or window has run out start over.
        entries.retain(|_, attempts| match attempts.banned_until {
            Some(until) => now < until,
            None => now.duration_since(attempts.window_started) < window,
        });

        let entry = entries.entry(key.clone()).or_insert(Attempts {
            count: 0,
            window_started: now,
            banned_until: None,
        });

        if entry.banned_until.is_some() {
            return false;
        }

        if entry.count >= self.config.max_attempts {
            entry.banned_until =
                Some(now + Duration::from_secs(self.config.ban_duration_seconds));
            warn!(
                "Too many login attempts for {}, locked for {} seconds",
                key, self.config.ban_duration_seconds
            );
            return false;
        }

        entry.count += 1;
        true
    }

    /// Forget the attempts for `key` after a successful login
    pub async fn reset(&self, key: &str) {
        self.entries.lock().await.remove(&Self::normalize(key));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn limiter(max_attempts: u32, window_seconds: u64, ban_duration_seconds: u64) -> RateLimiter {
        RateLimiter::new(RateLimiterConfig {
            max_attempts,
            window_seconds,
            ban_duration_seconds,
        })
    }

    #[tokio::test]
    async fn test_blocks_after_max_attempts() {
        let limiter = limiter(3, 300, 900);

        for _ in 0..3 {
            assert!(limiter.check("ada@example.com").await);
        }
        assert!(!limiter.check("ada@example.com").await);
        assert!(!limiter.check("ADA@example.com ").await);
        assert!(limiter.check("grace@example.com").await);
    }

    #[tokio::test]
    async fn test_reset_clears_attempts() {
        let limiter = limiter(1, 300, 900);

        assert!(limiter.check("ada@example.com").await);
        limiter.reset("Ada@Example.com").await;
        assert!(limiter.check("ada@example.com").await);
    }

    #[tokio::test]
    async fn test_ban_expires() {
        let limiter = limiter(1, 300, 0);

        assert!(limiter.check("ada@example.com").await);
        assert!(!limiter.check("ada@example.com").await);
        assert!(limiter.check("ada@example.com").await);
    }

    #[tokio::test]
    async fn test_window_expiry_resets_count() {
        let limiter = limiter(1, 0, 900);

        assert!(limiter.check("ada@example.com").await);
        assert!(limiter.check("ada@example.com").await);
    }

    #[tokio::test]
    async fn test_expired_keys_are_evicted() {
        let limiter = limiter(5, 0, 0);

        for i in 0..1000 {
            assert!(limiter.check(&format!("user{i}@example.com")).await);
        }
        assert_eq!(limiter.entries.lock().await.len(), 1);
    }

    #[tokio::test]
    async fn test_live_keys_are_kept() {
        let limiter = limiter(5, 300, 900);

        for i in 0..10 {
            assert!(limiter.check(&format!("user{i}@example.com")).await);
        }
        assert_eq!(limiter.entries.lock().await.len(), 10);
    }
}
