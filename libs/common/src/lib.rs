//! Common library for the wardrobe services
//!
//! This crate provides shared functionality used by the auth and API
//! services: PostgreSQL connectivity and migrations, the Redis client, the
//! persistence error type, and the JWT claim types both services agree on.
//!
//! ```rust,no_run
//! use common::database::{DatabaseConfig, health_check, init_pool, run_migrations};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = DatabaseConfig::from_env()?;
//!     let pool = init_pool(&config).await?;
//!     run_migrations(&pool).await?;
//!     let is_healthy = health_check(&pool).await?;
//!     println!("Database health check: {}", is_healthy);
//!     Ok(())
//! }
//! ```

pub mod auth;
pub mod cache;
pub mod database;
pub mod error;
