use std::sync::Arc;

use anyhow::Result;
use aws_config::BehaviorVersion;
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::EnvFilter;

mod config;
mod error;
mod middleware;
mod models;
mod routes;
mod s3;
mod state;

#[cfg(test)]
mod tests;

use common::{
    auth::RevocationList,
    cache::{RedisConfig, RedisPool},
    database::{DatabaseConfig, health_check, init_pool, run_migrations},
};
use wardrobe::{BlobStore, PgWardrobeStore, WardrobeStore};

use crate::{config::ApiConfig, middleware::JwtVerifier, s3::S3BlobStore, state::AppState};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    info!("Starting API service");

    let config = ApiConfig::from_env()?;

    // Initialize database connection pool
    let db_config = DatabaseConfig::from_env()?;
    let pool = init_pool(&db_config).await?;

    // Check database connectivity
    if health_check(&pool).await? {
        info!("Database connection successful");
    } else {
        anyhow::bail!("Failed to connect to database");
    }

    run_migrations(&pool).await?;

    let jwt = JwtVerifier::from_env()?;

    let redis_config = RedisConfig::from_env()?;
    let redis = RedisPool::new(&redis_config).await?;

    let aws_config = aws_config::load_defaults(BehaviorVersion::latest()).await;
    let s3_client = aws_sdk_s3::Client::new(&aws_config);

    let store: Arc<dyn WardrobeStore> = Arc::new(PgWardrobeStore::new(pool));
    let blobs: Arc<dyn BlobStore> = Arc::new(S3BlobStore::new(
        s3_client,
        config.image_bucket.clone(),
        config.image_public_base_url.clone(),
    ));

    let app_state = AppState::new(
        store,
        blobs,
        jwt,
        Some(RevocationList::new(redis)),
        config.max_upload_bytes,
    );

    info!("API service initialized successfully");

    // Start the web server
    let app = routes::create_router(app_state);

    let listener = TcpListener::bind(&config.bind_address).await?;
    info!("API service listening on {}", config.bind_address);

    axum::serve(listener, app).await?;

    Ok(())
}
