use anyhow::Result;
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::EnvFilter;

mod config;
mod jwt;
mod models;
mod oauth;
mod rate_limiter;
mod repositories;
mod routes;
mod validation;


use common::{
    auth::RevocationList,
    cache::{RedisConfig, RedisPool},
    database::{DatabaseConfig, health_check, init_pool, run_migrations},
};

use crate::{
    config::AuthConfig,
    jwt::{JwtConfig, JwtService},
    oauth::GoogleAuthenticator,
    rate_limiter::RateLimiter,
    repositories::UserRepository,
};

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub user_repository: UserRepository,
    pub jwt_service: JwtService,
    pub revocations: RevocationList,
    pub rate_limiter: RateLimiter,
    pub google: GoogleAuthenticator,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    info!("Starting authentication service");

    let config = AuthConfig::from_env()?;

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

    // Initialize JWT service
    let jwt_service = JwtService::new(JwtConfig::from_env()?)?;

    // Initialize Redis connection pool
    let redis_config = RedisConfig::from_env()?;
    let redis_pool = RedisPool::new(&redis_config).await?;

    let google = GoogleAuthenticator::from_config(&config)?;
    if config.google_client_id.is_none() {
        info!("Google sign-in disabled: AUTH_GOOGLE_CLIENT_ID is not set");
    }

    let app_state = AppState {
        user_repository: UserRepository::new(pool),
        jwt_service,
        revocations: RevocationList::new(redis_pool),
        rate_limiter: RateLimiter::new(config.rate_limiter()),
        google,
    };

    info!("Authentication service initialized successfully");

    // Start the web server
    let app = routes::create_router(app_state);

    let listener = TcpListener::bind(&config.bind_address).await?;
    info!("Authentication service listening on {}", config.bind_address);

    axum::serve(listener, app).await?;

    Ok(())
}
