//! Integration tests for the infrastructure components
//!
//! These tests verify that the PostgreSQL database and Redis cache are
//! reachable, that the schema migrations apply, and that token revocation
//! round-trips through Redis. They need live services:
//! `cargo test -p common -- --ignored`.

use common::{
    auth::RevocationList,
    cache::{RedisConfig, RedisPool},
    database::{DatabaseConfig, health_check, init_pool, run_migrations},
};
use sqlx::Row;
use uuid::Uuid;

#[tokio::test]
#[ignore = "requires running PostgreSQL and Redis"]
async fn test_infrastructure_integration() -> Result<(), Box<dyn std::error::Error>> {
    let db_config = DatabaseConfig::from_env()?;
    let pool = init_pool(&db_config).await?;

    assert!(health_check(&pool).await?, "Database health check failed");

    run_migrations(&pool).await?;

    let row = sqlx::query(
        "SELECT COUNT(*) AS tables FROM information_schema.tables \
         WHERE table_name IN ('users', 'clothing_items', 'collections')",
    )
    .fetch_one(&pool)
    .await?;
    let tables: i64 = row.get("tables");
    assert_eq!(tables, 3, "Migrations did not create the wardrobe tables");

    let redis_config = RedisConfig::from_env()?;
    let redis_pool = RedisPool::new(&redis_config).await?;
    assert!(
        redis_pool.health_check().await?,
        "Redis health check failed"
    );

    let revocations = RevocationList::new(redis_pool.clone());
    let jti = Uuid::new_v4();
    assert!(!revocations.is_revoked(&jti).await?);
    revocations.revoke(&jti, 10).await?;
    assert!(revocations.is_revoked(&jti).await?);

    Ok(())
}
