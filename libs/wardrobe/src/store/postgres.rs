//! PostgreSQL-backed wardrobe store

use async_trait::async_trait;
use common::error::{DatabaseError, DatabaseResult};
use sqlx::{PgPool, Row, postgres::PgRow};
use tracing::{info, warn};
use uuid::Uuid;

use super::WardrobeStore;
use crate::models::{
    Category, ClothingItem, Collection, CollectionUpsert, NewClothingItem, UpsertStatus,
};

const ITEM_COLUMNS: &str = "id, owner_id, clothing_name, category, image, created_at, updated_at";

/// Insert the collection or append the incoming ids it lacks, in input order.
/// The conditional `WHERE` skips the update, and so returns no row, when every
/// incoming id is already referenced.
const UPSERT_COLLECTION: &str = r#"
    INSERT INTO collections (id, owner_id, collection_name, item_ids)
    VALUES ($1, $2, $3, $4)
    ON CONFLICT (owner_id, collection_name) DO UPDATE
    SET item_ids = collections.item_ids || ARRAY(
            SELECT incoming.item_id
            FROM unnest(EXCLUDED.item_ids) WITH ORDINALITY AS incoming(item_id, position)
            WHERE incoming.item_id <> ALL(collections.item_ids)
            ORDER BY incoming.position
        ),
        updated_at = NOW()
    WHERE NOT (EXCLUDED.item_ids <@ collections.item_ids)
    RETURNING id, owner_id, collection_name, item_ids, created_at, updated_at,
              (xmax = 0) AS inserted
"#;

/// Wardrobe store over a PostgreSQL pool
#[derive(Clone)]
pub struct PgWardrobeStore {
    pool: PgPool,
}

impl PgWardrobeStore {
    /// Create a new store
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn find_collection_by_name(
        &self,
        owner_id: Uuid,
        collection_name: &str,
    ) -> DatabaseResult<Option<Collection>> {
        let row = sqlx::query(
            r#"
            SELECT id, owner_id, collection_name, item_ids, created_at, updated_at
            FROM collections
            WHERE owner_id = $1 AND collection_name = $2
            "#,
        )
        .bind(owner_id)
        .bind(collection_name)
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(collection_from_row).transpose()
    }
}

fn item_from_row(row: &PgRow) -> DatabaseResult<ClothingItem> {
    let category: String = row.try_get("category")?;
    let category = category.parse::<Category>().map_err(DatabaseError::Decode)?;

    Ok(ClothingItem {
        id: row.try_get("id")?,
        owner_id: row.try_get("owner_id")?,
        clothing_name: row.try_get("clothing_name")?,
        category,
        image: row.try_get("image")?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}

fn collection_from_row(row: &PgRow) -> DatabaseResult<Collection> {
    Ok(Collection {
        id: row.try_get("id")?,
        owner_id: row.try_get("owner_id")?,
        collection_name: row.try_get("collection_name")?,
        item_ids: row.try_get("item_ids")?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}

#[async_trait]
impl WardrobeStore for PgWardrobeStore {
    async fn health_check(&self) -> DatabaseResult<bool> {
        common::database::health_check(&self.pool).await
    }

    async fn user_exists(&self, user_id: Uuid) -> DatabaseResult<bool> {
        let exists: bool = sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM users WHERE id = $1)")
            .bind(user_id)
            .fetch_one(&self.pool)
            .await?;

        Ok(exists)
    }

    async fn insert_item(&self, item: &NewClothingItem) -> DatabaseResult<ClothingItem> {
        info!("Inserting clothing item {} for owner {}", item.id, item.owner_id);

        let row = sqlx::query(&format!(
            r#"
            INSERT INTO clothing_items (id, owner_id, clothing_name, category, image)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING {ITEM_COLUMNS}
            "#
        ))
        .bind(item.id)
        .bind(item.owner_id)
        .bind(&item.clothing_name)
        .bind(item.category.as_str())
        .bind(&item.image)
        .fetch_one(&self.pool)
        .await?;

        item_from_row(&row)
    }

    async fn find_item(&self, item_id: Uuid) -> DatabaseResult<Option<ClothingItem>> {
        let row = sqlx::query(&format!(
            "SELECT {ITEM_COLUMNS} FROM clothing_items WHERE id = $1"
        ))
        .bind(item_id)
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(item_from_row).transpose()
    }

    async fn list_items(
        &self,
        owner_id: Uuid,
        category: Option<Category>,
    ) -> DatabaseResult<Vec<ClothingItem>> {
        let rows = sqlx::query(&format!(
            r#"
            SELECT {ITEM_COLUMNS}
            FROM clothing_items
            WHERE owner_id = $1 AND ($2::TEXT IS NULL OR category = $2)
            ORDER BY created_at DESC, id
            "#
        ))
        .bind(owner_id)
        .bind(category.map(|c| c.as_str()))
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(item_from_row).collect()
    }

    async fn find_owned_items(
        &self,
        owner_id: Uuid,
        item_ids: &[Uuid],
    ) -> DatabaseResult<Vec<ClothingItem>> {
        if item_ids.is_empty() {
            return Ok(Vec::new());
        }

        let rows = sqlx::query(&format!(
            "SELECT {ITEM_COLUMNS} FROM clothing_items WHERE owner_id = $1 AND id = ANY($2)"
        ))
        .bind(owner_id)
        .bind(item_ids)
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(item_from_row).collect()
    }

    async fn delete_item(&self, owner_id: Uuid, item_id: Uuid) -> DatabaseResult<bool> {
        let result = sqlx::query("DELETE FROM clothing_items WHERE id = $1 AND owner_id = $2")
            .bind(item_id)
            .bind(owner_id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() == 1)
    }

    async fn upsert_collection(
        &self,
        owner_id: Uuid,
        collection_name: &str,
        item_ids: &[Uuid],
    ) -> DatabaseResult<CollectionUpsert> {
        // A concurrent delete can remove the conflicting row between the
        // skipped upsert and the follow-up read; retry once in that case.
        for _ in 0..2 {
            let row = sqlx::query(UPSERT_COLLECTION)
                .bind(Uuid::new_v4())
                .bind(owner_id)
                .bind(collection_name)
                .bind(item_ids)
                .fetch_optional(&self.pool)
                .await?;

            if let Some(row) = row {
                let inserted: bool = row.try_get("inserted")?;
                let collection = collection_from_row(&row)?;
                let status = if inserted {
                    UpsertStatus::Created
                } else {
                    UpsertStatus::Merged
                };
                return Ok(CollectionUpsert { status, collection });
            }

            if let Some(collection) = self.find_collection_by_name(owner_id, collection_name).await? {
                return Ok(CollectionUpsert {
                    status: UpsertStatus::NoOp,
                    collection,
                });
            }

            warn!(
                "Collection '{}' of owner {} vanished during upsert, retrying",
                collection_name, owner_id
            );
        }

        Err(DatabaseError::Query(sqlx::Error::RowNotFound))
    }

    async fn list_collections(&self, owner_id: Uuid) -> DatabaseResult<Vec<Collection>> {
        let rows = sqlx::query(
            r#"
            SELECT id, owner_id, collection_name, item_ids, created_at, updated_at
            FROM collections
            WHERE owner_id = $1
            ORDER BY created_at, id
            "#,
        )
        .bind(owner_id)
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(collection_from_row).collect()
    }

    async fn delete_collection(
        &self,
        owner_id: Uuid,
        collection_id: Uuid,
    ) -> DatabaseResult<bool> {
        let result = sqlx::query("DELETE FROM collections WHERE id = $1 AND owner_id = $2")
            .bind(collection_id)
            .bind(owner_id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() == 1)
    }
}
