//! Postgres asset repository.
//!
//! Encoded content is a text column behind `EncodedPayload`; the compound
//! operations run inside transactions so a half-applied primary flip or
//! renumbering can never be persisted.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use propmedia_core::models::{
    AssetCategory, AssetClass, MediaAsset, OwnerKind, OwnerRef, UpdateAssetDetails,
};
use propmedia_core::{AppError, EncodedPayload};
use sqlx::postgres::PgPoolOptions;
use sqlx::{PgPool, Postgres};
use uuid::Uuid;

use crate::repository::AssetRepository;

pub static MIGRATOR: sqlx::migrate::Migrator = sqlx::migrate!("../../migrations");

/// Row shape for the `media_assets` table.
#[derive(sqlx::FromRow)]
struct MediaAssetRow {
    id: Uuid,
    owner_kind: OwnerKind,
    owner_id: Uuid,
    agent_id: Option<Uuid>,
    file_name: String,
    original_file_name: String,
    content_type: String,
    size_bytes: i64,
    content: String,
    thumbnail: Option<String>,
    class: AssetClass,
    category: AssetCategory,
    title: Option<String>,
    description: Option<String>,
    is_primary: bool,
    sort_order: i32,
    width: Option<i32>,
    height: Option<i32>,
    created_at: DateTime<Utc>,
}

impl From<MediaAssetRow> for MediaAsset {
    fn from(row: MediaAssetRow) -> Self {
        MediaAsset {
            id: row.id,
            owner: OwnerRef::from_parts(row.owner_kind, row.owner_id),
            agent_id: row.agent_id,
            file_name: row.file_name,
            original_file_name: row.original_file_name,
            content_type: row.content_type,
            size_bytes: row.size_bytes,
            content: EncodedPayload::from_encoded(row.content),
            thumbnail: row.thumbnail.map(EncodedPayload::from_encoded),
            class: row.class,
            category: row.category,
            title: row.title,
            description: row.description,
            is_primary: row.is_primary,
            sort_order: row.sort_order,
            width: row.width,
            height: row.height,
            created_at: row.created_at,
        }
    }
}

#[derive(Clone)]
pub struct PgAssetRepository {
    pool: PgPool,
}

impl PgAssetRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Connect, then bring the schema up to date.
    pub async fn connect(database_url: &str, max_connections: u32) -> Result<Self, AppError> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .connect(database_url)
            .await?;
        MIGRATOR
            .run(&pool)
            .await
            .map_err(|e| AppError::Internal(format!("Migration failed: {}", e)))?;
        Ok(Self::new(pool))
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[async_trait]
impl AssetRepository for PgAssetRepository {
    #[tracing::instrument(skip(self, asset), fields(db.table = "media_assets", db.operation = "insert", asset_id = %asset.id))]
    async fn insert(&self, asset: MediaAsset) -> Result<MediaAsset, AppError> {
        let row: MediaAssetRow = sqlx::query_as::<Postgres, MediaAssetRow>(
            r#"
            INSERT INTO media_assets (
                id, owner_kind, owner_id, agent_id,
                file_name, original_file_name, content_type, size_bytes,
                content, thumbnail, class, category,
                title, description, is_primary, sort_order,
                width, height, created_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10,
                    $11, $12, $13, $14, $15, $16, $17, $18, $19)
            RETURNING *
            "#,
        )
        .bind(asset.id)
        .bind(asset.owner.kind())
        .bind(asset.owner.id())
        .bind(asset.agent_id)
        .bind(&asset.file_name)
        .bind(&asset.original_file_name)
        .bind(&asset.content_type)
        .bind(asset.size_bytes)
        .bind(asset.content.as_encoded_str())
        .bind(asset.thumbnail.as_ref().map(|t| t.as_encoded_str()))
        .bind(asset.class)
        .bind(asset.category)
        .bind(&asset.title)
        .bind(&asset.description)
        .bind(asset.is_primary)
        .bind(asset.sort_order)
        .bind(asset.width)
        .bind(asset.height)
        .bind(asset.created_at)
        .fetch_one(&self.pool)
        .await?;

        Ok(row.into())
    }

    #[tracing::instrument(skip(self), fields(db.table = "media_assets", db.operation = "select"))]
    async fn get(&self, id: Uuid) -> Result<Option<MediaAsset>, AppError> {
        let row = sqlx::query_as::<Postgres, MediaAssetRow>(
            "SELECT * FROM media_assets WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(Into::into))
    }

    #[tracing::instrument(skip(self), fields(db.table = "media_assets", db.operation = "select", owner = %owner))]
    async fn list_by_owner(&self, owner: OwnerRef) -> Result<Vec<MediaAsset>, AppError> {
        let rows = sqlx::query_as::<Postgres, MediaAssetRow>(
            r#"
            SELECT * FROM media_assets
            WHERE owner_kind = $1 AND owner_id = $2
            ORDER BY sort_order ASC, created_at ASC
            "#,
        )
        .bind(owner.kind())
        .bind(owner.id())
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().map(Into::into).collect())
    }

    #[tracing::instrument(skip(self), fields(db.table = "media_assets", db.operation = "update"))]
    async fn flip_primary(&self, demote: Option<Uuid>, promote: Uuid) -> Result<(), AppError> {
        let mut tx = self.pool.begin().await?;

        // Demote before promote so the partial unique index on
        // (owner, is_primary) never sees two primaries.
        if let Some(demote_id) = demote {
            sqlx::query("UPDATE media_assets SET is_primary = FALSE WHERE id = $1")
                .bind(demote_id)
                .execute(&mut *tx)
                .await?;
        }

        let result = sqlx::query("UPDATE media_assets SET is_primary = TRUE WHERE id = $1")
            .bind(promote)
            .execute(&mut *tx)
            .await?;
        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Asset {} not found", promote)));
        }

        tx.commit().await?;
        Ok(())
    }

    #[tracing::instrument(skip(self, updates), fields(db.table = "media_assets", db.operation = "update", count = updates.len()))]
    async fn assign_sort_orders(&self, updates: &[(Uuid, i32)]) -> Result<(), AppError> {
        let mut tx = self.pool.begin().await?;
        for (id, sort_order) in updates {
            sqlx::query("UPDATE media_assets SET sort_order = $2 WHERE id = $1")
                .bind(id)
                .bind(sort_order)
                .execute(&mut *tx)
                .await?;
        }
        tx.commit().await?;
        Ok(())
    }

    #[tracing::instrument(skip(self, details), fields(db.table = "media_assets", db.operation = "update"))]
    async fn update_details(
        &self,
        id: Uuid,
        details: &UpdateAssetDetails,
    ) -> Result<Option<MediaAsset>, AppError> {
        let row = sqlx::query_as::<Postgres, MediaAssetRow>(
            r#"
            UPDATE media_assets
            SET category = COALESCE($2, category),
                title = COALESCE($3, title),
                description = COALESCE($4, description)
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(details.category)
        .bind(&details.title)
        .bind(&details.description)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(Into::into))
    }

    #[tracing::instrument(skip(self), fields(db.table = "media_assets", db.operation = "delete"))]
    async fn delete(&self, id: Uuid) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM media_assets WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    #[tracing::instrument(skip(self), fields(db.table = "media_assets", db.operation = "delete", owner = %owner))]
    async fn delete_by_owner(&self, owner: OwnerRef) -> Result<u64, AppError> {
        let result = sqlx::query(
            "DELETE FROM media_assets WHERE owner_kind = $1 AND owner_id = $2",
        )
        .bind(owner.kind())
        .bind(owner.id())
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected())
    }
}
