//! Persistence for media assets.
//!
//! `AssetRepository` is the storage abstraction (Postgres or in-memory);
//! `MediaStore` sits on top as the single writer that owns the primary-image
//! and sort-order invariants. No other code path writes `is_primary` or
//! `sort_order`.

mod memory;
mod postgres;
mod repository;
mod store;

pub use memory::MemoryAssetRepository;
pub use postgres::{PgAssetRepository, MIGRATOR};
pub use repository::AssetRepository;
pub use store::MediaStore;

use propmedia_core::{AppError, Config, RepositoryBackend};
use std::sync::Arc;

/// Build the repository selected by configuration.
pub async fn repository_from_config(config: &Config) -> Result<Arc<dyn AssetRepository>, AppError> {
    match config.backend {
        RepositoryBackend::Memory => {
            tracing::info!("Using in-memory asset repository");
            Ok(Arc::new(MemoryAssetRepository::new()))
        }
        RepositoryBackend::Postgres => {
            let url = config.database_url.as_deref().ok_or_else(|| {
                AppError::Internal("DATABASE_URL missing for postgres backend".to_string())
            })?;
            let repo = PgAssetRepository::connect(url, config.db_max_connections).await?;
            tracing::info!("Connected to Postgres asset repository");
            Ok(Arc::new(repo))
        }
    }
}
