//! In-memory asset repository.
//!
//! Backs tests and single-process deployments without a database. All
//! operations run under one map lock, so the compound operations are
//! trivially atomic.

use async_trait::async_trait;
use propmedia_core::models::{MediaAsset, OwnerRef, UpdateAssetDetails};
use propmedia_core::AppError;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use uuid::Uuid;

use crate::repository::AssetRepository;

#[derive(Clone, Default)]
pub struct MemoryAssetRepository {
    assets: Arc<Mutex<HashMap<Uuid, MediaAsset>>>,
}

impl MemoryAssetRepository {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<Uuid, MediaAsset>> {
        self.assets.lock().expect("asset map poisoned")
    }
}

#[async_trait]
impl AssetRepository for MemoryAssetRepository {
    async fn insert(&self, asset: MediaAsset) -> Result<MediaAsset, AppError> {
        let mut assets = self.lock();
        assets.insert(asset.id, asset.clone());
        Ok(asset)
    }

    async fn get(&self, id: Uuid) -> Result<Option<MediaAsset>, AppError> {
        Ok(self.lock().get(&id).cloned())
    }

    async fn list_by_owner(&self, owner: OwnerRef) -> Result<Vec<MediaAsset>, AppError> {
        let mut matching: Vec<MediaAsset> = self
            .lock()
            .values()
            .filter(|a| a.owner == owner)
            .cloned()
            .collect();
        matching.sort_by(|a, b| {
            a.sort_order
                .cmp(&b.sort_order)
                .then(a.created_at.cmp(&b.created_at))
        });
        Ok(matching)
    }

    async fn flip_primary(&self, demote: Option<Uuid>, promote: Uuid) -> Result<(), AppError> {
        let mut assets = self.lock();
        if let Some(demote_id) = demote {
            if let Some(asset) = assets.get_mut(&demote_id) {
                asset.is_primary = false;
            }
        }
        match assets.get_mut(&promote) {
            Some(asset) => {
                asset.is_primary = true;
                Ok(())
            }
            None => Err(AppError::NotFound(format!("Asset {} not found", promote))),
        }
    }

    async fn assign_sort_orders(&self, updates: &[(Uuid, i32)]) -> Result<(), AppError> {
        let mut assets = self.lock();
        for (id, sort_order) in updates {
            if let Some(asset) = assets.get_mut(id) {
                asset.sort_order = *sort_order;
            }
        }
        Ok(())
    }

    async fn update_details(
        &self,
        id: Uuid,
        details: &UpdateAssetDetails,
    ) -> Result<Option<MediaAsset>, AppError> {
        let mut assets = self.lock();
        Ok(assets.get_mut(&id).map(|asset| {
            if let Some(category) = details.category {
                asset.category = category;
            }
            if let Some(title) = &details.title {
                asset.title = Some(title.clone());
            }
            if let Some(description) = &details.description {
                asset.description = Some(description.clone());
            }
            asset.clone()
        }))
    }

    async fn delete(&self, id: Uuid) -> Result<bool, AppError> {
        Ok(self.lock().remove(&id).is_some())
    }

    async fn delete_by_owner(&self, owner: OwnerRef) -> Result<u64, AppError> {
        let mut assets = self.lock();
        let before = assets.len();
        assets.retain(|_, a| a.owner != owner);
        Ok((before - assets.len()) as u64)
    }
}
