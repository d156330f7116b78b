//! Media store: the single writer for asset records.
//!
//! Owns the two collection invariants — at most one primary image per owner,
//! dense gap-free sort order — and serializes mutations per owner so
//! concurrent uploads or primary flips cannot race them. Reads do not take
//! the owner lock.

use propmedia_core::models::{MediaAsset, NewAsset, OwnerRef, UpdateAssetDetails};
use propmedia_core::AppError;
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex as StdMutex};
use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};
use uuid::Uuid;

use crate::repository::AssetRepository;

/// Owner-keyed mutation locks. Entries are created on first use and live for
/// the process lifetime; the key space is bounded by the number of owners
/// touched since startup.
#[derive(Clone, Default)]
struct OwnerLocks {
    inner: Arc<StdMutex<HashMap<OwnerRef, Arc<AsyncMutex<()>>>>>,
}

impl OwnerLocks {
    async fn acquire(&self, owner: OwnerRef) -> OwnedMutexGuard<()> {
        let lock = {
            let mut map = self.inner.lock().expect("owner lock map poisoned");
            map.entry(owner)
                .or_insert_with(|| Arc::new(AsyncMutex::new(())))
                .clone()
        };
        lock.lock_owned().await
    }
}

#[derive(Clone)]
pub struct MediaStore {
    repo: Arc<dyn AssetRepository>,
    locks: OwnerLocks,
}

impl MediaStore {
    pub fn new(repo: Arc<dyn AssetRepository>) -> Self {
        Self {
            repo,
            locks: OwnerLocks::default(),
        }
    }

    // ----- Mutations (owner-serialized) -----

    /// Create an asset at the end of the owner's sequence.
    ///
    /// The first image for an owner becomes primary automatically. An
    /// explicit `make_primary` request demotes the current primary and
    /// promotes the new asset as one atomic unit.
    #[tracing::instrument(skip(self, new), fields(owner = %new.owner, file = %new.file_name))]
    pub async fn create(&self, new: NewAsset) -> Result<MediaAsset, AppError> {
        let owner = new.owner;
        let _guard = self.locks.acquire(owner).await;

        let siblings = self.repo.list_by_owner(owner).await?;
        ensure_single_primary(owner, &siblings)?;

        let sort_order = siblings
            .iter()
            .map(|a| a.sort_order)
            .max()
            .map_or(0, |m| m + 1);

        let has_image_sibling = siblings.iter().any(|a| a.class.is_image());
        let current_primary = siblings.iter().find(|a| a.is_primary).map(|a| a.id);
        let wants_primary = new.class.is_image() && (new.make_primary || !has_image_sibling);

        // Insert flagged only when no demotion is needed; otherwise insert
        // unflagged and let the repository flip both sides atomically.
        let insert_flagged = wants_primary && current_primary.is_none();

        let asset = MediaAsset {
            id: Uuid::new_v4(),
            owner,
            agent_id: new.agent_id,
            file_name: new.file_name,
            original_file_name: new.original_file_name,
            content_type: new.content_type,
            size_bytes: new.size_bytes,
            content: new.content,
            thumbnail: new.thumbnail,
            class: new.class,
            category: new.category,
            title: new.title,
            description: new.description,
            is_primary: insert_flagged,
            sort_order,
            width: new.width,
            height: new.height,
            created_at: chrono::Utc::now(),
        };

        let mut created = self.repo.insert(asset).await?;
        if wants_primary && !insert_flagged {
            self.repo.flip_primary(current_primary, created.id).await?;
            created.is_primary = true;
        }

        tracing::debug!(asset_id = %created.id, sort_order = created.sort_order, is_primary = created.is_primary, "Asset created");
        Ok(created)
    }

    /// Flag an image asset as the owner's primary, demoting the current one.
    /// Idempotent when the target is already primary.
    #[tracing::instrument(skip(self))]
    pub async fn set_primary(&self, asset_id: Uuid) -> Result<MediaAsset, AppError> {
        let asset = self
            .repo
            .get(asset_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Asset {} not found", asset_id)))?;
        if !asset.class.is_image() {
            return Err(AppError::InvalidInput(
                "Only image assets can be flagged primary".to_string(),
            ));
        }

        let _guard = self.locks.acquire(asset.owner).await;

        // Re-read under the lock; the asset may have moved or gone away.
        let siblings = self.repo.list_by_owner(asset.owner).await?;
        ensure_single_primary(asset.owner, &siblings)?;
        let target = siblings
            .iter()
            .find(|a| a.id == asset_id)
            .ok_or_else(|| AppError::NotFound(format!("Asset {} not found", asset_id)))?;

        if target.is_primary {
            return Ok(target.clone());
        }

        let current_primary = siblings.iter().find(|a| a.is_primary).map(|a| a.id);
        self.repo.flip_primary(current_primary, asset_id).await?;

        let mut updated = target.clone();
        updated.is_primary = true;
        Ok(updated)
    }

    /// Delete an asset and renumber the remaining siblings densely,
    /// preserving their relative order. Deleting the primary does not
    /// promote a successor; readers fall back to the lowest sort order.
    #[tracing::instrument(skip(self))]
    pub async fn delete(&self, asset_id: Uuid) -> Result<(), AppError> {
        let asset = self
            .repo
            .get(asset_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Asset {} not found", asset_id)))?;

        let _guard = self.locks.acquire(asset.owner).await;

        if !self.repo.delete(asset_id).await? {
            return Err(AppError::NotFound(format!("Asset {} not found", asset_id)));
        }
        self.renumber(asset.owner).await?;

        tracing::debug!(asset_id = %asset_id, owner = %asset.owner, "Asset deleted");
        Ok(())
    }

    /// Replace the owner's display order. `ordered_ids` must be exactly the
    /// owner's current asset set.
    #[tracing::instrument(skip(self, ordered_ids), fields(owner = %owner, count = ordered_ids.len()))]
    pub async fn reorder(&self, owner: OwnerRef, ordered_ids: &[Uuid]) -> Result<(), AppError> {
        let _guard = self.locks.acquire(owner).await;

        let siblings = self.repo.list_by_owner(owner).await?;
        let current: HashSet<Uuid> = siblings.iter().map(|a| a.id).collect();
        let requested: HashSet<Uuid> = ordered_ids.iter().copied().collect();

        if ordered_ids.len() != siblings.len() || requested != current {
            return Err(AppError::InvalidReorderSet(format!(
                "Expected exactly the {} current asset ids for {}",
                siblings.len(),
                owner
            )));
        }

        let updates: Vec<(Uuid, i32)> = ordered_ids
            .iter()
            .enumerate()
            .map(|(position, id)| (*id, position as i32))
            .collect();
        self.repo.assign_sort_orders(&updates).await
    }

    /// Update mutable display metadata (category, title, description).
    #[tracing::instrument(skip(self, details))]
    pub async fn update_details(
        &self,
        asset_id: Uuid,
        details: &UpdateAssetDetails,
    ) -> Result<MediaAsset, AppError> {
        self.repo
            .update_details(asset_id, details)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Asset {} not found", asset_id)))
    }

    /// Orphan removal when the owning property/client is deleted.
    #[tracing::instrument(skip(self), fields(owner = %owner))]
    pub async fn delete_by_owner(&self, owner: OwnerRef) -> Result<u64, AppError> {
        let _guard = self.locks.acquire(owner).await;
        let removed = self.repo.delete_by_owner(owner).await?;
        tracing::debug!(owner = %owner, removed = removed, "Owner assets removed");
        Ok(removed)
    }

    // ----- Reads -----

    pub async fn get(&self, asset_id: Uuid) -> Result<MediaAsset, AppError> {
        self.repo
            .get(asset_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Asset {} not found", asset_id)))
    }

    /// Owner's assets ordered by sort order, creation time as tie-break.
    pub async fn list_by_owner(&self, owner: OwnerRef) -> Result<Vec<MediaAsset>, AppError> {
        self.repo.list_by_owner(owner).await
    }

    /// The flagged primary, else the lowest-sort-order asset as a read-time
    /// fallback, else `None` for an empty collection.
    pub async fn get_primary(&self, owner: OwnerRef) -> Result<Option<MediaAsset>, AppError> {
        let assets = self.repo.list_by_owner(owner).await?;
        let flagged = assets.iter().find(|a| a.is_primary).cloned();
        Ok(flagged.or_else(|| assets.into_iter().next()))
    }

    /// Original bytes, decoded on demand.
    pub async fn get_original(&self, asset_id: Uuid) -> Result<(String, Vec<u8>), AppError> {
        let asset = self.get(asset_id).await?;
        let bytes = asset.content.decode()?;
        Ok((asset.content_type, bytes))
    }

    /// Thumbnail bytes, falling back to the original when the asset has no
    /// derived preview.
    pub async fn get_thumbnail(&self, asset_id: Uuid) -> Result<(String, Vec<u8>), AppError> {
        let asset = self.get(asset_id).await?;
        match &asset.thumbnail {
            Some(thumbnail) => Ok(("image/jpeg".to_string(), thumbnail.decode()?)),
            None => {
                let bytes = asset.content.decode()?;
                Ok((asset.content_type, bytes))
            }
        }
    }

    // ----- Internals -----

    /// Close the gap left by a deletion: reassign dense 0..n-1 sort orders
    /// in the current relative order. Caller holds the owner lock.
    async fn renumber(&self, owner: OwnerRef) -> Result<(), AppError> {
        let siblings = self.repo.list_by_owner(owner).await?;
        let updates: Vec<(Uuid, i32)> = siblings
            .iter()
            .enumerate()
            .filter(|(position, a)| a.sort_order != *position as i32)
            .map(|(position, a)| (a.id, position as i32))
            .collect();
        if updates.is_empty() {
            return Ok(());
        }
        self.repo.assign_sort_orders(&updates).await
    }
}

/// Two flagged primaries is a corruption condition, not something to repair
/// silently; abort the mutation that observed it.
fn ensure_single_primary(owner: OwnerRef, assets: &[MediaAsset]) -> Result<(), AppError> {
    let primaries = assets.iter().filter(|a| a.is_primary).count();
    if primaries > 1 {
        return Err(AppError::StorageIntegrity(format!(
            "{} primary images flagged for {}",
            primaries, owner
        )));
    }
    Ok(())
}
