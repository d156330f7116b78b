use async_trait::async_trait;
use propmedia_core::models::{MediaAsset, OwnerRef, UpdateAssetDetails};
use propmedia_core::AppError;
use uuid::Uuid;

/// Storage primitives for media assets.
///
/// Implementations provide row-level CRUD and the two compound operations
/// the store needs to be atomic (`flip_primary`, `assign_sort_orders`).
/// Invariant decisions live in `MediaStore`, never here.
#[async_trait]
pub trait AssetRepository: Send + Sync {
    /// Persist a fully-populated asset exactly as given.
    async fn insert(&self, asset: MediaAsset) -> Result<MediaAsset, AppError>;

    async fn get(&self, id: Uuid) -> Result<Option<MediaAsset>, AppError>;

    /// All assets for an owner, ordered by `sort_order` ascending with
    /// `created_at` ascending as the tie-break.
    async fn list_by_owner(&self, owner: OwnerRef) -> Result<Vec<MediaAsset>, AppError>;

    /// Demote `demote` (when set) and promote `promote` in one atomic unit.
    /// A half-applied pair is a data-corruption condition, so implementations
    /// must make both flips or neither.
    async fn flip_primary(&self, demote: Option<Uuid>, promote: Uuid) -> Result<(), AppError>;

    /// Apply a batch of `(asset_id, sort_order)` assignments atomically.
    async fn assign_sort_orders(&self, updates: &[(Uuid, i32)]) -> Result<(), AppError>;

    /// Merge non-`None` detail fields; returns the updated asset, or `None`
    /// if the id does not exist.
    async fn update_details(
        &self,
        id: Uuid,
        details: &UpdateAssetDetails,
    ) -> Result<Option<MediaAsset>, AppError>;

    /// Returns whether a row was actually removed.
    async fn delete(&self, id: Uuid) -> Result<bool, AppError>;

    /// Orphan removal for a cascading owner delete. Returns the removed count.
    async fn delete_by_owner(&self, owner: OwnerRef) -> Result<u64, AppError>;
}
