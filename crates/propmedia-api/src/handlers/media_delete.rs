use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
};
use uuid::Uuid;

use crate::error::{ErrorResponse, HttpAppError};
use crate::state::AppState;

use super::parse_owner;

/// Delete one asset; siblings are renumbered to close the gap.
#[utoipa::path(
    delete,
    path = "/api/v0/media/{id}",
    tag = "media",
    params(("id" = Uuid, Path, description = "Asset ID")),
    responses(
        (status = 204, description = "Asset deleted"),
        (status = 404, description = "Asset not found", body = ErrorResponse)
    )
)]
pub async fn delete_media(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, HttpAppError> {
    state.store.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Orphan removal: the collaborator deleting a property or client calls this
/// to drop every attached asset.
#[utoipa::path(
    delete,
    path = "/api/v0/{owner_kind}/{id}/media",
    tag = "media",
    params(
        ("owner_kind" = String, Path, description = "Owner collection: 'properties' or 'clients'"),
        ("id" = Uuid, Path, description = "Owner ID")
    ),
    responses(
        (status = 204, description = "All owner assets deleted"),
        (status = 404, description = "Unknown owner collection", body = ErrorResponse)
    )
)]
pub async fn delete_owner_media(
    State(state): State<Arc<AppState>>,
    Path((owner_kind, owner_id)): Path<(String, Uuid)>,
) -> Result<StatusCode, HttpAppError> {
    let owner = parse_owner(&owner_kind, owner_id)?;
    let removed = state.store.delete_by_owner(owner).await?;
    tracing::info!(owner = %owner, removed = removed, "Owner media removed");
    Ok(StatusCode::NO_CONTENT)
}
