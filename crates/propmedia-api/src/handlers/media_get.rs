use std::sync::Arc;

use axum::{
    extract::{Path, State},
    Json,
};
use propmedia_core::models::MediaAssetResponse;
use propmedia_core::AppError;
use uuid::Uuid;

use crate::constants::API_PREFIX;
use crate::error::{ErrorResponse, HttpAppError};
use crate::state::AppState;

use super::parse_owner;

/// List an owner's assets, ordered for display.
#[utoipa::path(
    get,
    path = "/api/v0/{owner_kind}/{id}/media",
    tag = "media",
    params(
        ("owner_kind" = String, Path, description = "Owner collection: 'properties' or 'clients'"),
        ("id" = Uuid, Path, description = "Owner ID")
    ),
    responses(
        (status = 200, description = "Ordered asset metadata", body = [MediaAssetResponse]),
        (status = 404, description = "Unknown owner collection", body = ErrorResponse)
    )
)]
pub async fn list_media(
    State(state): State<Arc<AppState>>,
    Path((owner_kind, owner_id)): Path<(String, Uuid)>,
) -> Result<Json<Vec<MediaAssetResponse>>, HttpAppError> {
    let owner = parse_owner(&owner_kind, owner_id)?;
    let assets = state.store.list_by_owner(owner).await?;
    let responses = assets
        .iter()
        .map(|a| MediaAssetResponse::from_asset(a, API_PREFIX))
        .collect();
    Ok(Json(responses))
}

/// Single-asset metadata view, with the inline thumbnail URI.
#[utoipa::path(
    get,
    path = "/api/v0/media/{id}",
    tag = "media",
    params(("id" = Uuid, Path, description = "Asset ID")),
    responses(
        (status = 200, description = "Asset metadata", body = MediaAssetResponse),
        (status = 404, description = "Asset not found", body = ErrorResponse)
    )
)]
pub async fn get_media(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<MediaAssetResponse>, HttpAppError> {
    let asset = state.store.get(id).await?;
    Ok(Json(MediaAssetResponse::detail_from_asset(
        &asset, API_PREFIX,
    )))
}

/// The owner's primary image: the flagged one, else the lowest sort order.
#[utoipa::path(
    get,
    path = "/api/v0/{owner_kind}/{id}/media/primary",
    tag = "media",
    params(
        ("owner_kind" = String, Path, description = "Owner collection: 'properties' or 'clients'"),
        ("id" = Uuid, Path, description = "Owner ID")
    ),
    responses(
        (status = 200, description = "Primary asset metadata", body = MediaAssetResponse),
        (status = 404, description = "Owner has no assets", body = ErrorResponse)
    )
)]
pub async fn get_primary_media(
    State(state): State<Arc<AppState>>,
    Path((owner_kind, owner_id)): Path<(String, Uuid)>,
) -> Result<Json<MediaAssetResponse>, HttpAppError> {
    let owner = parse_owner(&owner_kind, owner_id)?;
    let asset = state
        .store
        .get_primary(owner)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("No assets for {}", owner)))?;
    Ok(Json(MediaAssetResponse::detail_from_asset(
        &asset, API_PREFIX,
    )))
}
