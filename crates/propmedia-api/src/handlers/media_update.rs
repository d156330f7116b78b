use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use propmedia_core::models::{MediaAssetResponse, UpdateAssetDetails};
use uuid::Uuid;

use crate::constants::API_PREFIX;
use crate::error::{ErrorResponse, HttpAppError};
use crate::state::AppState;

use super::parse_owner;

/// Flag an image as its owner's primary, demoting the current one.
#[utoipa::path(
    put,
    path = "/api/v0/media/{id}/primary",
    tag = "media",
    params(("id" = Uuid, Path, description = "Asset ID")),
    responses(
        (status = 200, description = "Updated asset metadata", body = MediaAssetResponse),
        (status = 400, description = "Asset is not an image", body = ErrorResponse),
        (status = 404, description = "Asset not found", body = ErrorResponse)
    )
)]
pub async fn set_primary_media(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<MediaAssetResponse>, HttpAppError> {
    let asset = state.store.set_primary(id).await?;
    Ok(Json(MediaAssetResponse::from_asset(&asset, API_PREFIX)))
}

/// Replace the owner's display order with the given id sequence. The ids
/// must be exactly the owner's current asset set.
#[utoipa::path(
    put,
    path = "/api/v0/{owner_kind}/{id}/media/order",
    tag = "media",
    params(
        ("owner_kind" = String, Path, description = "Owner collection: 'properties' or 'clients'"),
        ("id" = Uuid, Path, description = "Owner ID")
    ),
    request_body = Vec<Uuid>,
    responses(
        (status = 204, description = "Order applied"),
        (status = 400, description = "Id set does not match the owner's assets", body = ErrorResponse)
    )
)]
pub async fn reorder_media(
    State(state): State<Arc<AppState>>,
    Path((owner_kind, owner_id)): Path<(String, Uuid)>,
    Json(ordered_ids): Json<Vec<Uuid>>,
) -> Result<StatusCode, HttpAppError> {
    let owner = parse_owner(&owner_kind, owner_id)?;
    state.store.reorder(owner, &ordered_ids).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Update mutable display metadata.
#[utoipa::path(
    patch,
    path = "/api/v0/media/{id}",
    tag = "media",
    params(("id" = Uuid, Path, description = "Asset ID")),
    request_body = UpdateAssetDetails,
    responses(
        (status = 200, description = "Updated asset metadata", body = MediaAssetResponse),
        (status = 404, description = "Asset not found", body = ErrorResponse)
    )
)]
pub async fn update_media(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    Json(details): Json<UpdateAssetDetails>,
) -> Result<Json<MediaAssetResponse>, HttpAppError> {
    let asset = state.store.update_details(id, &details).await?;
    Ok(Json(MediaAssetResponse::from_asset(&asset, API_PREFIX)))
}
