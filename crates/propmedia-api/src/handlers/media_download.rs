use std::sync::Arc;

use axum::{
    body::Body,
    extract::{Path, Query, State},
    http::{header, StatusCode},
    response::Response,
};
use propmedia_core::AppError;
use serde::Deserialize;
use uuid::Uuid;

use crate::error::{ErrorResponse, HttpAppError};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct DispositionQuery {
    /// `1`/`true` selects attachment disposition; anything else serves inline.
    download: Option<String>,
}

impl DispositionQuery {
    fn wants_attachment(&self) -> bool {
        matches!(
            self.download.as_deref().map(str::trim),
            Some("1") | Some("true") | Some("True") | Some("TRUE")
        )
    }
}

fn file_response(
    content_type: &str,
    file_name: &str,
    attachment: bool,
    bytes: Vec<u8>,
) -> Result<Response, HttpAppError> {
    let disposition = if attachment { "attachment" } else { "inline" };
    Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, content_type)
        .header(
            header::CONTENT_DISPOSITION,
            format!("{}; filename=\"{}\"", disposition, file_name),
        )
        .header(header::CACHE_CONTROL, "private, max-age=3600")
        .body(Body::from(bytes))
        .map_err(|e| {
            tracing::error!(error = %e, "Failed to build file response");
            HttpAppError(AppError::Internal(e.to_string()))
        })
}

/// Serve the original bytes, decoded on demand from the stored payload.
#[utoipa::path(
    get,
    path = "/api/v0/media/{id}/file",
    tag = "media",
    params(
        ("id" = Uuid, Path, description = "Asset ID"),
        ("download" = Option<String>, Query, description = "Set to 1 for attachment disposition")
    ),
    responses(
        (status = 200, description = "Original file content", content_type = "application/octet-stream"),
        (status = 404, description = "Asset not found", body = ErrorResponse)
    )
)]
pub async fn download_media_file(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    Query(query): Query<DispositionQuery>,
) -> Result<Response, HttpAppError> {
    let asset = state.store.get(id).await?;
    let (content_type, bytes) = state.store.get_original(id).await?;
    file_response(
        &content_type,
        &asset.original_file_name,
        query.wants_attachment(),
        bytes,
    )
}

/// Serve the derived thumbnail, falling back to the original for assets
/// without one.
#[utoipa::path(
    get,
    path = "/api/v0/media/{id}/thumbnail",
    tag = "media",
    params(
        ("id" = Uuid, Path, description = "Asset ID"),
        ("download" = Option<String>, Query, description = "Set to 1 for attachment disposition")
    ),
    responses(
        (status = 200, description = "Thumbnail content", content_type = "image/jpeg"),
        (status = 404, description = "Asset not found", body = ErrorResponse)
    )
)]
pub async fn download_media_thumbnail(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    Query(query): Query<DispositionQuery>,
) -> Result<Response, HttpAppError> {
    let asset = state.store.get(id).await?;
    let (content_type, bytes) = state.store.get_thumbnail(id).await?;
    file_response(
        &content_type,
        &asset.original_file_name,
        query.wants_attachment(),
        bytes,
    )
}
