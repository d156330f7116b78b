use std::sync::Arc;

use axum::{
    extract::{Multipart, Path, State},
    http::StatusCode,
    Json,
};
use bytes::Bytes;
use propmedia_core::models::{AssetCategory, AssetClass, MediaAssetResponse, NewAsset};
use propmedia_core::{AppError, EncodedPayload};
use propmedia_processing::MediaValidator;
use uuid::Uuid;

use crate::agent::AgentScope;
use crate::constants::API_PREFIX;
use crate::error::{ErrorResponse, HttpAppError};
use crate::state::AppState;

use super::parse_owner;

struct UploadForm {
    file: Option<(String, String, Bytes)>,
    category: Option<AssetCategory>,
    title: Option<String>,
    description: Option<String>,
    make_primary: bool,
}

fn bad_multipart(err: axum::extract::multipart::MultipartError) -> HttpAppError {
    HttpAppError(AppError::InvalidInput(format!(
        "Invalid multipart body: {}",
        err
    )))
}

async fn read_upload_form(mut multipart: Multipart) -> Result<UploadForm, HttpAppError> {
    let mut form = UploadForm {
        file: None,
        category: None,
        title: None,
        description: None,
        make_primary: false,
    };

    while let Some(field) = multipart.next_field().await.map_err(bad_multipart)? {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "file" => {
                let file_name = field.file_name().map(str::to_string).ok_or_else(|| {
                    HttpAppError(AppError::InvalidInput(
                        "The 'file' part must carry a filename".to_string(),
                    ))
                })?;
                let content_type = field
                    .content_type()
                    .map(str::to_string)
                    .unwrap_or_else(|| "application/octet-stream".to_string());
                let data = field.bytes().await.map_err(bad_multipart)?;
                form.file = Some((file_name, content_type, data));
            }
            "category" => {
                let text = field.text().await.map_err(bad_multipart)?;
                let category = serde_json::from_value(serde_json::Value::String(text.clone()))
                    .map_err(|_| {
                        HttpAppError(AppError::InvalidInput(format!(
                            "Unknown category '{}'",
                            text
                        )))
                    })?;
                form.category = Some(category);
            }
            "title" => form.title = Some(field.text().await.map_err(bad_multipart)?),
            "description" => form.description = Some(field.text().await.map_err(bad_multipart)?),
            "primary" => {
                let text = field.text().await.map_err(bad_multipart)?;
                form.make_primary = matches!(text.trim(), "1" | "true" | "True" | "TRUE");
            }
            _ => tracing::debug!(field = %name, "Ignoring unknown multipart field"),
        }
    }
    Ok(form)
}

/// Upload a media asset for a property or client.
///
/// Validation and thumbnail derivation run before the store is touched;
/// a failed thumbnail leaves the asset without a preview but does not fail
/// the upload.
#[utoipa::path(
    post,
    path = "/api/v0/{owner_kind}/{id}/media",
    tag = "media",
    params(
        ("owner_kind" = String, Path, description = "Owner collection: 'properties' or 'clients'"),
        ("id" = Uuid, Path, description = "Owner ID")
    ),
    responses(
        (status = 201, description = "Asset created", body = MediaAssetResponse),
        (status = 400, description = "Invalid input", body = ErrorResponse),
        (status = 413, description = "File too large", body = ErrorResponse),
        (status = 415, description = "Unsupported content type", body = ErrorResponse)
    )
)]
pub async fn upload_media(
    State(state): State<Arc<AppState>>,
    Path((owner_kind, owner_id)): Path<(String, Uuid)>,
    agent: AgentScope,
    multipart: Multipart,
) -> Result<(StatusCode, Json<MediaAssetResponse>), HttpAppError> {
    let owner = parse_owner(&owner_kind, owner_id)?;
    let form = read_upload_form(multipart).await?;

    let (file_name, content_type, data) = form.file.ok_or_else(|| {
        HttpAppError(AppError::InvalidInput("Missing 'file' part".to_string()))
    })?;

    let policy = state.config.policy_for_content_type(&content_type);
    let validator = MediaValidator::new(policy.clone());
    let validated = validator.validate(&file_name, &content_type, data.len())?;

    let class = AssetClass::from_content_type(&validated.content_type);
    if class == AssetClass::Document && agent.0.is_none() {
        return Err(HttpAppError(AppError::Unauthorized(
            "Document uploads require an agent scope".to_string(),
        )));
    }

    // Derive the thumbnail before the store takes the owner lock; the lock
    // should never be held across CPU-bound work.
    let (thumbnail, width, height) = if class.is_image() {
        match state.thumbnailer.derive(&data) {
            Ok(output) => (
                Some(EncodedPayload::encode(&output.jpeg)),
                Some(output.source_width as i32),
                Some(output.source_height as i32),
            ),
            Err(err) => {
                tracing::warn!(error = %err, file = %validated.file_name, "Thumbnail derivation failed, storing asset without preview");
                (None, None, None)
            }
        }
    } else {
        (None, None, None)
    };

    let asset = state
        .store
        .create(NewAsset {
            owner,
            agent_id: agent.0,
            file_name: validated.file_name,
            original_file_name: validated.original_file_name,
            content_type: validated.content_type,
            size_bytes: data.len() as i64,
            content: EncodedPayload::encode(&data),
            thumbnail,
            class,
            category: form.category.unwrap_or_default(),
            title: form.title,
            description: form.description,
            make_primary: form.make_primary,
            width,
            height,
        })
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(MediaAssetResponse::from_asset(&asset, API_PREFIX)),
    ))
}
