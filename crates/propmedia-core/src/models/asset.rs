use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::payload::EncodedPayload;

use super::owner::OwnerRef;

/// Asset class: property images carry thumbnail and primary-image semantics,
/// document attachments carry neither.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(
    feature = "sqlx",
    sqlx(type_name = "asset_class", rename_all = "lowercase")
)]
#[serde(rename_all = "lowercase")]
pub enum AssetClass {
    Image,
    Document,
}

impl AssetClass {
    /// Derive the class from a validated content type.
    pub fn from_content_type(content_type: &str) -> Self {
        if content_type.starts_with("image/") {
            AssetClass::Image
        } else {
            AssetClass::Document
        }
    }

    pub fn is_image(&self) -> bool {
        matches!(self, AssetClass::Image)
    }
}

/// UI grouping category. Closed set; `General` is the fallback for uploads
/// that do not declare one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ToSchema)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(
    feature = "sqlx",
    sqlx(type_name = "asset_category", rename_all = "kebab-case")
)]
#[serde(rename_all = "kebab-case")]
pub enum AssetCategory {
    Exterior,
    Interior,
    FloorPlan,
    Contract,
    Identification,
    Certificate,
    #[default]
    General,
}

/// A stored media asset: a property image or a client/property document
/// attachment, with its encoded content inline.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MediaAsset {
    pub id: Uuid,
    pub owner: OwnerRef,
    pub agent_id: Option<Uuid>,
    pub file_name: String,
    pub original_file_name: String,
    pub content_type: String,
    /// Decoded byte length of `content`, never the encoded length.
    pub size_bytes: i64,
    pub content: EncodedPayload,
    pub thumbnail: Option<EncodedPayload>,
    pub class: AssetClass,
    pub category: AssetCategory,
    pub title: Option<String>,
    pub description: Option<String>,
    pub is_primary: bool,
    pub sort_order: i32,
    pub width: Option<i32>,
    pub height: Option<i32>,
    pub created_at: DateTime<Utc>,
}

impl MediaAsset {
    pub fn has_thumbnail(&self) -> bool {
        self.thumbnail.is_some()
    }
}

/// Input for `MediaStore::create`. Built by the upload pipeline after
/// validation, encoding, and thumbnail derivation.
#[derive(Debug, Clone)]
pub struct NewAsset {
    pub owner: OwnerRef,
    pub agent_id: Option<Uuid>,
    pub file_name: String,
    pub original_file_name: String,
    pub content_type: String,
    pub size_bytes: i64,
    pub content: EncodedPayload,
    pub thumbnail: Option<EncodedPayload>,
    pub class: AssetClass,
    pub category: AssetCategory,
    pub title: Option<String>,
    pub description: Option<String>,
    /// Caller requests primary status; the store demotes the current primary
    /// atomically. Ignored for document attachments.
    pub make_primary: bool,
    pub width: Option<i32>,
    pub height: Option<i32>,
}

/// Mutable display metadata. `None` fields are left unchanged.
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct UpdateAssetDetails {
    pub category: Option<AssetCategory>,
    pub title: Option<String>,
    pub description: Option<String>,
}

/// Metadata view returned by the API. Excludes raw content; serving URLs are
/// derived from the asset id.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct MediaAssetResponse {
    pub id: Uuid,
    pub owner: OwnerRef,
    pub agent_id: Option<Uuid>,
    pub file_name: String,
    pub original_file_name: String,
    pub content_type: String,
    pub size_bytes: i64,
    pub class: AssetClass,
    pub category: AssetCategory,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub is_primary: bool,
    pub sort_order: i32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub width: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub height: Option<i32>,
    pub created_at: DateTime<Utc>,
    pub file_url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub thumbnail_url: Option<String>,
    /// Inline `data:` URI for the thumbnail, usable without a separate fetch.
    /// Populated only on single-asset views to keep list payloads small.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub thumbnail_data_uri: Option<String>,
}

impl MediaAssetResponse {
    pub fn from_asset(asset: &MediaAsset, api_prefix: &str) -> Self {
        Self {
            id: asset.id,
            owner: asset.owner,
            agent_id: asset.agent_id,
            file_name: asset.file_name.clone(),
            original_file_name: asset.original_file_name.clone(),
            content_type: asset.content_type.clone(),
            size_bytes: asset.size_bytes,
            class: asset.class,
            category: asset.category,
            title: asset.title.clone(),
            description: asset.description.clone(),
            is_primary: asset.is_primary,
            sort_order: asset.sort_order,
            width: asset.width,
            height: asset.height,
            created_at: asset.created_at,
            file_url: format!("{}/media/{}/file", api_prefix, asset.id),
            thumbnail_url: asset
                .thumbnail
                .as_ref()
                .map(|_| format!("{}/media/{}/thumbnail", api_prefix, asset.id)),
            thumbnail_data_uri: None,
        }
    }

    /// Detail view: same as `from_asset` plus the inline thumbnail URI.
    pub fn detail_from_asset(asset: &MediaAsset, api_prefix: &str) -> Self {
        let mut response = Self::from_asset(asset, api_prefix);
        response.thumbnail_data_uri = asset
            .thumbnail
            .as_ref()
            .map(|t| t.to_data_uri("image/jpeg"));
        response
    }
}
