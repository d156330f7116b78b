//! OpenAPI document assembly.

use utoipa::OpenApi;

use crate::error::ErrorResponse;
use crate::handlers;
use propmedia_core::models::{
    AssetCategory, AssetClass, MediaAssetResponse, OwnerKind, OwnerRef, UpdateAssetDetails,
};

#[derive(OpenApi)]
#[openapi(
    paths(
        handlers::upload::upload_media,
        handlers::media_get::list_media,
        handlers::media_get::get_media,
        handlers::media_get::get_primary_media,
        handlers::media_download::download_media_file,
        handlers::media_download::download_media_thumbnail,
        handlers::media_update::set_primary_media,
        handlers::media_update::reorder_media,
        handlers::media_update::update_media,
        handlers::media_delete::delete_media,
        handlers::media_delete::delete_owner_media,
    ),
    components(schemas(
        MediaAssetResponse,
        UpdateAssetDetails,
        AssetCategory,
        AssetClass,
        OwnerKind,
        OwnerRef,
        ErrorResponse,
    )),
    tags(
        (name = "media", description = "Property media and document attachment storage")
    )
)]
pub struct ApiDoc;

pub fn get_openapi_spec() -> utoipa::openapi::OpenApi {
    ApiDoc::openapi()
}
