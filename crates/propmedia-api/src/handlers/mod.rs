pub mod media_delete;
pub mod media_download;
pub mod media_get;
pub mod media_update;
pub mod upload;

use propmedia_core::models::OwnerRef;
use propmedia_core::AppError;
use uuid::Uuid;

use crate::error::HttpAppError;

/// Map an owner path segment (`properties` or `clients`) to a typed owner
/// reference.
pub(crate) fn parse_owner(kind: &str, id: Uuid) -> Result<OwnerRef, HttpAppError> {
    match kind {
        "properties" => Ok(OwnerRef::Property(id)),
        "clients" => Ok(OwnerRef::Client(id)),
        other => Err(HttpAppError(AppError::NotFound(format!(
            "Unknown owner collection '{}'",
            other
        )))),
    }
}
