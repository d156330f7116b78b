use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

/// Kind of entity a media asset is attached to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(
    feature = "sqlx",
    sqlx(type_name = "owner_kind", rename_all = "lowercase")
)]
#[serde(rename_all = "lowercase")]
pub enum OwnerKind {
    Property,
    Client,
}

/// Owning entity reference. Every asset belongs to exactly one owner; the
/// enum makes the "neither or both" states unrepresentable.
///
/// Ownership is a lookup relation, not a live back-reference: the store is
/// queried with "assets where owner = X" and no owner object holds the
/// collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(tag = "kind", content = "id", rename_all = "lowercase")]
pub enum OwnerRef {
    Property(Uuid),
    Client(Uuid),
}

impl OwnerRef {
    pub fn kind(&self) -> OwnerKind {
        match self {
            OwnerRef::Property(_) => OwnerKind::Property,
            OwnerRef::Client(_) => OwnerKind::Client,
        }
    }

    pub fn id(&self) -> Uuid {
        match self {
            OwnerRef::Property(id) | OwnerRef::Client(id) => *id,
        }
    }

    pub fn from_parts(kind: OwnerKind, id: Uuid) -> Self {
        match kind {
            OwnerKind::Property => OwnerRef::Property(id),
            OwnerKind::Client => OwnerRef::Client(id),
        }
    }
}

impl std::fmt::Display for OwnerRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OwnerRef::Property(id) => write!(f, "property/{}", id),
            OwnerRef::Client(id) => write!(f, "client/{}", id),
        }
    }
}
