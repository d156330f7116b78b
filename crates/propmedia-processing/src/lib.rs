//! Upload-side processing: validation and thumbnail derivation.
//!
//! Everything in this crate is pure with respect to its inputs; persistence
//! happens in `propmedia-db` after these checks pass.

pub mod thumbnail;
pub mod validator;

pub use thumbnail::{ThumbnailError, ThumbnailOutput, Thumbnailer};
pub use validator::{MediaValidator, ValidatedUpload, ValidationError};
