//! Core domain types for the propmedia service.
//!
//! This crate holds the media asset model, the encoded payload codec, the
//! unified error type, and environment-driven configuration. It has no
//! persistence or HTTP dependencies; those live in `propmedia-db` and
//! `propmedia-api`.

pub mod config;
pub mod error;
pub mod models;
pub mod payload;

pub use config::{Config, RepositoryBackend, ThumbnailConfig, UploadPolicy};
pub use error::{AppError, ErrorMetadata, LogLevel};
pub use payload::{EncodedPayload, PayloadError};
