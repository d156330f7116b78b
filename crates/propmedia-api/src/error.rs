//! HTTP error response conversion
//!
//! Handlers return `Result<impl IntoResponse, HttpAppError>`. `AppError` (and
//! the processing error types) convert into `HttpAppError` so every failure
//! renders consistently: status from the error metadata, JSON body, log line
//! at the error's level.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use propmedia_core::{AppError, ErrorMetadata, LogLevel};
use propmedia_processing::ValidationError;
use serde::Serialize;
use utoipa::ToSchema;

#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorResponse {
    pub error: String,
    /// Machine-readable error code for programmatic handling
    pub code: String,
    /// Whether this error is recoverable (can be retried)
    pub recoverable: bool,
}

/// Wrapper for AppError to implement IntoResponse. Needed because of Rust's
/// orphan rules: IntoResponse is external and AppError lives in
/// propmedia-core.
#[derive(Debug)]
pub struct HttpAppError(pub AppError);

impl From<AppError> for HttpAppError {
    fn from(err: AppError) -> Self {
        HttpAppError(err)
    }
}

impl From<anyhow::Error> for HttpAppError {
    fn from(err: anyhow::Error) -> Self {
        HttpAppError(AppError::InternalWithSource {
            message: err.to_string(),
            source: err,
        })
    }
}

/// Validation failures surface before any persistence; size violations map
/// to 413, unknown types to 415, the rest to 400.
impl From<ValidationError> for HttpAppError {
    fn from(err: ValidationError) -> Self {
        let app = match &err {
            ValidationError::FileTooLarge { .. } => AppError::PayloadTooLarge(err.to_string()),
            ValidationError::UnsupportedType { .. } => {
                AppError::UnsupportedMediaType(err.to_string())
            }
            _ => AppError::InvalidInput(err.to_string()),
        };
        HttpAppError(app)
    }
}

impl IntoResponse for HttpAppError {
    fn into_response(self) -> Response {
        let err = self.0;
        let status = StatusCode::from_u16(err.http_status_code())
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

        match err.log_level() {
            LogLevel::Debug => {
                tracing::debug!(error = %err, code = err.error_code(), "Request rejected")
            }
            LogLevel::Warn => {
                tracing::warn!(error = %err, code = err.error_code(), "Request failed")
            }
            LogLevel::Error => {
                tracing::error!(error = %err, code = err.error_code(), "Request failed")
            }
        }

        let body = ErrorResponse {
            error: err.client_message(),
            code: err.error_code().to_string(),
            recoverable: err.is_recoverable(),
        };
        (status, Json(body)).into_response()
    }
}
