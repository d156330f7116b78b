use propmedia_core::UploadPolicy;
use std::path::Path;

/// Validation errors surfaced to the caller before anything is persisted.
#[derive(Debug, thiserror::Error)]
pub enum ValidationError {
    #[error("Empty file")]
    EmptyFile,

    #[error("File too large: {size} bytes (max: {max} bytes)")]
    FileTooLarge { size: usize, max: usize },

    #[error("Unsupported content type: {content_type} (allowed: {allowed:?})")]
    UnsupportedType {
        content_type: String,
        allowed: Vec<String>,
    },

    #[error("File extension '{extension}' is not acceptable: {reason}")]
    ExtensionMismatch { extension: String, reason: String },

    #[error("Unsafe file name: {0}")]
    UnsafeFileName(String),
}

/// Outcome of a successful validation: the sanitized storage name, the name
/// the uploader supplied, and the normalized content type.
#[derive(Debug, Clone)]
pub struct ValidatedUpload {
    pub file_name: String,
    pub original_file_name: String,
    pub content_type: String,
    pub extension: String,
    pub size_bytes: usize,
}

/// Upload validator for one asset class.
///
/// Pure checks against the injected policy; does not touch storage.
pub struct MediaValidator {
    policy: UploadPolicy,
}

impl MediaValidator {
    pub fn new(policy: UploadPolicy) -> Self {
        Self { policy }
    }

    /// Run every check and produce a `ValidatedUpload`.
    pub fn validate(
        &self,
        file_name: &str,
        content_type: &str,
        size: usize,
    ) -> Result<ValidatedUpload, ValidationError> {
        self.validate_size(size)?;
        let sanitized = sanitize_file_name(file_name)?;
        let extension = self.validate_extension(&sanitized)?;
        let normalized = self.validate_content_type(content_type)?;
        validate_extension_content_type_match(&extension, &normalized)?;
        Ok(ValidatedUpload {
            file_name: sanitized,
            original_file_name: file_name.to_string(),
            content_type: normalized,
            extension,
            size_bytes: size,
        })
    }

    pub fn validate_size(&self, size: usize) -> Result<(), ValidationError> {
        if size == 0 {
            return Err(ValidationError::EmptyFile);
        }
        if size > self.policy.max_size_bytes {
            return Err(ValidationError::FileTooLarge {
                size,
                max: self.policy.max_size_bytes,
            });
        }
        Ok(())
    }

    /// Extension must exist and be allow-listed. Returned lowercased.
    pub fn validate_extension(&self, file_name: &str) -> Result<String, ValidationError> {
        let extension = Path::new(file_name)
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_lowercase())
            .ok_or_else(|| ValidationError::ExtensionMismatch {
                extension: "none".to_string(),
                reason: "file name has no extension".to_string(),
            })?;

        if !self.policy.allowed_extensions.contains(&extension) {
            return Err(ValidationError::ExtensionMismatch {
                extension,
                reason: format!("allowed: {:?}", self.policy.allowed_extensions),
            });
        }
        Ok(extension)
    }

    /// Content type must be allow-listed. Returned lowercased.
    pub fn validate_content_type(&self, content_type: &str) -> Result<String, ValidationError> {
        let normalized = content_type.to_lowercase();
        if !self
            .policy
            .allowed_content_types
            .iter()
            .any(|ct| ct == &normalized)
        {
            return Err(ValidationError::UnsupportedType {
                content_type: content_type.to_string(),
                allowed: self.policy.allowed_content_types.clone(),
            });
        }
        Ok(normalized)
    }
}

/// Strip path separators and control characters; names still carrying `..`
/// segments afterwards are rejected (path-traversal defense).
pub fn sanitize_file_name(name: &str) -> Result<String, ValidationError> {
    let cleaned: String = name
        .chars()
        .filter(|c| !c.is_control() && *c != '/' && *c != '\\')
        .collect();
    let cleaned = cleaned.trim().to_string();

    if cleaned.is_empty() {
        return Err(ValidationError::UnsafeFileName(name.to_string()));
    }
    if cleaned.contains("..") {
        return Err(ValidationError::UnsafeFileName(name.to_string()));
    }
    Ok(cleaned)
}

/// Cross-check the declared Content-Type against the file extension. This
/// prevents spoofing where a file is uploaded under a legitimate type with a
/// mismatched name.
fn validate_extension_content_type_match(
    extension: &str,
    content_type: &str,
) -> Result<(), ValidationError> {
    let expected: &[&str] = match extension {
        "jpg" | "jpeg" => &["image/jpeg"],
        "png" => &["image/png"],
        "gif" => &["image/gif"],
        "webp" => &["image/webp"],
        "pdf" => &["application/pdf"],
        "doc" => &["application/msword"],
        "docx" => &["application/vnd.openxmlformats-officedocument.wordprocessingml.document"],
        "xls" => &["application/vnd.ms-excel"],
        "xlsx" => &["application/vnd.openxmlformats-officedocument.spreadsheetml.sheet"],
        "txt" => &["text/plain"],
        "csv" => &["text/csv"],
        "zip" => &["application/zip"],
        _ => {
            // Unknown extensions are still validated individually against the
            // allow-lists; only the cross-check is skipped.
            tracing::debug!(
                extension = %extension,
                content_type = %content_type,
                "Unknown extension, skipping content-type cross-check"
            );
            return Ok(());
        }
    };

    if !expected.iter().any(|ct| *ct == content_type) {
        return Err(ValidationError::ExtensionMismatch {
            extension: extension.to_string(),
            reason: format!(
                "declared content type {} does not correspond (expected one of: {})",
                content_type,
                expected.join(", ")
            ),
        });
    }
    Ok(())
}
