//! Configuration module
//!
//! Size/type policy, thumbnail parameters, and server settings are injected
//! from the environment; nothing here is consulted at hard-coded call sites.

use std::env;

// Defaults; every value can be overridden from the environment.
const DEFAULT_PORT: u16 = 3000;
const DEFAULT_MAX_IMAGE_SIZE_MB: usize = 10;
const DEFAULT_MAX_DOCUMENT_SIZE_MB: usize = 10;
const DEFAULT_THUMBNAIL_WIDTH: u32 = 320;
const DEFAULT_THUMBNAIL_HEIGHT: u32 = 240;
const DEFAULT_THUMBNAIL_QUALITY: u8 = 85;
const DEFAULT_DB_MAX_CONNECTIONS: u32 = 20;

/// Which asset repository backs the media store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RepositoryBackend {
    Postgres,
    Memory,
}

/// Per-asset-class upload policy.
#[derive(Clone, Debug)]
pub struct UploadPolicy {
    pub max_size_bytes: usize,
    pub allowed_extensions: Vec<String>,
    pub allowed_content_types: Vec<String>,
}

/// Thumbnail derivation parameters.
#[derive(Clone, Copy, Debug)]
pub struct ThumbnailConfig {
    pub width: u32,
    pub height: u32,
    pub preserve_aspect: bool,
    /// JPEG re-encode quality, 1-100.
    pub quality: u8,
}

#[derive(Clone, Debug)]
pub struct Config {
    pub server_port: u16,
    pub cors_origins: Vec<String>,
    pub environment: String,
    pub backend: RepositoryBackend,
    pub database_url: Option<String>,
    pub db_max_connections: u32,
    pub image_policy: UploadPolicy,
    pub document_policy: UploadPolicy,
    pub thumbnail: ThumbnailConfig,
}

fn env_parse<T: std::str::FromStr>(key: &str, default: T) -> T {
    env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

fn env_list(key: &str, default: &str) -> Vec<String> {
    env::var(key)
        .unwrap_or_else(|_| default.to_string())
        .split(',')
        .map(|s| s.trim().to_lowercase())
        .filter(|s| !s.is_empty())
        .collect()
}

impl Config {
    pub fn from_env() -> Result<Self, anyhow::Error> {
        dotenvy::dotenv().ok();

        let environment = env::var("ENVIRONMENT")
            .or_else(|_| env::var("APP_ENV"))
            .unwrap_or_else(|_| "development".to_string());

        let backend = match env::var("MEDIA_BACKEND")
            .unwrap_or_else(|_| "postgres".to_string())
            .to_lowercase()
            .as_str()
        {
            "memory" => RepositoryBackend::Memory,
            _ => RepositoryBackend::Postgres,
        };

        let image_policy = UploadPolicy {
            max_size_bytes: env_parse("MAX_IMAGE_SIZE_MB", DEFAULT_MAX_IMAGE_SIZE_MB)
                * 1024
                * 1024,
            allowed_extensions: env_list("IMAGE_ALLOWED_EXTENSIONS", "jpg,jpeg,png,gif,webp"),
            allowed_content_types: env_list(
                "IMAGE_ALLOWED_CONTENT_TYPES",
                "image/jpeg,image/png,image/gif,image/webp",
            ),
        };

        let document_policy = UploadPolicy {
            max_size_bytes: env_parse("MAX_DOCUMENT_SIZE_MB", DEFAULT_MAX_DOCUMENT_SIZE_MB)
                * 1024
                * 1024,
            allowed_extensions: env_list(
                "DOCUMENT_ALLOWED_EXTENSIONS",
                "pdf,doc,docx,xls,xlsx,txt,csv,zip",
            ),
            allowed_content_types: env_list(
                "DOCUMENT_ALLOWED_CONTENT_TYPES",
                "application/pdf,application/msword,\
                 application/vnd.openxmlformats-officedocument.wordprocessingml.document,\
                 application/vnd.ms-excel,\
                 application/vnd.openxmlformats-officedocument.spreadsheetml.sheet,\
                 text/plain,text/csv,application/zip",
            ),
        };

        let thumbnail = ThumbnailConfig {
            width: env_parse("THUMBNAIL_WIDTH", DEFAULT_THUMBNAIL_WIDTH),
            height: env_parse("THUMBNAIL_HEIGHT", DEFAULT_THUMBNAIL_HEIGHT),
            preserve_aspect: env_parse("THUMBNAIL_PRESERVE_ASPECT", true),
            quality: env_parse("THUMBNAIL_QUALITY", DEFAULT_THUMBNAIL_QUALITY),
        };

        let config = Config {
            server_port: env_parse("PORT", DEFAULT_PORT),
            cors_origins: env_list("CORS_ORIGINS", "*"),
            environment,
            backend,
            database_url: env::var("DATABASE_URL").ok(),
            db_max_connections: env_parse("DB_MAX_CONNECTIONS", DEFAULT_DB_MAX_CONNECTIONS),
            image_policy,
            document_policy,
            thumbnail,
        };

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), anyhow::Error> {
        if self.backend == RepositoryBackend::Postgres && self.database_url.is_none() {
            anyhow::bail!("DATABASE_URL is required when MEDIA_BACKEND=postgres");
        }
        if self.thumbnail.width == 0 || self.thumbnail.height == 0 {
            anyhow::bail!("Thumbnail dimensions must be non-zero");
        }
        if self.thumbnail.quality == 0 || self.thumbnail.quality > 100 {
            anyhow::bail!("THUMBNAIL_QUALITY must be in 1..=100");
        }
        if self.image_policy.max_size_bytes == 0 || self.document_policy.max_size_bytes == 0 {
            anyhow::bail!("Upload size limits must be non-zero");
        }
        Ok(())
    }

    pub fn is_production(&self) -> bool {
        matches!(self.environment.to_lowercase().as_str(), "production" | "prod")
    }

    /// Body limit for the HTTP layer: the larger class limit plus multipart
    /// framing headroom.
    pub fn max_upload_body_bytes(&self) -> usize {
        self.image_policy
            .max_size_bytes
            .max(self.document_policy.max_size_bytes)
            + 64 * 1024
    }

    /// Policy for an upload, chosen by the declared content type.
    pub fn policy_for_content_type(&self, content_type: &str) -> &UploadPolicy {
        if content_type.starts_with("image/") {
            &self.image_policy
        } else {
            &self.document_policy
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_config() -> Config {
        Config {
            server_port: 3000,
            cors_origins: vec!["*".to_string()],
            environment: "test".to_string(),
            backend: RepositoryBackend::Memory,
            database_url: None,
            db_max_connections: 5,
            image_policy: UploadPolicy {
                max_size_bytes: 10 * 1024 * 1024,
                allowed_extensions: vec!["jpg".into(), "png".into()],
                allowed_content_types: vec!["image/jpeg".into(), "image/png".into()],
            },
            document_policy: UploadPolicy {
                max_size_bytes: 10 * 1024 * 1024,
                allowed_extensions: vec!["pdf".into()],
                allowed_content_types: vec!["application/pdf".into()],
            },
            thumbnail: ThumbnailConfig {
                width: 320,
                height: 240,
                preserve_aspect: true,
                quality: 85,
            },
        }
    }

    #[test]
    fn test_policy_selection_by_content_type() {
        let config = test_config();
        assert!(config
            .policy_for_content_type("image/png")
            .allowed_extensions
            .contains(&"jpg".to_string()));
        assert!(config
            .policy_for_content_type("application/pdf")
            .allowed_extensions
            .contains(&"pdf".to_string()));
    }

    #[test]
    fn test_validate_rejects_missing_database_url() {
        let mut config = test_config();
        config.backend = RepositoryBackend::Postgres;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_bad_quality() {
        let mut config = test_config();
        config.thumbnail.quality = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_body_limit_exceeds_class_limits() {
        let config = test_config();
        assert!(config.max_upload_body_bytes() > config.image_policy.max_size_bytes);
    }
}
