//! Thumbnail derivation.
//!
//! Decodes an accepted original image, fits it to the configured box, and
//! re-encodes as JPEG at the configured quality. A decode failure is
//! non-fatal to the upload: the asset is stored without a thumbnail.

use bytes::Bytes;
use image::codecs::jpeg::JpegEncoder;
use image::imageops::FilterType;
use image::{GenericImageView, ImageReader};
use propmedia_core::ThumbnailConfig;
use std::io::Cursor;

#[derive(Debug, thiserror::Error)]
pub enum ThumbnailError {
    #[error("Failed to decode image: {0}")]
    DecodeFailed(String),

    #[error("Failed to encode thumbnail: {0}")]
    EncodeFailed(String),
}

/// Derived preview plus the original's pixel dimensions.
#[derive(Debug, Clone)]
pub struct ThumbnailOutput {
    pub jpeg: Bytes,
    pub source_width: u32,
    pub source_height: u32,
}

pub struct Thumbnailer {
    config: ThumbnailConfig,
}

impl Thumbnailer {
    pub fn new(config: ThumbnailConfig) -> Self {
        Self { config }
    }

    /// Derive a thumbnail from raw image bytes. Pure with respect to inputs;
    /// callers run this before taking any owner-level lock.
    pub fn derive(&self, data: &[u8]) -> Result<ThumbnailOutput, ThumbnailError> {
        let reader = ImageReader::new(Cursor::new(data))
            .with_guessed_format()
            .map_err(|e| ThumbnailError::DecodeFailed(e.to_string()))?;
        let img = reader
            .decode()
            .map_err(|e| ThumbnailError::DecodeFailed(e.to_string()))?;

        let (source_width, source_height) = img.dimensions();
        let ThumbnailConfig { width, height, .. } = self.config;

        let resized = if self.config.preserve_aspect {
            if source_width <= width && source_height <= height {
                // Already fits the box; keep native size rather than upscale.
                img
            } else {
                let filter = select_filter(source_width, source_height, width, height);
                img.resize(width, height, filter)
            }
        } else {
            let filter = select_filter(source_width, source_height, width, height);
            img.resize_exact(width, height, filter)
        };

        // JPEG carries no alpha channel.
        let rgb = resized.to_rgb8();
        let mut buf = Vec::new();
        let mut encoder = JpegEncoder::new_with_quality(&mut buf, self.config.quality);
        encoder
            .encode_image(&rgb)
            .map_err(|e| ThumbnailError::EncodeFailed(e.to_string()))?;

        Ok(ThumbnailOutput {
            jpeg: Bytes::from(buf),
            source_width,
            source_height,
        })
    }

    /// Probe pixel dimensions without deriving anything. Returns `None` for
    /// undecodable data.
    pub fn probe_dimensions(data: &[u8]) -> Option<(u32, u32)> {
        let reader = ImageReader::new(Cursor::new(data))
            .with_guessed_format()
            .ok()?;
        let img = reader.decode().ok()?;
        Some(img.dimensions())
    }
}

/// Pick a resize filter by downscale ratio: cheap filters for heavy
/// reductions, Lanczos for near-1:1 work.
fn select_filter(orig_width: u32, orig_height: u32, new_width: u32, new_height: u32) -> FilterType {
    let width_ratio = orig_width as f32 / new_width as f32;
    let height_ratio = orig_height as f32 / new_height as f32;
    let max_ratio = width_ratio.max(height_ratio);

    if max_ratio > 2.0 {
        FilterType::Triangle
    } else if max_ratio > 1.5 {
        FilterType::CatmullRom
    } else {
        FilterType::Lanczos3
    }
}
