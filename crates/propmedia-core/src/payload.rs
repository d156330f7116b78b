//! Opaque encoded payload handling.
//!
//! Asset content is persisted as a base64 text column. `EncodedPayload` keeps
//! that column opaque: callers move bytes in and out through `encode`/`decode`
//! and never touch the encoded text directly, so already-encoded data cannot
//! be re-encoded by accident.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use serde::{Deserialize, Serialize};

/// Base64-encoded binary content as stored in the database.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EncodedPayload(String);

#[derive(Debug, thiserror::Error)]
pub enum PayloadError {
    #[error("Stored payload is not valid base64: {0}")]
    Corrupt(#[from] base64::DecodeError),
}

impl EncodedPayload {
    /// Encode raw bytes for storage. Lossless for every byte sequence,
    /// including the empty one; length policy is the validator's concern.
    pub fn encode(bytes: &[u8]) -> Self {
        Self(STANDARD.encode(bytes))
    }

    /// Wrap text that is already encoded (database read path). No validation
    /// happens here; a corrupt column surfaces as `PayloadError` on decode.
    pub fn from_encoded(encoded: String) -> Self {
        Self(encoded)
    }

    /// Decode back to the original bytes.
    pub fn decode(&self) -> Result<Vec<u8>, PayloadError> {
        Ok(STANDARD.decode(&self.0)?)
    }

    /// The encoded text, for binding into a database column.
    pub fn as_encoded_str(&self) -> &str {
        &self.0
    }

    pub fn into_encoded(self) -> String {
        self.0
    }

    /// Length of the encoded text (~4/3 of the original byte length).
    pub fn encoded_len(&self) -> usize {
        self.0.len()
    }

    /// Self-contained `data:` URI a display surface can use without a
    /// separate fetch.
    pub fn to_data_uri(&self, content_type: &str) -> String {
        format!("data:{};base64,{}", content_type, self.0)
    }
}
