//! Media retrieval and storage traits.
//!
//! Image messages arrive as a platform message id. The bytes are fetched
//! through a [`MediaSource`], persisted through a [`MediaStore`], and then
//! encoded as a self-contained `data:` URL for the inference request.
//! Implementations live in chatrelay-infra.

use std::path::PathBuf;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;

use chatrelay_types::error::MediaError;

/// Downloads the binary content attached to a platform message.
pub trait MediaSource: Send + Sync {
    fn fetch(
        &self,
        message_id: &str,
    ) -> impl std::future::Future<Output = Result<Vec<u8>, MediaError>> + Send;
}

/// Persists downloaded media under a per-user, timestamp-derived path.
pub trait MediaStore: Send + Sync {
    /// Write the bytes and return where they were stored.
    fn save_image(
        &self,
        user_id: &str,
        bytes: &[u8],
    ) -> impl std::future::Future<Output = Result<PathBuf, MediaError>> + Send;
}

/// Encode JPEG bytes as `data:image/jpeg;base64,...`.
pub fn jpeg_data_url(bytes: &[u8]) -> String {
    format!("data:image/jpeg;base64,{}", STANDARD.encode(bytes))
}
