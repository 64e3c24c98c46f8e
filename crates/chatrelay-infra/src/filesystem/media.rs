//! Local disk media store.
//!
//! Images are written to `{upload_dir}/image/{user_id}/{YYYYmmdd_HHMMSS_mmm}.jpg`.
//! The user id is reduced to `[A-Za-z0-9_-]` before it becomes a path
//! component, so a hostile id cannot escape `upload_dir`.

use std::path::{Path, PathBuf};

use chrono::Local;
use tracing::debug;

use chatrelay_core::storage::media::MediaStore;
use chatrelay_types::error::MediaError;

/// Writes downloaded media under an upload root via `tokio::fs`.
#[derive(Debug, Clone)]
pub struct LocalMediaStore {
    root: PathBuf,
}

impl LocalMediaStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Directory holding one user's images.
    pub fn image_dir(&self, user_id: &str) -> PathBuf {
        self.root.join("image").join(sanitize_component(user_id))
    }
}

impl MediaStore for LocalMediaStore {
    async fn save_image(&self, user_id: &str, bytes: &[u8]) -> Result<PathBuf, MediaError> {
        let dir = self.image_dir(user_id);
        tokio::fs::create_dir_all(&dir)
            .await
            .map_err(|e| MediaError::Storage(format!("{}: {e}", dir.display())))?;

        let stem = Local::now().format("%Y%m%d_%H%M%S_%3f").to_string();
        let mut path = dir.join(format!("{stem}.jpg"));
        // Two images from one user within the same millisecond.
        let mut n = 1;
        while tokio::fs::try_exists(&path).await.unwrap_or(false) {
            path = dir.join(format!("{stem}_{n}.jpg"));
            n += 1;
        }

        tokio::fs::write(&path, bytes)
            .await
            .map_err(|e| MediaError::Storage(format!("{}: {e}", path.display())))?;

        debug!(path = %path.display(), size = bytes.len(), "image stored");
        Ok(path)
    }
}

/// Keep ASCII alphanumerics, `_` and `-`; map everything else to `_`.
fn sanitize_component(raw: &str) -> String {
    let cleaned: String = raw
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '_' || c == '-' {
                c
            } else {
                '_'
            }
        })
        .collect();

    if cleaned.is_empty() {
        "unknown".to_string()
    } else {
        cleaned
    }
}
