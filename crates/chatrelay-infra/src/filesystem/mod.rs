//! Filesystem adapters for chatrelay.
//!
//! Resolves the data directory layout and implements the `MediaStore` port
//! from `chatrelay-core` on the local disk.

pub mod media;

use std::path::{Path, PathBuf};

/// Environment variable that overrides the data directory.
pub const DATA_DIR_ENV: &str = "CHATRELAY_DATA_DIR";

/// Resolve the data directory from environment or the working directory.
///
/// Priority:
/// 1. `CHATRELAY_DATA_DIR` environment variable
/// 2. Current working directory (the bridge is deployed as a project folder
///    holding `config.toml`, `prompts.json` and the database)
pub fn resolve_data_dir() -> PathBuf {
    if let Ok(dir) = std::env::var(DATA_DIR_ENV) {
        if !dir.trim().is_empty() {
            return PathBuf::from(dir);
        }
    }

    std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."))
}

/// Resolve a configured path: absolute paths are kept, relative ones are
/// joined onto `data_dir`.
pub fn resolve_path(data_dir: &Path, configured: &str) -> PathBuf {
    let path = Path::new(configured);
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        data_dir.join(path)
    }
}
