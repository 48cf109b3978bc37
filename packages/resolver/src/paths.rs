//! Canonical file locations for the raw record cache and the resolved
//! label cache.
//!
//! All defaults are relative to the current working directory.

use std::path::{Path, PathBuf};

use crate::codec::RECORD_EXTENSION;

/// Default destination of the resolved label cache.
pub const DEFAULT_LABEL_CACHE_PATH: &str = "./output/fast_cache.json";

/// Returns the raw cache file for place `id` under `output_dir`.
#[must_use]
pub fn raw_record_path(output_dir: &Path, id: &str) -> PathBuf {
    output_dir.join(format!("{id}.{RECORD_EXTENSION}"))
}

/// Ensures a directory exists, creating it if necessary.
///
/// # Errors
///
/// Returns an I/O error if the directory cannot be created.
pub fn ensure_dir(path: &Path) -> std::io::Result<()> {
    if !path.as_os_str().is_empty() && !path.exists() {
        std::fs::create_dir_all(path)?;
    }
    Ok(())
}
