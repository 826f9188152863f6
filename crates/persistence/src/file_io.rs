//! File I/O helpers for loading, saving and modification tracking.

use std::path::Path;
use std::time::SystemTime;

use anyhow::{Context, Result};

use crate::{FileInfo, SaveResult};

/// One megabyte in bytes.
pub const MEGABYTE: u64 = 1024 * 1024;

/// Maximum file size that can be opened (50 MB).
pub const MAX_FILE_SIZE: u64 = 50 * MEGABYTE;

/// Title used when a path has no usable file name.
pub const UNTITLED: &str = "Untitled.md";

/// Read a text document.
///
/// Returns `Err` if the file is too large or cannot be read as UTF-8 text.
pub fn read_file(path: &Path) -> Result<FileInfo> {
    if let Ok(metadata) = std::fs::metadata(path) {
        if metadata.is_file() && metadata.len() > MAX_FILE_SIZE {
            return Err(anyhow::anyhow!(
                "File is too large to open ({:.1} MB). Maximum allowed size is {} MB.",
                metadata.len() as f64 / MEGABYTE as f64,
                MAX_FILE_SIZE / MEGABYTE
            ));
        }
    }

    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read file: {}", path.display()))?;

    Ok(FileInfo {
        path: path.to_string_lossy().into_owned(),
        content,
        name: path_to_title(path),
    })
}

/// Write the whole document to `path`.
pub fn save_file(path: &Path, content: &str) -> SaveResult {
    match std::fs::write(path, content) {
        Ok(()) => SaveResult::ok(),
        Err(e) => {
            log::warn!("Save failed for {}: {}", path.display(), e);
            SaveResult::failed(format!("Failed to save file: {}", e))
        }
    }
}

/// Check whether `path` exists.
pub fn file_exists(path: &Path) -> bool {
    path.exists()
}

/// Get current modification time of a file.
pub fn file_mtime(path: &Path) -> Option<SystemTime> {
    std::fs::metadata(path).ok().and_then(|m| m.modified().ok())
}

/// Check if file was modified externally by comparing modification times.
///
/// Returns `true` if `current_mtime > saved_mtime`.
pub fn was_modified_externally(path: &Path, saved_mtime: Option<SystemTime>) -> bool {
    let saved = match saved_mtime {
        Some(t) => t,
        None => return false,
    };

    file_mtime(path).is_some_and(|current| current > saved)
}

/// Extract file name from path for title display.
pub fn path_to_title(path: &Path) -> String {
    path.file_name()
        .and_then(|n| n.to_str())
        .map(|s| s.to_string())
        .unwrap_or_else(|| UNTITLED.to_string())
}
