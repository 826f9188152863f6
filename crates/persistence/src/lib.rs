//! Document persistence for mdpad.
//!
//! The editor core only talks to the [`Persistence`] trait. Saves are
//! asynchronous: [`Persistence::save`] hands back a [`PendingSave`] that the
//! caller polls on later ticks.

mod file_io;
mod pending;

pub use file_io::{
    file_exists, file_mtime, path_to_title, read_file, save_file, was_modified_externally,
    MAX_FILE_SIZE, MEGABYTE, UNTITLED,
};
pub use pending::{PendingSave, SaveCompleter};

use std::path::{Path, PathBuf};

use anyhow::Result;
use serde::{Deserialize, Serialize};

/// A document read from storage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileInfo {
    pub path: String,
    pub content: String,
    pub name: String,
}

/// Outcome of a save.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SaveResult {
    pub success: bool,
    pub error: Option<String>,
}

impl SaveResult {
    /// Successful save.
    pub fn ok() -> Self {
        Self {
            success: true,
            error: None,
        }
    }

    /// Failed save with a message.
    pub fn failed(error: impl Into<String>) -> Self {
        Self {
            success: false,
            error: Some(error.into()),
        }
    }
}

/// Storage backend used by the editor.
pub trait Persistence {
    /// Read the document at `path`.
    fn open(&self, path: &Path) -> Result<FileInfo>;

    /// Start writing `content` to `path`.
    fn save(&self, path: &Path, content: String) -> PendingSave;
}

/// Local file system storage. Writes run on a background thread.
#[derive(Debug, Clone, Copy, Default)]
pub struct FsPersistence;

impl Persistence for FsPersistence {
    fn open(&self, path: &Path) -> Result<FileInfo> {
        read_file(path)
    }

    fn save(&self, path: &Path, content: String) -> PendingSave {
        let (completer, pending) = PendingSave::channel();
        let target: PathBuf = path.to_path_buf();

        let spawned = std::thread::Builder::new()
            .name("mdpad-save".to_string())
            .spawn(move || completer.complete(save_file(&target, &content)));

        match spawned {
            Ok(_) => pending,
            Err(e) => {
                log::warn!("Failed to spawn save thread: {}", e);
                PendingSave::ready(SaveResult::failed(format!(
                    "Failed to save file: {}",
                    e
                )))
            }
        }
    }
}
