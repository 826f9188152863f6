//! Editor command types.
//!
//! Menus and key bindings send these to the controller instead of calling into
//! it directly, so every trigger source goes through one dispatch point.

use std::path::PathBuf;

use mdpad_history::HistoryStats;

use crate::autosave::SaveRequest;

/// Commands that can be sent to a document controller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditorCommand {
    /// Step back in history.
    /// Response: `CommandResult::ContentReplaced` or `CommandResult::None`
    Undo,

    /// Step forward in history.
    /// Response: `CommandResult::ContentReplaced` or `CommandResult::None`
    Redo,

    /// Save to the current path.
    /// Response: `CommandResult::Save(..)`
    Save,

    /// Save to a new path and keep editing it.
    /// Response: `CommandResult::Save(..)`
    SaveAs(PathBuf),

    /// Replace the document with a file.
    /// Response: `CommandResult::ContentReplaced` or `CommandResult::Error`
    Open(PathBuf),

    /// Replace the document with an empty, pathless one.
    /// Response: `CommandResult::ContentReplaced`
    NewDocument,

    /// Query modification status.
    /// Response: `CommandResult::ModificationStatus { .. }`
    GetModificationStatus,

    /// Query history sizes.
    /// Response: `CommandResult::HistoryStats(..)`
    GetHistoryStats,
}

/// Result of handling an editor command.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum CommandResult {
    /// Nothing changed (e.g. undo with empty history).
    #[default]
    None,

    /// The input widget must show this content.
    ContentReplaced(String),

    /// Answer to a save request.
    Save(SaveRequest),

    /// Editor modification status.
    ModificationStatus {
        /// Whether the document has unsaved changes
        is_dirty: bool,
        /// Whether the file was modified externally
        has_external_change: bool,
    },

    /// History sizes.
    HistoryStats(HistoryStats),

    /// Command failed.
    Error(String),
}

impl CommandResult {
    /// Content the input widget must display, if the command replaced it.
    pub fn replaced_content(&self) -> Option<&str> {
        match self {
            CommandResult::ContentReplaced(content) => Some(content),
            _ => None,
        }
    }

    /// Get modification status from result, if present.
    pub fn modification_status(&self) -> Option<(bool, bool)> {
        match self {
            CommandResult::ModificationStatus {
                is_dirty,
                has_external_change,
            } => Some((*is_dirty, *has_external_change)),
            _ => None,
        }
    }
}
