//! Configuration structures for mdpad settings.

use serde::{Deserialize, Serialize};

use crate::defaults;

/// Application configuration with nested sections.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Editing and history settings
    #[serde(default)]
    pub editor: EditorSettings,

    /// Automatic save settings
    #[serde(default)]
    pub autosave: AutosaveSettings,

    /// Logging settings
    #[serde(default)]
    pub logging: LoggingSettings,
}

/// Editor settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EditorSettings {
    /// Maximum number of undo snapshots
    #[serde(default = "default_history_size")]
    pub history_size: usize,

    /// Quiet period before a burst of edits becomes one undo step
    #[serde(default = "default_edit_debounce_ms")]
    pub edit_debounce_ms: u64,
}

/// Autosave settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AutosaveSettings {
    /// Save automatically once edits settle
    #[serde(default = "default_autosave_enabled")]
    pub enabled: bool,

    /// Quiet period before an autosave starts
    #[serde(default = "default_autosave_delay_ms")]
    pub delay_ms: u64,
}

/// Logging settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoggingSettings {
    /// Log file path (optional, defaults to the data directory)
    #[serde(default)]
    pub file_path: Option<String>,

    /// Minimum log level (debug, info, warn, error)
    #[serde(default = "default_min_level")]
    pub min_level: String,

    /// Number of log entries kept in memory
    #[serde(default = "default_max_entries")]
    pub max_entries: usize,
}

// Default value functions for serde
fn default_history_size() -> usize {
    defaults::HISTORY_SIZE
}

fn default_edit_debounce_ms() -> u64 {
    defaults::EDIT_DEBOUNCE_MS
}

fn default_autosave_enabled() -> bool {
    defaults::AUTOSAVE_ENABLED
}

fn default_autosave_delay_ms() -> u64 {
    defaults::AUTOSAVE_DELAY_MS
}

fn default_min_level() -> String {
    defaults::MIN_LOG_LEVEL.to_string()
}

fn default_max_entries() -> usize {
    defaults::LOG_MAX_ENTRIES
}

impl Default for EditorSettings {
    fn default() -> Self {
        Self {
            history_size: default_history_size(),
            edit_debounce_ms: default_edit_debounce_ms(),
        }
    }
}

impl Default for AutosaveSettings {
    fn default() -> Self {
        Self {
            enabled: default_autosave_enabled(),
            delay_ms: default_autosave_delay_ms(),
        }
    }
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            file_path: None,
            min_level: default_min_level(),
            max_entries: default_max_entries(),
        }
    }
}
