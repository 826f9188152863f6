//! Configuration management for mdpad.
//!
//! This crate provides configuration loading, saving, and validation
//! with support for TOML format and XDG directory conventions.

mod settings;
mod xdg;

pub use settings::{AutosaveSettings, Config, EditorSettings, LoggingSettings};
pub use xdg::{get_config_dir, get_data_dir};

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Default values as constants
pub mod defaults {
    pub const HISTORY_SIZE: usize = 100;
    pub const EDIT_DEBOUNCE_MS: u64 = 500;
    pub const AUTOSAVE_ENABLED: bool = true;
    pub const AUTOSAVE_DELAY_MS: u64 = 2000;
    pub const MIN_LOG_LEVEL: &str = "info";
    pub const LOG_MAX_ENTRIES: usize = 1000;
    pub const LOG_FILE_NAME: &str = "mdpad.log";
}

impl Config {
    /// Load configuration from the user's config file.
    ///
    /// On first run, creates the config file with default values.
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_file_path()?)
    }

    /// Load configuration from `path`.
    ///
    /// A missing file is created with defaults. Missing keys are filled in with
    /// defaults and written back so the file always shows every setting.
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            let config = Self::default();
            config.save_to(path)?;
            return Ok(config);
        }

        let original_content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config: {}", path.display()))?;
        let config = Self::validate_content(&original_content)?;

        // Serialize back to get normalized content
        let normalized_content = toml::to_string_pretty(&config)?;
        if original_content != normalized_content {
            config.save_to(path)?;
        }

        Ok(config)
    }

    /// Save configuration to the user's config file.
    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_file_path()?)
    }

    /// Save configuration to `path`.
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)
            .with_context(|| format!("Failed to write config: {}", path.display()))?;
        Ok(())
    }

    /// Get path to config file.
    pub fn config_file_path() -> Result<PathBuf> {
        Ok(get_config_dir()?.join("config.toml"))
    }

    /// Validate config content.
    pub fn validate_content(content: &str) -> Result<Config> {
        toml::from_str(content).map_err(|e| anyhow::anyhow!("{}", e))
    }

    /// Resolved log file path: the configured one, or `mdpad.log` in the data directory.
    pub fn log_file_path(&self) -> Option<PathBuf> {
        match &self.logging.file_path {
            Some(path) => Some(PathBuf::from(path)),
            None => get_data_dir()
                .ok()
                .map(|dir| dir.join(defaults::LOG_FILE_NAME)),
        }
    }
}

impl EditorSettings {
    /// Edit debounce as a duration.
    pub fn edit_debounce(&self) -> Duration {
        Duration::from_millis(self.edit_debounce_ms)
    }
}

impl AutosaveSettings {
    /// Autosave delay as a duration.
    pub fn delay(&self) -> Duration {
        Duration::from_millis(self.delay_ms)
    }
}
