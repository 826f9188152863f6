//! XDG Base Directory support for mdpad.

use anyhow::{Context, Result};
use std::path::PathBuf;

const APP_NAME: &str = "mdpad";

/// Get the configuration directory following XDG conventions.
///
/// Returns `$XDG_CONFIG_HOME/mdpad` or `~/.config/mdpad`.
pub fn get_config_dir() -> Result<PathBuf> {
    dirs::config_dir()
        .map(|p| p.join(APP_NAME))
        .context("Failed to determine config directory")
}

/// Get the data directory following XDG conventions.
///
/// Returns `$XDG_DATA_HOME/mdpad` or `~/.local/share/mdpad`.
pub fn get_data_dir() -> Result<PathBuf> {
    dirs::data_dir()
        .map(|p| p.join(APP_NAME))
        .context("Failed to determine data directory")
}
