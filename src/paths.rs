//! Common paths for assetdeck data storage
//!
//! All data is stored under ~/.config/assetdeck/ on all platforms:
//! - config.toml - User configuration
//! - assets.json - Local asset catalog (used when no feed URL is set)

use anyhow::{Context, Result};
use std::fs;
use std::path::PathBuf;

/// Get the assetdeck data directory (~/.config/assetdeck/)
///
/// This is consistent across all platforms for simplicity.
pub fn assetdeck_dir() -> Result<PathBuf> {
    let home = dirs::home_dir().context("Could not determine home directory")?;
    let dir = home.join(".config").join("assetdeck");
    fs::create_dir_all(&dir).context("Failed to create assetdeck directory")?;
    Ok(dir)
}

/// Get the config file path (~/.config/assetdeck/config.toml)
pub fn config_path() -> Result<PathBuf> {
    Ok(assetdeck_dir()?.join("config.toml"))
}

/// Get the local catalog path (~/.config/assetdeck/assets.json)
pub fn catalog_path() -> Result<PathBuf> {
    Ok(assetdeck_dir()?.join("assets.json"))
}
