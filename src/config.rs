//! Configuration module for assetdeck

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::theme::Theme;
use crate::thumbnail::RenderOptions;

/// Application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Selected theme
    #[serde(default)]
    pub theme: Theme,

    /// Base URL of the asset pipeline API (takes precedence over the catalog)
    #[serde(default)]
    pub feed_url: Option<String>,

    /// JSON catalog to read when no feed URL is set
    #[serde(default)]
    pub catalog_path: Option<PathBuf>,

    /// Poll interval in seconds (0 = manual only)
    #[serde(default = "default_poll_interval")]
    pub poll_interval_secs: u64,

    /// Number of decoded thumbnails kept in memory
    #[serde(default = "default_image_cache_size")]
    pub image_cache_size: usize,

    /// Seconds a cached thumbnail stays valid
    #[serde(default = "default_image_cache_ttl")]
    pub image_cache_ttl_secs: u64,

    /// Frames a fade-in lasts (0 disables fading)
    #[serde(default = "default_fade_ticks")]
    pub fade_ticks: u16,

    /// Blur radius for provisional previews
    #[serde(default = "default_blur_sigma")]
    pub blur_sigma: f32,

    /// Show a progress indicator while generation is running
    #[serde(default = "default_true")]
    pub show_progress: bool,

    /// Draw thumbnails with terminal graphics
    #[serde(default = "default_true")]
    pub show_images: bool,
}

fn default_poll_interval() -> u64 {
    5
}

fn default_image_cache_size() -> usize {
    crate::images::DEFAULT_CAPACITY
}

fn default_image_cache_ttl() -> u64 {
    crate::images::DEFAULT_TTL.as_secs()
}

fn default_fade_ticks() -> u16 {
    8
}

fn default_blur_sigma() -> f32 {
    3.0
}

fn default_true() -> bool {
    true
}

impl Default for Config {
    fn default() -> Self {
        Self {
            theme: Theme::default(),
            feed_url: None,
            catalog_path: None,
            poll_interval_secs: default_poll_interval(),
            image_cache_size: default_image_cache_size(),
            image_cache_ttl_secs: default_image_cache_ttl(),
            fade_ticks: default_fade_ticks(),
            blur_sigma: default_blur_sigma(),
            show_progress: default_true(),
            show_images: default_true(),
        }
    }
}

impl Config {
    /// Get the default config file path
    pub fn default_path() -> Result<PathBuf> {
        crate::paths::config_path()
    }

    /// Load config from the default path or create default
    pub fn load() -> Result<Self> {
        let path = Self::default_path()?;
        Self::load_from(&path)
    }

    /// Load config from a specific path
    pub fn load_from(path: &Path) -> Result<Self> {
        if path.exists() {
            let content = std::fs::read_to_string(path).context("Failed to read config file")?;
            let config: Self = toml::from_str(&content).context("Failed to parse config file")?;
            tracing::debug!("Loaded config from {}", path.display());
            Ok(config)
        } else {
            Ok(Self::default())
        }
    }

    /// Save config to the default path
    pub fn save(&self) -> Result<()> {
        let path = Self::default_path()?;
        self.save_to(&path)
    }

    /// Save config to a specific path
    pub fn save_to(&self, path: &Path) -> Result<()> {
        // Ensure parent directory exists
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).context("Failed to create config directory")?;
        }

        let content = toml::to_string_pretty(self).context("Failed to serialize config")?;
        std::fs::write(path, content).context("Failed to write config file")?;

        Ok(())
    }

    /// Renderer settings derived from this config
    pub fn render_options(&self) -> RenderOptions {
        RenderOptions {
            fade_ticks: self.fade_ticks,
            show_progress: self.show_progress,
            blur_sigma: self.blur_sigma.max(0.0),
        }
    }

    /// Cache entry lifetime (at least one second)
    pub fn image_cache_ttl(&self) -> Duration {
        Duration::from_secs(self.image_cache_ttl_secs.max(1))
    }

    /// Poll interval, `None` when polling is disabled
    pub fn poll_interval(&self) -> Option<Duration> {
        (self.poll_interval_secs > 0).then(|| Duration::from_secs(self.poll_interval_secs))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_missing_file_gives_defaults() {
        let dir = tempdir().unwrap();
        let config = Config::load_from(&dir.path().join("nope.toml")).unwrap();
        assert_eq!(config.poll_interval_secs, 5);
        assert!(config.show_images);
        assert!(config.feed_url.is_none());
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "feed_url = \"https://dam.example.com/api\"\nfade_ticks = 0\n").unwrap();

        let config = Config::load_from(&path).unwrap();
        assert_eq!(config.feed_url.as_deref(), Some("https://dam.example.com/api"));
        assert_eq!(config.render_options().fade_ticks, 0);
        assert_eq!(config.image_cache_size, crate::images::DEFAULT_CAPACITY);
    }

    #[test]
    fn test_save_and_reload() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");
        let config = Config {
            poll_interval_secs: 0,
            blur_sigma: 1.5,
            ..Config::default()
        };
        config.save_to(&path).unwrap();

        let loaded = Config::load_from(&path).unwrap();
        assert_eq!(loaded.poll_interval(), None);
        assert!((loaded.blur_sigma - 1.5).abs() < f32::EPSILON);
    }

    #[test]
    fn test_ttl_never_zero() {
        let config = Config {
            image_cache_ttl_secs: 0,
            ..Config::default()
        };
        assert_eq!(config.image_cache_ttl(), Duration::from_secs(1));
    }
}
