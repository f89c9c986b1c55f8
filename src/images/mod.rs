//! Image loading and caching for terminal display.
//!
//! This module handles downloading, caching, and preparing thumbnails for
//! rendering in the terminal using various graphics protocols (Sixel,
//! Kitty, iTerm2) with fallback to Unicode halfblocks.

mod cache;
pub mod effects;
mod loader;

pub use cache::{CachedImage, DEFAULT_CAPACITY, DEFAULT_TTL, ImageCache};
pub use loader::{ImageLoader, LoadError, fetch_image};

use ratatui_image::picker::Picker;
use std::sync::OnceLock;

use crate::thumbnail::{ImageSource, LoadEvent, LoadTicket};

/// Global picker instance (initialized once at startup)
static PICKER: OnceLock<Picker> = OnceLock::new();

/// Initialize the image picker by querying terminal capabilities.
///
/// This should be called once at startup, before entering the TUI.
pub fn init_picker() -> &'static Picker {
    PICKER.get_or_init(|| {
        // This queries the terminal for sixel/kitty/iterm2 support
        match Picker::from_query_stdio() {
            Ok(p) => {
                tracing::info!("Image support detected: {:?}", p.protocol_type());
                p
            }
            Err(e) => {
                tracing::debug!("No image protocol support: {e}");
                // Fall back to halfblocks (Unicode-based, works everywhere)
                Picker::halfblocks()
            }
        }
    })
}

/// Get the global picker instance.
pub fn picker() -> Option<&'static Picker> {
    PICKER.get()
}

/// Cache plus loader, the image source of every thumbnail slot.
pub struct ImageStore {
    cache: ImageCache,
    loader: ImageLoader,
}

impl ImageStore {
    /// Pair a cache with a loader that fills it
    pub const fn new(cache: ImageCache, loader: ImageLoader) -> Self {
        Self { cache, loader }
    }

    /// Shared cache handle
    pub const fn cache(&self) -> &ImageCache {
        &self.cache
    }

    /// Drain finished loads
    pub fn poll_events(&mut self) -> Vec<LoadEvent> {
        self.loader.poll_results()
    }

    /// Stop the background loader
    pub fn shutdown(&self) {
        self.loader.shutdown();
    }
}

impl ImageSource for ImageStore {
    fn cached_dimensions(&self, url: &str) -> Option<(u32, u32)> {
        self.cache.dimensions(url)
    }

    fn request(&mut self, url: &str, ticket: LoadTicket) {
        self.loader.load(url, ticket);
    }
}
