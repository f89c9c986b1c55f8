//! Bounded, TTL-checked cache for decoded thumbnails.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};

use image::DynamicImage;

/// Default number of images to keep
pub const DEFAULT_CAPACITY: usize = 64;

/// Default time an entry stays valid
pub const DEFAULT_TTL: Duration = Duration::from_secs(600);

/// Cache entry for an image
#[derive(Clone)]
pub struct CachedImage {
    /// The decoded image
    pub image: Arc<DynamicImage>,
    /// When the entry was stored (for TTL)
    pub inserted_at: Instant,
    /// Last access timestamp (for LRU eviction)
    pub last_access: Instant,
}

impl CachedImage {
    /// Natural dimensions of the image
    pub fn dimensions(&self) -> (u32, u32) {
        (self.image.width(), self.image.height())
    }
}

/// Thread-safe image cache.
///
/// Cloning shares the underlying storage. Entries older than the TTL are
/// treated as missing and dropped on access.
#[derive(Clone)]
pub struct ImageCache {
    images: Arc<Mutex<HashMap<String, CachedImage>>>,
    capacity: usize,
    ttl: Duration,
}

impl Default for ImageCache {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY, DEFAULT_TTL)
    }
}

impl ImageCache {
    /// Create a new image cache.
    #[must_use]
    pub fn new(capacity: usize, ttl: Duration) -> Self {
        Self {
            images: Arc::new(Mutex::new(HashMap::new())),
            capacity: capacity.max(1),
            ttl,
        }
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<String, CachedImage>> {
        self.images.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn is_expired(&self, entry: &CachedImage, now: Instant) -> bool {
        now.duration_since(entry.inserted_at) >= self.ttl
    }

    /// Store a decoded image in the cache.
    pub fn insert(&self, url: &str, image: DynamicImage) {
        let mut cache = self.lock();
        let now = Instant::now();

        cache.retain(|_, entry| !self.is_expired(entry, now));
        if cache.len() >= self.capacity && !cache.contains_key(url) {
            Self::evict_oldest(&mut cache);
        }

        cache.insert(
            url.to_string(),
            CachedImage {
                image: Arc::new(image),
                inserted_at: now,
                last_access: now,
            },
        );
    }

    /// Get a decoded image from cache.
    pub fn get(&self, url: &str) -> Option<Arc<DynamicImage>> {
        self.touch(url).map(|entry| entry.image)
    }

    /// Natural dimensions of a cached image.
    pub fn dimensions(&self, url: &str) -> Option<(u32, u32)> {
        self.touch(url).map(|entry| entry.dimensions())
    }

    fn touch(&self, url: &str) -> Option<CachedImage> {
        let mut cache = self.lock();
        let now = Instant::now();
        let expired = cache.get(url).is_some_and(|e| self.is_expired(e, now));
        if expired {
            tracing::trace!(url, "cache entry expired");
            cache.remove(url);
            return None;
        }
        let entry = cache.get_mut(url)?;
        entry.last_access = now;
        Some(entry.clone())
    }

    /// Check if a live image is cached.
    pub fn contains(&self, url: &str) -> bool {
        let now = Instant::now();
        self.lock()
            .get(url)
            .is_some_and(|e| !self.is_expired(e, now))
    }

    /// Evict the least recently used entry.
    fn evict_oldest(cache: &mut HashMap<String, CachedImage>) {
        if let Some(oldest_key) = cache
            .iter()
            .min_by_key(|(_, v)| v.last_access)
            .map(|(k, _)| k.clone())
        {
            tracing::trace!(url = %oldest_key, "evicting cached image");
            cache.remove(&oldest_key);
        }
    }

    /// Clear the entire cache.
    pub fn clear(&self) {
        self.lock().clear();
    }

    /// Get the number of stored images (expired ones included until touched).
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    /// Check if the cache is empty.
    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }
}
