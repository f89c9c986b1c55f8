//! Async image loading from URLs.

use std::time::Duration;

use image::DynamicImage;
use tokio::runtime::Handle;
use tokio::sync::mpsc;

use super::ImageCache;
use crate::thumbnail::{LoadEvent, LoadOutcome, LoadTicket};

/// Largest edge kept in memory
const MAX_DIMENSION: u32 = 800;

/// Why an image could not be loaded
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    /// Transport-level failure
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),
    /// Server answered with a non-success status
    #[error("HTTP {0}")]
    Status(u16),
    /// Bytes were not a decodable image
    #[error("decode failed: {0}")]
    Decode(#[from] image::ImageError),
    /// Local file could not be read
    #[error("read failed: {0}")]
    Io(#[from] std::io::Error),
    /// No loader for this URL scheme
    #[error("unsupported URL scheme: {0}")]
    UnsupportedScheme(String),
    /// Resource does not exist
    #[error("not found: {0}")]
    NotFound(String),
}

/// Message for the image loader task
#[derive(Debug)]
pub enum LoaderMessage {
    /// Request to load an image
    Load {
        /// Resource to load
        url: String,
        /// Ticket echoed back in the result
        ticket: LoadTicket,
    },
    /// Shutdown the loader
    Shutdown,
}

/// Async image loader that runs in a background task.
pub struct ImageLoader {
    /// Sender to request image loads
    sender: mpsc::UnboundedSender<LoaderMessage>,
    /// Receiver for load results
    result_rx: mpsc::UnboundedReceiver<LoadEvent>,
}

impl ImageLoader {
    /// Create a new image loader with a shared cache.
    ///
    /// Spawns a background task on `runtime` to handle image loading.
    pub fn spawn(cache: ImageCache, runtime: &Handle) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        let (result_tx, result_rx) = mpsc::unbounded_channel();

        runtime.spawn(loader_task(rx, result_tx, cache));

        Self {
            sender: tx,
            result_rx,
        }
    }

    /// Request an image to be loaded.
    pub fn load(&self, url: &str, ticket: LoadTicket) {
        let _ = self.sender.send(LoaderMessage::Load {
            url: url.to_string(),
            ticket,
        });
    }

    /// Poll for completed loads (non-blocking).
    pub fn poll_results(&mut self) -> Vec<LoadEvent> {
        let mut results = Vec::new();
        while let Ok(result) = self.result_rx.try_recv() {
            results.push(result);
        }
        results
    }

    /// Shutdown the loader.
    pub fn shutdown(&self) {
        let _ = self.sender.send(LoaderMessage::Shutdown);
    }
}

/// Background task that handles image loading.
async fn loader_task(
    mut rx: mpsc::UnboundedReceiver<LoaderMessage>,
    result_tx: mpsc::UnboundedSender<LoadEvent>,
    cache: ImageCache,
) {
    // Create a reqwest client for downloading images
    let client = reqwest::Client::builder()
        .timeout(Duration::from_secs(30))
        .build()
        .unwrap_or_default();

    while let Some(msg) = rx.recv().await {
        match msg {
            LoaderMessage::Load { url, ticket } => {
                // Already cached: report right away
                if let Some((width, height)) = cache.dimensions(&url) {
                    let _ = result_tx.send(LoadEvent {
                        ticket,
                        url,
                        outcome: LoadOutcome::Loaded { width, height },
                    });
                    continue;
                }

                let client = client.clone();
                let cache = cache.clone();
                let result_tx = result_tx.clone();
                tokio::spawn(async move {
                    let outcome = match fetch_image(&client, &url).await {
                        Ok(image) => {
                            let (width, height) = (image.width(), image.height());
                            cache.insert(&url, image);
                            LoadOutcome::Loaded { width, height }
                        }
                        Err(e) => {
                            tracing::warn!("Failed to load image {url}: {e}");
                            LoadOutcome::Errored(e.to_string())
                        }
                    };
                    let _ = result_tx.send(LoadEvent {
                        ticket,
                        url,
                        outcome,
                    });
                });
            }
            LoaderMessage::Shutdown => {
                tracing::debug!("Image loader shutting down");
                break;
            }
        }
    }
}

/// Fetch an image from any supported location and decode it.
pub async fn fetch_image(client: &reqwest::Client, url: &str) -> Result<DynamicImage, LoadError> {
    let image = if url.starts_with("http://") || url.starts_with("https://") {
        download_and_decode(client, url).await?
    } else if url.starts_with(crate::demo::DEMO_SCHEME) {
        // Simulated network latency
        tokio::time::sleep(Duration::from_millis(250)).await;
        crate::demo::synthesize_image(url).ok_or_else(|| LoadError::NotFound(url.to_string()))?
    } else if let Some(path) = url.strip_prefix("file://") {
        read_and_decode(path).await?
    } else if let Some((scheme, _)) = url.split_once("://") {
        return Err(LoadError::UnsupportedScheme(scheme.to_string()));
    } else {
        read_and_decode(url).await?
    };

    Ok(resize_if_needed(image))
}

/// Download an image from a URL and decode it.
async fn download_and_decode(
    client: &reqwest::Client,
    url: &str,
) -> Result<DynamicImage, LoadError> {
    tracing::debug!("Downloading image: {url}");

    let response = client.get(url).send().await?;

    if !response.status().is_success() {
        return Err(LoadError::Status(response.status().as_u16()));
    }

    let bytes = response.bytes().await?;
    Ok(image::load_from_memory(&bytes)?)
}

async fn read_and_decode(path: &str) -> Result<DynamicImage, LoadError> {
    tracing::debug!("Reading image: {path}");
    let bytes = tokio::fs::read(path).await?;
    Ok(image::load_from_memory(&bytes)?)
}

/// Resize image if it's too large (to save memory and rendering time).
fn resize_if_needed(image: DynamicImage) -> DynamicImage {
    let (width, height) = (image.width(), image.height());

    if width <= MAX_DIMENSION && height <= MAX_DIMENSION {
        return image;
    }

    image.resize(MAX_DIMENSION, MAX_DIMENSION, image::imageops::FilterType::Triangle)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resize_keeps_small_images() {
        let image = resize_if_needed(DynamicImage::new_rgb8(100, 50));
        assert_eq!((image.width(), image.height()), (100, 50));
    }

    #[test]
    fn test_resize_bounds_large_images() {
        let image = resize_if_needed(DynamicImage::new_rgb8(1600, 400));
        assert_eq!(image.width(), MAX_DIMENSION);
        assert!(image.height() <= MAX_DIMENSION);
    }

    #[tokio::test]
    async fn test_unsupported_scheme() {
        let client = reqwest::Client::new();
        let err = fetch_image(&client, "ftp://example.com/a.png").await.unwrap_err();
        assert!(matches!(err, LoadError::UnsupportedScheme(s) if s == "ftp"));
    }

    #[tokio::test]
    async fn test_reads_local_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("thumb.png");
        DynamicImage::new_rgb8(3, 2).save(&path).unwrap();

        let client = reqwest::Client::new();
        let url = format!("file://{}", path.display());
        let image = fetch_image(&client, &url).await.unwrap();
        assert_eq!((image.width(), image.height()), (3, 2));
    }

    #[tokio::test]
    async fn test_missing_file_is_io_error() {
        let client = reqwest::Client::new();
        let err = fetch_image(&client, "/definitely/not/here.png").await.unwrap_err();
        assert!(matches!(err, LoadError::Io(_)));
    }

    #[tokio::test]
    async fn test_loader_reports_ticket() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("thumb.png");
        DynamicImage::new_rgb8(5, 4).save(&path).unwrap();
        let url = path.display().to_string();

        let cache = ImageCache::default();
        let mut loader = ImageLoader::spawn(cache.clone(), &Handle::current());
        let ticket = LoadTicket::next();
        loader.load(&url, ticket);

        let mut events = Vec::new();
        for _ in 0..200 {
            events = loader.poll_results();
            if !events.is_empty() {
                break;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        loader.shutdown();

        assert_eq!(events.len(), 1);
        assert_eq!(events[0].ticket, ticket);
        assert_eq!(
            events[0].outcome,
            LoadOutcome::Loaded {
                width: 5,
                height: 4
            }
        );
        assert_eq!(cache.dimensions(&url), Some((5, 4)));
    }
}
