//! JSON catalog on disk

use std::path::PathBuf;

use anyhow::{Context, Result};

use super::{AssetFeed, FeedError, parse_assets};
use crate::models::Asset;

/// Re-reads a JSON file of asset records on every poll.
///
/// Whatever writes the file plays the pipeline's role.
pub struct FileFeed {
    path: PathBuf,
}

impl FileFeed {
    /// Create a feed reading `path`
    pub const fn new(path: PathBuf) -> Self {
        Self { path }
    }

    /// Catalog location
    pub const fn path(&self) -> &PathBuf {
        &self.path
    }
}

impl AssetFeed for FileFeed {
    async fn fetch_assets(&self) -> Result<Vec<Asset>> {
        if !tokio::fs::try_exists(&self.path).await.unwrap_or(false) {
            tracing::debug!("Catalog {} does not exist yet", self.path.display());
            return Ok(Vec::new());
        }
        let content = tokio::fs::read_to_string(&self.path)
            .await
            .with_context(|| format!("Failed to read catalog {}", self.path.display()))?;
        parse_assets(&content)
            .with_context(|| format!("Failed to parse catalog {}", self.path.display()))
    }

    async fn request_regeneration(&self, asset_id: &str) -> Result<()> {
        tracing::warn!("Cannot regenerate {asset_id}: catalog feed is read-only");
        Err(FeedError::Unsupported("catalog").into())
    }

    fn name(&self) -> &'static str {
        "catalog"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[tokio::test]
    async fn test_missing_catalog_is_empty() {
        let dir = tempdir().unwrap();
        let feed = FileFeed::new(dir.path().join("assets.json"));
        assert!(feed.fetch_assets().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_reads_catalog() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("assets.json");
        std::fs::write(
            &path,
            r#"[{"id": "a", "mimeType": "image/jpeg", "finalImageUrl": "f1"}]"#,
        )
        .unwrap();

        let assets = FileFeed::new(path).fetch_assets().await.unwrap();
        assert_eq!(assets.len(), 1);
        assert_eq!(assets[0].final_url(), Some("f1"));
    }

    #[tokio::test]
    async fn test_regeneration_unsupported() {
        let dir = tempdir().unwrap();
        let feed = FileFeed::new(dir.path().join("assets.json"));
        assert!(feed.request_regeneration("a").await.is_err());
    }
}
