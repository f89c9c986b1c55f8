//! Asset feeds: where asset records come from.
//!
//! The processing pipeline lives elsewhere. The dashboard only polls it for
//! the current records and can ask it to regenerate a failed thumbnail.

mod file;
mod http;

pub use file::FileFeed;
pub use http::HttpFeed;

use anyhow::Result;

use crate::config::Config;
use crate::demo::DemoFeed;
use crate::models::Asset;

/// Typed failures of a feed
#[derive(Debug, thiserror::Error)]
pub enum FeedError {
    /// Pipeline answered with a non-success status
    #[error("pipeline returned HTTP {status} for {url}")]
    Status {
        /// HTTP status code
        status: u16,
        /// Requested URL
        url: String,
    },
    /// Payload was not a list of assets
    #[error("malformed asset payload: {0}")]
    Payload(#[from] serde_json::Error),
    /// Feed cannot do this
    #[error("{0} feed does not support regeneration")]
    Unsupported(&'static str),
}

/// Source of asset records
#[allow(async_fn_in_trait)]
pub trait AssetFeed {
    /// Fetch the current state of all assets
    async fn fetch_assets(&self) -> Result<Vec<Asset>>;

    /// Ask the pipeline to generate the thumbnail again
    async fn request_regeneration(&self, asset_id: &str) -> Result<()>;

    /// Short name for status messages
    fn name(&self) -> &'static str;
}

/// Unified feed that wraps the concrete implementations
pub enum Feed {
    /// Remote pipeline over HTTP
    Http(HttpFeed),
    /// JSON catalog on disk
    File(FileFeed),
    /// Scripted pipeline for demos
    Demo(DemoFeed),
}

impl Feed {
    /// Pick a feed from configuration: HTTP if configured, else the local catalog.
    pub fn from_config(config: &Config) -> Result<Self> {
        if let Some(url) = config.feed_url.as_deref().filter(|u| !u.trim().is_empty()) {
            return Ok(Self::Http(HttpFeed::new(url)?));
        }
        let path = match &config.catalog_path {
            Some(path) => path.clone(),
            None => crate::paths::catalog_path()?,
        };
        Ok(Self::File(FileFeed::new(path)))
    }

    /// Fetch the current state of all assets
    pub async fn fetch_assets(&self) -> Result<Vec<Asset>> {
        match self {
            Self::Http(f) => f.fetch_assets().await,
            Self::File(f) => f.fetch_assets().await,
            Self::Demo(f) => f.fetch_assets().await,
        }
    }

    /// Ask the pipeline to generate the thumbnail again
    pub async fn request_regeneration(&self, asset_id: &str) -> Result<()> {
        match self {
            Self::Http(f) => f.request_regeneration(asset_id).await,
            Self::File(f) => f.request_regeneration(asset_id).await,
            Self::Demo(f) => f.request_regeneration(asset_id).await,
        }
    }

    /// Short name for status messages
    pub fn name(&self) -> &'static str {
        match self {
            Self::Http(f) => f.name(),
            Self::File(f) => f.name(),
            Self::Demo(f) => f.name(),
        }
    }
}

/// Parse a JSON payload that is either a list of assets or `{ "assets": [...] }`.
pub fn parse_assets(json: &str) -> Result<Vec<Asset>, FeedError> {
    #[derive(serde::Deserialize)]
    #[serde(untagged)]
    enum Payload {
        List(Vec<Asset>),
        Wrapped { assets: Vec<Asset> },
    }

    let payload: Payload = serde_json::from_str(json)?;
    Ok(match payload {
        Payload::List(assets) | Payload::Wrapped { assets } => assets,
    })
}
