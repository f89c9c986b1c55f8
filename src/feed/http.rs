//! Remote pipeline over HTTP

use std::time::Duration;

use anyhow::{Context, Result};

use super::{AssetFeed, FeedError, parse_assets};
use crate::models::Asset;

/// Polls `GET {base}/assets` and posts retries to
/// `POST {base}/assets/{id}/thumbnail/retry`.
pub struct HttpFeed {
    base_url: String,
    client: reqwest::Client,
}

impl HttpFeed {
    /// Create a feed for the given API base URL
    pub fn new(base_url: &str) -> Result<Self> {
        let base_url = if base_url.starts_with("http") {
            base_url.trim_end_matches('/').to_string()
        } else {
            format!("https://{}", base_url.trim_end_matches('/'))
        };
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .context("Failed to build HTTP client")?;
        Ok(Self { base_url, client })
    }

    /// API base URL
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn assets_url(&self) -> String {
        format!("{}/assets", self.base_url)
    }

    fn retry_url(&self, asset_id: &str) -> String {
        format!(
            "{}/assets/{}/thumbnail/retry",
            self.base_url,
            urlencoding::encode(asset_id)
        )
    }
}

impl AssetFeed for HttpFeed {
    async fn fetch_assets(&self) -> Result<Vec<Asset>> {
        let url = self.assets_url();
        tracing::debug!("Fetching assets from {url}");

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .with_context(|| format!("Failed to reach {url}"))?;
        let status = response.status();
        if !status.is_success() {
            return Err(FeedError::Status {
                status: status.as_u16(),
                url,
            }
            .into());
        }

        let body = response.text().await.context("Failed to read asset list")?;
        Ok(parse_assets(&body)?)
    }

    async fn request_regeneration(&self, asset_id: &str) -> Result<()> {
        let url = self.retry_url(asset_id);
        tracing::info!("Requesting thumbnail regeneration for {asset_id}");

        let response = self
            .client
            .post(&url)
            .send()
            .await
            .with_context(|| format!("Failed to reach {url}"))?;
        let status = response.status();
        if !status.is_success() {
            return Err(FeedError::Status {
                status: status.as_u16(),
                url,
            }
            .into());
        }
        Ok(())
    }

    fn name(&self) -> &'static str {
        "http"
    }
}
