//! Thumbnail state resolution
//!
//! Combines capability classification, declared processing status and the
//! candidate URLs into a single display state. URLs are evidence that work
//! happened and beat the declared status, which may lag behind.

use serde::Serialize;

use super::classify::is_thumbnailable;
use crate::models::{Asset, ProcessingStatus};

/// Number of user-triggered retries allowed for a failed thumbnail
pub const MAX_RETRIES: u32 = 2;

/// Mutually exclusive display states
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum ThumbnailState {
    /// File type never produces a thumbnail
    NotSupported,
    /// Generation queued or in flight
    Pending,
    /// Pipeline reported failure
    Failed,
    /// Pipeline chose not to generate
    Skipped,
    /// A permanent thumbnail exists
    Available,
}

impl ThumbnailState {
    /// Get state as string
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::NotSupported => "not supported",
            Self::Pending => "pending",
            Self::Failed => "failed",
            Self::Skipped => "skipped",
            Self::Available => "available",
        }
    }

    /// Short glyph for list rows
    pub const fn glyph(&self) -> &'static str {
        match self {
            Self::NotSupported => "·",
            Self::Pending => "◌",
            Self::Failed => "✗",
            Self::Skipped => "–",
            Self::Available => "■",
        }
    }
}

impl std::fmt::Display for ThumbnailState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Which candidate URL was picked
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum UrlSource {
    /// Permanent, full quality (final or legacy URL)
    Final,
    /// Low quality, short-lived preview
    Temporary,
}

/// Output of [`resolve`]
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolvedState {
    /// Display state
    pub state: ThumbnailState,
    /// URL to render, if any
    pub url: Option<String>,
    /// Kind of URL in `url`
    pub source: Option<UrlSource>,
    /// Whether another retry may be requested
    pub can_retry: bool,
}

impl ResolvedState {
    const fn bare(state: ThumbnailState, can_retry: bool) -> Self {
        Self {
            state,
            url: None,
            source: None,
            can_retry,
        }
    }

    fn with_url(state: ThumbnailState, url: &str, source: UrlSource) -> Self {
        Self {
            state,
            url: Some(url.to_string()),
            source: Some(source),
            can_retry: false,
        }
    }

    /// True for a pending state that already has a preview to show
    pub fn has_temporary_preview(&self) -> bool {
        self.state == ThumbnailState::Pending && self.source == Some(UrlSource::Temporary)
    }
}

/// Resolve the display state of an asset.
///
/// Precedence, first match wins:
/// 1. unsupported type
/// 2. final URL (authoritative, status ignored)
/// 3. temporary URL unless the status is failed or skipped
/// 4. legacy URL with completed status
/// 5. failed status (retry while `retry_count < MAX_RETRIES`)
/// 6. skipped status
/// 7. pending without preview
pub fn resolve(asset: &Asset, retry_count: u32) -> ResolvedState {
    if !is_thumbnailable(asset.mime(), asset.extension()) {
        return ResolvedState::bare(ThumbnailState::NotSupported, false);
    }

    if let Some(url) = asset.final_url() {
        return ResolvedState::with_url(ThumbnailState::Available, url, UrlSource::Final);
    }

    let status = asset.processing_status;
    let terminal_without_thumbnail = matches!(
        status,
        Some(ProcessingStatus::Failed | ProcessingStatus::Skipped)
    );

    if let Some(url) = asset.temporary_url()
        && !terminal_without_thumbnail
    {
        return ResolvedState::with_url(ThumbnailState::Pending, url, UrlSource::Temporary);
    }

    if let Some(url) = asset.legacy_url()
        && status == Some(ProcessingStatus::Completed)
    {
        return ResolvedState::with_url(ThumbnailState::Available, url, UrlSource::Final);
    }

    match status {
        Some(ProcessingStatus::Failed) => {
            ResolvedState::bare(ThumbnailState::Failed, retry_count < MAX_RETRIES)
        }
        Some(ProcessingStatus::Skipped) => ResolvedState::bare(ThumbnailState::Skipped, false),
        _ => ResolvedState::bare(ThumbnailState::Pending, false),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn jpeg(id: &str) -> Asset {
        Asset::new(id).with_mime("image/jpeg")
    }

    #[test]
    fn test_unsupported_ignores_urls() {
        let asset = Asset::new("a")
            .with_mime("application/zip")
            .with_final_url("f")
            .with_status(ProcessingStatus::Completed);
        let resolved = resolve(&asset, 0);
        assert_eq!(resolved.state, ThumbnailState::NotSupported);
        assert_eq!(resolved.url, None);
        assert!(!resolved.can_retry);
    }

    #[test]
    fn test_final_wins_over_failed_status() {
        let asset = jpeg("a")
            .with_status(ProcessingStatus::Failed)
            .with_temporary_url("t")
            .with_final_url("f");
        let resolved = resolve(&asset, 0);
        assert_eq!(resolved.state, ThumbnailState::Available);
        assert_eq!(resolved.url.as_deref(), Some("f"));
        assert_eq!(resolved.source, Some(UrlSource::Final));
        assert!(!resolved.can_retry);
    }

    #[test]
    fn test_temporary_preview_while_processing() {
        let asset = jpeg("a")
            .with_status(ProcessingStatus::Processing)
            .with_temporary_url("t1");
        let resolved = resolve(&asset, 0);
        assert_eq!(resolved.state, ThumbnailState::Pending);
        assert_eq!(resolved.url.as_deref(), Some("t1"));
        assert!(resolved.has_temporary_preview());
    }

    #[test]
    fn test_temporary_ignored_when_failed_or_skipped() {
        let failed = jpeg("a")
            .with_status(ProcessingStatus::Failed)
            .with_temporary_url("t");
        assert_eq!(resolve(&failed, 0).state, ThumbnailState::Failed);
        assert_eq!(resolve(&failed, 0).url, None);

        let skipped = jpeg("b")
            .with_status(ProcessingStatus::Skipped)
            .with_temporary_url("t");
        assert_eq!(resolve(&skipped, 0).state, ThumbnailState::Skipped);
    }

    #[test]
    fn test_temporary_shown_without_status() {
        let asset = jpeg("a").with_temporary_url("t");
        assert_eq!(resolve(&asset, 0).state, ThumbnailState::Pending);
    }

    #[test]
    fn test_legacy_requires_completed() {
        let legacy = jpeg("a")
            .with_legacy_url("l")
            .with_status(ProcessingStatus::Completed);
        let resolved = resolve(&legacy, 0);
        assert_eq!(resolved.state, ThumbnailState::Available);
        assert_eq!(resolved.url.as_deref(), Some("l"));

        let no_status = jpeg("b").with_legacy_url("l");
        let resolved = resolve(&no_status, 0);
        assert_eq!(resolved.state, ThumbnailState::Pending);
        assert_eq!(resolved.url, None);
    }

    #[test]
    fn test_retry_budget() {
        let failed = jpeg("a").with_status(ProcessingStatus::Failed);
        assert!(resolve(&failed, 0).can_retry);
        assert!(resolve(&failed, 1).can_retry);
        assert!(!resolve(&failed, 2).can_retry);
        assert!(!resolve(&failed, 7).can_retry);
    }

    #[test]
    fn test_skipped_never_retries() {
        let skipped = jpeg("a").with_status(ProcessingStatus::Skipped);
        let resolved = resolve(&skipped, 0);
        assert_eq!(resolved.state, ThumbnailState::Skipped);
        assert!(!resolved.can_retry);
    }

    #[test]
    fn test_pending_without_anything() {
        for status in [None, Some(ProcessingStatus::Pending), Some(ProcessingStatus::Processing)] {
            let mut asset = jpeg("a");
            asset.processing_status = status;
            let resolved = resolve(&asset, 0);
            assert_eq!(resolved.state, ThumbnailState::Pending);
            assert_eq!(resolved.url, None);
            assert!(!resolved.can_retry);
        }
    }

    #[test]
    fn test_empty_urls_are_absent() {
        let asset = jpeg("a")
            .with_final_url("")
            .with_temporary_url("  ")
            .with_status(ProcessingStatus::Processing);
        let resolved = resolve(&asset, 0);
        assert_eq!(resolved.state, ThumbnailState::Pending);
        assert_eq!(resolved.url, None);
    }
}
