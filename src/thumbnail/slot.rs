//! One displayed thumbnail instance (grid row, preview pane, ...).
//!
//! Wires the pieces together per render pass: derive the version signal,
//! re-resolve only when it (or the retry count) changed, feed the detector
//! synchronously, and hand state plus animate flag to the renderer.
//!
//! The retry count comes from the caller, which decides what a retry does
//! and keeps the budget per asset.

use super::render::{ImageSource, LoadEvent, LoadTicket, RenderOptions, RenderTarget, Visual};
use super::transition::TransitionDetector;
use super::version::{VersionSignal, version_of};
use super::{ResolvedState, ThumbnailRenderer, resolve};
use crate::models::{Asset, ProcessingStatus};

#[derive(Debug)]
struct Memo {
    version: VersionSignal,
    retry_count: u32,
    resolved: ResolvedState,
}

/// Private display state of one instance
#[derive(Debug)]
pub struct ThumbnailSlot {
    asset_id: Option<String>,
    memo: Option<Memo>,
    detector: TransitionDetector,
    renderer: ThumbnailRenderer,
    resolutions: u64,
}

impl ThumbnailSlot {
    /// Create an empty slot
    pub fn new(options: RenderOptions) -> Self {
        Self {
            asset_id: None,
            memo: None,
            detector: TransitionDetector::new(),
            renderer: ThumbnailRenderer::new(options),
            resolutions: 0,
        }
    }

    /// Render pass for `asset`. Returns the current resolution.
    pub fn update(
        &mut self,
        asset: &Asset,
        retry_count: u32,
        images: &mut dyn ImageSource,
    ) -> &ResolvedState {
        if self.asset_id.as_deref() != Some(asset.id.as_str()) {
            self.asset_id = Some(asset.id.clone());
            self.memo = None;
        }

        let version = version_of(asset);
        let memo = match self.memo.take() {
            Some(memo) if memo.version == version && memo.retry_count == retry_count => memo,
            _ => {
                self.resolutions += 1;
                Memo {
                    resolved: resolve(asset, retry_count),
                    version,
                    retry_count,
                }
            }
        };
        let memo = self.memo.insert(memo);

        let animate = self.detector.observe(&asset.id, memo.resolved.state);
        let target = RenderTarget {
            asset_id: &asset.id,
            kind: asset.media_kind(),
            in_flight: matches!(
                asset.processing_status,
                None | Some(ProcessingStatus::Pending | ProcessingStatus::Processing)
            ),
        };
        self.renderer.update(target, &memo.resolved, animate, images);
        &memo.resolved
    }

    /// Whether the current resolution permits another retry
    pub fn can_retry(&self) -> bool {
        self.memo.as_ref().is_some_and(|m| m.resolved.can_retry)
    }

    /// Id of the asset currently displayed
    pub fn asset_id(&self) -> Option<&str> {
        self.asset_id.as_deref()
    }

    /// Advance one frame
    pub fn tick(&mut self, images: &dyn ImageSource) {
        self.renderer.tick(images);
    }

    /// Route a load completion; `false` if it was not for this slot
    pub fn on_load_event(&mut self, event: &LoadEvent) -> bool {
        self.renderer.on_load_event(event)
    }

    /// Request the displayed image again; see [`ThumbnailRenderer::reload`]
    pub fn reload(&mut self, images: &mut dyn ImageSource) -> bool {
        self.renderer.reload(images)
    }

    /// Whether this slot waits for `ticket`
    pub fn awaits(&self, ticket: LoadTicket) -> bool {
        self.renderer.awaits(ticket)
    }

    /// Visual for the current frame
    pub fn visual(&self) -> Visual {
        self.renderer.visual()
    }

    /// Last resolution, if the slot has been updated
    pub fn resolved(&self) -> Option<&ResolvedState> {
        self.memo.as_ref().map(|m| &m.resolved)
    }

    /// How many times the resolver actually ran
    pub const fn resolution_count(&self) -> u64 {
        self.resolutions
    }

    /// Whether the renderer is mid fade-in
    pub const fn is_fading(&self) -> bool {
        self.renderer.is_fading()
    }

    /// Unmount: drop all per-instance state
    pub fn reset(&mut self) {
        self.asset_id = None;
        self.memo = None;
        self.detector.reset();
        self.renderer.reset();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::thumbnail::ThumbnailState;

    #[derive(Default)]
    struct NoImages {
        requests: usize,
    }

    impl ImageSource for NoImages {
        fn cached_dimensions(&self, _url: &str) -> Option<(u32, u32)> {
            None
        }

        fn request(&mut self, _url: &str, _ticket: LoadTicket) {
            self.requests += 1;
        }
    }

    #[test]
    fn test_unchanged_signal_skips_resolution() {
        let mut images = NoImages::default();
        let mut slot = ThumbnailSlot::new(RenderOptions::default());
        let asset = Asset::new("a")
            .with_mime("image/jpeg")
            .with_status(ProcessingStatus::Processing);

        slot.update(&asset, 0, &mut images);
        slot.update(&asset, 0, &mut images);
        slot.update(&asset.clone().with_name("renamed.jpg"), 0, &mut images);
        assert_eq!(slot.resolution_count(), 1);

        slot.update(&asset.clone().with_temporary_url("t1"), 0, &mut images);
        assert_eq!(slot.resolution_count(), 2);
        assert_eq!(slot.resolved().map(|r| r.state), Some(ThumbnailState::Pending));
    }

    #[test]
    fn test_retry_count_change_re_resolves() {
        let mut images = NoImages::default();
        let mut slot = ThumbnailSlot::new(RenderOptions::default());
        let failed = Asset::new("a")
            .with_mime("image/png")
            .with_status(ProcessingStatus::Failed);

        assert!(slot.update(&failed, 0, &mut images).can_retry);
        assert!(slot.update(&failed, 1, &mut images).can_retry);
        assert!(!slot.update(&failed, 2, &mut images).can_retry);
        assert!(!slot.can_retry());
        assert_eq!(slot.resolution_count(), 3);
    }

    #[test]
    fn test_asset_swap_forces_resolution() {
        let mut images = NoImages::default();
        let mut slot = ThumbnailSlot::new(RenderOptions::default());
        let a = Asset::new("a").with_mime("image/png").with_final_url("f");
        let mut b = a.clone();
        b.id = "b".to_string();

        slot.update(&a, 0, &mut images);
        slot.update(&b, 0, &mut images);
        assert_eq!(slot.resolution_count(), 2);
        assert_eq!(slot.asset_id(), Some("b"));
    }

    #[test]
    fn test_icon_states_issue_no_requests() {
        let mut images = NoImages::default();
        let mut slot = ThumbnailSlot::new(RenderOptions::default());
        let avif = Asset::new("a").with_mime("image/avif").with_final_url("f");
        slot.update(&avif, 0, &mut images);
        slot.update(&Asset::new("b").with_mime("image/png"), 0, &mut images);
        assert_eq!(images.requests, 0);
        assert!(slot.visual().is_icon());
    }

    #[test]
    fn test_reset_unmounts() {
        let mut images = NoImages::default();
        let mut slot = ThumbnailSlot::new(RenderOptions::default());
        slot.update(&Asset::new("a").with_mime("image/png").with_final_url("f"), 0, &mut images);
        slot.reset();
        assert!(slot.resolved().is_none());
        assert!(slot.asset_id().is_none());
    }
}
