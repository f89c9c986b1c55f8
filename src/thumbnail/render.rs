//! Thumbnail renderer: turns a resolved state into a visual.
//!
//! Owns the image-load sub-state of one rendered instance. Loads are
//! requested through an [`ImageSource`] and complete asynchronously with a
//! [`LoadEvent`]; every frame the renderer also probes the source directly,
//! so an image that is already cached resolves even if its completion
//! event never arrives.

use std::sync::atomic::{AtomicU64, Ordering};

use super::{ResolvedState, ThumbnailState, UrlSource};
use crate::models::MediaKind;

static NEXT_TICKET: AtomicU64 = AtomicU64::new(1);

/// Identifies one load request. Events carrying a ticket the renderer no
/// longer waits for are dropped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct LoadTicket(u64);

impl LoadTicket {
    /// Allocate a process-unique ticket
    pub fn next() -> Self {
        Self(NEXT_TICKET.fetch_add(1, Ordering::Relaxed))
    }

    /// Raw ticket number
    pub const fn get(&self) -> u64 {
        self.0
    }
}

impl std::fmt::Display for LoadTicket {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Result of a load attempt
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadOutcome {
    /// Decoded with the given natural size
    Loaded {
        /// Natural width in pixels
        width: u32,
        /// Natural height in pixels
        height: u32,
    },
    /// Fetch or decode failed
    Errored(String),
}

/// Completion of a load request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadEvent {
    /// Ticket passed to [`ImageSource::request`]
    pub ticket: LoadTicket,
    /// Requested URL
    pub url: String,
    /// What happened
    pub outcome: LoadOutcome,
}

/// Where the renderer gets image resources from.
pub trait ImageSource {
    /// Natural dimensions of `url` if it is already available locally.
    fn cached_dimensions(&self, url: &str) -> Option<(u32, u32)>;

    /// Start loading `url`. Completion is reported later as a [`LoadEvent`]
    /// carrying `ticket`.
    fn request(&mut self, url: &str, ticket: LoadTicket);
}

/// Load state of the image currently displayed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadPhase {
    /// Requested, nothing known yet
    NotLoaded,
    /// Decoded and non-empty
    Loaded {
        /// Natural width in pixels
        width: u32,
        /// Natural height in pixels
        height: u32,
    },
    /// Failed, or decoded to zero pixels
    Errored,
}

impl LoadPhase {
    fn from_dimensions(width: u32, height: u32) -> Self {
        if width == 0 || height == 0 {
            Self::Errored
        } else {
            Self::Loaded { width, height }
        }
    }

    /// Whether the image is ready to draw
    pub const fn is_loaded(&self) -> bool {
        matches!(self, Self::Loaded { .. })
    }
}

#[derive(Debug)]
struct ImageProbe {
    url: String,
    ticket: LoadTicket,
    phase: LoadPhase,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Fade {
    Idle,
    /// Meaningful transition seen, waiting for the image
    Armed,
    Running { step: u16 },
    Done,
}

/// Why an icon is shown instead of an image
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IconReason {
    /// Type never gets a thumbnail
    NotSupported,
    /// Pipeline failed
    Failed {
        /// Whether the user may retry
        can_retry: bool,
    },
    /// Pipeline skipped this asset
    Skipped,
    /// Nothing to show yet
    Pending,
    /// The image resource failed to load
    LoadError,
}

/// What to draw for one instance
#[derive(Debug, Clone, PartialEq)]
pub enum Visual {
    /// Type icon, no image involved
    Icon {
        /// Media category for picking the glyph
        kind: MediaKind,
        /// Why no image is shown
        reason: IconReason,
    },
    /// Provisional preview, drawn blurred
    Temporary {
        /// Preview URL
        url: String,
        /// Ready to draw; otherwise draw a placeholder
        loaded: bool,
        /// Show a small progress indicator
        show_progress: bool,
        /// Blur radius for the provisional treatment
        blur_sigma: f32,
    },
    /// Full-quality thumbnail
    Final {
        /// Thumbnail URL
        url: String,
        /// Ready to draw; otherwise draw a placeholder
        loaded: bool,
        /// Fade-in progress in `0.0..1.0` while animating
        fade: Option<f32>,
    },
}

impl Visual {
    /// True for the icon outcome
    pub const fn is_icon(&self) -> bool {
        matches!(self, Self::Icon { .. })
    }
}

/// Rendering knobs
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RenderOptions {
    /// Frames a fade-in lasts; 0 disables fading
    pub fade_ticks: u16,
    /// Show a progress indicator over provisional previews
    pub show_progress: bool,
    /// Blur radius for provisional previews
    pub blur_sigma: f32,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            fade_ticks: 8,
            show_progress: true,
            blur_sigma: 3.0,
        }
    }
}

/// Per-update input besides the resolved state
#[derive(Debug, Clone, Copy)]
pub struct RenderTarget<'a> {
    /// Identity of the displayed asset
    pub asset_id: &'a str,
    /// Media category for the fallback icon
    pub kind: MediaKind,
    /// Generation still running upstream
    pub in_flight: bool,
}

/// Renderer state for one displayed instance
#[derive(Debug)]
pub struct ThumbnailRenderer {
    options: RenderOptions,
    asset_id: Option<String>,
    kind: MediaKind,
    in_flight: bool,
    resolved: Option<ResolvedState>,
    probe: Option<ImageProbe>,
    fade: Fade,
}

impl ThumbnailRenderer {
    /// Create an empty renderer
    pub const fn new(options: RenderOptions) -> Self {
        Self {
            options,
            asset_id: None,
            kind: MediaKind::Other,
            in_flight: false,
            resolved: None,
            probe: None,
            fade: Fade::Idle,
        }
    }

    /// Feed the latest resolved state and animate flag.
    pub fn update(
        &mut self,
        target: RenderTarget<'_>,
        resolved: &ResolvedState,
        animate: bool,
        images: &mut dyn ImageSource,
    ) {
        if self.asset_id.as_deref() != Some(target.asset_id) {
            self.abandon();
            self.asset_id = Some(target.asset_id.to_string());
        }
        self.kind = target.kind;
        self.in_flight = target.in_flight;
        self.resolved = Some(resolved.clone());

        match image_url(resolved) {
            None => {
                self.probe = None;
                self.fade = Fade::Idle;
            }
            Some(url) => {
                if self.probe.as_ref().is_none_or(|p| p.url != url) {
                    self.fade = Fade::Idle;
                    self.start_probe(url, images);
                }
            }
        }

        if animate && resolved.state == ThumbnailState::Available && self.probe.is_some() {
            self.fade = Fade::Armed;
        }
        self.maybe_start_fade();
    }

    /// Advance one frame: probe the source and step the fade.
    pub fn tick(&mut self, images: &dyn ImageSource) {
        if let Some(probe) = &mut self.probe
            && probe.phase == LoadPhase::NotLoaded
            && let Some((width, height)) = images.cached_dimensions(&probe.url)
        {
            probe.phase = LoadPhase::from_dimensions(width, height);
            if probe.phase == LoadPhase::Errored {
                tracing::debug!(url = %probe.url, "cached image has zero dimensions");
            }
        }

        if let Fade::Running { step } = self.fade {
            let step = step.saturating_add(1);
            self.fade = if step >= self.options.fade_ticks {
                Fade::Done
            } else {
                Fade::Running { step }
            };
        }
        self.maybe_start_fade();
    }

    /// Apply a load completion. Returns `false` if the event was stale.
    pub fn on_load_event(&mut self, event: &LoadEvent) -> bool {
        let Some(probe) = self
            .probe
            .as_mut()
            .filter(|p| p.ticket == event.ticket && p.url == event.url)
        else {
            tracing::trace!(ticket = %event.ticket, url = %event.url, "discarding stale load event");
            return false;
        };

        if probe.phase == LoadPhase::NotLoaded {
            probe.phase = match &event.outcome {
                LoadOutcome::Loaded { width, height } => {
                    LoadPhase::from_dimensions(*width, *height)
                }
                LoadOutcome::Errored(error) => {
                    tracing::debug!(url = %probe.url, %error, "thumbnail failed to load");
                    LoadPhase::Errored
                }
            };
            if probe.phase == LoadPhase::Errored {
                self.fade = Fade::Idle;
            }
        }
        self.maybe_start_fade();
        true
    }

    /// Fetch a loaded image again after its pixels were dropped from the
    /// source. Returns `false` if nothing was loaded.
    pub fn reload(&mut self, images: &mut dyn ImageSource) -> bool {
        let Some(url) = self
            .probe
            .as_ref()
            .filter(|p| p.phase.is_loaded())
            .map(|p| p.url.clone())
        else {
            return false;
        };
        tracing::debug!(url = %url, "image left the cache, loading again");
        self.start_probe(&url, images);
        true
    }

    /// Whether an event with `ticket` would be accepted
    pub fn awaits(&self, ticket: LoadTicket) -> bool {
        self.probe.as_ref().is_some_and(|p| p.ticket == ticket)
    }

    /// Load phase of the current image, if one is involved
    pub fn load_phase(&self) -> Option<LoadPhase> {
        self.probe.as_ref().map(|p| p.phase)
    }

    /// Whether a fade-in is in progress
    pub const fn is_fading(&self) -> bool {
        matches!(self.fade, Fade::Running { .. })
    }

    /// Forget the displayed asset (instance unmounted)
    pub fn reset(&mut self) {
        self.abandon();
        self.asset_id = None;
        self.resolved = None;
    }

    /// The visual for the current frame
    pub fn visual(&self) -> Visual {
        let Some(resolved) = &self.resolved else {
            return self.icon(IconReason::Pending);
        };

        match resolved.state {
            ThumbnailState::NotSupported => return self.icon(IconReason::NotSupported),
            ThumbnailState::Failed => {
                return self.icon(IconReason::Failed {
                    can_retry: resolved.can_retry,
                });
            }
            ThumbnailState::Skipped => return self.icon(IconReason::Skipped),
            ThumbnailState::Pending | ThumbnailState::Available => {}
        }

        let Some(probe) = &self.probe else {
            return self.icon(IconReason::Pending);
        };
        if probe.phase == LoadPhase::Errored {
            return self.icon(IconReason::LoadError);
        }
        let loaded = probe.phase.is_loaded();

        if resolved.state == ThumbnailState::Pending {
            Visual::Temporary {
                url: probe.url.clone(),
                loaded,
                show_progress: self.options.show_progress && self.in_flight,
                blur_sigma: self.options.blur_sigma,
            }
        } else {
            let fade = match self.fade {
                Fade::Running { step } => {
                    Some(f32::from(step) / f32::from(self.options.fade_ticks.max(1)))
                }
                _ => None,
            };
            Visual::Final {
                url: probe.url.clone(),
                loaded,
                fade,
            }
        }
    }

    const fn icon(&self, reason: IconReason) -> Visual {
        Visual::Icon {
            kind: self.kind,
            reason,
        }
    }

    fn start_probe(&mut self, url: &str, images: &mut dyn ImageSource) {
        let ticket = LoadTicket::next();
        let phase = match images.cached_dimensions(url) {
            Some((width, height)) => LoadPhase::from_dimensions(width, height),
            None => {
                tracing::debug!(url, %ticket, "requesting thumbnail image");
                images.request(url, ticket);
                LoadPhase::NotLoaded
            }
        };
        self.probe = Some(ImageProbe {
            url: url.to_string(),
            ticket,
            phase,
        });
    }

    fn abandon(&mut self) {
        if let Some(probe) = self.probe.take()
            && probe.phase == LoadPhase::NotLoaded
        {
            tracing::trace!(url = %probe.url, ticket = %probe.ticket, "abandoning in-flight load");
        }
        self.fade = Fade::Idle;
    }

    fn maybe_start_fade(&mut self) {
        let loaded = self.probe.as_ref().is_some_and(|p| p.phase.is_loaded());
        if self.fade == Fade::Armed && loaded {
            self.fade = if self.options.fade_ticks == 0 {
                Fade::Done
            } else {
                Fade::Running { step: 0 }
            };
        }
    }
}

/// The URL the renderer should load, if the state calls for an image
fn image_url(resolved: &ResolvedState) -> Option<&str> {
    match (resolved.state, resolved.source) {
        (ThumbnailState::Available, Some(_)) | (ThumbnailState::Pending, Some(UrlSource::Temporary)) => {
            resolved.url.as_deref()
        }
        _ => None,
    }
}
