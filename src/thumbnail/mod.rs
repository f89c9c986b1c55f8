//! Thumbnail availability and rendering priority.
//!
//! Decides, for every asset, whether to show the permanent thumbnail, the
//! provisional preview, or a type icon, and when a change may animate.
//!
//! ```text
//! Asset ──► version_of ──(changed?)──► resolve ──► TransitionDetector
//!                                         │              │ animate
//!                                         ▼              ▼
//!                                     ThumbnailRenderer ◄─┘ ──► Visual
//! ```
//!
//! [`ThumbnailSlot`] bundles the per-instance pieces for display surfaces.

mod classify;
mod render;
mod resolve;
mod slot;
mod transition;
mod version;

pub use classify::is_thumbnailable;
pub use render::{
    IconReason, ImageSource, LoadEvent, LoadOutcome, LoadPhase, LoadTicket, RenderOptions,
    RenderTarget, ThumbnailRenderer, Visual,
};
pub use resolve::{MAX_RETRIES, ResolvedState, ThumbnailState, UrlSource, resolve};
pub use slot::ThumbnailSlot;
pub use transition::TransitionDetector;
pub use version::{VersionSignal, version_of};
