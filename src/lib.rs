//! # assetdeck 🖼
//!
//! A terminal browser for digital-asset thumbnails.
//!
//! ## Overview
//!
//! assetdeck watches the records an asset pipeline produces and shows, for
//! every asset, the best thumbnail that currently exists: a permanent image,
//! a blurred provisional preview while generation runs, or a type icon when
//! there is nothing to show. It never flashes an icon before an image is
//! known to be missing and only animates transitions it actually observed.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                          App                                │
//! │  Polls the feed, owns one slot per row, runs the event loop │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!          ┌───────────────────┼───────────────────┐
//!          ▼                   ▼                   ▼
//! ┌─────────────────┐ ┌─────────────────┐ ┌─────────────────┐
//! │      Feed       │ │    Thumbnail    │ │       UI        │
//! │                 │ │                 │ │                 │
//! │ • HTTP API      │ │ • Classify      │ │ • Asset list    │
//! │ • JSON catalog  │ │ • Resolve       │ │ • Preview pane  │
//! │ • Demo pipeline │ │ • Version/Fade  │ │ • Themes        │
//! └─────────────────┘ └─────────────────┘ └─────────────────┘
//!                              │
//!                              ▼
//!                     ┌─────────────────┐
//!                     │     Images      │
//!                     │                 │
//!                     │ • Loader task   │
//!                     │ • TTL cache     │
//!                     │ • Blur / fade   │
//!                     └─────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`thumbnail`] - Classification, state resolution, change detection, rendering
//! - [`app`] - TUI application state and event loop
//! - [`feed`] - Where asset records come from (HTTP, catalog file, demo)
//! - [`images`] - Background image loading and caching
//! - [`config`] - Configuration management
//! - [`models`] - Data models (Asset, `ProcessingStatus`, `MediaKind`)
//! - [`theme`] - Theme support via ratatui-themes
//!
//! ## Example
//!
//! ```
//! use assetdeck::models::{Asset, ProcessingStatus};
//! use assetdeck::thumbnail::{ThumbnailState, resolve};
//!
//! let asset = Asset::new("a1")
//!     .with_mime("image/jpeg")
//!     .with_status(ProcessingStatus::Processing)
//!     .with_temporary_url("https://cdn.example.com/t.jpg");
//!
//! let resolved = resolve(&asset, 0);
//! assert_eq!(resolved.state, ThumbnailState::Pending);
//! assert!(resolved.has_temporary_preview());
//! ```

#![doc(html_root_url = "https://docs.rs/assetdeck/0.1.0")]
#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::items_after_statements)]
#![allow(clippy::option_if_let_else)]
#![allow(clippy::too_many_lines)]
#![allow(clippy::trivially_copy_pass_by_ref)]
#![allow(clippy::match_same_arms)]
#![allow(clippy::uninlined_format_args)]
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_sign_loss)]
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::needless_pass_by_value)]
#![allow(clippy::struct_excessive_bools)]
#![allow(clippy::return_self_not_must_use)]

pub mod app;
pub mod config;
pub mod demo;
pub mod feed;
pub mod images;
pub mod models;
pub mod paths;
pub mod theme;
pub mod thumbnail;

// Re-export main types for convenience
pub use app::AppState;
pub use config::Config;
pub use models::{Asset, MediaKind, ProcessingStatus};
pub use theme::{Theme, ThemeColors};
pub use thumbnail::{ResolvedState, ThumbnailState, is_thumbnailable, resolve, version_of};

// Re-export theme types from ratatui-themes crate
pub use ratatui_themes::{ThemeName, ThemePalette};

/// ASCII logo for the application
pub const LOGO: &str = r"
                      __      __          __
  ____ ______________/ /_____/ /__  _____/ /__
 / __ `/ ___/ ___/ _ \ __/ __  / _ \/ ___/ //_/
/ /_/ (__  |__  )  __/ /_/ /_/ /  __/ /__/ ,<
\__,_/____/____/\___/\__/\__,_/\___/\___/_/|_|
";

/// Application version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
