//! Data models for assetdeck

mod asset;
mod media_kind;

pub use asset::{Asset, ProcessingStatus};
pub use media_kind::MediaKind;
