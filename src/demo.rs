//! Demo mode: a scripted pipeline and synthetic thumbnails.
//!
//! Each poll of [`DemoFeed`] advances the script by one step, so the
//! dashboard shows previews appearing, final thumbnails replacing them,
//! failures, skips and broken images without any server.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Mutex, PoisonError};

use anyhow::Result;
use chrono::{DateTime, Duration, Utc};
use image::{DynamicImage, Rgb, RgbImage};

use crate::feed::AssetFeed;
use crate::models::{Asset, ProcessingStatus};

/// URL scheme served by [`synthesize_image`]
pub const DEMO_SCHEME: &str = "demo://";

/// Polls a regeneration stays in flight
const REGENERATION_POLLS: u32 = 2;

/// Scripted stand-in for the processing pipeline
pub struct DemoFeed {
    step: AtomicU32,
    started_at: DateTime<Utc>,
    /// Asset id -> step at which regeneration was requested
    regenerations: Mutex<HashMap<String, u32>>,
}

impl Default for DemoFeed {
    fn default() -> Self {
        Self::new()
    }
}

impl DemoFeed {
    /// Start the script at step 0
    pub fn new() -> Self {
        Self {
            step: AtomicU32::new(0),
            started_at: Utc::now(),
            regenerations: Mutex::new(HashMap::new()),
        }
    }

    /// Current script step
    pub fn step(&self) -> u32 {
        self.step.load(Ordering::Relaxed)
    }

    /// Assets as they look at `step`
    pub fn assets_at(&self, step: u32) -> Vec<Asset> {
        let at = |minutes: u32| Some(self.started_at + Duration::minutes(i64::from(minutes)));
        let regenerated_at = self
            .regenerations
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get("scan")
            .copied();

        let mut assets = Vec::new();

        // Full lifecycle: queued, preview, final arrives before status flips
        let mut sunset = Asset::new("sunset")
            .with_name("sunset.jpg")
            .with_mime("image/jpeg");
        sunset.created_at = at(0);
        match step {
            0 => sunset.processing_status = Some(ProcessingStatus::Pending),
            1 | 2 => {
                sunset = sunset
                    .with_status(ProcessingStatus::Processing)
                    .with_temporary_url(demo_url("sunset", "preview"));
            }
            3 => {
                sunset = sunset
                    .with_status(ProcessingStatus::Processing)
                    .with_temporary_url(demo_url("sunset", "preview"))
                    .with_final_url(demo_url("sunset", "full"));
            }
            _ => {
                sunset = sunset
                    .with_status(ProcessingStatus::Completed)
                    .with_final_url(demo_url("sunset", "full"));
            }
        }
        sunset.last_modified_at = at(step.min(4));
        assets.push(sunset);

        assets.push(
            Asset::new("portrait")
                .with_name("portrait.png")
                .with_mime("image/png")
                .with_status(ProcessingStatus::Completed)
                .with_final_url(demo_url("portrait", "full")),
        );

        let clip = Asset::new("clip")
            .with_name("launch-teaser.mp4")
            .with_mime("video/mp4");
        assets.push(if step < 5 {
            clip.with_status(ProcessingStatus::Processing)
                .with_temporary_url(demo_url("clip", "preview"))
        } else {
            clip.with_status(ProcessingStatus::Completed)
                .with_final_url(demo_url("clip", "full"))
        });

        // Pipeline cannot do AVIF, so the final URL is never shown
        assets.push(
            Asset::new("hero")
                .with_name("hero.avif")
                .with_mime("image/avif")
                .with_status(ProcessingStatus::Completed)
                .with_final_url(demo_url("hero", "full")),
        );

        let scan = Asset::new("scan").with_name("contract-scan.tiff").with_extension("tiff");
        assets.push(match regenerated_at {
            Some(requested) if step >= requested + REGENERATION_POLLS => scan
                .with_status(ProcessingStatus::Completed)
                .with_final_url(demo_url("scan", "full")),
            Some(_) => scan.with_status(ProcessingStatus::Processing),
            None => scan.with_status(ProcessingStatus::Failed),
        });

        assets.push(
            Asset::new("notes")
                .with_name("meeting-notes.txt")
                .with_mime("text/plain")
                .with_status(ProcessingStatus::Skipped),
        );

        assets.push(
            Asset::new("logo")
                .with_name("logo.svg")
                .with_mime("image/svg+xml")
                .with_status(ProcessingStatus::Skipped),
        );

        assets.push(
            Asset::new("archive")
                .with_name("2019-offsite.jpg")
                .with_extension("jpg")
                .with_status(ProcessingStatus::Completed)
                .with_legacy_url(demo_url("archive", "full")),
        );

        assets.push(
            Asset::new("broken")
                .with_name("corrupt.png")
                .with_mime("image/png")
                .with_status(ProcessingStatus::Completed)
                .with_final_url(demo_url("broken", "full")),
        );

        assets.push(
            Asset::new("missing")
                .with_name("moved.gif")
                .with_mime("image/gif")
                .with_status(ProcessingStatus::Completed)
                .with_final_url(demo_url("missing", "full")),
        );

        assets
    }
}

impl AssetFeed for DemoFeed {
    async fn fetch_assets(&self) -> Result<Vec<Asset>> {
        let step = self.step.fetch_add(1, Ordering::Relaxed);
        tracing::debug!(step, "demo pipeline advanced");
        Ok(self.assets_at(step))
    }

    async fn request_regeneration(&self, asset_id: &str) -> Result<()> {
        let step = self.step();
        self.regenerations
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(asset_id.to_string(), step);
        tracing::info!(asset_id, step, "demo regeneration queued");
        Ok(())
    }

    fn name(&self) -> &'static str {
        "demo"
    }
}

fn demo_url(key: &str, variant: &str) -> String {
    format!("{DEMO_SCHEME}{key}/{variant}")
}

/// Render a synthetic thumbnail for a `demo://key/variant` URL.
///
/// `demo://broken/..` decodes to an empty image; `demo://missing/..` does
/// not exist.
pub fn synthesize_image(url: &str) -> Option<DynamicImage> {
    let rest = url.strip_prefix(DEMO_SCHEME)?;
    let (key, variant) = rest.split_once('/').unwrap_or((rest, "full"));

    match key {
        "missing" | "" => return None,
        "broken" => return Some(DynamicImage::new_rgb8(0, 0)),
        _ => {}
    }

    let (width, height) = if variant == "preview" { (24, 16) } else { (160, 108) };
    let seed = key
        .bytes()
        .fold(7u32, |acc, b| acc.wrapping_mul(31).wrapping_add(u32::from(b)));
    let base = [
        (seed & 0xff) as u8,
        ((seed >> 8) & 0xff) as u8,
        ((seed >> 16) & 0xff) as u8,
    ];

    let image = RgbImage::from_fn(width, height, |x, y| {
        let fx = x * 255 / width.max(1);
        let fy = y * 255 / height.max(1);
        Rgb([
            base[0].wrapping_add(fx as u8),
            base[1].wrapping_add(fy as u8),
            base[2].wrapping_add(((fx + fy) / 2) as u8),
        ])
    });
    Some(DynamicImage::ImageRgb8(image))
}
