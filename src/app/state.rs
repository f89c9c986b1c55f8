//! Application state

use std::collections::{HashMap, HashSet};

use ratatui_image::protocol::StatefulProtocol;

use crate::config::Config;
use crate::images::{ImageStore, effects};
use crate::models::Asset;
use crate::theme::Theme;
use crate::thumbnail::{LoadEvent, MAX_RETRIES, ThumbnailSlot, ThumbnailState, Visual};

use super::async_ops::AsyncCommand;

/// Discrete frames a fade-in is drawn with
const FADE_FRAMES: u8 = 4;

/// Protocols kept before the map is flushed
const MAX_PROTOCOLS: usize = 24;

/// Current interaction mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Mode {
    #[default]
    Normal,
    /// Keyboard shortcuts popup
    Help,
    /// Theme selection popup
    ThemePicker,
}

/// Asset list filter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AssetFilter {
    #[default]
    All,
    /// Permanent thumbnail available
    Ready,
    /// Generation queued or running
    InProgress,
    /// Failed or skipped
    Problems,
}

impl AssetFilter {
    /// Next filter in rotation
    pub fn next(&self) -> Self {
        match self {
            Self::All => Self::Ready,
            Self::Ready => Self::InProgress,
            Self::InProgress => Self::Problems,
            Self::Problems => Self::All,
        }
    }

    /// Display name
    pub fn name(&self) -> &'static str {
        match self {
            Self::All => "All",
            Self::Ready => "Ready",
            Self::InProgress => "In progress",
            Self::Problems => "Problems",
        }
    }

    /// Whether a row in `state` passes
    pub fn matches(&self, state: Option<ThumbnailState>) -> bool {
        match self {
            Self::All => true,
            Self::Ready => state == Some(ThumbnailState::Available),
            Self::InProgress => state == Some(ThumbnailState::Pending),
            Self::Problems => matches!(
                state,
                Some(ThumbnailState::Failed | ThumbnailState::Skipped)
            ),
        }
    }
}

/// How an image is treated before it reaches the terminal
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum Treatment {
    Final,
    /// Blurred
    Provisional,
    /// Blended toward the background, by frame
    Fade(u8),
}

type ProtocolKey = (String, Treatment);

/// Application state
pub struct AppState {
    /// Configuration
    pub config: Config,
    /// Whether to quit
    pub should_quit: bool,
    /// Current theme
    pub theme: Theme,
    /// Current mode
    pub mode: Mode,
    /// List filter
    pub filter: AssetFilter,
    /// Highlighted row in the theme picker
    pub theme_picker_index: usize,
    /// Name of the feed (for the header)
    pub feed_name: &'static str,

    /// Assets as last delivered by the feed
    pub assets: Vec<Asset>,
    /// Selected row in the visible list
    pub selected: usize,
    /// One slot per listed asset
    rows: HashMap<String, ThumbnailSlot>,
    /// Slot of the preview pane, follows the selection
    preview: ThumbnailSlot,
    /// Retries spent through the preview pane, per asset.
    /// Rows offer no retry and always resolve with a count of zero.
    retries: HashMap<String, u32>,
    /// Regeneration requests sent but not yet answered
    retries_in_flight: HashSet<String>,

    /// Image cache and loader
    images: ImageStore,
    /// Terminal graphics protocols per image and treatment
    protocols: HashMap<ProtocolKey, StatefulProtocol>,
    /// Draw thumbnails with terminal graphics
    pub show_images: bool,

    /// Status message (bottom bar)
    pub status: String,
    /// Is loading?
    pub loading: bool,

    /// Tick counter for animations
    tick: u64,
}

impl AppState {
    /// Create a new app state
    pub fn new(config: Config, images: ImageStore, feed_name: &'static str) -> Self {
        let render_options = config.render_options();
        Self {
            theme: config.theme,
            show_images: config.show_images,
            config,
            should_quit: false,
            mode: Mode::Normal,
            filter: AssetFilter::All,
            theme_picker_index: 0,
            feed_name,
            assets: Vec::new(),
            selected: 0,
            rows: HashMap::new(),
            preview: ThumbnailSlot::new(render_options),
            retries: HashMap::new(),
            retries_in_flight: HashSet::new(),
            images,
            protocols: HashMap::new(),
            status: String::new(),
            loading: false,
            tick: 0,
        }
    }

    /// Tick for animations: probe images and advance fades
    pub fn tick(&mut self) {
        self.tick = self.tick.wrapping_add(1);
        for slot in self.rows.values_mut() {
            slot.tick(&self.images);
        }
        self.preview.tick(&self.images);
    }

    /// Get current tick
    pub fn current_tick(&self) -> u64 {
        self.tick
    }

    /// Set status message
    pub fn set_status(&mut self, msg: impl Into<String>) {
        self.status = msg.into();
    }

    /// Replace the asset list with a fresh delivery from the feed
    pub fn apply_assets(&mut self, assets: Vec<Asset>) {
        let selected_id = self.selected_asset().map(|a| a.id.clone());
        let live: HashSet<&str> = assets.iter().map(|a| a.id.as_str()).collect();

        // Unmount rows whose asset disappeared; their loads become stale
        self.rows.retain(|id, _| live.contains(id.as_str()));
        self.retries.retain(|id, _| live.contains(id.as_str()));
        self.retries_in_flight.retain(|id| live.contains(id.as_str()));

        self.assets = assets;
        self.sync_rows();
        if let Some(id) = selected_id
            && let Some(index) = self.visible_ids().iter().position(|v| *v == id)
        {
            self.selected = index;
        }
        self.clamp_selection();
        self.sync_preview();
    }

    /// Render pass over every slot.
    ///
    /// Cheap when nothing changed: slots only re-resolve on a new version
    /// signal or retry count.
    pub fn sync_slots(&mut self) {
        self.sync_rows();
        self.sync_preview();
    }

    fn sync_rows(&mut self) {
        let options = self.config.render_options();
        for asset in &self.assets {
            self.rows
                .entry(asset.id.clone())
                .or_insert_with(|| ThumbnailSlot::new(options))
                .update(asset, 0, &mut self.images);
        }
    }

    fn sync_preview(&mut self) {
        let selected = self.selected_asset().cloned();
        match selected {
            Some(asset) => {
                let retries = self.retries.get(&asset.id).copied().unwrap_or(0);
                self.preview.update(&asset, retries, &mut self.images);
            }
            None => self.preview.reset(),
        }
    }

    /// Drain finished image loads and hand them to the waiting slot
    pub fn process_image_events(&mut self) {
        for event in self.images.poll_events() {
            self.dispatch_load_event(&event);
        }
    }

    /// Route one load completion to the slot holding its ticket
    pub fn dispatch_load_event(&mut self, event: &LoadEvent) {
        let slot = if self.preview.awaits(event.ticket) {
            Some(&mut self.preview)
        } else {
            self.rows.values_mut().find(|slot| slot.awaits(event.ticket))
        };
        match slot {
            Some(slot) => {
                slot.on_load_event(event);
            }
            None => {
                tracing::trace!(ticket = %event.ticket, url = %event.url, "load event had no taker");
            }
        }
    }

    /// Ids of assets passing the current filter, in feed order
    pub fn visible_ids(&self) -> Vec<String> {
        self.visible_assets().iter().map(|a| a.id.clone()).collect()
    }

    /// Assets passing the current filter
    pub fn visible_assets(&self) -> Vec<&Asset> {
        self.assets
            .iter()
            .filter(|a| self.filter.matches(self.row_state(&a.id)))
            .collect()
    }

    /// Resolved state shown in the list row of `asset_id`
    pub fn row_state(&self, asset_id: &str) -> Option<ThumbnailState> {
        self.rows
            .get(asset_id)
            .and_then(|slot| slot.resolved())
            .map(|r| r.state)
    }

    /// Visual of the list row of `asset_id`
    pub fn row_visual(&self, asset_id: &str) -> Option<Visual> {
        self.rows.get(asset_id).map(ThumbnailSlot::visual)
    }

    /// Whether the list row of `asset_id` is fading in
    pub fn row_is_fading(&self, asset_id: &str) -> bool {
        self.rows.get(asset_id).is_some_and(ThumbnailSlot::is_fading)
    }

    /// Retries spent on `asset_id`
    pub fn retries_for(&self, asset_id: &str) -> u32 {
        self.retries.get(asset_id).copied().unwrap_or(0)
    }

    /// Get the currently selected asset
    pub fn selected_asset(&self) -> Option<&Asset> {
        self.visible_assets().get(self.selected).copied()
    }

    /// Preview pane visual
    pub fn preview_visual(&self) -> Visual {
        self.preview.visual()
    }

    /// Preview pane slot
    pub const fn preview(&self) -> &ThumbnailSlot {
        &self.preview
    }

    /// Move selection down
    pub fn select_next(&mut self) {
        let count = self.visible_assets().len();
        if count > 0 {
            self.selected = (self.selected + 1).min(count - 1);
        }
        self.sync_preview();
    }

    /// Move selection up
    pub fn select_prev(&mut self) {
        self.selected = self.selected.saturating_sub(1);
        self.sync_preview();
    }

    /// Jump to first row
    pub fn select_first(&mut self) {
        self.selected = 0;
        self.sync_preview();
    }

    /// Jump to last row
    pub fn select_last(&mut self) {
        self.selected = self.visible_assets().len().saturating_sub(1);
        self.sync_preview();
    }

    fn clamp_selection(&mut self) {
        let count = self.visible_assets().len();
        self.selected = self.selected.min(count.saturating_sub(1));
    }

    /// Cycle through list filters
    pub fn cycle_filter(&mut self) {
        self.filter = self.filter.next();
        self.selected = 0;
        self.sync_preview();
    }

    /// Toggle terminal graphics
    pub fn toggle_images(&mut self) {
        self.show_images = !self.show_images;
        self.config.show_images = self.show_images;
        self.protocols.clear();
    }

    /// Ask for a retry of the selected asset if its state allows one.
    ///
    /// The budget is only spent once the feed accepts the request, see
    /// [`Self::confirm_retry`].
    pub fn retry_selected(&mut self) -> Option<AsyncCommand> {
        let asset_id = self.selected_asset()?.id.clone();
        if self.preview.asset_id() != Some(asset_id.as_str()) || !self.preview.can_retry() {
            self.set_status("Retry not available for this asset");
            return None;
        }
        if !self.retries_in_flight.insert(asset_id.clone()) {
            self.set_status(format!("Retry for {asset_id} already requested"));
            return None;
        }

        let attempt = self.retries_for(&asset_id) + 1;
        self.set_status(format!("Requesting retry {attempt}/{MAX_RETRIES} for {asset_id}..."));
        Some(AsyncCommand::RequestRegeneration { asset_id })
    }

    /// The feed accepted a regeneration request: count it against the budget
    pub fn confirm_retry(&mut self, asset_id: &str) {
        self.retries_in_flight.remove(asset_id);
        let count = self.retries.entry(asset_id.to_string()).or_insert(0);
        *count += 1;
        let attempt = *count;
        tracing::info!(asset_id, attempt, "thumbnail regeneration accepted");
        self.set_status(format!("↻ Retry {attempt}/{MAX_RETRIES} queued for {asset_id}"));
        self.sync_preview();
    }

    /// The feed refused a regeneration request; the budget is untouched
    pub fn abandon_retry(&mut self, asset_id: &str) {
        self.retries_in_flight.remove(asset_id);
    }

    /// Build (or reuse) the terminal protocol for the preview visual.
    ///
    /// Returns `None` when there is nothing to draw as an image. A loaded
    /// image that has since left the cache is requested again.
    pub fn preview_protocol(&mut self) -> Option<&mut StatefulProtocol> {
        if !self.show_images {
            return None;
        }

        let (url, treatment) = match self.preview.visual() {
            Visual::Temporary {
                url, loaded: true, ..
            } => (url, Treatment::Provisional),
            Visual::Final {
                url,
                loaded: true,
                fade,
            } => {
                let treatment = match fade.map(|p| effects::fade_step(p, FADE_FRAMES)) {
                    Some(step) if step < FADE_FRAMES => Treatment::Fade(step),
                    _ => Treatment::Final,
                };
                (url, treatment)
            }
            _ => return None,
        };

        let key = (url, treatment);
        if !self.protocols.contains_key(&key) {
            let Some(image) = self.images.cache().get(&key.0) else {
                self.preview.reload(&mut self.images);
                return None;
            };
            let picker = crate::images::picker()?;
            let prepared = match treatment {
                Treatment::Final => (*image).clone(),
                Treatment::Provisional => effects::provisional(&image, self.config.blur_sigma),
                Treatment::Fade(step) => effects::fade_frame(
                    &image,
                    f32::from(step + 1) / f32::from(FADE_FRAMES + 1),
                    self.theme.colors().bg_rgb(),
                ),
            };
            if self.protocols.len() >= MAX_PROTOCOLS {
                self.protocols.clear();
            }
            self.protocols
                .insert(key.clone(), picker.new_resize_protocol(prepared));
        }
        self.protocols.get_mut(&key)
    }

    /// Stop background image work
    pub fn shutdown(&self) {
        self.images.shutdown();
    }
}
