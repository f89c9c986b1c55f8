//! TUI Application module

mod async_ops;
mod events;
mod state;
mod ui;

pub use async_ops::{AsyncCommand, AsyncHandle, AsyncResult, spawn_worker};
pub use state::{AppState, AssetFilter, Mode};

use anyhow::Result;
use crossterm::{
    event::{self, Event},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::prelude::*;
use std::io::stdout;
use std::time::Duration;
use tokio::runtime::Runtime;

use crate::config::Config;
use crate::demo::DemoFeed;
use crate::feed::Feed;
use crate::images::{self, ImageCache, ImageLoader, ImageStore};

/// Run the TUI against the configured feed
pub fn run() -> Result<()> {
    let config = Config::load()?;
    let feed = Feed::from_config(&config)?;
    run_with(config, feed)
}

/// Run the TUI against the scripted demo pipeline
pub fn run_demo() -> Result<()> {
    let mut config = Config::load()?;
    // The demo advances one step per poll
    if config.poll_interval_secs == 0 {
        config.poll_interval_secs = 2;
    }
    run_with(config, Feed::Demo(DemoFeed::new()))
}

fn run_with(config: Config, feed: Feed) -> Result<()> {
    // Create tokio runtime
    let rt = Runtime::new()?;
    let feed_name = feed.name();
    tracing::info!("Starting with {feed_name} feed");

    // Query terminal graphics support before raw mode
    if config.show_images {
        images::init_picker();
    }

    let cache = ImageCache::new(config.image_cache_size, config.image_cache_ttl());
    let loader = ImageLoader::spawn(cache.clone(), rt.handle());
    let async_handle = spawn_worker(feed, config.poll_interval(), rt.handle());

    // Initialize terminal
    enable_raw_mode()?;
    let mut stdout = stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;
    terminal.clear()?;

    let mut state = AppState::new(config, ImageStore::new(cache, loader), feed_name);

    // Initial refresh
    let _ = async_handle.cmd_tx.blocking_send(AsyncCommand::RefreshAssets);
    state.loading = true;
    state.set_status("Loading assets...");

    // Main loop
    let result = run_app(&mut terminal, &mut state, async_handle);
    state.shutdown();

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    result
}

fn run_app(
    terminal: &mut Terminal<CrosstermBackend<std::io::Stdout>>,
    state: &mut AppState,
    mut async_handle: AsyncHandle,
) -> Result<()> {
    loop {
        // Process any async results
        while let Ok(result) = async_handle.result_rx.try_recv() {
            if let Some(cmd) = handle_async_result(state, result) {
                let _ = async_handle.cmd_tx.blocking_send(cmd);
            }
        }

        // Hand finished image loads to their slots
        state.process_image_events();
        state.sync_slots();

        // Draw UI
        terminal.draw(|frame| ui::render(frame, state))?;

        // Handle events
        if event::poll(Duration::from_millis(50))?
            && let Event::Key(key) = event::read()?
            && let Some(cmd) = events::handle_key(state, key)
        {
            let _ = async_handle.cmd_tx.blocking_send(cmd);
        }

        // Tick for animations
        state.tick();

        if state.should_quit {
            // Shutdown async worker
            let _ = async_handle.cmd_tx.blocking_send(AsyncCommand::Shutdown);
            break;
        }
    }

    // Save config on exit
    state.config.save()?;

    Ok(())
}

fn handle_async_result(state: &mut AppState, result: AsyncResult) -> Option<AsyncCommand> {
    match result {
        AsyncResult::AssetsRefreshed { assets } => {
            let first_load = state.assets.is_empty();
            state.apply_assets(assets);
            if state.loading || first_load {
                state.set_status(format!("Loaded {} assets", state.assets.len()));
            }
            state.loading = false;
            None
        }
        AsyncResult::RegenerationRequested { asset_id } => {
            state.confirm_retry(&asset_id);
            // Pick up the new status right away instead of waiting for the poller
            Some(AsyncCommand::RefreshAssets)
        }
        AsyncResult::RegenerationFailed { asset_id, message } => {
            state.abandon_retry(&asset_id);
            state.set_status(format!("❌ Retry failed: {message}"));
            None
        }
        AsyncResult::Error { message } => {
            state.set_status(format!("❌ {message}"));
            state.loading = false;
            None
        }
        AsyncResult::Status { message } => {
            state.set_status(message);
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Asset, ProcessingStatus};
    use tokio::runtime::Handle;

    fn state() -> AppState {
        let cache = ImageCache::default();
        let loader = ImageLoader::spawn(cache.clone(), &Handle::current());
        AppState::new(Config::default(), ImageStore::new(cache, loader), "test")
    }

    #[tokio::test]
    async fn test_refresh_result_clears_loading() {
        let mut state = state();
        state.loading = true;
        let cmd = handle_async_result(
            &mut state,
            AsyncResult::AssetsRefreshed {
                assets: vec![Asset::new("a").with_mime("image/png")],
            },
        );
        assert!(cmd.is_none());
        assert!(!state.loading);
        assert_eq!(state.status, "Loaded 1 assets");
    }

    #[tokio::test]
    async fn test_regeneration_triggers_refresh() {
        let mut state = state();
        state.apply_assets(vec![
            Asset::new("a")
                .with_mime("image/png")
                .with_status(ProcessingStatus::Failed),
        ]);
        assert!(state.retry_selected().is_some());
        assert_eq!(state.retries_for("a"), 0);

        let cmd = handle_async_result(
            &mut state,
            AsyncResult::RegenerationRequested {
                asset_id: "a".to_string(),
            },
        );
        assert!(matches!(cmd, Some(AsyncCommand::RefreshAssets)));
        assert_eq!(state.retries_for("a"), 1);
    }

    #[tokio::test]
    async fn test_refused_regeneration_is_not_counted() {
        let mut state = state();
        state.apply_assets(vec![
            Asset::new("a")
                .with_mime("image/png")
                .with_status(ProcessingStatus::Failed),
        ]);
        assert!(state.retry_selected().is_some());

        let cmd = handle_async_result(
            &mut state,
            AsyncResult::RegenerationFailed {
                asset_id: "a".to_string(),
                message: "catalog feed does not support regeneration".to_string(),
            },
        );
        assert!(cmd.is_none());
        assert_eq!(state.retries_for("a"), 0);
        assert!(state.status.contains("does not support"));
        assert!(state.retry_selected().is_some());
    }

    #[tokio::test]
    async fn test_error_result() {
        let mut state = state();
        state.loading = true;
        handle_async_result(
            &mut state,
            AsyncResult::Error {
                message: "boom".to_string(),
            },
        );
        assert!(!state.loading);
        assert!(state.status.contains("boom"));
    }
}
