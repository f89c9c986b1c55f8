//! Event handling

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use super::async_ops::AsyncCommand;
use super::state::{AppState, Mode};
use crate::theme::Theme;

/// Handle key events, returning an optional async command
pub fn handle_key(state: &mut AppState, key: KeyEvent) -> Option<AsyncCommand> {
    // Handle mode-specific input first
    match state.mode {
        Mode::ThemePicker => {
            handle_theme_picker_key(state, key);
            return None;
        }
        Mode::Help => {
            if matches!(key.code, KeyCode::Esc | KeyCode::Char('?') | KeyCode::Enter) {
                state.mode = Mode::Normal;
            }
            return None;
        }
        Mode::Normal => {}
    }

    match (key.modifiers, key.code) {
        (KeyModifiers::CONTROL, KeyCode::Char('c')) | (_, KeyCode::Char('q')) => {
            state.should_quit = true;
            None
        }
        (_, KeyCode::Char('?') | KeyCode::F(1)) => {
            state.mode = Mode::Help;
            None
        }

        // Navigation
        (_, KeyCode::Char('j') | KeyCode::Down) => {
            state.select_next();
            None
        }
        (_, KeyCode::Char('k') | KeyCode::Up) => {
            state.select_prev();
            None
        }
        (_, KeyCode::Char('g') | KeyCode::Home) => {
            state.select_first();
            None
        }
        (_, KeyCode::Char('G') | KeyCode::End) => {
            state.select_last();
            None
        }

        // Actions
        (_, KeyCode::Char('f')) => {
            state.cycle_filter();
            state.set_status(format!("Filter: {}", state.filter.name()));
            None
        }
        (_, KeyCode::Char('r')) => state.retry_selected(),
        (_, KeyCode::Char('R')) => {
            state.loading = true;
            state.set_status("Refreshing...");
            Some(AsyncCommand::RefreshAssets)
        }
        (_, KeyCode::Char('i')) => {
            state.toggle_images();
            let label = if state.show_images { "on" } else { "off" };
            state.set_status(format!("Images {label}"));
            None
        }
        (_, KeyCode::Char('o')) => {
            open_selected(state);
            None
        }
        (_, KeyCode::Char('t')) => {
            state.theme_picker_index = Theme::all()
                .iter()
                .position(|t| *t == state.theme.inner())
                .unwrap_or(0);
            state.mode = Mode::ThemePicker;
            None
        }
        _ => None,
    }
}

/// Open the best image of the selected asset in the system viewer
fn open_selected(state: &mut AppState) {
    let Some(url) = state.preview().resolved().and_then(|r| r.url.clone()) else {
        state.set_status("Nothing to open");
        return;
    };
    match open::that(&url) {
        Ok(()) => state.set_status(format!("Opened {url}")),
        Err(e) => {
            tracing::warn!("Failed to open {url}: {e}");
            state.set_status(format!("✗ Could not open {url}"));
        }
    }
}

fn handle_theme_picker_key(state: &mut AppState, key: KeyEvent) {
    let themes = Theme::all();
    let len = themes.len();

    match key.code {
        KeyCode::Esc => {
            // Cancel, restore configured theme
            state.theme = state.config.theme;
            state.mode = Mode::Normal;
        }
        KeyCode::Enter => {
            let selected_theme = Theme::from(themes[state.theme_picker_index]);
            state.theme = selected_theme;
            state.config.theme = selected_theme;

            state.mode = Mode::Normal;
            state.set_status(format!("✓ Theme set to {}", selected_theme.name()));
        }
        KeyCode::Down | KeyCode::Char('j') => {
            state.theme_picker_index = (state.theme_picker_index + 1) % len;
            state.theme = Theme::from(themes[state.theme_picker_index]);
        }
        KeyCode::Up | KeyCode::Char('k') => {
            state.theme_picker_index = state.theme_picker_index.checked_sub(1).unwrap_or(len - 1);
            state.theme = Theme::from(themes[state.theme_picker_index]);
        }
        KeyCode::Home | KeyCode::Char('g') => {
            state.theme_picker_index = 0;
            state.theme = Theme::from(themes[state.theme_picker_index]);
        }
        KeyCode::End | KeyCode::Char('G') => {
            state.theme_picker_index = len - 1;
            state.theme = Theme::from(themes[state.theme_picker_index]);
        }
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::images::{ImageCache, ImageLoader, ImageStore};
    use crate::models::{Asset, ProcessingStatus};
    use tokio::runtime::Handle;

    fn state() -> AppState {
        let cache = ImageCache::default();
        let loader = ImageLoader::spawn(cache.clone(), &Handle::current());
        let mut state = AppState::new(Config::default(), ImageStore::new(cache, loader), "test");
        state.apply_assets(vec![
            Asset::new("a")
                .with_mime("image/png")
                .with_status(ProcessingStatus::Failed),
            Asset::new("b").with_mime("text/plain"),
        ]);
        state
    }

    fn press(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    #[tokio::test]
    async fn test_quit() {
        let mut state = state();
        handle_key(&mut state, press(KeyCode::Char('q')));
        assert!(state.should_quit);
    }

    #[tokio::test]
    async fn test_navigation() {
        let mut state = state();
        handle_key(&mut state, press(KeyCode::Char('j')));
        assert_eq!(state.selected, 1);
        handle_key(&mut state, press(KeyCode::Char('j')));
        assert_eq!(state.selected, 1);
        handle_key(&mut state, press(KeyCode::Char('g')));
        assert_eq!(state.selected, 0);
    }

    #[tokio::test]
    async fn test_retry_key_emits_regeneration() {
        let mut state = state();
        let cmd = handle_key(&mut state, press(KeyCode::Char('r')));
        assert!(matches!(cmd, Some(AsyncCommand::RequestRegeneration { .. })));

        handle_key(&mut state, press(KeyCode::Char('j')));
        assert!(handle_key(&mut state, press(KeyCode::Char('r'))).is_none());
    }

    #[tokio::test]
    async fn test_help_swallows_keys() {
        let mut state = state();
        handle_key(&mut state, press(KeyCode::Char('?')));
        assert_eq!(state.mode, Mode::Help);
        assert!(handle_key(&mut state, press(KeyCode::Char('R'))).is_none());
        handle_key(&mut state, press(KeyCode::Esc));
        assert_eq!(state.mode, Mode::Normal);
    }

    #[tokio::test]
    async fn test_theme_picker_cancel_restores() {
        let mut state = state();
        let original = state.theme;
        handle_key(&mut state, press(KeyCode::Char('t')));
        handle_key(&mut state, press(KeyCode::Char('j')));
        assert_ne!(state.theme, original);
        handle_key(&mut state, press(KeyCode::Esc));
        assert_eq!(state.theme, original);
    }
}
