//! Theme configuration and colors.
//!
//! assetdeck supports popular terminal color schemes out of the box.
//! Theme palettes are provided by the `ratatui-themes` crate.

use ratatui::style::{Color, Modifier, Style};
use ratatui_themes::{ThemeName, ThemePalette};
use serde::{Deserialize, Serialize};

use crate::thumbnail::ThumbnailState;

/// Theme wrapper around `ThemeName` from ratatui-themes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Theme(pub ThemeName);

impl Theme {
    /// Get all available theme names.
    #[must_use]
    pub const fn all() -> &'static [ThemeName] {
        ThemeName::all()
    }

    /// Get the display name for the theme.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        self.0.display_name()
    }

    /// Get the color palette for this theme
    #[must_use]
    pub fn colors(&self) -> ThemeColors {
        ThemeColors::from_palette(self.0.palette())
    }

    /// Get the inner `ThemeName`
    #[must_use]
    pub const fn inner(&self) -> ThemeName {
        self.0
    }
}

impl From<ThemeName> for Theme {
    fn from(name: ThemeName) -> Self {
        Self(name)
    }
}

impl std::fmt::Display for Theme {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Extended color palette for UI elements.
#[derive(Debug, Clone)]
pub struct ThemeColors {
    // Base colors (from palette)
    /// Primary background color
    pub bg: Color,
    /// Secondary background for panels/cards
    pub bg_secondary: Color,
    /// Highlighted/hover background
    pub bg_highlight: Color,
    /// Primary foreground/text color
    pub fg: Color,
    /// Dimmed text color
    pub fg_dim: Color,
    /// Muted text color (lowest contrast)
    pub fg_muted: Color,

    // Accent colors
    /// Primary accent color
    pub primary: Color,
    /// Secondary accent color
    pub secondary: Color,
    /// Tertiary accent color
    pub accent: Color,

    // Semantic colors
    /// Success state color (green)
    pub success: Color,
    /// Warning state color (yellow/orange)
    pub warning: Color,
    /// Error state color (red)
    pub error: Color,
    /// Info state color (blue)
    pub info: Color,

    // UI elements
    /// Border color (unfocused)
    pub border: Color,
    /// Border color (focused)
    pub border_focus: Color,
    /// Selection/highlight background
    pub selection: Color,

    // Thumbnail state colors
    /// Permanent thumbnail available
    pub available: Color,
    /// Generation pending or in flight
    pub pending: Color,
    /// Type never gets a thumbnail
    pub unsupported: Color,

    // Logo colors
    /// Logo color
    pub logo_primary: Color,
}

impl ThemeColors {
    /// Create `ThemeColors` from a `ThemePalette`
    #[must_use]
    pub fn from_palette(p: ThemePalette) -> Self {
        let bg_secondary = Self::adjust_brightness(p.bg, 10);
        let bg_highlight = Self::adjust_brightness(p.bg, 20);

        Self {
            bg: p.bg,
            bg_secondary,
            bg_highlight,
            fg: p.fg,
            fg_dim: p.muted,
            fg_muted: p.muted,

            primary: p.accent,
            secondary: p.secondary,
            accent: p.secondary,

            success: p.success,
            warning: p.warning,
            error: p.error,
            info: p.info,

            border: p.muted,
            border_focus: p.accent,
            selection: p.selection,

            available: p.success,
            pending: p.info,
            unsupported: p.muted,

            logo_primary: p.accent,
        }
    }

    /// Adjust color brightness
    fn adjust_brightness(color: Color, amount: i16) -> Color {
        if let Color::Rgb(r, g, b) = color {
            let adjust = |c: u8| -> u8 {
                if amount > 0 {
                    c.saturating_add(amount as u8)
                } else {
                    c.saturating_sub((-amount) as u8)
                }
            };
            Color::Rgb(adjust(r), adjust(g), adjust(b))
        } else {
            color
        }
    }

    // Style helpers

    /// Default text style
    #[must_use]
    pub fn text(&self) -> Style {
        Style::default().fg(self.fg)
    }

    /// Dimmed text style
    #[must_use]
    pub fn text_dim(&self) -> Style {
        Style::default().fg(self.fg_dim)
    }

    /// Muted text style
    #[must_use]
    pub fn text_muted(&self) -> Style {
        Style::default().fg(self.fg_muted)
    }

    /// Primary accent style
    #[must_use]
    pub fn text_primary(&self) -> Style {
        Style::default().fg(self.primary)
    }

    /// Secondary accent style
    #[must_use]
    pub fn text_secondary(&self) -> Style {
        Style::default().fg(self.secondary)
    }

    /// Success style
    #[must_use]
    pub fn text_success(&self) -> Style {
        Style::default().fg(self.success)
    }

    /// Warning style
    #[must_use]
    pub fn text_warning(&self) -> Style {
        Style::default().fg(self.warning)
    }

    /// Error style
    #[must_use]
    pub fn text_error(&self) -> Style {
        Style::default().fg(self.error)
    }

    /// Info style
    #[must_use]
    pub fn text_info(&self) -> Style {
        Style::default().fg(self.info)
    }

    /// Block border style
    #[must_use]
    pub fn block(&self) -> Style {
        Style::default().fg(self.border)
    }

    /// Focused block border style
    #[must_use]
    pub fn block_focus(&self) -> Style {
        Style::default().fg(self.border_focus)
    }

    /// Selected item style
    #[must_use]
    pub fn selected(&self) -> Style {
        Style::default()
            .bg(self.selection)
            .fg(self.fg)
            .add_modifier(Modifier::BOLD)
    }

    /// Tab style
    #[must_use]
    pub fn tab(&self) -> Style {
        Style::default().fg(self.fg_muted)
    }

    /// Active tab style
    #[must_use]
    pub fn tab_active(&self) -> Style {
        Style::default()
            .fg(self.primary)
            .add_modifier(Modifier::BOLD)
    }

    /// Key hint style (for shortcuts)
    #[must_use]
    pub fn key_hint(&self) -> Style {
        Style::default()
            .fg(self.accent)
            .add_modifier(Modifier::BOLD)
    }

    /// Style for a thumbnail state glyph
    #[must_use]
    pub fn thumbnail_state(&self, state: ThumbnailState) -> Style {
        let color = match state {
            ThumbnailState::Available => self.available,
            ThumbnailState::Pending => self.pending,
            ThumbnailState::Failed => self.error,
            ThumbnailState::Skipped => self.warning,
            ThumbnailState::NotSupported => self.unsupported,
        };
        Style::default().fg(color)
    }

    /// Background as RGB, for blending fade-in frames
    #[must_use]
    pub const fn bg_rgb(&self) -> [u8; 3] {
        match self.bg {
            Color::Rgb(r, g, b) => [r, g, b],
            _ => [0, 0, 0],
        }
    }

    /// Logo primary style
    #[must_use]
    pub fn logo_style_primary(&self) -> Style {
        Style::default()
            .fg(self.logo_primary)
            .add_modifier(Modifier::BOLD)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bg_rgb_falls_back_to_black() {
        let mut colors = Theme::default().colors();
        colors.bg = Color::Rgb(10, 20, 30);
        assert_eq!(colors.bg_rgb(), [10, 20, 30]);
        colors.bg = Color::Reset;
        assert_eq!(colors.bg_rgb(), [0, 0, 0]);
    }

    #[test]
    fn test_thumbnail_state_styles() {
        let colors = Theme::default().colors();
        assert_eq!(
            colors.thumbnail_state(ThumbnailState::Available).fg,
            Some(colors.available)
        );
        assert_eq!(
            colors.thumbnail_state(ThumbnailState::Failed).fg,
            Some(colors.error)
        );
    }
}
