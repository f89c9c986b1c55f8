//! UI rendering for the TUI

use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Clear, List, ListItem, ListState, Paragraph, Tabs, Wrap},
};
use ratatui_image::StatefulImage;
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

use super::state::{AppState, AssetFilter, Mode};
use crate::models::{Asset, ProcessingStatus};
use crate::theme::{Theme, ThemeColors};
use crate::thumbnail::{IconReason, MAX_RETRIES, ThumbnailState, UrlSource, Visual};

/// assetdeck icon
const ICON: &str = "🖼";

/// Spinner animation frames
const SPINNER: &[&str] = &["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"];

/// Main render function
pub fn render(frame: &mut Frame, state: &mut AppState) {
    let colors = state.theme.colors();

    // Set background
    let area = frame.area();
    let bg_block = Block::default().style(Style::default().bg(colors.bg));
    frame.render_widget(bg_block, area);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Tabs
            Constraint::Min(0),    // Main content
            Constraint::Length(1), // Status bar
        ])
        .split(area);

    render_tabs(frame, state, chunks[0]);
    render_main(frame, state, chunks[1]);
    render_status_bar(frame, state, chunks[2]);

    // Render modal dialogs
    match state.mode {
        Mode::Help => render_help_popup(frame, state),
        Mode::ThemePicker => render_theme_picker(frame, state),
        Mode::Normal => {}
    }
}

fn spinner(state: &AppState) -> &'static str {
    SPINNER[(state.current_tick() / 2) as usize % SPINNER.len()]
}

fn render_tabs(frame: &mut Frame, state: &AppState, area: Rect) {
    let colors = state.theme.colors();
    let filters = [
        AssetFilter::All,
        AssetFilter::Ready,
        AssetFilter::InProgress,
        AssetFilter::Problems,
    ];

    let titles: Vec<Line> = filters
        .iter()
        .map(|filter| {
            let count = state
                .assets
                .iter()
                .filter(|a| filter.matches(state.row_state(&a.id)))
                .count();
            let marker = if *filter == state.filter { "●" } else { "○" };
            Line::from(format!("{marker}  {} ({count})", filter.name()))
        })
        .collect();

    let selected = filters.iter().position(|f| *f == state.filter).unwrap_or(0);

    let tabs = Tabs::new(titles)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_type(BorderType::Rounded)
                .border_style(colors.block())
                .title(format!(" {ICON} assetdeck · {} ", state.feed_name))
                .title_style(colors.logo_style_primary()),
        )
        .select(selected)
        .style(colors.tab())
        .highlight_style(colors.tab_active())
        .divider(Span::styled(" │ ", colors.text_muted()));

    frame.render_widget(tabs, area);
}

fn render_main(frame: &mut Frame, state: &mut AppState, area: Rect) {
    // Layout: [Assets 45%] [Preview 55%]
    let horizontal = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(45), Constraint::Percentage(55)])
        .split(area);

    render_asset_list(frame, state, horizontal[0]);
    render_preview(frame, state, horizontal[1]);
}

fn render_asset_list(frame: &mut Frame, state: &AppState, area: Rect) {
    let colors = state.theme.colors();

    let block = Block::default()
        .title(format!(" 📁 Assets ({}) ", state.filter.name()))
        .title_style(colors.text_primary())
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(colors.block_focus());

    let visible = state.visible_assets();

    // Show loading or empty state
    let items: Vec<ListItem> = if state.loading && state.assets.is_empty() {
        vec![ListItem::new(Line::from(vec![
            Span::styled("  ", Style::default()),
            Span::styled("⏳ Loading...", colors.text_muted()),
        ]))]
    } else if visible.is_empty() {
        vec![
            ListItem::new(Line::from("")),
            ListItem::new(Line::from(vec![
                Span::styled("  ℹ ", colors.text_info()),
                Span::styled("No assets here", colors.text_muted()),
            ])),
            ListItem::new(Line::from("")),
            ListItem::new(Line::from(vec![
                Span::styled("  Press ", colors.text_dim()),
                Span::styled("[R]", colors.key_hint()),
                Span::styled(" to refresh or ", colors.text_dim()),
                Span::styled("[f]", colors.key_hint()),
                Span::styled(" to change the filter", colors.text_dim()),
            ])),
        ]
    } else {
        let width = area.width.saturating_sub(4) as usize;
        visible
            .iter()
            .map(|asset| asset_row(state, &colors, asset, width))
            .collect()
    };

    let list = List::new(items)
        .block(block)
        .highlight_style(colors.selected());

    let mut list_state = ListState::default();
    if !visible.is_empty() {
        list_state.select(Some(state.selected));
    }
    frame.render_stateful_widget(list, area, &mut list_state);
}

fn asset_row<'a>(
    state: &AppState,
    colors: &ThemeColors,
    asset: &'a Asset,
    width: usize,
) -> ListItem<'a> {
    let row_state = state.row_state(&asset.id);
    let glyph = match row_state {
        Some(ThumbnailState::Pending) if in_flight(asset) => spinner(state),
        Some(s) => s.glyph(),
        None => " ",
    };
    let mut glyph_style = row_state.map_or_else(Style::default, |s| colors.thumbnail_state(s));
    if state.row_is_fading(&asset.id) {
        glyph_style = glyph_style.add_modifier(Modifier::BOLD | Modifier::REVERSED);
    }

    let time = asset.relative_time().unwrap_or_default();
    let kind = asset.media_kind().emoji();
    // glyph + kind + spacing + time
    let fixed = 2 + kind.width() + 2 + time.width() + 1;
    let name = truncate(asset.display_name(), width.saturating_sub(fixed));
    let padding = width.saturating_sub(fixed + name.width());

    ListItem::new(Line::from(vec![
        Span::styled(format!(" {glyph}"), glyph_style),
        Span::raw(format!(" {kind} ")),
        Span::styled(name, colors.text()),
        Span::raw(" ".repeat(padding + 1)),
        Span::styled(time, colors.text_muted()),
    ]))
}

fn in_flight(asset: &Asset) -> bool {
    matches!(
        asset.processing_status,
        None | Some(ProcessingStatus::Pending | ProcessingStatus::Processing)
    )
}

/// Cut `text` to `max` display columns, marking the cut with an ellipsis
fn truncate(text: &str, max: usize) -> String {
    if text.width() <= max {
        return text.to_string();
    }
    let mut out = String::new();
    let mut used = 0;
    for c in text.chars() {
        let w = c.width().unwrap_or(0);
        if used + w + 1 > max {
            break;
        }
        out.push(c);
        used += w;
    }
    out.push('…');
    out
}

fn render_preview(frame: &mut Frame, state: &mut AppState, area: Rect) {
    let colors = state.theme.colors();

    let Some(asset) = state.selected_asset().cloned() else {
        let empty = Paragraph::new(vec![
            Line::from(""),
            Line::from(""),
            Line::styled("  Select an asset", colors.text_muted()),
        ])
        .block(
            Block::default()
                .title(" 🔍 Preview ")
                .title_style(colors.text_primary())
                .borders(Borders::ALL)
                .border_type(BorderType::Rounded)
                .border_style(colors.block()),
        );
        frame.render_widget(empty, area);
        return;
    };

    let block = Block::default()
        .title(format!(" 🔍 {} ", asset.display_name()))
        .title_style(colors.text_primary())
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(colors.block());
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let sections = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(4), Constraint::Length(8)])
        .split(inner);

    render_visual(frame, state, sections[0]);
    render_details(frame, state, &asset, sections[1]);
}

fn render_visual(frame: &mut Frame, state: &mut AppState, area: Rect) {
    let colors = state.theme.colors();
    let visual = state.preview_visual();
    let image_area = Rect {
        x: area.x + 1,
        y: area.y,
        width: area.width.saturating_sub(2),
        height: area.height,
    };

    match visual {
        Visual::Icon { kind, reason } => {
            let (label, style) = match reason {
                IconReason::NotSupported => ("No thumbnail for this type", colors.text_muted()),
                IconReason::Failed { .. } => ("Thumbnail generation failed", colors.text_error()),
                IconReason::Skipped => ("Thumbnail skipped", colors.text_warning()),
                IconReason::Pending => ("Waiting for thumbnail", colors.text_dim()),
                IconReason::LoadError => ("Thumbnail could not be loaded", colors.text_muted()),
            };
            let mut lines = vec![
                Line::from(""),
                Line::from(kind.emoji()),
                Line::styled(kind.name(), colors.text_dim()),
                Line::from(""),
                Line::styled(label, style),
            ];
            if let IconReason::Failed { can_retry: true } = reason {
                lines.push(Line::from(vec![
                    Span::styled("Press ", colors.text_dim()),
                    Span::styled("[r]", colors.key_hint()),
                    Span::styled(" to retry", colors.text_dim()),
                ]));
            }
            let paragraph = Paragraph::new(lines).alignment(Alignment::Center);
            frame.render_widget(paragraph, image_area);
        }
        Visual::Temporary { loaded: false, .. } | Visual::Final { loaded: false, .. } => {
            render_placeholder(frame, state, image_area);
        }
        Visual::Temporary { show_progress, .. } => {
            render_image_or_label(frame, state, image_area, "Provisional preview");
            if show_progress {
                let badge = Paragraph::new(Line::from(vec![
                    Span::styled(spinner(state), colors.text_secondary()),
                    Span::styled(" generating", colors.text_muted()),
                ]))
                .alignment(Alignment::Right);
                let corner = Rect {
                    height: image_area.height.min(1),
                    ..image_area
                };
                frame.render_widget(badge, corner);
            }
        }
        Visual::Final { .. } => {
            render_image_or_label(frame, state, image_area, "Thumbnail ready");
        }
    }
}

/// Reserve the thumbnail's box while its image is on the way
fn render_placeholder(frame: &mut Frame, state: &AppState, area: Rect) {
    let colors = state.theme.colors();
    let fill = "░".repeat(area.width as usize);
    let mut lines: Vec<Line> = (0..area.height)
        .map(|_| Line::styled(fill.clone(), colors.text_muted()))
        .collect();
    if let Some(middle) = lines.get_mut(area.height as usize / 2) {
        *middle = Line::styled(format!("{} loading", spinner(state)), colors.text_dim())
            .alignment(Alignment::Center);
    }
    frame.render_widget(Paragraph::new(lines), area);
}

fn render_image_or_label(frame: &mut Frame, state: &mut AppState, area: Rect, label: &str) {
    let colors = state.theme.colors();
    if let Some(protocol) = state.preview_protocol() {
        let image_widget = StatefulImage::new();
        frame.render_stateful_widget(image_widget, area, protocol);
        return;
    }

    let hint = if state.show_images {
        "(image unavailable)"
    } else {
        "(images off, press i)"
    };
    let paragraph = Paragraph::new(vec![
        Line::from(""),
        Line::styled(label.to_string(), colors.text_success()),
        Line::styled(hint, colors.text_muted()),
    ])
    .alignment(Alignment::Center);
    frame.render_widget(paragraph, area);
}

fn render_details(frame: &mut Frame, state: &AppState, asset: &Asset, area: Rect) {
    let colors = state.theme.colors();
    let resolved = state.preview().resolved();

    let field = |name: &'static str, value: String, style: Style| {
        Line::from(vec![
            Span::styled(format!(" {name:<10}"), colors.text_dim()),
            Span::styled(value, style),
        ])
    };

    let (thumb, thumb_style) = resolved.map_or_else(
        || ("-".to_string(), colors.text_muted()),
        |r| {
            (
                format!("{} {}", r.state.glyph(), r.state),
                colors.thumbnail_state(r.state),
            )
        },
    );
    let source = match resolved.and_then(|r| r.source) {
        Some(UrlSource::Final) => "final",
        Some(UrlSource::Temporary) => "temporary",
        None => "-",
    };
    let url = resolved
        .and_then(|r| r.url.clone())
        .unwrap_or_else(|| "-".to_string());
    let status = asset.processing_status.map_or_else(
        || "unknown".to_string(),
        |s| format!("{} {}", s.emoji(), s.as_str()),
    );
    let retries = state.retries_for(&asset.id);
    let retry_text = match resolved {
        Some(r) if r.state == ThumbnailState::Failed => {
            let hint = if r.can_retry { "" } else { " (exhausted)" };
            format!("{retries}/{MAX_RETRIES}{hint}")
        }
        _ => "-".to_string(),
    };

    let lines = vec![
        field("Thumbnail", thumb, thumb_style),
        field("Source", source.to_string(), colors.text()),
        field("URL", url, colors.text_info()),
        field("Pipeline", status, colors.text()),
        field("Retries", retry_text, colors.text()),
        field(
            "Type",
            format!(
                "{} {}",
                asset.mime().unwrap_or("-"),
                asset.extension().map(|e| format!("(.{e})")).unwrap_or_default()
            ),
            colors.text_dim(),
        ),
    ];

    let details = Paragraph::new(lines)
        .wrap(Wrap { trim: true })
        .block(
            Block::default()
                .borders(Borders::TOP)
                .border_style(colors.block()),
        );
    frame.render_widget(details, area);
}

fn render_status_bar(frame: &mut Frame, state: &AppState, area: Rect) {
    let colors = state.theme.colors();

    let loading_indicator = if state.loading {
        format!("{} ", spinner(state))
    } else {
        String::new()
    };

    let content = if state.status.is_empty() {
        vec![
            Span::styled(" ", Style::default()),
            Span::styled(loading_indicator, colors.text_secondary()),
            Span::styled("f", colors.key_hint()),
            Span::styled(": filter  ", colors.text_muted()),
            Span::styled("r", colors.key_hint()),
            Span::styled(": retry  ", colors.text_muted()),
            Span::styled("R", colors.key_hint()),
            Span::styled(": refresh  ", colors.text_muted()),
            Span::styled("?", colors.key_hint()),
            Span::styled(": help  ", colors.text_muted()),
            Span::styled("q", colors.key_hint()),
            Span::styled(": quit", colors.text_muted()),
        ]
    } else {
        vec![
            Span::styled(" ", Style::default()),
            Span::styled(loading_indicator, colors.text_secondary()),
            Span::styled(state.status.as_str(), colors.text_secondary()),
        ]
    };

    let status =
        Paragraph::new(Line::from(content)).style(Style::default().bg(colors.bg_secondary));
    frame.render_widget(status, area);
}

fn render_help_popup(frame: &mut Frame, state: &AppState) {
    let colors = state.theme.colors();
    let area = frame.area();

    let popup_area = centered_rect(50, 70, area);

    // First render a solid background block to cover everything underneath
    let bg_block = Block::default().style(Style::default().bg(colors.bg_secondary));
    frame.render_widget(Clear, popup_area);
    frame.render_widget(bg_block, popup_area);

    let section = |title: &'static str| {
        Line::from(vec![Span::styled(
            format!("  {title}"),
            colors.text_primary().add_modifier(Modifier::BOLD),
        )])
    };
    let key = |keys: &'static str, what: &'static str| {
        Line::from(vec![
            Span::styled(format!("  {keys:<17}"), colors.key_hint()),
            Span::styled(what, colors.text()),
        ])
    };

    let help_content = vec![
        Line::from(""),
        section("Navigation"),
        key("j/k or ↑/↓", "Select asset"),
        key("g/G", "Go to first/last asset"),
        key("f", "Cycle filter (All/Ready/In progress/Problems)"),
        Line::from(""),
        section("Thumbnails"),
        key("r", "Retry a failed thumbnail (twice at most)"),
        key("R", "Refresh assets now"),
        key("i", "Toggle terminal images"),
        key("o", "Open thumbnail in the system viewer"),
        Line::from(""),
        section("Legend"),
        Line::from(vec![
            Span::styled("  ■ available  ", colors.thumbnail_state(ThumbnailState::Available)),
            Span::styled("◌ pending  ", colors.thumbnail_state(ThumbnailState::Pending)),
            Span::styled("✗ failed  ", colors.thumbnail_state(ThumbnailState::Failed)),
            Span::styled("– skipped  ", colors.thumbnail_state(ThumbnailState::Skipped)),
            Span::styled("· no thumbnail", colors.thumbnail_state(ThumbnailState::NotSupported)),
        ]),
        Line::from(""),
        section("General"),
        key("t", "Open theme selector"),
        key("?", "Toggle this help"),
        key("q", "Quit application"),
        Line::from(""),
        Line::from(vec![
            Span::styled("  Press ", colors.text_muted()),
            Span::styled("Esc", colors.key_hint()),
            Span::styled(" or ", colors.text_muted()),
            Span::styled("?", colors.key_hint()),
            Span::styled(" to close", colors.text_muted()),
        ]),
    ];

    let help = Paragraph::new(help_content)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_type(BorderType::Rounded)
                .border_style(colors.block_focus())
                .style(Style::default().bg(colors.bg_secondary))
                .title(" ⌨ Keyboard Shortcuts ")
                .title_style(colors.text_primary()),
        )
        .wrap(Wrap { trim: false });

    frame.render_widget(help, popup_area);
}

fn render_theme_picker(frame: &mut Frame, state: &AppState) {
    let colors = state.theme.colors();
    let area = frame.area();

    let popup_area = centered_rect(50, 70, area);

    let bg_block = Block::default().style(Style::default().bg(colors.bg));
    frame.render_widget(Clear, popup_area);
    frame.render_widget(bg_block, popup_area);

    let themes = Theme::all();
    let items: Vec<ListItem> = themes
        .iter()
        .enumerate()
        .map(|(i, theme_name)| {
            let palette = theme_name.palette();
            let selected = i == state.theme_picker_index;

            let label = format!(
                "  {} {} ",
                if selected { "▸" } else { " " },
                theme_name.display_name()
            );

            let style = if selected {
                Style::default()
                    .fg(palette.accent)
                    .bg(palette.selection)
                    .add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(palette.fg).bg(colors.bg)
            };

            ListItem::new(Line::from(vec![
                Span::styled(label, style),
                Span::styled("█", Style::default().fg(palette.accent).bg(colors.bg)),
                Span::styled("█", Style::default().fg(palette.secondary).bg(colors.bg)),
                Span::styled("█", Style::default().fg(palette.success).bg(colors.bg)),
                Span::styled("█", Style::default().fg(palette.warning).bg(colors.bg)),
            ]))
        })
        .collect();

    let theme_list = List::new(items)
        .style(Style::default().bg(colors.bg))
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(colors.primary))
                .border_type(BorderType::Rounded)
                .style(Style::default().bg(colors.bg))
                .title(format!(
                    " 🎨 Select Theme ({}/{}) ",
                    state.theme_picker_index + 1,
                    themes.len()
                ))
                .title_bottom(Line::from(" ↑↓ navigate │ ↵ apply │ Esc cancel ").centered()),
        );

    frame.render_widget(theme_list, popup_area);
}

const fn centered_rect(percent_x: u16, percent_y: u16, r: Rect) -> Rect {
    let popup_width = r.width * percent_x / 100;
    let popup_height = r.height * percent_y / 100;
    Rect {
        x: r.x + (r.width.saturating_sub(popup_width)) / 2,
        y: r.y + (r.height.saturating_sub(popup_height)) / 2,
        width: popup_width,
        height: popup_height,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("short.png", 20), "short.png");
        assert_eq!(truncate("a-very-long-name.png", 8), "a-very-…");
        assert_eq!(truncate("写真写真.jpg", 5), "写真…");
    }

    #[test]
    fn test_centered_rect() {
        let r = centered_rect(50, 50, Rect::new(0, 0, 100, 40));
        assert_eq!(r, Rect::new(25, 10, 50, 20));
    }
}
