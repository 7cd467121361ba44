//! UI rendering helpers for the terminal user interface.
//!
//! This module contains functions to render the TUI using `ratatui`.

use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Direction, Layout},
    style::{Modifier, Style, Stylize},
    widgets::{Block, Borders, Gauge, List, ListItem, Padding, Paragraph, Wrap},
};
use std::{collections::BTreeMap, sync::LazyLock, time::Duration};

use crate::app::{App, PlaybackStatus};
use crate::catalog::Track;
use crate::config::{ControlsSettings, TimeField, TrackDisplayField, UiSettings};

static CONTROLS_MAP: LazyLock<BTreeMap<String, String>> = LazyLock::new(|| {
    let mut map: BTreeMap<String, String> = BTreeMap::new();
    map.insert("j/k".to_string(), "up/down".to_string());
    map.insert("g/G".to_string(), "top/bottom".to_string());
    map.insert("enter".to_string(), "play/pause selected".to_string());
    map.insert("space".to_string(), "pause/resume".to_string());
    map.insert("x".to_string(), "stop".to_string());
    // h/l and -/+ are filled dynamically from config.
    map.insert("/".to_string(), "search".to_string());
    map.insert("s".to_string(), "sort".to_string());
    map.insert("f".to_string(), "like".to_string());
    map.insert("F".to_string(), "liked only".to_string());
    map.insert("q".to_string(), "quit".to_string());
    map
});

/// Render the controls help text, incorporating configured steps.
fn controls_text(controls: &ControlsSettings) -> String {
    let order = [
        "j/k", "g/G", "enter", "space", "x", "h/l", "-/+", "/", "s", "f", "F", "q",
    ];
    order
        .iter()
        .filter_map(|k| match *k {
            "h/l" => Some(format!("[h/l] seek -/+{}s", controls.scrub_seconds)),
            "-/+" => Some(format!(
                "[-/+] volume -/+{}%",
                (controls.volume_step * 100.0).round()
            )),
            _ => CONTROLS_MAP.get(*k).map(|v| format!("[{}] {}", k, v)),
        })
        .collect::<Vec<String>>()
        .join(" | ")
}

/// Format a `Duration` as `MM:SS`.
fn format_mmss(d: Duration) -> String {
    let secs = d.as_secs();
    format!("{:02}:{:02}", secs / 60, secs % 60)
}

/// Build a track's text according to `ui` settings.
fn track_text(track: &Track, ui: &UiSettings) -> String {
    let parts: Vec<&str> = ui
        .track_fields
        .iter()
        .map(|f| match f {
            TrackDisplayField::Title => track.title.trim(),
            TrackDisplayField::Artist => track.artist.trim(),
            TrackDisplayField::Id => track.id.as_str(),
        })
        .filter(|s| !s.is_empty())
        .collect();

    if parts.is_empty() {
        track.title.clone()
    } else {
        parts.join(&ui.track_separator)
    }
}

/// Build the now-playing time text (elapsed/total/remaining) per `UiSettings`.
fn now_playing_time_text(
    elapsed: Duration,
    total: Option<Duration>,
    ui: &UiSettings,
) -> Option<String> {
    if ui.time_fields.is_empty() {
        return None;
    }

    let mut parts: Vec<String> = Vec::new();
    for f in &ui.time_fields {
        match f {
            TimeField::Elapsed => parts.push(format_mmss(elapsed)),
            TimeField::Total => {
                if let Some(t) = total {
                    parts.push(format_mmss(t));
                }
            }
            TimeField::Remaining => {
                if let Some(t) = total {
                    let rem = t.saturating_sub(elapsed);
                    parts.push(format!("-{}", format_mmss(rem)));
                }
            }
        }
    }

    if parts.is_empty() {
        None
    } else {
        Some(parts.join(&ui.time_separator))
    }
}

fn status_marker(status: PlaybackStatus) -> &'static str {
    match status {
        PlaybackStatus::Stopped => "  ",
        PlaybackStatus::Loading => "… ",
        PlaybackStatus::Playing => "▶ ",
        PlaybackStatus::Paused => "‖ ",
    }
}

fn status_line(app: &App, ui_settings: &UiSettings) -> String {
    let mut parts: Vec<String> = Vec::new();

    parts.push(format!(" SORT: {}", app.catalog.sort_key().label()));

    let q = app.catalog.search_term().trim();
    if app.search_mode || !q.is_empty() {
        let mut search_part = String::from("SEARCH:");
        if !q.is_empty() {
            search_part.push(' ');
            search_part.push_str(q);
        }
        if app.search_mode {
            search_part.push('_');
        }
        parts.push(search_part);
    }

    if app.catalog.liked_only() {
        parts.push(format!("LIKED ONLY ({})", app.catalog.liked_count()));
    }

    let np = &app.now_playing;
    match np.track.as_ref().and_then(|id| app.catalog.track(id)) {
        Some(track) => {
            let song = track_text(track, ui_settings);
            match now_playing_time_text(np.position, np.duration, ui_settings) {
                Some(time) => parts.push(format!("Song: {} [{}]", song, time)),
                None => parts.push(format!("Song: {}", song)),
            }
            let state = match np.status {
                PlaybackStatus::Loading => "Loading",
                PlaybackStatus::Playing => "Playing",
                PlaybackStatus::Paused => "Paused",
                PlaybackStatus::Stopped => "Stopped",
            };
            parts.push(state.to_string());
        }
        None => parts.push("Stopped".to_string()),
    }

    parts.push(format!("Vol: {:.0}%", np.volume * 100.0));

    parts.join(" • ")
}

/// Render the entire UI into the provided `frame` using `app` state and settings.
pub fn draw(
    frame: &mut Frame,
    app: &App,
    ui_settings: &UiSettings,
    controls_settings: &ControlsSettings,
) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Length(5),
            Constraint::Min(1),
            Constraint::Length(3),
            Constraint::Length(4),
        ])
        .split(frame.area());
    // Header
    let header = Paragraph::new(ui_settings.header_text.as_str())
        .alignment(Alignment::Center)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(" riffle ")
                .title_alignment(Alignment::Center),
        );
    frame.render_widget(header, chunks[0]);

    // Status box
    let mut status_text = status_line(app, ui_settings);
    if let Some(msg) = app.advisory() {
        status_text.push('\n');
        status_text.push_str(msg);
    }
    let status_par = Paragraph::new(status_text)
        .block(
            Block::bordered()
                .padding(Padding {
                    left: 1,
                    right: 0,
                    top: 0,
                    bottom: 0,
                })
                .title(" status "),
        )
        .wrap(Wrap { trim: true });
    frame.render_widget(status_par, chunks[1]);

    // Main list
    {
        let view = app.catalog.view();
        let title = if app.loading {
            " tracks (loading…) ".to_string()
        } else {
            format!(" tracks ({}/{}) ", view.len(), app.catalog.len())
        };

        // Center the selected item when possible by creating a visible window.
        // Only build ListItems for the visible window.
        let total = view.len();
        let list_height = chunks[2].height.saturating_sub(2) as usize;
        let sel_pos = app.selected.min(total.saturating_sub(1));
        let (start, end, selected_pos_in_visible) = if total <= list_height || list_height == 0 {
            (0, total, sel_pos)
        } else {
            let half = list_height / 2;
            let mut start = sel_pos.saturating_sub(half);
            if start + list_height > total {
                start = total - list_height;
            }
            (start, start + list_height, sel_pos - start)
        };

        let visible_items: Vec<ListItem> = view[start..end]
            .iter()
            .map(|track| {
                let like = if app.catalog.is_liked(&track.id) {
                    "♥ "
                } else {
                    "  "
                };
                let marker = status_marker(app.now_playing.status_of(&track.id));
                ListItem::new(format!(
                    "{}{}{}",
                    like,
                    marker,
                    track_text(track, ui_settings)
                ))
            })
            .collect();

        let list = List::new(visible_items)
            .block(Block::default().borders(Borders::ALL).title(title))
            .highlight_style(Style::default().add_modifier(Modifier::REVERSED))
            .highlight_symbol("> ");
        let mut state = ratatui::widgets::ListState::default();
        if total > 0 {
            state.select(Some(selected_pos_in_visible));
        }
        frame.render_stateful_widget(list, chunks[2], &mut state);
    }

    // Progress
    let np = &app.now_playing;
    let ratio = match np.duration {
        Some(total) if !total.is_zero() => {
            (np.position.as_secs_f64() / total.as_secs_f64()).clamp(0.0, 1.0)
        }
        _ => 0.0,
    };
    let label = now_playing_time_text(np.position, np.duration, ui_settings).unwrap_or_default();
    let gauge = Gauge::default()
        .block(Block::default().borders(Borders::ALL).title(" progress "))
        .ratio(ratio)
        .label(label)
        .bold();
    frame.render_widget(gauge, chunks[3]);

    let footer = Paragraph::new(controls_text(controls_settings))
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(" controls ")
                .padding(Padding {
                    left: 1,
                    right: 0,
                    top: 0,
                    bottom: 0,
                }),
        )
        .wrap(Wrap { trim: true });

    frame.render_widget(footer, chunks[4]);
}
