use std::sync::mpsc::{self, Receiver};
use std::time::Duration;

use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use ratatui::{Terminal, backend::CrosstermBackend};

use crate::app::App;
use crate::audio::{AudioCmd, AudioPlayer, PlaybackEvent};
use crate::catalog::{CatalogError, Track};
use crate::config;
use crate::ui;

/// Channels the event loop drains on every iteration.
pub struct EventSources {
    /// Answers once with the fetched catalog, then disconnects.
    pub catalog: Receiver<Result<Vec<Track>, CatalogError>>,
    pub playback: Receiver<PlaybackEvent>,
}

/// Main terminal event loop: folds catalog and playback updates into `app`,
/// draws and maps keys to audio commands. Returns `Ok(())` when shutdown is
/// requested.
pub fn run(
    terminal: &mut Terminal<CrosstermBackend<std::io::Stdout>>,
    settings: &config::Settings,
    app: &mut App,
    audio_player: &AudioPlayer,
    sources: &EventSources,
) -> anyhow::Result<()> {
    let playback_handle = audio_player.playback_handle();

    loop {
        if app.loading {
            match sources.catalog.try_recv() {
                Ok(result) => app.finish_loading(result),
                Err(mpsc::TryRecvError::Disconnected) => {
                    let gone = std::io::Error::other("catalog fetch thread exited");
                    app.finish_loading(Err(CatalogError::Io(gone)));
                }
                Err(mpsc::TryRecvError::Empty) => {}
            }
        }

        while let Ok(ev) = sources.playback.try_recv() {
            app.apply_playback_event(&ev);
        }
        if let Ok(snapshot) = playback_handle.lock() {
            app.sync_from_snapshot(&snapshot);
        }

        terminal.draw(|f| ui::draw(f, app, &settings.ui, &settings.controls))?;

        if event::poll(Duration::from_millis(50))? {
            if let Event::Key(key) = event::read()? {
                if key.kind != KeyEventKind::Press {
                    continue;
                }
                if handle_key_event(key, settings, app, audio_player) {
                    break;
                }
            }
        }
    }

    Ok(())
}

/// Map one key press onto the model and the audio thread. Returns `true`
/// when the user asked to quit.
fn handle_key_event(
    key: KeyEvent,
    settings: &config::Settings,
    app: &mut App,
    audio_player: &AudioPlayer,
) -> bool {
    if app.search_mode {
        match key.code {
            KeyCode::Esc => app.clear_search(),
            KeyCode::Enter => app.exit_search_mode(),
            KeyCode::Backspace => app.pop_search_char(),
            KeyCode::Char('j') | KeyCode::Char('n')
                if key.modifiers.contains(KeyModifiers::CONTROL) =>
            {
                app.next();
            }
            KeyCode::Char('k') | KeyCode::Char('p')
                if key.modifiers.contains(KeyModifiers::CONTROL) =>
            {
                app.prev();
            }
            KeyCode::Down => app.next(),
            KeyCode::Up => app.prev(),
            KeyCode::Char(c) => {
                if !c.is_control() {
                    app.push_search_char(c);
                }
            }
            _ => {}
        }

        return false;
    }

    let send = |cmd: AudioCmd| {
        if audio_player.send(cmd).is_err() {
            tracing::warn!("audio thread is gone; command dropped");
        }
    };

    match key.code {
        KeyCode::Char('q') => {
            audio_player.quit_softly(Duration::from_millis(settings.audio.quit_fade_out_ms));
            return true;
        }
        KeyCode::Char('/') => app.enter_search_mode(),
        KeyCode::Esc => app.clear_search(),
        KeyCode::Char('g') | KeyCode::Home => app.select_first(),
        KeyCode::Char('G') | KeyCode::End => app.select_last(),
        KeyCode::Char('j') | KeyCode::Down => app.next(),
        KeyCode::Char('k') | KeyCode::Up => app.prev(),
        KeyCode::Char('s') => app.cycle_sort_key(),
        KeyCode::Char('f') => {
            if let Some(liked) = app.toggle_like_selected() {
                tracing::debug!(liked, "like toggled");
            }
        }
        KeyCode::Char('F') => app.toggle_liked_only(),
        KeyCode::Enter => {
            if let Some(cmd) = app.play_selected() {
                send(cmd);
            }
        }
        KeyCode::Char(' ') => send(AudioCmd::TogglePause),
        KeyCode::Char('x') => send(AudioCmd::Stop),
        KeyCode::Char('l') | KeyCode::Right => {
            send(AudioCmd::SeekBy(settings.controls.scrub_seconds as f64));
        }
        KeyCode::Char('h') | KeyCode::Left => {
            send(AudioCmd::SeekBy(-(settings.controls.scrub_seconds as f64)));
        }
        KeyCode::Char('+') | KeyCode::Char('=') => {
            send(AudioCmd::SetVolume(
                app.stepped_volume(settings.controls.volume_step),
            ));
        }
        KeyCode::Char('-') => {
            send(AudioCmd::SetVolume(
                app.stepped_volume(-settings.controls.volume_step),
            ));
        }
        _ => {}
    }

    false
}
