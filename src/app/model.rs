//! Application model types: `App`, `NowPlaying` and `PlaybackStatus`.
//!
//! The `App` struct holds the catalog view-model, the cursor and a
//! `NowPlaying` value folded from the controller's event stream.

use std::time::Duration;

use crate::audio::{AudioCmd, PlaybackEvent, PlaybackState};
use crate::catalog::{CatalogError, CatalogStore, Track, TrackId};

/// The playback status as the UI renders it.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Default)]
pub enum PlaybackStatus {
    #[default]
    Stopped,
    Loading,
    Playing,
    Paused,
}

/// UI-side fold of `PlaybackEvent`s.
#[derive(Clone, Debug, PartialEq)]
pub struct NowPlaying {
    pub track: Option<TrackId>,
    pub status: PlaybackStatus,
    pub position: Duration,
    pub duration: Option<Duration>,
    pub volume: f32,
    pub last_error: Option<String>,
}

impl Default for NowPlaying {
    fn default() -> Self {
        Self {
            track: None,
            status: PlaybackStatus::Stopped,
            position: Duration::ZERO,
            duration: None,
            volume: 1.0,
            last_error: None,
        }
    }
}

impl NowPlaying {
    pub fn apply(&mut self, event: &PlaybackEvent) {
        match event {
            PlaybackEvent::Acquiring { track } => {
                self.track = Some(track.clone());
                self.status = PlaybackStatus::Loading;
                self.position = Duration::ZERO;
                self.duration = None;
                self.last_error = None;
            }
            PlaybackEvent::Started { track } => {
                self.track = Some(track.clone());
                self.status = PlaybackStatus::Playing;
            }
            PlaybackEvent::Paused { track, position } => {
                self.track = Some(track.clone());
                self.status = PlaybackStatus::Paused;
                self.position = *position;
            }
            PlaybackEvent::Resumed { track, position } => {
                self.track = Some(track.clone());
                self.status = PlaybackStatus::Playing;
                self.position = *position;
            }
            PlaybackEvent::Progress {
                track,
                position,
                duration,
            } => {
                if self.track.as_ref() == Some(track) {
                    self.position = *position;
                    self.duration = *duration;
                }
            }
            PlaybackEvent::VolumeChanged(v) => self.volume = *v,
            PlaybackEvent::Stopped { track } | PlaybackEvent::Ended { track } => {
                if self.track.as_ref() == Some(track) {
                    self.clear();
                }
            }
            PlaybackEvent::Failed { track, error } => {
                if self.track.as_ref() == Some(track) || self.track.is_none() {
                    self.clear();
                }
                self.last_error = Some(format!("Can't play {track}: {error}"));
            }
        }
    }

    fn clear(&mut self) {
        self.track = None;
        self.status = PlaybackStatus::Stopped;
        self.position = Duration::ZERO;
        self.duration = None;
    }

    /// Status of `id` for row markers: `Stopped` unless it is the current track.
    pub fn status_of(&self, id: &TrackId) -> PlaybackStatus {
        if self.track.as_ref() == Some(id) {
            self.status
        } else {
            PlaybackStatus::Stopped
        }
    }
}

/// The main application model.
pub struct App {
    pub catalog: CatalogStore,
    /// Cursor position within `catalog.view()`.
    pub selected: usize,
    pub now_playing: NowPlaying,
    pub follow_playback: bool,
    pub search_mode: bool,
    /// True until the catalog fetch has answered.
    pub loading: bool,
}

impl App {
    /// Create a new `App` around `catalog`, waiting for the first fetch.
    pub fn new(catalog: CatalogStore) -> Self {
        Self {
            catalog,
            selected: 0,
            now_playing: NowPlaying::default(),
            follow_playback: true,
            search_mode: false,
            loading: true,
        }
    }

    /// Apply the outcome of the catalog fetch.
    pub fn finish_loading(&mut self, result: Result<Vec<Track>, CatalogError>) {
        match result {
            Ok(tracks) => self.catalog.load(tracks),
            Err(e) => self.catalog.load_failed(&e.to_string()),
        }
        self.loading = false;
        self.selected = 0;
    }

    pub fn visible_len(&self) -> usize {
        self.catalog.view().len()
    }

    pub fn selected_track(&self) -> Option<&Track> {
        self.catalog.view().get(self.selected).copied()
    }

    /// Move the cursor onto `id` if it is visible. Returns whether it moved.
    pub fn select_track(&mut self, id: &TrackId) -> bool {
        match self.catalog.view().iter().position(|t| &t.id == id) {
            Some(pos) => {
                self.selected = pos;
                true
            }
            None => false,
        }
    }

    /// Move selection to the next visible track, wrapping to the first.
    pub fn next(&mut self) {
        let len = self.visible_len();
        if len > 0 {
            self.selected = (self.selected + 1) % len;
        }
    }

    /// Move selection to the previous visible track, wrapping to the last.
    pub fn prev(&mut self) {
        let len = self.visible_len();
        if len > 0 {
            self.selected = if self.selected == 0 {
                len - 1
            } else {
                (self.selected - 1).min(len - 1)
            };
        }
    }

    pub fn select_first(&mut self) {
        self.selected = 0;
    }

    pub fn select_last(&mut self) {
        self.selected = self.visible_len().saturating_sub(1);
    }

    /// Enter search mode: typed characters edit the search term.
    pub fn enter_search_mode(&mut self) {
        self.search_mode = true;
    }
    /// Leave search mode, keeping the current term.
    pub fn exit_search_mode(&mut self) {
        self.search_mode = false;
    }
    /// Clear the search term and leave search mode.
    pub fn clear_search(&mut self) {
        self.search_mode = false;
        self.edit_search(|term| term.clear());
    }
    /// Append a character to the search term and refresh view.
    pub fn push_search_char(&mut self, c: char) {
        self.edit_search(|term| term.push(c));
    }
    /// Remove the last character from the search term and refresh view.
    pub fn pop_search_char(&mut self) {
        self.edit_search(|term| {
            term.pop();
        });
    }

    fn edit_search(&mut self, edit: impl FnOnce(&mut String)) {
        let mut term = self.catalog.search_term().to_string();
        edit(&mut term);
        self.refresh_view(|catalog| catalog.set_search_term(term));
    }

    /// Flip between title and artist order, keeping the cursor on the same track.
    pub fn cycle_sort_key(&mut self) {
        let key = self.catalog.sort_key().cycle();
        self.refresh_view(|catalog| catalog.set_sort_key(key));
    }

    pub fn toggle_liked_only(&mut self) {
        let liked_only = !self.catalog.liked_only();
        self.refresh_view(|catalog| catalog.set_liked_only(liked_only));
    }

    /// Like or unlike the selected track. Returns the new state.
    pub fn toggle_like_selected(&mut self) -> Option<bool> {
        let id = self.selected_track()?.id.clone();
        let mut liked = false;
        self.refresh_view(|catalog| liked = catalog.toggle_like(&id));
        Some(liked)
    }

    /// Change a view input, then keep the cursor on the same track when it
    /// is still visible, or clamp it into the new view otherwise.
    fn refresh_view(&mut self, change: impl FnOnce(&mut CatalogStore)) {
        let before = self.selected_track().map(|t| t.id.clone());
        change(&mut self.catalog);
        let kept = before.is_some_and(|id| self.select_track(&id));
        if !kept {
            self.selected = self.selected.min(self.visible_len().saturating_sub(1));
        }
    }

    /// The play command for the selected track.
    pub fn play_selected(&self) -> Option<AudioCmd> {
        let track = self.selected_track()?;
        Some(AudioCmd::Play {
            track: track.id.clone(),
            url: track.stream_url.clone(),
        })
    }

    /// Fold a controller event into `now_playing`.
    pub fn apply_playback_event(&mut self, event: &PlaybackEvent) {
        self.now_playing.apply(event);
        if let PlaybackEvent::Started { track } = event {
            if self.follow_playback && !self.search_mode {
                self.select_track(track);
            }
        }
    }

    /// Refresh position, duration and volume from the controller's snapshot.
    ///
    /// Only applies when the snapshot describes the track the event fold
    /// already shows, so a lagging snapshot cannot resurrect a stopped track.
    pub fn sync_from_snapshot(&mut self, snapshot: &PlaybackState) {
        self.now_playing.volume = snapshot.volume;
        let shown = self.now_playing.track.as_ref();
        if shown.is_some() && snapshot.phase.track() == shown {
            self.now_playing.position = snapshot.position;
            self.now_playing.duration = snapshot.duration;
        }
    }

    /// Volume after moving by `delta`, clamped to 0.0..=1.0.
    pub fn stepped_volume(&self, delta: f32) -> f32 {
        (self.now_playing.volume + delta).clamp(0.0, 1.0)
    }

    /// The user-facing message for the status line, if any.
    pub fn advisory(&self) -> Option<&str> {
        self.catalog
            .advisory()
            .or(self.now_playing.last_error.as_deref())
    }
}
