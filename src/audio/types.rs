//! Audio-related small types and handles.
//!
//! This module defines the commands accepted by the audio thread, the
//! signals a resource posts back, the events the controller emits and the
//! shared playback snapshot.

use std::sync::mpsc::Sender;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use crate::catalog::TrackId;

/// Monotonic acquisition counter used to discard stale resource signals.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Generation(pub u64);

impl Generation {
    pub fn next(self) -> Self {
        Self(self.0 + 1)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AudioError {
    #[error("could not fetch stream: {0}")]
    Fetch(String),
    #[error("stream endpoint returned HTTP {0}")]
    Status(u16),
    #[error("could not read stream file: {0}")]
    Io(String),
    #[error("unsupported or corrupt stream: {0}")]
    Decode(String),
    #[error("no audio output device")]
    NoOutputDevice,
}

#[derive(Debug)]
pub enum AudioCmd {
    /// Play `track`, or pause/resume it if it is already the current one.
    Play { track: TrackId, url: String },
    /// Toggle pause/resume of the current track.
    TogglePause,
    /// Stop playback and release the resource.
    Stop,
    /// Seek to an absolute position in seconds.
    Seek(f64),
    /// Seek by the specified number of seconds (positive or negative).
    SeekBy(f64),
    /// Set the output volume (clamped to 0.0..=1.0).
    SetVolume(f32),
    /// Register a new playback event subscriber.
    Subscribe(Sender<PlaybackEvent>),
    /// A signal posted by the active (or a superseded) resource.
    Resource(ResourceEvent),
    /// Quit the audio thread, optionally fading out over `fade_out_ms` milliseconds.
    Quit { fade_out_ms: u64 },
}

/// Signals a resource posts back to the controller, tagged with the
/// generation it was acquired under.
#[derive(Debug, Clone, PartialEq)]
pub enum ResourceEvent {
    Started(Generation),
    DurationKnown(Generation, Duration),
    TimeUpdate(Generation, Duration),
    Ended(Generation),
    Failed(Generation, AudioError),
}

impl ResourceEvent {
    pub fn generation(&self) -> Generation {
        match self {
            Self::Started(g)
            | Self::DurationKnown(g, _)
            | Self::TimeUpdate(g, _)
            | Self::Ended(g)
            | Self::Failed(g, _) => *g,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum PlaybackPhase {
    #[default]
    Idle,
    /// A resource was requested; playback has not been confirmed yet.
    Acquiring(TrackId),
    Playing(TrackId),
    /// Resource retained, output halted.
    Paused(TrackId),
}

impl PlaybackPhase {
    /// The track the held resource belongs to, whatever its phase.
    pub fn track(&self) -> Option<&TrackId> {
        match self {
            Self::Idle => None,
            Self::Acquiring(id) | Self::Playing(id) | Self::Paused(id) => Some(id),
        }
    }
}

/// Transition events emitted to subscribers.
#[derive(Debug, Clone, PartialEq)]
pub enum PlaybackEvent {
    Acquiring {
        track: TrackId,
    },
    Started {
        track: TrackId,
    },
    Paused {
        track: TrackId,
        position: Duration,
    },
    Resumed {
        track: TrackId,
        position: Duration,
    },
    Progress {
        track: TrackId,
        position: Duration,
        duration: Option<Duration>,
    },
    VolumeChanged(f32),
    Stopped {
        track: TrackId,
    },
    /// The track played to its natural end.
    Ended {
        track: TrackId,
    },
    Failed {
        track: TrackId,
        error: AudioError,
    },
}

#[derive(Debug, Clone, PartialEq)]
/// Point-in-time view of the controller, shared with the UI.
pub struct PlaybackState {
    /// Track currently rendered as playing (only while `Playing`).
    pub active_track_id: Option<TrackId>,
    pub phase: PlaybackPhase,
    pub position: Duration,
    pub duration: Option<Duration>,
    pub volume: f32,
}

impl Default for PlaybackState {
    fn default() -> Self {
        Self {
            active_track_id: None,
            phase: PlaybackPhase::Idle,
            position: Duration::ZERO,
            duration: None,
            volume: 1.0,
        }
    }
}

pub type PlaybackHandle = Arc<Mutex<PlaybackState>>;
