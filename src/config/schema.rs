use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Top-level application settings loaded from `config.toml`.
///
/// File format: TOML
/// Default path (Linux/XDG): `$XDG_CONFIG_HOME/riffle/config.toml` or `~/.config/riffle/config.toml`
///
/// Precedence (highest wins):
/// 1) Environment variables (prefix `RIFFLE__`, `__` as nested separator)
/// 2) Config file (if present)
/// 3) Struct defaults
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct Settings {
    pub catalog: CatalogSettings,
    pub audio: AudioSettings,
    pub playback: PlaybackSettings,
    pub controls: ControlsSettings,
    pub ui: UiSettings,
    pub logging: LoggingSettings,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct CatalogSettings {
    /// Where the song list comes from: an `http(s)://` endpoint returning a
    /// JSON array, or a path to a local JSON file.
    pub source: String,
    /// Request timeout for fetching the catalog (seconds).
    pub timeout_secs: u64,
}

impl Default for CatalogSettings {
    fn default() -> Self {
        Self {
            source: "https://robo-music-api.onrender.com/music/my-api".to_string(),
            timeout_secs: 15,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct AudioSettings {
    /// Volume applied to the first stream (0.0 - 1.0).
    pub initial_volume: f32,
    /// How often a playing stream reports its position (milliseconds).
    pub progress_interval_ms: u64,
    /// Request timeout for downloading a stream (seconds).
    pub fetch_timeout_secs: u64,
    /// Fade-out duration when quitting (milliseconds).
    /// Set to 0 to stop immediately.
    pub quit_fade_out_ms: u64,
}

impl Default for AudioSettings {
    fn default() -> Self {
        Self {
            initial_volume: 1.0,
            progress_interval_ms: 250,
            fetch_timeout_secs: 60,
            quit_fade_out_ms: 300,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct PlaybackSettings {
    /// What re-playing the playing track does.
    pub pause_policy: PausePolicy,
    /// Initial ordering of the track list.
    pub sort_key: SortKeySetting,
}

impl Default for PlaybackSettings {
    fn default() -> Self {
        Self {
            pause_policy: PausePolicy::Resume,
            sort_key: SortKeySetting::Title,
        }
    }
}

/// Behaviour when the play action is used on the track that is playing.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum PausePolicy {
    /// Pause in place; playing again continues where it stopped.
    #[default]
    #[serde(alias = "preserve", alias = "pause")]
    Resume,
    /// Pause and rewind; playing again starts from the beginning.
    #[serde(alias = "reset", alias = "rewind")]
    Restart,
}

#[derive(Debug, Copy, Clone, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum SortKeySetting {
    #[serde(alias = "name", alias = "song")]
    Title,
    #[serde(alias = "artist-name", alias = "artist_name")]
    Artist,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ControlsSettings {
    /// Number of seconds to seek when pressing `h` / `l`.
    pub scrub_seconds: u64,
    /// Volume change per `-` / `+` press (0.0 - 1.0).
    pub volume_step: f32,
}

impl Default for ControlsSettings {
    fn default() -> Self {
        Self {
            scrub_seconds: 5,
            volume_step: 0.05,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct UiSettings {
    /// Whether the cursor jumps to a track when it starts playing.
    pub follow_playback: bool,

    /// The text rendered inside the top header box.
    pub header_text: String,

    /// Which track fields to show in list rows and the "Song:" line, and in what order.
    ///
    /// Example: ["artist", "title"]
    pub track_fields: Vec<TrackDisplayField>,

    /// Separator used to join `track_fields`.
    pub track_separator: String,

    /// Which time fields to show for the status line, and in what order.
    ///
    /// Example: ["elapsed", "total", "remaining"]
    pub time_fields: Vec<TimeField>,

    /// Separator used to join `time_fields`.
    pub time_separator: String,
}

impl Default for UiSettings {
    fn default() -> Self {
        Self {
            follow_playback: true,
            header_text: " ~ PlayList ~ ".to_string(),
            track_fields: vec![TrackDisplayField::Artist, TrackDisplayField::Title],
            track_separator: " - ".to_string(),
            time_fields: vec![TimeField::Elapsed, TimeField::Total, TimeField::Remaining],
            time_separator: " / ".to_string(),
        }
    }
}

#[derive(Debug, Copy, Clone, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum TimeField {
    Elapsed,
    Total,
    Remaining,
}

#[derive(Debug, Copy, Clone, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum TrackDisplayField {
    Title,
    Artist,
    Id,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct LoggingSettings {
    /// Log file; defaults to `$XDG_STATE_HOME/riffle/riffle.log`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file: Option<PathBuf>,
    /// `tracing` filter directive, overridden by `RUST_LOG`.
    pub filter: String,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            file: None,
            filter: "info,riffle=debug,hyper_util=warn,reqwest=warn,hyper=warn".to_string(),
        }
    }
}
