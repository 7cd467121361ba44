use std::sync::mpsc::{self, Receiver};
use std::thread;
use std::time::Duration;

use crate::app::App;
use crate::catalog::{self, CatalogError, SortKey, Track};
use crate::config;

/// Seed the view-model with the configured defaults.
pub fn apply_view_defaults(app: &mut App, settings: &config::Settings) {
    app.follow_playback = settings.ui.follow_playback;
    app.now_playing.volume = settings.audio.initial_volume;
    let key = match settings.playback.sort_key {
        config::SortKeySetting::Title => SortKey::Title,
        config::SortKeySetting::Artist => SortKey::Artist,
    };
    app.catalog.set_sort_key(key);
}

/// Fetch the catalog off the UI thread; the answer arrives exactly once.
pub fn spawn_catalog_fetch(
    source: String,
    timeout: Duration,
) -> Receiver<Result<Vec<Track>, CatalogError>> {
    let (tx, rx) = mpsc::channel();
    thread::spawn(move || {
        let _ = tx.send(catalog::fetch_catalog(&source, timeout));
    });
    rx
}
