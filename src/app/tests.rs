use super::*;
use crate::audio::{AudioCmd, AudioError, PlaybackEvent, PlaybackPhase, PlaybackState};
use crate::catalog::{CatalogError, CatalogStore, SONGS_UNAVAILABLE, SortKey, Track, TrackId};
use std::time::Duration;

fn t(id: &str, title: &str, artist: &str) -> Track {
    Track::new(id, title, artist, format!("https://cdn.test/{id}.mp3"))
}

fn loaded(tracks: Vec<Track>) -> App {
    let mut app = App::new(CatalogStore::new());
    app.finish_loading(Ok(tracks));
    app
}

fn id(s: &str) -> TrackId {
    TrackId::new(s)
}

fn selected_title(app: &App) -> Option<&str> {
    app.selected_track().map(|t| t.title.as_str())
}

#[test]
fn starts_loading_until_fetch_answers() {
    let mut app = App::new(CatalogStore::new());
    assert!(app.loading);
    assert!(app.selected_track().is_none());

    app.finish_loading(Ok(vec![t("1", "Alpha", "A")]));
    assert!(!app.loading);
    assert_eq!(selected_title(&app), Some("Alpha"));
}

#[test]
fn failed_fetch_shows_advisory_and_empty_list() {
    let mut app = App::new(CatalogStore::new());
    app.finish_loading(Err(CatalogError::Status(503)));

    assert!(!app.loading);
    assert!(app.catalog.is_empty());
    assert_eq!(app.advisory(), Some(SONGS_UNAVAILABLE));
    assert!(app.play_selected().is_none());
}

#[test]
fn next_prev_wrap_within_view() {
    let mut app = loaded(vec![t("1", "Alpha", "A"), t("2", "Beta", "B"), t("3", "Gamma", "C")]);

    app.prev();
    assert_eq!(selected_title(&app), Some("Gamma"));
    app.next();
    assert_eq!(selected_title(&app), Some("Alpha"));
    app.next();
    assert_eq!(selected_title(&app), Some("Beta"));

    app.select_last();
    assert_eq!(selected_title(&app), Some("Gamma"));
    app.select_first();
    assert_eq!(selected_title(&app), Some("Alpha"));
}

#[test]
fn navigation_on_empty_view_is_a_noop() {
    let mut app = loaded(vec![]);
    app.next();
    app.prev();
    app.select_last();
    assert_eq!(app.selected, 0);
    assert!(app.selected_track().is_none());
}

#[test]
fn typing_a_search_narrows_the_view() {
    let mut app = loaded(vec![t("1", "Alpha", "A"), t("2", "Beta", "B"), t("3", "Gamma", "C")]);
    app.enter_search_mode();
    app.push_search_char('e');
    app.push_search_char('t');

    assert_eq!(app.catalog.search_term(), "et");
    assert_eq!(app.visible_len(), 1);
    assert_eq!(selected_title(&app), Some("Beta"));

    app.pop_search_char();
    assert_eq!(app.catalog.search_term(), "e");

    app.clear_search();
    assert!(!app.search_mode);
    assert_eq!(app.catalog.search_term(), "");
    assert_eq!(app.visible_len(), 3);
}

#[test]
fn exit_search_mode_keeps_the_term() {
    let mut app = loaded(vec![t("1", "Alpha", "A"), t("2", "Beta", "B")]);
    app.enter_search_mode();
    app.push_search_char('b');
    app.exit_search_mode();

    assert!(!app.search_mode);
    assert_eq!(app.catalog.search_term(), "b");
    assert_eq!(app.visible_len(), 1);
}

#[test]
fn selection_follows_track_when_view_changes() {
    let mut app = loaded(vec![t("1", "Zulu", "Abba"), t("2", "Alpha", "Yes")]);
    // title order: Alpha, Zulu
    app.select_last();
    assert_eq!(selected_title(&app), Some("Zulu"));

    app.cycle_sort_key();
    assert_eq!(app.catalog.sort_key(), SortKey::Artist);
    // artist order: Zulu (Abba), Alpha (Yes)
    assert_eq!(app.selected, 0);
    assert_eq!(selected_title(&app), Some("Zulu"));
}

#[test]
fn selection_clamps_when_track_leaves_view() {
    let mut app = loaded(vec![t("1", "Alpha", "A"), t("2", "Beta", "B"), t("3", "Gamma", "C")]);
    app.select_last();
    app.push_search_char('a');
    app.push_search_char('l');
    // only Alpha left
    assert_eq!(app.selected, 0);
    assert_eq!(selected_title(&app), Some("Alpha"));
}

#[test]
fn like_toggle_and_liked_only_filter() {
    let mut app = loaded(vec![t("1", "Alpha", "A"), t("2", "Beta", "B")]);
    app.next();
    assert_eq!(app.toggle_like_selected(), Some(true));
    assert!(app.catalog.is_liked(&id("2")));

    app.toggle_liked_only();
    assert_eq!(app.visible_len(), 1);
    assert_eq!(selected_title(&app), Some("Beta"));

    // unliking the only visible track empties the liked view
    assert_eq!(app.toggle_like_selected(), Some(false));
    assert_eq!(app.visible_len(), 0);
    assert!(app.toggle_like_selected().is_none());

    app.toggle_liked_only();
    assert_eq!(app.visible_len(), 2);
}

#[test]
fn play_selected_builds_play_command() {
    let app = loaded(vec![t("7", "Alpha", "A")]);
    match app.play_selected() {
        Some(AudioCmd::Play { track, url }) => {
            assert_eq!(track, id("7"));
            assert_eq!(url, "https://cdn.test/7.mp3");
        }
        other => panic!("unexpected command: {other:?}"),
    }
}

#[test]
fn now_playing_folds_lifecycle_events() {
    let mut app = loaded(vec![t("1", "Alpha", "A")]);
    let one = id("1");

    app.apply_playback_event(&PlaybackEvent::Acquiring { track: one.clone() });
    assert_eq!(app.now_playing.status, PlaybackStatus::Loading);
    assert_eq!(app.now_playing.status_of(&one), PlaybackStatus::Loading);

    app.apply_playback_event(&PlaybackEvent::Started { track: one.clone() });
    app.apply_playback_event(&PlaybackEvent::Progress {
        track: one.clone(),
        position: Duration::from_secs(3),
        duration: Some(Duration::from_secs(90)),
    });
    assert_eq!(app.now_playing.status, PlaybackStatus::Playing);
    assert_eq!(app.now_playing.position, Duration::from_secs(3));
    assert_eq!(app.now_playing.duration, Some(Duration::from_secs(90)));

    app.apply_playback_event(&PlaybackEvent::Paused {
        track: one.clone(),
        position: Duration::from_secs(4),
    });
    assert_eq!(app.now_playing.status, PlaybackStatus::Paused);

    app.apply_playback_event(&PlaybackEvent::Ended { track: one.clone() });
    assert_eq!(app.now_playing.status, PlaybackStatus::Stopped);
    assert!(app.now_playing.track.is_none());
    assert_eq!(app.now_playing.status_of(&one), PlaybackStatus::Stopped);
}

#[test]
fn stale_stop_for_previous_track_is_ignored() {
    let mut app = loaded(vec![t("1", "Alpha", "A"), t("2", "Beta", "B")]);
    app.apply_playback_event(&PlaybackEvent::Acquiring { track: id("2") });
    app.apply_playback_event(&PlaybackEvent::Stopped { track: id("1") });
    assert_eq!(app.now_playing.track, Some(id("2")));
    assert_eq!(app.now_playing.status, PlaybackStatus::Loading);
}

#[test]
fn failure_is_reported_and_cleared_by_next_play() {
    let mut app = loaded(vec![t("1", "Alpha", "A"), t("2", "Beta", "B")]);
    app.apply_playback_event(&PlaybackEvent::Acquiring { track: id("1") });
    app.apply_playback_event(&PlaybackEvent::Failed {
        track: id("1"),
        error: AudioError::Status(404),
    });
    assert_eq!(app.now_playing.status, PlaybackStatus::Stopped);
    assert!(app.advisory().is_some_and(|m| m.contains("404")));

    app.apply_playback_event(&PlaybackEvent::Acquiring { track: id("2") });
    assert!(app.advisory().is_none());
}

#[test]
fn started_track_pulls_the_cursor_when_following() {
    let mut app = loaded(vec![t("1", "Alpha", "A"), t("2", "Beta", "B")]);
    app.apply_playback_event(&PlaybackEvent::Started { track: id("2") });
    assert_eq!(selected_title(&app), Some("Beta"));

    app.follow_playback = false;
    app.select_first();
    app.apply_playback_event(&PlaybackEvent::Started { track: id("2") });
    assert_eq!(selected_title(&app), Some("Alpha"));
}

#[test]
fn volume_steps_are_clamped() {
    let mut app = loaded(vec![]);
    app.apply_playback_event(&PlaybackEvent::VolumeChanged(0.98));
    assert_eq!(app.stepped_volume(0.05), 1.0);
    app.apply_playback_event(&PlaybackEvent::VolumeChanged(0.02));
    assert_eq!(app.stepped_volume(-0.05), 0.0);
}

#[test]
fn snapshot_only_updates_the_track_already_shown() {
    let mut app = loaded(vec![t("1", "Alpha", "A"), t("2", "Beta", "B")]);
    app.apply_playback_event(&PlaybackEvent::Started { track: id("1") });

    let snapshot = PlaybackState {
        active_track_id: Some(id("1")),
        phase: PlaybackPhase::Playing(id("1")),
        position: Duration::from_secs(12),
        duration: Some(Duration::from_secs(200)),
        volume: 0.5,
    };
    app.sync_from_snapshot(&snapshot);
    assert_eq!(app.now_playing.position, Duration::from_secs(12));
    assert_eq!(app.now_playing.volume, 0.5);

    let other = PlaybackState {
        active_track_id: Some(id("2")),
        phase: PlaybackPhase::Playing(id("2")),
        position: Duration::from_secs(40),
        duration: None,
        volume: 0.5,
    };
    app.sync_from_snapshot(&other);
    assert_eq!(app.now_playing.position, Duration::from_secs(12));
    assert_eq!(app.now_playing.track, Some(id("1")));
}
