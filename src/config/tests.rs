use super::load::{default_config_path, default_log_path, resolve_config_path};
use super::schema::*;
use std::sync::{Mutex, OnceLock};

static ENV_LOCK: OnceLock<Mutex<()>> = OnceLock::new();

fn env_lock() -> std::sync::MutexGuard<'static, ()> {
    ENV_LOCK.get_or_init(|| Mutex::new(())).lock().unwrap()
}

struct EnvGuard {
    key: &'static str,
    old: Option<std::ffi::OsString>,
}

impl EnvGuard {
    fn set(key: &'static str, val: &str) -> Self {
        let old = std::env::var_os(key);
        unsafe {
            std::env::set_var(key, val);
        }
        Self { key, old }
    }

    fn remove(key: &'static str) -> Self {
        let old = std::env::var_os(key);
        unsafe {
            std::env::remove_var(key);
        }
        Self { key, old }
    }
}

impl Drop for EnvGuard {
    fn drop(&mut self) {
        match self.old.take() {
            Some(v) => unsafe {
                std::env::set_var(self.key, v);
            },
            None => unsafe {
                std::env::remove_var(self.key);
            },
        }
    }
}

#[test]
fn resolve_config_path_prefers_riffle_config_path() {
    let _lock = env_lock();
    let _g1 = EnvGuard::set("RIFFLE_CONFIG_PATH", "/tmp/riffle-test-config.toml");
    assert_eq!(
        resolve_config_path().unwrap(),
        std::path::PathBuf::from("/tmp/riffle-test-config.toml")
    );
}

#[test]
fn default_config_path_prefers_xdg_config_home() {
    let _lock = env_lock();
    let _g1 = EnvGuard::set("XDG_CONFIG_HOME", "/tmp/xdg-config-home");
    let _g2 = EnvGuard::set("HOME", "/tmp/home-should-not-win");

    let p = default_config_path().unwrap();
    assert_eq!(
        p,
        std::path::PathBuf::from("/tmp/xdg-config-home")
            .join("riffle")
            .join("config.toml")
    );
}

#[test]
fn default_config_path_falls_back_to_home_dot_config() {
    let _lock = env_lock();
    let _g1 = EnvGuard::remove("XDG_CONFIG_HOME");
    let _g2 = EnvGuard::set("HOME", "/tmp/home-dir");

    let p = default_config_path().unwrap();
    assert_eq!(
        p,
        std::path::PathBuf::from("/tmp/home-dir")
            .join(".config")
            .join("riffle")
            .join("config.toml")
    );
}

#[test]
fn default_log_path_uses_xdg_state_home_then_home() {
    let _lock = env_lock();
    let _g1 = EnvGuard::set("XDG_STATE_HOME", "/tmp/xdg-state");
    assert_eq!(
        default_log_path().unwrap(),
        std::path::PathBuf::from("/tmp/xdg-state/riffle/riffle.log")
    );

    let _g2 = EnvGuard::remove("XDG_STATE_HOME");
    let _g3 = EnvGuard::set("HOME", "/tmp/home-dir");
    assert_eq!(
        default_log_path().unwrap(),
        std::path::PathBuf::from("/tmp/home-dir/.local/state/riffle/riffle.log")
    );
}

#[test]
fn settings_load_from_config_file_and_parse_aliases() {
    let _lock = env_lock();

    let dir = tempfile::tempdir().unwrap();
    let cfg_path = dir.path().join("config.toml");
    std::fs::write(
        &cfg_path,
        r#"
[catalog]
source = "/srv/music/songs.json"
timeout_secs = 3

[playback]
pause_policy = "reset"
sort_key = "artist"

[audio]
initial_volume = 0.5
progress_interval_ms = 100
fetch_timeout_secs = 9
quit_fade_out_ms = 0

[controls]
scrub_seconds = 9
volume_step = 0.1

[ui]
follow_playback = false
header_text = "hello"
track_fields = ["title", "id"]
track_separator = " • "
time_fields = ["elapsed", "remaining"]
time_separator = " | "

[logging]
file = "/tmp/riffle-test.log"
filter = "warn"
"#,
    )
    .unwrap();

    let _g1 = EnvGuard::set("RIFFLE_CONFIG_PATH", cfg_path.to_str().unwrap());
    let _g2 = EnvGuard::remove("RIFFLE__AUDIO__INITIAL_VOLUME");

    let s = Settings::load().unwrap();
    assert_eq!(s.catalog.source, "/srv/music/songs.json");
    assert_eq!(s.catalog.timeout_secs, 3);
    assert_eq!(s.playback.pause_policy, PausePolicy::Restart);
    assert!(matches!(s.playback.sort_key, SortKeySetting::Artist));
    assert_eq!(s.audio.initial_volume, 0.5);
    assert_eq!(s.audio.progress_interval_ms, 100);
    assert_eq!(s.audio.fetch_timeout_secs, 9);
    assert_eq!(s.audio.quit_fade_out_ms, 0);
    assert_eq!(s.controls.scrub_seconds, 9);
    assert_eq!(s.controls.volume_step, 0.1);
    assert!(!s.ui.follow_playback);
    assert_eq!(s.ui.header_text, "hello");
    assert_eq!(s.ui.track_fields.len(), 2);
    assert!(matches!(s.ui.track_fields[0], TrackDisplayField::Title));
    assert!(matches!(s.ui.track_fields[1], TrackDisplayField::Id));
    assert_eq!(s.ui.track_separator, " • ");
    assert_eq!(s.ui.time_fields.len(), 2);
    assert!(matches!(s.ui.time_fields[0], TimeField::Elapsed));
    assert!(matches!(s.ui.time_fields[1], TimeField::Remaining));
    assert_eq!(s.ui.time_separator, " | ");
    assert_eq!(
        s.logging.file.as_deref(),
        Some(std::path::Path::new("/tmp/riffle-test.log"))
    );
    assert_eq!(s.logging.filter, "warn");
    assert!(s.validate().is_ok());
}

#[test]
fn settings_env_overrides_config_file() {
    let _lock = env_lock();

    let dir = tempfile::tempdir().unwrap();
    let cfg_path = dir.path().join("config.toml");
    std::fs::write(
        &cfg_path,
        r#"
[audio]
quit_fade_out_ms = 250
"#,
    )
    .unwrap();

    let _g1 = EnvGuard::set("RIFFLE_CONFIG_PATH", cfg_path.to_str().unwrap());
    let _g2 = EnvGuard::set("RIFFLE__AUDIO__QUIT_FADE_OUT_MS", "0");

    let s = Settings::load().unwrap();
    assert_eq!(s.audio.quit_fade_out_ms, 0);
}

#[test]
fn missing_config_file_yields_defaults() {
    let _lock = env_lock();
    let dir = tempfile::tempdir().unwrap();
    let _g1 = EnvGuard::set(
        "RIFFLE_CONFIG_PATH",
        dir.path().join("absent.toml").to_str().unwrap(),
    );

    let s = Settings::load().unwrap();
    assert_eq!(s.playback.pause_policy, PausePolicy::Resume);
    assert_eq!(s.catalog.source, CatalogSettings::default().source);
    assert!(s.validate().is_ok());
}

#[test]
fn validate_rejects_nonsense() {
    let mut s = Settings::default();
    s.audio.progress_interval_ms = 0;
    assert!(s.validate().is_err());

    let mut s = Settings::default();
    s.controls.volume_step = 0.0;
    assert!(s.validate().is_err());

    let mut s = Settings::default();
    s.audio.initial_volume = 1.5;
    assert!(s.validate().is_err());

    let mut s = Settings::default();
    s.catalog.source = "  ".into();
    assert!(s.validate().is_err());
}

#[test]
fn default_settings_render_as_toml() {
    let text = Settings::default().to_toml().unwrap();
    assert!(text.contains("[playback]"));
    assert!(text.contains("pause_policy = \"resume\""));
    assert!(text.contains("robo-music-api"));
}
