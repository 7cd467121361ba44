use crate::config;

/// Settings to run with, plus the reason defaults were substituted, if they
/// were. The reason is printed now and logged once logging is up.
pub struct LoadedSettings {
    pub settings: config::Settings,
    pub fallback_reason: Option<String>,
}

pub fn load_settings() -> LoadedSettings {
    let fallback_reason = match config::Settings::load() {
        Ok(s) => match s.validate() {
            Ok(()) => {
                return LoadedSettings {
                    settings: s,
                    fallback_reason: None,
                };
            }
            Err(msg) => format!("invalid config: {msg}"),
        },
        // Config is optional; failures should not prevent the app from starting.
        Err(e) => format!("failed to load config: {e}"),
    };

    eprintln!("riffle: {fallback_reason}, using defaults");
    LoadedSettings {
        settings: config::Settings::default(),
        fallback_reason: Some(fallback_reason),
    }
}
