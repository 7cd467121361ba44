use std::path::PathBuf;

use crate::config;

/// Route `tracing` output to a log file; the terminal belongs to the UI.
///
/// Returns the log path when logging was set up.
pub fn init_logging(settings: &config::LoggingSettings) -> Option<PathBuf> {
    let path = settings.file.clone().or_else(config::default_log_path)?;

    if let Some(parent) = path.parent() {
        if let Err(e) = std::fs::create_dir_all(parent) {
            eprintln!("riffle: cannot create log dir {}: {e}", parent.display());
            return None;
        }
    }

    let log_file = match std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&path)
    {
        Ok(f) => f,
        Err(e) => {
            eprintln!("riffle: logging disabled, cannot open {}: {e}", path.display());
            return None;
        }
    };

    // Allow RUST_LOG override of the configured filter.
    let filter = std::env::var("RUST_LOG").unwrap_or_else(|_| settings.filter.clone());
    let init = tracing_subscriber::fmt()
        .with_writer(std::sync::Mutex::new(log_file))
        .with_env_filter(filter.as_str())
        .with_ansi(false)
        .try_init();
    if let Err(e) = init {
        eprintln!("riffle: logging disabled: {e}");
        return None;
    }

    Some(path)
}
