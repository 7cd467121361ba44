use std::env;
use std::time::Duration;

use anyhow::Context;
use crossterm::execute;
use crossterm::terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode};
use ratatui::{Terminal, backend::CrosstermBackend};

use crate::app::App;
use crate::audio::AudioPlayer;
use crate::catalog::CatalogStore;

mod event_loop;
mod logging;
mod settings;
mod startup;

pub fn run() -> anyhow::Result<()> {
    let settings::LoadedSettings {
        mut settings,
        fallback_reason,
    } = settings::load_settings();

    let mut args = env::args().skip(1);
    match args.next() {
        Some(flag) if flag == "--print-config" => {
            let rendered = settings.to_toml().context("rendering configuration")?;
            print!("{rendered}");
            return Ok(());
        }
        Some(source) => settings.catalog.source = source,
        None => {}
    }

    if let Some(path) = logging::init_logging(&settings.logging) {
        tracing::info!(log = %path.display(), "riffle starting");
    }
    if let Some(reason) = &fallback_reason {
        tracing::warn!(%reason, "using default settings");
    }

    let catalog_rx = startup::spawn_catalog_fetch(
        settings.catalog.source.clone(),
        Duration::from_secs(settings.catalog.timeout_secs),
    );
    let audio_player = AudioPlayer::new(settings.audio.clone(), settings.playback.pause_policy);
    let sources = event_loop::EventSources {
        catalog: catalog_rx,
        playback: audio_player.subscribe(),
    };

    let mut app = App::new(CatalogStore::new());
    startup::apply_view_defaults(&mut app, &settings);

    enable_raw_mode()?;
    let mut stdout = std::io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let run_result = event_loop::run(&mut terminal, &settings, &mut app, &audio_player, &sources);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    if let Err(e) = &run_result {
        tracing::error!(error = %e, "event loop failed");
        audio_player.quit_softly(Duration::ZERO);
    }
    tracing::info!("riffle exiting");
    run_result
}
