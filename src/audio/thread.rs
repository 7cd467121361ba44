use std::sync::mpsc::{Receiver, Sender};
use std::thread;
use std::thread::JoinHandle;
use std::time::Duration;

use crate::config::{AudioSettings, PausePolicy};

use super::controller::PlaybackController;
use super::resource::AudioBackend;
use super::sink::RodioBackend;
use super::types::{AudioCmd, PlaybackHandle};

pub(super) fn spawn_audio_thread(
    tx: Sender<AudioCmd>,
    rx: Receiver<AudioCmd>,
    playback_info: PlaybackHandle,
    audio_settings: AudioSettings,
    pause_policy: PausePolicy,
) -> JoinHandle<()> {
    thread::spawn(move || {
        // The output stream is opened on this thread and never leaves it.
        let backend = RodioBackend::open(tx, &audio_settings);
        let mut controller =
            PlaybackController::new(backend, audio_settings.initial_volume, pause_policy);
        publish(&controller, &playback_info);

        run_commands(&mut controller, &rx, &playback_info);
    })
}

/// Apply commands one at a time, in arrival order, until `Quit` or until
/// every sender is gone.
pub(super) fn run_commands<B: AudioBackend>(
    controller: &mut PlaybackController<B>,
    rx: &Receiver<AudioCmd>,
    playback_info: &PlaybackHandle,
) {
    while let Ok(cmd) = rx.recv() {
        match cmd {
            AudioCmd::Play { track, url } => controller.play(track, &url),
            AudioCmd::TogglePause => controller.toggle_pause(),
            AudioCmd::Stop => controller.stop(),
            AudioCmd::Seek(secs) => controller.seek(secs),
            AudioCmd::SeekBy(secs) => controller.seek_by(secs),
            AudioCmd::SetVolume(level) => controller.set_volume(level),
            AudioCmd::Subscribe(tx) => controller.add_subscriber(tx),
            AudioCmd::Resource(event) => controller.handle_resource_event(event),
            AudioCmd::Quit { fade_out_ms } => {
                controller.shutdown(Duration::from_millis(fade_out_ms));
                publish(controller, playback_info);
                break;
            }
        }
        publish(controller, playback_info);
    }
}

fn publish<B: AudioBackend>(controller: &PlaybackController<B>, playback_info: &PlaybackHandle) {
    if let Ok(mut info) = playback_info.lock() {
        *info = controller.snapshot();
    }
}
