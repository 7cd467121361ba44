use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::{Arc, Mutex};
use std::thread::JoinHandle;
use std::time::Duration;

use crate::config::{AudioSettings, PausePolicy};

use super::thread::spawn_audio_thread;
use super::types::{AudioCmd, PlaybackEvent, PlaybackHandle, PlaybackState};

/// Handle to the audio thread, which owns the playback controller.
pub struct AudioPlayer {
    tx: Sender<AudioCmd>,
    playback: PlaybackHandle,
    join: Mutex<Option<JoinHandle<()>>>,
}

impl AudioPlayer {
    pub fn new(audio_settings: AudioSettings, pause_policy: PausePolicy) -> Self {
        let (tx, rx) = mpsc::channel::<AudioCmd>();
        let playback_info: PlaybackHandle = Arc::new(Mutex::new(PlaybackState::default()));

        let audio_handle = spawn_audio_thread(
            tx.clone(),
            rx,
            playback_info.clone(),
            audio_settings,
            pause_policy,
        );

        Self {
            tx,
            playback: playback_info,
            join: Mutex::new(Some(audio_handle)),
        }
    }

    pub fn playback_handle(&self) -> PlaybackHandle {
        self.playback.clone()
    }

    /// Receive every playback event from now on.
    pub fn subscribe(&self) -> Receiver<PlaybackEvent> {
        let (tx, rx) = mpsc::channel();
        let _ = self.send(AudioCmd::Subscribe(tx));
        rx
    }

    pub fn send(&self, cmd: AudioCmd) -> Result<(), mpsc::SendError<AudioCmd>> {
        self.tx.send(cmd)
    }

    pub fn quit_softly(&self, fade_out: Duration) {
        let _ = self.send(AudioCmd::Quit {
            fade_out_ms: fade_out.as_millis() as u64,
        });

        if let Ok(mut j) = self.join.lock() {
            if let Some(h) = j.take() {
                let _ = h.join();
            }
        }
    }
}
