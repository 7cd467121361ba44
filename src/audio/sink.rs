//! `rodio`-backed audio resources.
//!
//! Each acquisition spawns a loader thread that fetches and decodes the
//! stream, attaches a `Sink` to the shared mixer and then reports progress
//! until the sink drains. The handle the controller holds and the loader
//! share one mutex-guarded slot; once `released` is set the loader neither
//! attaches a sink nor posts further signals.

use std::sync::mpsc::Sender;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::thread;
use std::time::Duration;

use rodio::mixer::Mixer;
use rodio::{OutputStream, OutputStreamBuilder, Sink};

use crate::config::AudioSettings;

use super::resource::{AcquireRequest, AudioBackend, AudioResource};
use super::source;
use super::types::{AudioCmd, AudioError, Generation, ResourceEvent};

struct Slot {
    sink: Option<Sink>,
    wants_play: bool,
    volume: f32,
    released: bool,
}

fn lock(slot: &Mutex<Slot>) -> MutexGuard<'_, Slot> {
    slot.lock().unwrap_or_else(PoisonError::into_inner)
}

pub struct RodioBackend {
    stream: Option<OutputStream>,
    client: reqwest::blocking::Client,
    events: Sender<AudioCmd>,
    progress_interval: Duration,
}

impl RodioBackend {
    /// Open the default output device. A missing device is not fatal: every
    /// acquisition then fails with `AudioError::NoOutputDevice`.
    pub fn open(events: Sender<AudioCmd>, settings: &AudioSettings) -> Self {
        let stream = match OutputStreamBuilder::open_default_stream() {
            Ok(mut stream) => {
                // rodio logs to stderr when OutputStream is dropped, which would
                // scribble over the TUI.
                stream.log_on_drop(false);
                Some(stream)
            }
            Err(e) => {
                tracing::error!(error = %e, "no audio output device");
                None
            }
        };

        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(settings.fetch_timeout_secs))
            .build()
            .unwrap_or_else(|e| {
                tracing::warn!(error = %e, "falling back to default HTTP client");
                reqwest::blocking::Client::new()
            });

        Self {
            stream,
            client,
            events,
            progress_interval: Duration::from_millis(settings.progress_interval_ms.max(1)),
        }
    }
}

impl AudioBackend for RodioBackend {
    type Resource = RodioResource;

    fn acquire(&mut self, request: AcquireRequest) -> Result<RodioResource, AudioError> {
        let Some(stream) = self.stream.as_ref() else {
            return Err(AudioError::NoOutputDevice);
        };

        let slot = Arc::new(Mutex::new(Slot {
            sink: None,
            wants_play: false,
            volume: request.volume,
            released: false,
        }));

        let loader = Loader {
            slot: slot.clone(),
            mixer: stream.mixer().clone(),
            client: self.client.clone(),
            events: self.events.clone(),
            generation: request.generation,
            progress_interval: self.progress_interval,
        };
        let url = request.url;
        thread::spawn(move || loader.run(&url));

        Ok(RodioResource { slot })
    }
}

struct Loader {
    slot: Arc<Mutex<Slot>>,
    mixer: Mixer,
    client: reqwest::blocking::Client,
    events: Sender<AudioCmd>,
    generation: Generation,
    progress_interval: Duration,
}

impl Loader {
    fn send(&self, event: ResourceEvent) -> bool {
        self.events.send(AudioCmd::Resource(event)).is_ok()
    }

    fn run(self, url: &str) {
        let g = self.generation;
        tracing::debug!(url, generation = g.0, "loading stream");

        let loaded = source::fetch(&self.client, url).and_then(source::decode);
        let stream = match loaded {
            Ok(s) => s,
            Err(e) => {
                if !lock(&self.slot).released {
                    self.send(ResourceEvent::Failed(g, e));
                }
                return;
            }
        };

        {
            let mut slot = lock(&self.slot);
            if slot.released {
                tracing::debug!(generation = g.0, "superseded before start, discarding");
                return;
            }

            let sink = Sink::connect_new(&self.mixer);
            sink.pause();
            sink.set_volume(slot.volume);
            sink.append(stream.decoder);
            if slot.wants_play {
                sink.play();
            }
            slot.sink = Some(sink);

            if let Some(d) = stream.duration {
                self.send(ResourceEvent::DurationKnown(g, d));
            }
            self.send(ResourceEvent::Started(g));
        }

        self.report_progress();
    }

    fn report_progress(&self) {
        let g = self.generation;
        loop {
            thread::sleep(self.progress_interval);

            let slot = lock(&self.slot);
            if slot.released {
                break;
            }
            let Some(sink) = slot.sink.as_ref() else {
                break;
            };

            if sink.empty() {
                drop(slot);
                self.send(ResourceEvent::Ended(g));
                break;
            }
            if !sink.is_paused() {
                let position = sink.get_pos();
                drop(slot);
                if !self.send(ResourceEvent::TimeUpdate(g, position)) {
                    break;
                }
            }
        }
    }
}

pub struct RodioResource {
    slot: Arc<Mutex<Slot>>,
}

impl AudioResource for RodioResource {
    fn play(&mut self) {
        let mut slot = lock(&self.slot);
        slot.wants_play = true;
        if let Some(sink) = slot.sink.as_ref() {
            sink.play();
        }
    }

    fn pause(&mut self) {
        let mut slot = lock(&self.slot);
        slot.wants_play = false;
        if let Some(sink) = slot.sink.as_ref() {
            sink.pause();
        }
    }

    fn seek(&mut self, position: Duration) {
        let slot = lock(&self.slot);
        if let Some(sink) = slot.sink.as_ref() {
            if let Err(e) = sink.try_seek(position) {
                tracing::warn!(error = %e, ?position, "seek failed");
            }
        }
    }

    fn set_volume(&mut self, volume: f32) {
        let mut slot = lock(&self.slot);
        slot.volume = volume;
        if let Some(sink) = slot.sink.as_ref() {
            sink.set_volume(volume);
        }
    }

    fn fade_out(&mut self, over: Duration) {
        let slot = lock(&self.slot);
        let Some(sink) = slot.sink.as_ref() else {
            return;
        };
        let steps: u32 = 20;
        let step = (over / steps).max(Duration::from_millis(1));
        let start = slot.volume;
        for i in 1..=steps {
            let t = i as f32 / steps as f32;
            sink.set_volume(start * (1.0 - t));
            thread::sleep(step);
        }
        sink.set_volume(0.0);
    }

    fn release(&mut self) {
        let mut slot = lock(&self.slot);
        slot.released = true;
        if let Some(sink) = slot.sink.take() {
            sink.stop();
        }
    }
}

impl Drop for RodioResource {
    fn drop(&mut self) {
        self.release();
    }
}
