//! Single-active-playback state machine.
//!
//! The controller owns at most one resource at a time. Every path that
//! replaces or ends playback goes through `release_current`, which stops the
//! old resource before anything new is considered current. Resource signals
//! carry the generation they were acquired under; anything not matching the
//! held resource is dropped.

use std::sync::mpsc::Sender;
use std::time::Duration;

use crate::catalog::TrackId;
use crate::config::PausePolicy;

use super::resource::{AcquireRequest, AudioBackend, AudioResource};
use super::types::{Generation, PlaybackEvent, PlaybackPhase, PlaybackState, ResourceEvent};

struct Held<R> {
    generation: Generation,
    handle: R,
}

pub struct PlaybackController<B: AudioBackend> {
    backend: B,
    current: Option<Held<B::Resource>>,
    phase: PlaybackPhase,
    generation: Generation,
    position: Duration,
    duration: Option<Duration>,
    volume: f32,
    pause_policy: PausePolicy,
    subscribers: Vec<Sender<PlaybackEvent>>,
}

pub(crate) fn clamp_volume(level: f32) -> f32 {
    if level.is_nan() {
        0.0
    } else {
        level.clamp(0.0, 1.0)
    }
}

impl<B: AudioBackend> PlaybackController<B> {
    pub fn new(backend: B, volume: f32, pause_policy: PausePolicy) -> Self {
        Self {
            backend,
            current: None,
            phase: PlaybackPhase::Idle,
            generation: Generation::default(),
            position: Duration::ZERO,
            duration: None,
            volume: clamp_volume(volume),
            pause_policy,
            subscribers: Vec::new(),
        }
    }

    #[cfg(test)]
    pub fn subscribe(&mut self) -> std::sync::mpsc::Receiver<PlaybackEvent> {
        let (tx, rx) = std::sync::mpsc::channel();
        self.add_subscriber(tx);
        rx
    }

    pub fn add_subscriber(&mut self, tx: Sender<PlaybackEvent>) {
        self.subscribers.push(tx);
    }

    pub fn phase(&self) -> &PlaybackPhase {
        &self.phase
    }

    /// The track rendered as playing; `None` while acquiring, paused or idle.
    pub fn active_track_id(&self) -> Option<&TrackId> {
        match &self.phase {
            PlaybackPhase::Playing(id) => Some(id),
            _ => None,
        }
    }

    pub fn position(&self) -> Duration {
        self.position
    }

    pub fn duration(&self) -> Option<Duration> {
        self.duration
    }

    pub fn volume(&self) -> f32 {
        self.volume
    }

    #[cfg(test)]
    pub fn holds_resource(&self) -> bool {
        self.current.is_some()
    }

    pub fn snapshot(&self) -> PlaybackState {
        PlaybackState {
            active_track_id: self.active_track_id().cloned(),
            phase: self.phase().clone(),
            position: self.position(),
            duration: self.duration(),
            volume: self.volume(),
        }
    }

    /// Play `track`. Re-playing the playing track pauses it; re-playing the
    /// paused track resumes it. Any other track replaces the current one.
    pub fn play(&mut self, track: TrackId, url: &str) {
        match &self.phase {
            PlaybackPhase::Playing(id) if *id == track => {
                self.pause();
                return;
            }
            PlaybackPhase::Paused(id) if *id == track => {
                self.resume();
                return;
            }
            _ => {}
        }

        if let Some(previous) = self.release_current() {
            tracing::debug!(%previous, next = %track, "replacing current track");
            self.emit(PlaybackEvent::Stopped { track: previous });
        }

        self.generation = self.generation.next();
        let request = AcquireRequest {
            generation: self.generation,
            url: url.to_string(),
            volume: self.volume,
        };

        match self.backend.acquire(request) {
            Ok(mut handle) => {
                handle.play();
                self.current = Some(Held {
                    generation: self.generation,
                    handle,
                });
                self.phase = PlaybackPhase::Acquiring(track.clone());
                tracing::debug!(%track, generation = self.generation.0, "acquiring");
                self.emit(PlaybackEvent::Acquiring { track });
            }
            Err(error) => {
                tracing::error!(%track, %error, "could not acquire audio resource");
                self.emit(PlaybackEvent::Failed { track, error });
            }
        }
    }

    /// Pause if playing, resume if paused; otherwise nothing.
    pub fn toggle_pause(&mut self) {
        match self.phase {
            PlaybackPhase::Playing(_) => self.pause(),
            PlaybackPhase::Paused(_) => self.resume(),
            _ => {}
        }
    }

    fn pause(&mut self) {
        let PlaybackPhase::Playing(track) = self.phase.clone() else {
            return;
        };
        let Some(held) = self.current.as_mut() else {
            return;
        };

        held.handle.pause();
        if self.pause_policy == PausePolicy::Restart {
            held.handle.seek(Duration::ZERO);
            self.position = Duration::ZERO;
        }
        self.phase = PlaybackPhase::Paused(track.clone());
        self.emit(PlaybackEvent::Paused {
            track,
            position: self.position,
        });
    }

    fn resume(&mut self) {
        let PlaybackPhase::Paused(track) = self.phase.clone() else {
            return;
        };
        let Some(held) = self.current.as_mut() else {
            return;
        };

        held.handle.play();
        self.phase = PlaybackPhase::Playing(track.clone());
        self.emit(PlaybackEvent::Resumed {
            track,
            position: self.position,
        });
    }

    pub fn set_volume(&mut self, level: f32) {
        self.volume = clamp_volume(level);
        if let Some(held) = self.current.as_mut() {
            held.handle.set_volume(self.volume);
        }
        self.emit(PlaybackEvent::VolumeChanged(self.volume));
    }

    /// Seek to `position_secs`, clamped to the known track length.
    pub fn seek(&mut self, position_secs: f64) {
        let track = match &self.phase {
            PlaybackPhase::Playing(id) | PlaybackPhase::Paused(id) => id.clone(),
            _ => return,
        };
        let Some(held) = self.current.as_mut() else {
            return;
        };

        let target = clamp_position(position_secs, self.duration);
        held.handle.seek(target);
        self.position = target;
        self.emit(PlaybackEvent::Progress {
            track,
            position: self.position,
            duration: self.duration,
        });
    }

    pub fn seek_by(&mut self, delta_secs: f64) {
        self.seek(self.position.as_secs_f64() + delta_secs);
    }

    pub fn stop(&mut self) {
        if let Some(track) = self.release_current() {
            tracing::debug!(%track, "stopped");
            self.emit(PlaybackEvent::Stopped { track });
        }
    }

    /// Fade out and release on the way out of the audio thread.
    pub fn shutdown(&mut self, fade_out: Duration) {
        if let Some(held) = self.current.as_mut() {
            if matches!(self.phase, PlaybackPhase::Playing(_)) && !fade_out.is_zero() {
                held.handle.fade_out(fade_out);
            }
        }
        self.stop();
    }

    pub fn handle_resource_event(&mut self, event: ResourceEvent) {
        let Some(held) = self.current.as_ref() else {
            tracing::debug!(?event, "signal with no resource held, ignoring");
            return;
        };
        if event.generation() != held.generation {
            tracing::debug!(
                ?event,
                current = held.generation.0,
                "stale resource signal, ignoring"
            );
            return;
        }
        let Some(track) = self.phase.track().cloned() else {
            return;
        };

        match event {
            ResourceEvent::Started(_) => {
                if matches!(self.phase, PlaybackPhase::Acquiring(_)) {
                    tracing::info!(%track, "playback started");
                    self.phase = PlaybackPhase::Playing(track.clone());
                    self.emit(PlaybackEvent::Started { track });
                }
            }
            ResourceEvent::DurationKnown(_, duration) => {
                self.duration = Some(duration);
                self.position = self.position.min(duration);
                self.emit(PlaybackEvent::Progress {
                    track,
                    position: self.position,
                    duration: self.duration,
                });
            }
            ResourceEvent::TimeUpdate(_, position) => {
                if matches!(self.phase, PlaybackPhase::Acquiring(_)) {
                    return;
                }
                self.position = match self.duration {
                    Some(d) => position.min(d),
                    None => position,
                };
                self.emit(PlaybackEvent::Progress {
                    track,
                    position: self.position,
                    duration: self.duration,
                });
            }
            ResourceEvent::Ended(_) => {
                self.release_current();
                tracing::info!(%track, "track ended");
                self.emit(PlaybackEvent::Ended { track });
            }
            ResourceEvent::Failed(_, error) => {
                self.release_current();
                tracing::error!(%track, %error, "playback failed");
                self.emit(PlaybackEvent::Failed { track, error });
            }
        }
    }

    /// Stop and drop the held resource and reset to `Idle`. Returns the
    /// track it belonged to.
    fn release_current(&mut self) -> Option<TrackId> {
        let previous = std::mem::take(&mut self.phase);
        if let Some(mut held) = self.current.take() {
            held.handle.release();
        }
        self.position = Duration::ZERO;
        self.duration = None;
        previous.track().cloned()
    }

    fn emit(&mut self, event: PlaybackEvent) {
        self.subscribers.retain(|tx| tx.send(event.clone()).is_ok());
    }
}

impl<B: AudioBackend> Drop for PlaybackController<B> {
    fn drop(&mut self) {
        if let Some(mut held) = self.current.take() {
            held.handle.release();
        }
    }
}

fn clamp_position(secs: f64, duration: Option<Duration>) -> Duration {
    // NaN and -inf land on zero; +inf lands on the upper bound.
    let mut secs = if secs.is_nan() { 0.0 } else { secs.max(0.0) };
    if let Some(d) = duration {
        secs = secs.min(d.as_secs_f64());
    }
    let target = Duration::try_from_secs_f64(secs).unwrap_or(Duration::MAX);
    match duration {
        Some(d) => target.min(d),
        None => target,
    }
}
