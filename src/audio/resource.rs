//! The capability surface the controller needs from an audio output.
//!
//! A backend hands out one `AudioResource` per acquisition. Loading is
//! asynchronous: the outcome arrives later as a `ResourceEvent` carrying the
//! request's generation.

use std::time::Duration;

use super::types::{AudioError, Generation};

#[derive(Debug, Clone, PartialEq)]
pub struct AcquireRequest {
    pub generation: Generation,
    pub url: String,
    pub volume: f32,
}

pub trait AudioResource {
    /// Start (or resume) output. Before the stream is ready this records the
    /// intent so output begins as soon as loading completes.
    fn play(&mut self);
    fn pause(&mut self);
    fn seek(&mut self, position: Duration);
    fn set_volume(&mut self, volume: f32);
    /// Ramp the output down before a release. Blocking.
    fn fade_out(&mut self, _over: Duration) {}
    /// Stop output and free everything. Further signals from this resource
    /// must be suppressed.
    fn release(&mut self);
}

pub trait AudioBackend {
    type Resource: AudioResource;

    /// Begin loading `request.url`. Returning `Err` means the request was
    /// refused outright and nothing was allocated.
    fn acquire(&mut self, request: AcquireRequest) -> Result<Self::Resource, AudioError>;
}
