//! Audio subsystem: the single-active-playback controller, the resource
//! abstraction it drives, the `rodio` implementation of that resource and
//! the thread that owns all of it.

mod controller;
mod player;
mod resource;
mod sink;
mod source;
mod thread;
mod types;

pub use controller::PlaybackController;
pub use player::AudioPlayer;
pub use resource::{AcquireRequest, AudioBackend, AudioResource};
pub use types::*;
