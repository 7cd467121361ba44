//! Application module: exposes the app model used by the TUI and runtime.
//!
//! The `App` model lives in `app::model` and holds the catalog view-model,
//! the cursor and what the UI knows about playback.

mod model;

pub use model::*;

#[cfg(test)]
mod tests;
