//! Song catalog: track records, the filtered/sorted view and session likes.
//!
//! Tracks come from an external source (`fetch`), are owned by the
//! `CatalogStore` and are only referenced by `TrackId` elsewhere.

mod fetch;
mod model;
mod store;

pub use fetch::{CatalogError, fetch_catalog, parse_catalog};
pub(crate) use fetch::is_remote;
pub use model::{SortKey, Track, TrackId};
pub use store::{CatalogStore, SONGS_UNAVAILABLE};
