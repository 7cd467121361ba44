//! The catalog view-model.
//!
//! `CatalogStore` owns the fetched tracks and the session like-set. The
//! visible list is never stored: `view()` derives it from the current inputs
//! on every call, so it cannot go stale.

use std::collections::HashSet;

use super::model::{SortKey, Track, TrackId};

/// Advisory shown when the catalog could not be fetched.
pub const SONGS_UNAVAILABLE: &str = "Songs unavailable. Please try again later.";

struct Entry {
    track: Track,
    // Lowercased copies so filtering and sorting don't allocate per keystroke.
    haystack: String,
    title_key: String,
    artist_key: String,
}

impl Entry {
    fn new(track: Track) -> Self {
        let title_key = track.title.to_lowercase();
        let artist_key = track.artist.to_lowercase();
        let haystack = format!("{title_key} {artist_key}");
        Self {
            track,
            haystack,
            title_key,
            artist_key,
        }
    }

    fn sort_key(&self, key: SortKey) -> &str {
        match key {
            SortKey::Title => &self.title_key,
            SortKey::Artist => &self.artist_key,
        }
    }
}

#[derive(Default)]
pub struct CatalogStore {
    entries: Vec<Entry>,
    search_term: String,
    sort_key: SortKey,
    liked_only: bool,
    likes: HashSet<TrackId>,
    advisory: Option<String>,
}

impl CatalogStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the catalog wholesale.
    ///
    /// Likes for tracks that are no longer in the catalog are dropped.
    pub fn load(&mut self, tracks: Vec<Track>) {
        self.entries = tracks.into_iter().map(Entry::new).collect();
        let present: HashSet<&TrackId> = self.entries.iter().map(|e| &e.track.id).collect();
        self.likes.retain(|id| present.contains(id));
        self.advisory = None;
        tracing::info!(tracks = self.entries.len(), "catalog loaded");
    }

    /// Record a failed fetch: the store keeps working on an empty catalog.
    pub fn load_failed(&mut self, reason: &str) {
        tracing::error!(%reason, "catalog unavailable");
        self.entries.clear();
        self.likes.clear();
        self.advisory = Some(SONGS_UNAVAILABLE.to_string());
    }

    pub fn advisory(&self) -> Option<&str> {
        self.advisory.as_deref()
    }

    pub fn set_search_term(&mut self, term: impl Into<String>) {
        self.search_term = term.into();
    }

    pub fn search_term(&self) -> &str {
        &self.search_term
    }

    pub fn set_sort_key(&mut self, key: SortKey) {
        self.sort_key = key;
    }

    pub fn sort_key(&self) -> SortKey {
        self.sort_key
    }

    pub fn set_liked_only(&mut self, liked_only: bool) {
        self.liked_only = liked_only;
    }

    pub fn liked_only(&self) -> bool {
        self.liked_only
    }

    /// The filtered, sorted projection of the catalog.
    pub fn view(&self) -> Vec<&Track> {
        let needle = self.search_term.trim().to_lowercase();

        let mut visible: Vec<&Entry> = self
            .entries
            .iter()
            .filter(|e| needle.is_empty() || e.haystack.contains(&needle))
            .filter(|e| !self.liked_only || self.likes.contains(&e.track.id))
            .collect();

        // `sort_by` is stable, so equal keys keep catalog order.
        let key = self.sort_key;
        visible.sort_by(|a, b| a.sort_key(key).cmp(b.sort_key(key)));

        visible.into_iter().map(|e| &e.track).collect()
    }

    /// Flip the like flag for `id`. Returns the new state.
    pub fn toggle_like(&mut self, id: &TrackId) -> bool {
        if self.likes.remove(id) {
            false
        } else {
            self.likes.insert(id.clone());
            true
        }
    }

    pub fn is_liked(&self, id: &TrackId) -> bool {
        self.likes.contains(id)
    }

    pub fn liked_count(&self) -> usize {
        self.likes.len()
    }

    pub fn track(&self, id: &TrackId) -> Option<&Track> {
        self.entries
            .iter()
            .map(|e| &e.track)
            .find(|t| &t.id == id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
