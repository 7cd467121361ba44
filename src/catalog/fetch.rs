//! Fetching and parsing the song catalog.
//!
//! The source is either an HTTP(S) endpoint returning a JSON array of track
//! records, or a local JSON file with the same shape.

use std::collections::HashSet;
use std::path::Path;
use std::time::Duration;

use super::model::Track;

#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("catalog request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("catalog endpoint returned HTTP {0}")]
    Status(u16),
    #[error("could not read catalog file: {0}")]
    Io(#[from] std::io::Error),
    #[error("catalog is not a JSON array of records: {0}")]
    Parse(#[from] serde_json::Error),
}

pub(crate) fn is_remote(source: &str) -> bool {
    source.starts_with("http://") || source.starts_with("https://")
}

/// Fetch and parse the catalog from `source`.
pub fn fetch_catalog(source: &str, timeout: Duration) -> Result<Vec<Track>, CatalogError> {
    let body = if is_remote(source) {
        tracing::info!(%source, "fetching catalog");
        let client = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .build()?;
        let resp = client.get(source).send()?;
        let status = resp.status();
        if !status.is_success() {
            return Err(CatalogError::Status(status.as_u16()));
        }
        resp.text()?
    } else {
        let path = source.strip_prefix("file://").unwrap_or(source);
        tracing::info!(path, "reading catalog file");
        std::fs::read_to_string(Path::new(path))?
    };

    parse_catalog(&body)
}

/// Parse a JSON array of track records.
///
/// Malformed records and records repeating an earlier id are skipped so one
/// bad entry does not take the whole catalog down.
pub fn parse_catalog(body: &str) -> Result<Vec<Track>, CatalogError> {
    let records: Vec<serde_json::Value> = serde_json::from_str(body)?;

    let mut seen = HashSet::new();
    let mut tracks = Vec::with_capacity(records.len());
    for (pos, record) in records.into_iter().enumerate() {
        let track: Track = match serde_json::from_value(record) {
            Ok(t) => t,
            Err(e) => {
                tracing::warn!(pos, error = %e, "skipping malformed catalog record");
                continue;
            }
        };
        if !seen.insert(track.id.clone()) {
            tracing::warn!(pos, id = %track.id, "skipping duplicate catalog id");
            continue;
        }
        tracks.push(track);
    }

    Ok(tracks)
}
