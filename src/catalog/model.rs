use std::fmt;

use serde::{Deserialize, Deserializer};

/// Opaque track identifier as handed out by the catalog service.
///
/// The service is not consistent about id types, so integer ids are
/// normalised to their decimal text.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TrackId(String);

impl TrackId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TrackId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for TrackId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum RawId {
            Text(String),
            Unsigned(u64),
            Signed(i64),
        }

        Ok(match RawId::deserialize(deserializer)? {
            RawId::Text(s) => TrackId(s),
            RawId::Unsigned(n) => TrackId(n.to_string()),
            RawId::Signed(n) => TrackId(n.to_string()),
        })
    }
}

/// An immutable catalog entry.
///
/// Records may spell fields either way (`title`/`songTitle`,
/// `artist`/`artistName`, `streamUrl`/`url`/`songUrl`); when several
/// spellings are present the first non-empty one in that order wins.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(try_from = "RawTrack")]
pub struct Track {
    pub id: TrackId,
    pub title: String,
    pub artist: String,
    pub stream_url: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawTrack {
    id: TrackId,
    title: Option<String>,
    song_title: Option<String>,
    artist: Option<String>,
    artist_name: Option<String>,
    stream_url: Option<String>,
    url: Option<String>,
    song_url: Option<String>,
}

fn first_present<const N: usize>(
    field: &str,
    candidates: [Option<String>; N],
) -> Result<String, String> {
    candidates
        .into_iter()
        .flatten()
        .find(|s| !s.is_empty())
        .ok_or_else(|| format!("missing field `{field}`"))
}

impl TryFrom<RawTrack> for Track {
    type Error = String;

    fn try_from(raw: RawTrack) -> Result<Self, Self::Error> {
        Ok(Self {
            id: raw.id,
            title: first_present("title", [raw.title, raw.song_title])?,
            artist: first_present("artist", [raw.artist, raw.artist_name])?,
            stream_url: first_present("url", [raw.stream_url, raw.url, raw.song_url])?,
        })
    }
}

impl Track {
    pub fn new(
        id: impl Into<String>,
        title: impl Into<String>,
        artist: impl Into<String>,
        stream_url: impl Into<String>,
    ) -> Self {
        Self {
            id: TrackId::new(id),
            title: title.into(),
            artist: artist.into(),
            stream_url: stream_url.into(),
        }
    }
}

/// Ordering applied to the catalog view.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
pub enum SortKey {
    #[default]
    Title,
    Artist,
}

impl SortKey {
    /// Flip between the two sort keys.
    pub fn cycle(self) -> Self {
        match self {
            Self::Title => Self::Artist,
            Self::Artist => Self::Title,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Title => "title",
            Self::Artist => "artist",
        }
    }
}
