//! Track-related domain models
//!
//! A [`Track`] is the normalized shape of one liked item. Identity is the
//! `uri`; two tracks with the same uri are the same item regardless of
//! their other fields.

use serde::{Deserialize, Serialize};

/// Contributor reference on a track
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Artist {
    /// Display name
    pub name: String,

    /// Artist identifier
    pub uri: String,
}

/// Container reference on a track
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Album {
    /// Display name
    pub name: String,

    /// Album identifier
    pub uri: String,
}

/// One entry of the liked collection
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Track {
    /// Unique key of the item
    pub uri: String,

    /// Display name
    pub name: String,

    /// Contributors in source order
    pub artists: Vec<Artist>,

    /// Album the track belongs to
    pub album: Album,

    /// When the track was liked (ISO-8601)
    pub added_at: String,

    /// Track length in milliseconds
    pub duration_ms: u64,
}

impl Track {
    /// Create a track with no contributors
    pub fn new(uri: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            uri: uri.into(),
            name: name.into(),
            artists: Vec::new(),
            album: Album {
                name: String::new(),
                uri: String::new(),
            },
            added_at: String::new(),
            duration_ms: 0,
        }
    }

    /// Add a contributor
    pub fn with_artist(mut self, name: impl Into<String>, uri: impl Into<String>) -> Self {
        self.artists.push(Artist {
            name: name.into(),
            uri: uri.into(),
        });
        self
    }

    /// Set the album reference
    pub fn with_album(mut self, name: impl Into<String>, uri: impl Into<String>) -> Self {
        self.album = Album {
            name: name.into(),
            uri: uri.into(),
        };
        self
    }

    /// Comma-separated contributor names
    pub fn artist_names(&self) -> String {
        self.artists
            .iter()
            .map(|a| a.name.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

/// One fetched slice of the remote collection
///
/// Transient: merged into the cache and then dropped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackPage {
    /// Tracks in source order
    pub items: Vec<Track>,

    /// Requested offset
    pub offset: usize,

    /// Requested limit
    pub limit: usize,

    /// Source-reported size of the whole collection
    pub total: u64,
}

impl TrackPage {
    /// Number of items actually returned
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Whether the page came back empty
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}
