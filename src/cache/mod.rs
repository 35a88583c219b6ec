//! In-memory mirror of the liked collection
//!
//! The cache is organised in *generations*. Readers always look at the
//! currently published generation; the sync engine merges pages into it in
//! place (insert or overwrite only, never remove). A hard reload builds a
//! fresh generation off to the side and publishes it with a single atomic
//! swap, so readers never observe an empty cache mid-reload.
//!
//! # Thread Safety
//!
//! The published generation lives behind an `ArcSwap`; track entries live in
//! a `DashMap`. Lookups never wait on the sync engine's guard and only touch
//! one shard.

use arc_swap::ArcSwap;
use chrono::{DateTime, Utc};
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use std::sync::Arc;

use crate::models::{CacheStats, Track};

/// Summary metadata of one generation
#[derive(Debug, Clone, Default, PartialEq, Eq)]
struct CacheMeta {
    total: u64,
    last_updated: Option<DateTime<Utc>>,
    is_fully_loaded: bool,
}

/// One self-contained snapshot of the mirrored collection
#[derive(Debug, Default)]
pub struct CacheGeneration {
    tracks: DashMap<String, Track>,
    meta: ArcSwap<CacheMeta>,
}

impl CacheGeneration {
    /// Whether the track with this uri is held
    pub fn contains(&self, uri: &str) -> bool {
        self.tracks.contains_key(uri)
    }

    /// Cloned track for this uri
    pub fn get(&self, uri: &str) -> Option<Track> {
        self.tracks.get(uri).map(|t| t.value().clone())
    }

    /// Number of tracks held
    pub fn len(&self) -> usize {
        self.tracks.len()
    }

    /// Whether no tracks are held
    pub fn is_empty(&self) -> bool {
        self.tracks.is_empty()
    }

    /// Last observed authoritative size
    pub fn total(&self) -> u64 {
        self.meta.load().total
    }

    /// Whether a full sweep has completed
    pub fn is_fully_loaded(&self) -> bool {
        self.meta.load().is_fully_loaded
    }

    /// Insert or overwrite every track by uri, returning how many were new
    pub fn merge<I>(&self, tracks: I) -> usize
    where
        I: IntoIterator<Item = Track>,
    {
        let mut fresh = 0;
        for track in tracks {
            if self.tracks.insert(track.uri.clone(), track).is_none() {
                fresh += 1;
            }
        }
        fresh
    }

    /// Insert only tracks whose uri is not held yet, returning the new uris
    pub fn insert_missing<I>(&self, tracks: I) -> Vec<String>
    where
        I: IntoIterator<Item = Track>,
    {
        let mut added = Vec::new();
        for track in tracks {
            if let Entry::Vacant(slot) = self.tracks.entry(track.uri.clone()) {
                added.push(track.uri.clone());
                slot.insert(track);
            }
        }
        added
    }

    /// Record a new authoritative size
    pub fn set_total(&self, total: u64) {
        self.meta.rcu(|meta| CacheMeta {
            total,
            ..(**meta).clone()
        });
    }

    /// Stamp the last refresh time with now
    pub fn touch(&self) {
        let now = Utc::now();
        self.meta.rcu(|meta| CacheMeta {
            last_updated: Some(now),
            ..(**meta).clone()
        });
    }

    /// Set or clear the fully-loaded flag
    pub fn set_fully_loaded(&self, loaded: bool) {
        self.meta.rcu(|meta| CacheMeta {
            is_fully_loaded: loaded,
            ..(**meta).clone()
        });
    }

    /// Metadata plus loaded count
    pub fn stats(&self) -> CacheStats {
        let meta = self.meta.load();
        CacheStats {
            total: meta.total,
            loaded: self.tracks.len(),
            last_updated: meta.last_updated,
            is_fully_loaded: meta.is_fully_loaded,
        }
    }
}

/// Process-wide store holding the published cache generation
#[derive(Debug, Default)]
pub struct TrackCache {
    current: ArcSwap<CacheGeneration>,
}

impl TrackCache {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// The generation readers currently see
    pub fn current(&self) -> Arc<CacheGeneration> {
        self.current.load_full()
    }

    /// A new, unpublished, empty generation
    pub fn stage(&self) -> Arc<CacheGeneration> {
        Arc::new(CacheGeneration::default())
    }

    /// Make `generation` the one readers see
    pub fn publish(&self, generation: Arc<CacheGeneration>) {
        self.current.store(generation);
    }

    /// Whether the track with this uri is held
    pub fn contains(&self, uri: &str) -> bool {
        self.current.load().contains(uri)
    }

    /// Cloned track for this uri
    pub fn get(&self, uri: &str) -> Option<Track> {
        self.current.load().get(uri)
    }

    /// Number of tracks held
    pub fn len(&self) -> usize {
        self.current.load().len()
    }

    /// Whether no tracks are held
    pub fn is_empty(&self) -> bool {
        self.current.load().is_empty()
    }

    /// Snapshot of the published generation's metadata
    pub fn stats(&self) -> CacheStats {
        self.current.load().stats()
    }
}
