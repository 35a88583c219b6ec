//! Paginated fetcher
//!
//! Wraps a [`TrackSource`] with the retry policy and turns raw pages into
//! normalized [`TrackPage`] values.

use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, warn};

use crate::error::SyncError;
use crate::models::{Album, Artist, Track, TrackPage};
use crate::source::{RawTrack, RawTrackPage, TrackSource};
use crate::sync::RetryManager;

/// Fetches single pages of the liked collection with retry
#[derive(Clone)]
pub struct PageFetcher {
    source: Arc<dyn TrackSource>,
    retry: RetryManager,
    max_page_size: usize,
}

impl PageFetcher {
    /// Create a new fetcher
    ///
    /// Requests larger than `max_page_size` are clamped down to it.
    pub fn new(source: Arc<dyn TrackSource>, retry: RetryManager, max_page_size: usize) -> Self {
        Self {
            source,
            retry,
            max_page_size: max_page_size.max(1),
        }
    }

    /// The underlying source
    pub fn source(&self) -> &Arc<dyn TrackSource> {
        &self.source
    }

    /// Fetch and normalize the page at `(offset, limit)`
    ///
    /// Transient failures are retried by the [`RetryManager`]; once its
    /// attempts are exhausted the last error is returned.
    pub async fn fetch(&self, offset: usize, limit: usize) -> Result<TrackPage, SyncError> {
        let limit = limit.min(self.max_page_size);
        let source_name = self.source.name().to_string();
        let started = Instant::now();

        debug!(source = %source_name, offset, limit, "Fetching page");

        let result = self
            .retry
            .execute_with_observer(
                || self.source.get_tracks(offset, limit),
                |attempt, err: &SyncError| {
                    warn!(
                        source = %source_name,
                        offset,
                        attempt,
                        error = %err,
                        "Page fetch failed, retrying"
                    );
                },
            )
            .await;

        let elapsed_ms = started.elapsed().as_secs_f64() * 1000.0;

        match result {
            Ok(raw) => {
                let page = normalize_page(raw, offset, limit);
                debug!(
                    source = %source_name,
                    offset,
                    items = page.len(),
                    total = page.total,
                    elapsed_ms,
                    "Page fetched"
                );
                Ok(page)
            }
            Err(e) => {
                warn!(
                    source = %source_name,
                    offset,
                    elapsed_ms,
                    error = %e,
                    "Page fetch failed"
                );
                Err(e)
            }
        }
    }
}

/// Convert a raw page into the internal shape
///
/// The collection size prefers `totalLength`, then `unfilteredTotalLength`,
/// then 0. A present `totalLength` of 0 is taken as-is and does not fall
/// through to `unfilteredTotalLength`: an empty filtered view is a valid
/// answer, not a missing one.
pub fn normalize_page(raw: RawTrackPage, offset: usize, limit: usize) -> TrackPage {
    let total = raw
        .total_length
        .or(raw.unfiltered_total_length)
        .unwrap_or(0);

    TrackPage {
        items: raw.items.into_iter().map(normalize_track).collect(),
        offset,
        limit,
        total,
    }
}

fn normalize_track(raw: RawTrack) -> Track {
    let album = raw.album.unwrap_or_default();
    Track {
        uri: raw.uri,
        name: raw.name,
        artists: raw
            .artists
            .into_iter()
            .map(|a| Artist {
                name: a.name,
                uri: a.uri,
            })
            .collect(),
        album: Album {
            name: album.name,
            uri: album.uri,
        },
        added_at: raw.added_at.unwrap_or_default(),
        duration_ms: raw.duration.map(|d| d.as_millis()).unwrap_or(0),
    }
}
