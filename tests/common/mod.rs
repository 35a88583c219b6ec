//! Common test utilities and helpers for integration tests

#![allow(dead_code)]

use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use liked_sync::config::{Config, RetryConfig, SyncConfig};
use liked_sync::error::SyncError;
use liked_sync::notify::{Notifier, NotifyLevel};
use liked_sync::source::{RawDuration, RawReference, RawTrack, RawTrackPage, TrackSource};

/// Uri of the n-th generated track
pub fn uri(n: usize) -> String {
    format!("spotify:track:{}", n)
}

/// Raw track as the library would return it
pub fn raw_track(uri: &str) -> RawTrack {
    RawTrack {
        uri: uri.to_string(),
        name: format!("Song {}", uri),
        artists: vec![RawReference {
            name: "Artist".to_string(),
            uri: "spotify:artist:1".to_string(),
        }],
        album: Some(RawReference {
            name: "Album".to_string(),
            uri: "spotify:album:1".to_string(),
        }),
        added_at: Some("2025-12-04T10:30:00.000Z".to_string()),
        duration: Some(RawDuration::Millis(180_000)),
    }
}

/// In-memory library holding a newest-first collection
///
/// Records every page request and can be scripted to be unavailable, fail,
/// answer slowly, or return short pages.
#[derive(Default)]
pub struct FakeSource {
    collection: Mutex<Vec<RawTrack>>,
    unavailable: AtomicBool,
    failing: AtomicBool,
    fail_next: AtomicU32,
    delay: Mutex<Duration>,
    page_cap: Mutex<Option<usize>>,
    total_override: Mutex<Option<u64>>,
    requests: Mutex<Vec<(usize, usize)>>,
}

impl FakeSource {
    /// Collection of `count` tracks `spotify:track:0..count`, newest first
    pub fn with_tracks(count: usize) -> Arc<Self> {
        let source = Self::default();
        *source.collection.lock().unwrap() = (0..count).map(|n| raw_track(&uri(n))).collect();
        Arc::new(source)
    }

    /// Simulate newly liked tracks (they appear at the head)
    pub fn prepend(&self, uris: &[String]) {
        let mut collection = self.collection.lock().unwrap();
        let fresh: Vec<RawTrack> = uris.iter().map(|u| raw_track(u)).collect();
        collection.splice(0..0, fresh);
    }

    /// Simulate tracks that show up somewhere other than the head
    pub fn append(&self, uris: &[String]) {
        let mut collection = self.collection.lock().unwrap();
        collection.extend(uris.iter().map(|u| raw_track(u)));
    }

    /// Simulate an unlike
    pub fn remove(&self, uri: &str) {
        self.collection.lock().unwrap().retain(|t| t.uri != uri);
    }

    pub fn len(&self) -> usize {
        self.collection.lock().unwrap().len()
    }

    pub fn set_available(&self, available: bool) {
        self.unavailable.store(!available, Ordering::SeqCst);
    }

    /// Fail every request until switched off
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    /// Fail only the next `n` requests
    pub fn fail_next(&self, n: u32) {
        self.fail_next.store(n, Ordering::SeqCst);
    }

    /// Delay every response
    pub fn set_delay(&self, delay: Duration) {
        *self.delay.lock().unwrap() = delay;
    }

    /// Return at most `cap` items per page regardless of the limit
    pub fn set_page_cap(&self, cap: Option<usize>) {
        *self.page_cap.lock().unwrap() = cap;
    }

    /// Report this total instead of the collection length
    pub fn set_total_override(&self, total: Option<u64>) {
        *self.total_override.lock().unwrap() = total;
    }

    /// Every `(offset, limit)` requested so far, failed attempts included
    pub fn requests(&self) -> Vec<(usize, usize)> {
        self.requests.lock().unwrap().clone()
    }

    pub fn fetch_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    pub fn clear_requests(&self) {
        self.requests.lock().unwrap().clear();
    }
}

#[async_trait]
impl TrackSource for FakeSource {
    fn name(&self) -> &str {
        "fake"
    }

    async fn is_available(&self) -> bool {
        !self.unavailable.load(Ordering::SeqCst)
    }

    async fn get_tracks(&self, offset: usize, limit: usize) -> Result<RawTrackPage, SyncError> {
        self.requests.lock().unwrap().push((offset, limit));

        let delay = *self.delay.lock().unwrap();
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }

        if self.failing.load(Ordering::SeqCst) {
            return Err(SyncError::NetworkTimeout);
        }
        let pending = self.fail_next.load(Ordering::SeqCst);
        if pending > 0 {
            self.fail_next.store(pending - 1, Ordering::SeqCst);
            return Err(SyncError::ServerError(503));
        }

        let collection = self.collection.lock().unwrap();
        let cap = self.page_cap.lock().unwrap().unwrap_or(limit);
        let end = offset.saturating_add(limit.min(cap)).min(collection.len());
        let items = if offset < end {
            collection[offset..end].to_vec()
        } else {
            Vec::new()
        };

        let total = self
            .total_override
            .lock()
            .unwrap()
            .unwrap_or(collection.len() as u64);

        Ok(RawTrackPage {
            items,
            total_length: Some(total),
            unfiltered_total_length: None,
        })
    }
}

/// Notifier that keeps every message
#[derive(Default)]
pub struct RecordingNotifier {
    messages: Mutex<Vec<(NotifyLevel, String)>>,
}

impl RecordingNotifier {
    pub fn messages(&self) -> Vec<(NotifyLevel, String)> {
        self.messages.lock().unwrap().clone()
    }
}

impl Notifier for RecordingNotifier {
    fn notify(&self, level: NotifyLevel, message: &str) {
        self.messages
            .lock()
            .unwrap()
            .push((level, message.to_string()));
    }
}

/// Configuration used by the engine tests
///
/// Background backfill is off so fetch counts are deterministic.
pub fn test_config(page_size: usize) -> Config {
    Config {
        sync: SyncConfig {
            default_page_size: page_size,
            max_page_size: 100,
            poll_interval_secs: 180,
            backfill_delay_ms: 10,
            debounce_ms: 10_000,
            backfill_on_start: false,
            quiet: true,
        },
        retry: RetryConfig {
            max_attempts: 3,
            initial_delay_ms: 2000,
            exponential: true,
        },
        ..Default::default()
    }
}

/// Let spawned tasks run until they wait on a timer
///
/// Under a paused clock this only advances time by a millisecond.
pub async fn settle() {
    tokio::time::sleep(Duration::from_millis(1)).await;
}
