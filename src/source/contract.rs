//! Response contract check for track sources
//!
//! The incremental update relies on the head page listing the most recently
//! liked tracks first. [`check_contract`] fetches one page from a live source
//! and reports whether its responses actually look that way.

use chrono::DateTime;
use std::cmp::Ordering;
use std::time::{Duration, Instant};
use tracing::{info, warn};

use super::{RawTrackPage, TrackSource};
use crate::error::SyncError;

/// What one sampled page revealed about the source
#[derive(Debug, Clone, PartialEq)]
pub struct ContractReport {
    /// Time taken by the page request
    pub response_time: Duration,

    /// Items on the sampled page
    pub item_count: usize,

    /// Items carrying an `addedAt` timestamp
    pub items_with_added_at: usize,

    /// Whether `totalLength` was present
    pub has_total_length: bool,

    /// Whether `unfilteredTotalLength` was present
    pub has_unfiltered_total_length: bool,

    /// Whether `addedAt` never increases down the page
    pub newest_first: bool,
}

impl ContractReport {
    /// Inspect a page fetched in `response_time`
    pub fn from_page(page: &RawTrackPage, response_time: Duration) -> Self {
        let stamps: Vec<&str> = page
            .items
            .iter()
            .filter_map(|t| t.added_at.as_deref())
            .collect();

        let newest_first = stamps
            .windows(2)
            .all(|pair| compare_added_at(pair[0], pair[1]) != Ordering::Less);

        Self {
            response_time,
            item_count: page.items.len(),
            items_with_added_at: stamps.len(),
            has_total_length: page.total_length.is_some(),
            has_unfiltered_total_length: page.unfiltered_total_length.is_some(),
            newest_first,
        }
    }

    /// Whether every item has `addedAt`
    pub fn has_added_at(&self) -> bool {
        self.items_with_added_at == self.item_count
    }

    /// Whether a collection size is reported at all
    pub fn has_total(&self) -> bool {
        self.has_total_length || self.has_unfiltered_total_length
    }

    /// Whether the source meets everything the sync engine assumes
    pub fn is_satisfied(&self) -> bool {
        self.has_total() && self.has_added_at() && self.newest_first
    }
}

/// Order two `addedAt` values, falling back to text order if unparsable
fn compare_added_at(a: &str, b: &str) -> Ordering {
    match (
        DateTime::parse_from_rfc3339(a),
        DateTime::parse_from_rfc3339(b),
    ) {
        (Ok(a), Ok(b)) => a.cmp(&b),
        _ => a.cmp(b),
    }
}

/// Fetch the head page of `source` and inspect it
pub async fn check_contract(
    source: &dyn TrackSource,
    limit: usize,
) -> Result<ContractReport, SyncError> {
    let started = Instant::now();
    let page = source.get_tracks(0, limit).await?;
    let report = ContractReport::from_page(&page, started.elapsed());

    if report.is_satisfied() {
        info!(
            source = source.name(),
            items = report.item_count,
            response_ms = report.response_time.as_millis() as u64,
            "Source contract satisfied"
        );
    } else {
        warn!(
            source = source.name(),
            items = report.item_count,
            with_added_at = report.items_with_added_at,
            has_total = report.has_total(),
            newest_first = report.newest_first,
            "Source contract violated"
        );
    }
    Ok(report)
}
