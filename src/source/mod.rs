//! Remote track source abstraction
//!
//! The remote library is an external collaborator. This module defines the
//! single capability the sync engine needs from it, a paginated "list liked
//! tracks" call, together with the raw wire shape of its responses.
//!
//! Raw responses are normalized into [`Track`](crate::models::Track) values
//! by the [`PageFetcher`](crate::sync::PageFetcher).

pub mod contract;
pub mod http;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::SyncError;

pub use contract::{check_contract, ContractReport};
pub use http::HttpTrackSource;

/// A paginated source of liked tracks
///
/// Implementations are expected to return the newest items first, so that
/// freshly liked tracks surface at the head of page 0.
#[async_trait]
pub trait TrackSource: Send + Sync {
    /// Name used in log output
    fn name(&self) -> &str;

    /// Whether the paginated endpoint can be reached at all
    async fn is_available(&self) -> bool;

    /// Fetch one page of the collection
    async fn get_tracks(&self, offset: usize, limit: usize) -> Result<RawTrackPage, SyncError>;
}

/// Page as returned by the remote library
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawTrackPage {
    /// Tracks on this page
    #[serde(default)]
    pub items: Vec<RawTrack>,

    /// Size of the collection after filtering
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_length: Option<u64>,

    /// Size of the collection ignoring filters
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unfiltered_total_length: Option<u64>,
}

/// Track as returned by the remote library
///
/// Fields the sync engine does not use are ignored on deserialization.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawTrack {
    pub uri: String,

    #[serde(default)]
    pub name: String,

    #[serde(default)]
    pub artists: Vec<RawReference>,

    #[serde(default)]
    pub album: Option<RawReference>,

    #[serde(default)]
    pub added_at: Option<String>,

    #[serde(default)]
    pub duration: Option<RawDuration>,
}

/// Name + identifier pair used for artists and albums
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawReference {
    #[serde(default)]
    pub name: String,

    #[serde(default)]
    pub uri: String,
}

/// Track duration in either of the shapes the library emits
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawDuration {
    Millis(u64),
    Fractional(f64),
    Object { milliseconds: u64 },
}

impl RawDuration {
    /// Duration in whole milliseconds
    pub fn as_millis(&self) -> u64 {
        match *self {
            RawDuration::Millis(ms) => ms,
            RawDuration::Fractional(ms) if ms.is_finite() && ms > 0.0 => ms.round() as u64,
            RawDuration::Fractional(_) => 0,
            RawDuration::Object { milliseconds } => milliseconds,
        }
    }
}
