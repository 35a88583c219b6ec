//! HTTP implementation of [`TrackSource`]
//!
//! Talks to a library service exposing
//! `GET {base_url}{tracks_path}?offset=..&limit=..` with a JSON
//! [`RawTrackPage`] body.

use async_trait::async_trait;
use std::time::Duration;
use tracing::debug;

use super::{check_contract, ContractReport, RawTrackPage, TrackSource};
use crate::config::SourceConfig;
use crate::error::SyncError;
use crate::sync::HttpClientWithRateLimit;

/// Track source backed by a remote HTTP endpoint
#[derive(Debug)]
pub struct HttpTrackSource {
    client: HttpClientWithRateLimit,
    endpoint: String,
}

impl HttpTrackSource {
    /// Create a source from configuration
    pub fn new(config: &SourceConfig) -> Result<Self, SyncError> {
        let client = HttpClientWithRateLimit::new(
            config.rate_limit.clone(),
            Duration::from_secs(config.timeout_secs),
        )?;
        Ok(Self::with_client(client, &config.base_url, &config.tracks_path))
    }

    /// Create a source using an existing client
    pub fn with_client(client: HttpClientWithRateLimit, base_url: &str, tracks_path: &str) -> Self {
        let endpoint = format!(
            "{}/{}",
            base_url.trim_end_matches('/'),
            tracks_path.trim_start_matches('/')
        );
        Self { client, endpoint }
    }

    /// Full URL of the tracks endpoint
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Sample the head page and check it against what the sync engine assumes
    pub async fn check_contract(&self, limit: usize) -> Result<ContractReport, SyncError> {
        check_contract(self, limit).await
    }
}

#[async_trait]
impl TrackSource for HttpTrackSource {
    fn name(&self) -> &str {
        "http"
    }

    async fn is_available(&self) -> bool {
        match self.get_tracks(0, 0).await {
            Ok(_) => true,
            Err(e) => {
                debug!(endpoint = %self.endpoint, error = %e, "Availability check failed");
                false
            }
        }
    }

    async fn get_tracks(&self, offset: usize, limit: usize) -> Result<RawTrackPage, SyncError> {
        self.client
            .get_json(
                &self.endpoint,
                &[("offset", offset.to_string()), ("limit", limit.to_string())],
            )
            .await
    }
}
