//! Rate-limited HTTP client for the remote library API
//!
//! This module provides a JSON-over-HTTP client with built-in rate limiting,
//! per-host request interval control, a concurrency cap and mapping of
//! transport and status failures onto [`SyncError`].

use crate::config::RateLimitConfig;
use crate::error::SyncError;
use reqwest::{Client, StatusCode, Url};
use serde::de::DeserializeOwned;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{Mutex, Semaphore};
use tokio::time::Instant;
use tracing::{debug, warn};

/// HTTP client with rate limiting capabilities
///
/// Features:
/// - Per-host request interval enforcement
/// - Global concurrent request limiting via semaphore
/// - HTTP 429 handling with Retry-After support
#[derive(Debug)]
pub struct HttpClientWithRateLimit {
    client: Client,
    semaphore: Arc<Semaphore>,
    last_request: Arc<Mutex<HashMap<String, Instant>>>,
    config: RateLimitConfig,
}

impl HttpClientWithRateLimit {
    /// Create a new rate-limited HTTP client with the given request timeout
    pub fn new(config: RateLimitConfig, timeout: Duration) -> Result<Self, SyncError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| SyncError::Network(format!("Failed to create HTTP client: {}", e)))?;
        Ok(Self::with_client(client, config))
    }

    /// Create a rate-limited HTTP client with a custom reqwest Client
    pub fn with_client(client: Client, config: RateLimitConfig) -> Self {
        Self {
            client,
            semaphore: Arc::new(Semaphore::new(config.max_concurrent.max(1))),
            last_request: Arc::new(Mutex::new(HashMap::new())),
            config,
        }
    }

    /// Perform a GET request and decode the JSON body
    pub async fn get_json<T: DeserializeOwned>(
        &self,
        url: &str,
        query: &[(&str, String)],
    ) -> Result<T, SyncError> {
        let _permit = self
            .semaphore
            .acquire()
            .await
            .map_err(|_| SyncError::Network("Request limiter closed".to_string()))?;

        self.wait_for_rate_limit(url).await;

        debug!(url = url, "Sending HTTP GET request");

        let response = self
            .client
            .get(url)
            .query(query)
            .send()
            .await
            .map_err(map_transport_error)?;

        match response.status() {
            StatusCode::OK => {
                let body = response.bytes().await.map_err(map_transport_error)?;
                debug!(url = url, body_size = body.len(), "Received response");
                serde_json::from_slice(&body).map_err(|e| SyncError::InvalidData(e.to_string()))
            }
            StatusCode::TOO_MANY_REQUESTS => {
                let wait = response
                    .headers()
                    .get("Retry-After")
                    .and_then(|v| v.to_str().ok())
                    .and_then(|v| v.parse().ok())
                    .unwrap_or(self.config.rate_limit_wait_secs);

                warn!(url = url, retry_after = wait, "Rate limited by upstream");
                Err(SyncError::RateLimited(wait))
            }
            StatusCode::NOT_FOUND => {
                debug!(url = url, "Resource not found (404)");
                Err(SyncError::NotFound)
            }
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
                warn!(url = url, status = ?response.status(), "Unauthorized");
                Err(SyncError::Unauthorized)
            }
            status => {
                warn!(url = url, status = status.as_u16(), "Unexpected status");
                Err(SyncError::ServerError(status.as_u16()))
            }
        }
    }

    /// Wait for the rate limit interval to pass for the given URL's host
    async fn wait_for_rate_limit(&self, url: &str) {
        let min_interval = Duration::from_millis(self.config.min_interval_ms);
        if min_interval.is_zero() {
            return;
        }

        let host = extract_host(url);
        let mut last_requests = self.last_request.lock().await;

        if let Some(last) = last_requests.get(&host) {
            let elapsed = last.elapsed();
            if elapsed < min_interval {
                let wait_time = min_interval - elapsed;
                debug!(
                    host = host,
                    wait_ms = wait_time.as_millis() as u64,
                    "Waiting for rate limit"
                );
                drop(last_requests); // Release lock while waiting
                tokio::time::sleep(wait_time).await;
                last_requests = self.last_request.lock().await;
            }
        }

        last_requests.insert(host, Instant::now());
    }

    /// Get current configuration
    pub fn config(&self) -> &RateLimitConfig {
        &self.config
    }

    /// Get number of available permits (concurrent request slots)
    pub fn available_permits(&self) -> usize {
        self.semaphore.available_permits()
    }
}

fn map_transport_error(e: reqwest::Error) -> SyncError {
    if e.is_timeout() {
        SyncError::NetworkTimeout
    } else if e.is_connect() {
        SyncError::ConnectionRefused
    } else {
        SyncError::Network(e.to_string())
    }
}

/// Host part of a URL, used as the rate limiting key
fn extract_host(url: &str) -> String {
    Url::parse(url)
        .ok()
        .and_then(|u| {
            u.host_str()
                .map(|h| format!("{}:{}", h, u.port_or_known_default().unwrap_or(0)))
        })
        .unwrap_or_else(|| url.to_string())
}
