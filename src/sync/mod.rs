//! Data synchronization infrastructure
//!
//! This module provides the building blocks the sync engine is assembled
//! from: retries with backoff, a rate-limited HTTP client, the paginated
//! fetcher, a debounce gate and the poll scheduler.
//!
//! # Components
//!
//! - [`retry`]: Retry manager with exponential or fixed backoff
//! - [`http_client`]: Rate-limited HTTP client for the remote library API
//! - [`fetcher`]: Page fetch + normalization, wrapped in retries
//! - [`debounce`]: Drops checks that arrive too close together
//! - [`scheduler`]: Recurring poll timer with external trigger support
//!
//! # Example
//!
//! ```ignore
//! use liked_sync::config::RetryConfig;
//! use liked_sync::sync::{PageFetcher, RetryManager};
//!
//! let fetcher = PageFetcher::new(source, RetryManager::new(RetryConfig::default()), 100);
//! let page = fetcher.fetch(0, 50).await?;
//! ```

pub mod debounce;
pub mod fetcher;
pub mod http_client;
pub mod retry;
pub mod scheduler;

// Re-export main types for convenience
pub use debounce::Debouncer;
pub use fetcher::{normalize_page, PageFetcher};
pub use http_client::HttpClientWithRateLimit;
pub use retry::RetryManager;
pub use scheduler::{PollScheduler, PollTarget, TriggerHandle};
