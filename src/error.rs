//! Application error types for liked-sync
//!
//! This module defines the error types shared by the fetch, retry and sync
//! layers. All error types use `thiserror` for ergonomic error handling.

use thiserror::Error;

use crate::config::ConfigError;

/// Synchronization-related errors
///
/// Overlapping operations and remote shrinkage are not errors; the sync
/// engine handles both as control flow.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum SyncError {
    /// The remote source is absent or unreachable
    #[error("Track source unavailable: {0}")]
    SourceUnavailable(String),

    /// Network timeout
    #[error("Network timeout")]
    NetworkTimeout,

    /// Connection refused
    #[error("Connection refused")]
    ConnectionRefused,

    /// Rate limited by upstream
    #[error("Rate limited, retry after {0} seconds")]
    RateLimited(u64),

    /// Server error
    #[error("Server error: HTTP {0}")]
    ServerError(u16),

    /// Invalid data received
    #[error("Invalid data: {0}")]
    InvalidData(String),

    /// Resource not found
    #[error("Resource not found")]
    NotFound,

    /// Unauthorized
    #[error("Unauthorized")]
    Unauthorized,

    /// Generic network error
    #[error("Network error: {0}")]
    Network(String),
}

/// Application-level error type
///
/// Aggregates the domain errors for the binary entry point.
#[derive(Debug, Error)]
pub enum AppError {
    /// Sync error
    #[error("Sync error: {0}")]
    Sync(#[from] SyncError),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Logging setup error
    #[error("Telemetry error: {0}")]
    Telemetry(String),
}
