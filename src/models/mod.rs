//! Domain models for liked-sync
//!
//! This module contains the track, page and statistics types shared by the
//! fetcher, cache and sync engine.

pub mod stats;
pub mod track;

// Re-export commonly used types
pub use stats::CacheStats;
pub use track::{Album, Artist, Track, TrackPage};
