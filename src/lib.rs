//! liked-sync - A local, queryable mirror of a remote liked-tracks collection
//!
//! This crate keeps an in-memory copy of a paginated, mutable remote
//! collection and answers membership queries in O(1). A sync engine loads the
//! first page quickly, backfills the rest in the background, and polls the
//! head page for changes.

pub mod cache;
pub mod config;
pub mod error;
pub mod manager;
pub mod models;
pub mod notify;
pub mod source;
pub mod sync;
pub mod telemetry;

pub use manager::{LikedTracksManager, UpdateOutcome};
