//! Debounce gate for bursty triggers
//!
//! A check is accepted only if strictly more than `min_interval` has passed
//! since the last accepted one. Rejected checks have no side effect.

use std::sync::Mutex;
use std::time::Duration;
use tokio::time::Instant;

/// Time-based acceptance gate
#[derive(Debug)]
pub struct Debouncer {
    min_interval: Duration,
    last_accepted: Mutex<Option<Instant>>,
}

impl Debouncer {
    /// Create a gate that accepts at most one check per `min_interval`
    pub fn new(min_interval: Duration) -> Self {
        Self {
            min_interval,
            last_accepted: Mutex::new(None),
        }
    }

    /// Accept the check if enough time has passed, recording it if so
    pub fn try_accept(&self) -> bool {
        let now = Instant::now();
        let mut last = match self.last_accepted.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };

        match *last {
            Some(prev) if now.duration_since(prev) <= self.min_interval => false,
            _ => {
                *last = Some(now);
                true
            }
        }
    }

    /// Configured minimum spacing
    pub fn min_interval(&self) -> Duration {
        self.min_interval
    }
}
