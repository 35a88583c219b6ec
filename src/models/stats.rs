//! Cache statistics snapshot

use chrono::{DateTime, Local, Utc};
use serde::{Deserialize, Serialize};

/// Point-in-time view of the cache metadata
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheStats {
    /// Most recently observed authoritative size
    pub total: u64,

    /// Number of tracks held locally
    pub loaded: usize,

    /// Last time the cache content was refreshed
    pub last_updated: Option<DateTime<Utc>>,

    /// Whether a full sweep has completed
    pub is_fully_loaded: bool,
}

impl CacheStats {
    /// Human-readable local timestamp of the last refresh
    pub fn last_updated_display(&self) -> String {
        match self.last_updated {
            Some(ts) => ts
                .with_timezone(&Local)
                .format("%Y/%m/%d %H:%M:%S")
                .to_string(),
            None => "never".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_never() {
        let stats = CacheStats {
            total: 0,
            loaded: 0,
            last_updated: None,
            is_fully_loaded: false,
        };
        assert_eq!(stats.last_updated_display(), "never");
    }

    #[test]
    fn test_display_formats_timestamp() {
        let stats = CacheStats {
            total: 10,
            loaded: 10,
            last_updated: Some(Utc::now()),
            is_fully_loaded: true,
        };
        let shown = stats.last_updated_display();
        // YYYY/MM/DD HH:MM:SS
        assert_eq!(shown.len(), 19);
        assert_eq!(&shown[4..5], "/");
    }
}
