//! HTTP source integration tests
//!
//! Runs the manager end to end against a mock library service.

use std::sync::Arc;

use liked_sync::config::{Config, RateLimitConfig, SourceConfig};
use liked_sync::error::SyncError;
use liked_sync::source::HttpTrackSource;
use liked_sync::LikedTracksManager;
use serde_json::json;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, Request, Respond, ResponseTemplate};

/// Serves `/tracks` pages out of a fixed newest-first collection
struct LibraryResponder {
    total: usize,
}

impl Respond for LibraryResponder {
    fn respond(&self, request: &Request) -> ResponseTemplate {
        let param = |name: &str| {
            request
                .url
                .query_pairs()
                .find(|(k, _)| k == name)
                .and_then(|(_, v)| v.parse::<usize>().ok())
                .unwrap_or(0)
        };
        let offset = param("offset");
        let end = (offset + param("limit")).min(self.total);

        let items: Vec<_> = (offset.min(end)..end)
            .map(|n| {
                json!({
                    "uri": format!("spotify:track:{}", n),
                    "name": format!("Song {}", n),
                    "artists": [{"name": "Artist", "uri": "spotify:artist:1"}],
                    "album": {"name": "Album", "uri": "spotify:album:1"},
                    "addedAt": "2025-12-04T10:30:00.000Z",
                    "duration": {"milliseconds": 200000}
                })
            })
            .collect();

        ResponseTemplate::new(200).set_body_json(json!({
            "items": items,
            "totalLength": self.total,
        }))
    }
}

fn config_for(server: &MockServer) -> Config {
    let mut config = Config {
        source: SourceConfig {
            base_url: server.uri(),
            tracks_path: "/tracks".to_string(),
            timeout_secs: 5,
            rate_limit: RateLimitConfig::default(),
        },
        ..Default::default()
    };
    config.sync.backfill_on_start = false;
    config.sync.backfill_delay_ms = 0;
    config.sync.quiet = true;
    config.retry.initial_delay_ms = 10;
    config
}

fn manager_for(config: &Config) -> LikedTracksManager {
    let source = HttpTrackSource::new(&config.source).unwrap();
    LikedTracksManager::new(Arc::new(source), config)
}

#[tokio::test]
async fn test_full_sync_over_http() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/tracks"))
        .respond_with(LibraryResponder { total: 120 })
        .mount(&mock_server)
        .await;

    let config = config_for(&mock_server);
    let manager = manager_for(&config);

    manager.initialize().await.unwrap();
    assert_eq!(manager.get_stats().loaded, 50);

    manager.load_all_data().await.unwrap();
    let stats = manager.get_stats();
    assert_eq!(stats.loaded, 120);
    assert_eq!(stats.total, 120);
    assert!(stats.is_fully_loaded);

    let track = manager.get("spotify:track:119").unwrap();
    assert_eq!(track.name, "Song 119");
    assert_eq!(track.duration_ms, 200_000);
    assert_eq!(track.added_at, "2025-12-04T10:30:00.000Z");

    manager.stop_polling();
}

#[tokio::test]
async fn test_initialize_fails_when_service_missing() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&mock_server)
        .await;

    let config = config_for(&mock_server);
    let manager = manager_for(&config);

    let result = manager.initialize().await;
    assert_eq!(result, Err(SyncError::SourceUnavailable("http".to_string())));
    assert_eq!(manager.get_stats().loaded, 0);
    assert!(!manager.is_polling());
}

#[tokio::test]
async fn test_server_errors_are_retried() {
    let mock_server = MockServer::start().await;
    // Availability check succeeds, first page attempt fails, retry succeeds
    Mock::given(method("GET"))
        .and(path("/tracks"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"items": []})))
        .up_to_n_times(1)
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/tracks"))
        .respond_with(ResponseTemplate::new(503))
        .up_to_n_times(1)
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/tracks"))
        .respond_with(LibraryResponder { total: 10 })
        .mount(&mock_server)
        .await;

    let config = config_for(&mock_server);
    let manager = manager_for(&config);

    manager.initialize().await.unwrap();

    let stats = manager.get_stats();
    assert_eq!(stats.loaded, 10);
    assert_eq!(stats.total, 10);

    manager.stop_polling();
}
