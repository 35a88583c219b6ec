//! liked-sync - A local, queryable mirror of a remote liked-tracks collection
//!
//! This is the command line entry point. It mirrors the collection exposed by
//! an HTTP library service, keeps it fresh until interrupted, and optionally
//! answers membership queries for the given track uris.

use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use tokio::signal;
use tracing::{error, info};

use liked_sync::config::Config;
use liked_sync::source::HttpTrackSource;
use liked_sync::telemetry::init_tracing;
use liked_sync::LikedTracksManager;

/// liked-sync - Mirror a remote liked-tracks collection
#[derive(Parser, Debug)]
#[command(name = "liked-sync")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to the configuration file
    #[arg(short, long, env = "LIKED_SYNC_CONFIG")]
    config: Option<String>,

    /// Load the whole collection, print membership for the given uris and exit
    #[arg(long)]
    once: bool,

    /// Check the source's response shape and ordering, then exit
    #[arg(long, conflicts_with = "once")]
    check: bool,

    /// Track uris to check for membership
    uris: Vec<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    let mut config = load_config(&args)?;
    if args.once {
        // The sweep runs in the foreground instead
        config.sync.backfill_on_start = false;
    }

    init_tracing(&config.logging.level, &config.logging.format)?;

    info!(version = env!("CARGO_PKG_VERSION"), "Starting liked-sync");

    let source = Arc::new(HttpTrackSource::new(&config.source)?);
    info!(endpoint = %source.endpoint(), "Track source configured");

    if args.check {
        let report = source
            .check_contract(config.sync.default_page_size)
            .await?;
        println!("response time\t{} ms", report.response_time.as_millis());
        println!(
            "addedAt\t\t{}/{} items",
            report.items_with_added_at, report.item_count
        );
        println!(
            "total fields\ttotalLength={} unfilteredTotalLength={}",
            report.has_total_length, report.has_unfiltered_total_length
        );
        println!("newest first\t{}", report.newest_first);
        if !report.is_satisfied() {
            anyhow::bail!("Track source does not meet the expected contract");
        }
        return Ok(());
    }

    let manager = LikedTracksManager::new(source, &config);
    manager.initialize().await?;

    if args.once {
        manager.stop_polling();
        manager.load_all_data().await?;
        report(&manager, &args.uris);
        return Ok(());
    }

    let stats_manager = manager.clone();
    let stats_task = tokio::spawn(async move {
        let mut ticker = tokio::time::interval(Duration::from_secs(60));
        loop {
            ticker.tick().await;
            let stats = stats_manager.get_stats();
            info!(
                loaded = stats.loaded,
                total = stats.total,
                fully_loaded = stats.is_fully_loaded,
                last_updated = %stats.last_updated_display(),
                "Cache status"
            );
        }
    });

    report(&manager, &args.uris);
    shutdown_signal().await;

    stats_task.abort();
    if !manager.stop_polling() {
        error!("Poll scheduler was not running at shutdown");
    }
    info!("liked-sync shutdown complete");
    Ok(())
}

/// Print membership for each uri
fn report(manager: &LikedTracksManager, uris: &[String]) {
    for uri in uris {
        match manager.get(uri) {
            Some(track) => println!("{}\tliked\t{} - {}", uri, track.artist_names(), track.name),
            None => println!("{}\tnot liked", uri),
        }
    }
}

/// Load configuration from file or environment
fn load_config(args: &Args) -> anyhow::Result<Config> {
    match &args.config {
        Some(path) => {
            // Use eprintln! since tracing is not yet initialized
            eprintln!("Loading configuration from file: {}", path);
            Config::from_file(path).map_err(|e| anyhow::anyhow!("Failed to load config: {}", e))
        }
        None => {
            eprintln!("Loading configuration from environment variables");
            Config::from_env().map_err(|e| anyhow::anyhow!("Failed to load config: {}", e))
        }
    }
}

/// Create a future that resolves when a shutdown signal is received
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, initiating graceful shutdown");
        }
        _ = terminate => {
            info!("Received SIGTERM, initiating graceful shutdown");
        }
    }
}
