//! Logging setup for liked-sync
//!
//! Builds a `tracing-subscriber` registry with a level filter and a `fmt`
//! layer in either human-readable or JSON form.

use tracing::Level;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::error::AppError;

/// Parse a textual log level, defaulting to `INFO`
pub fn parse_level(log_level: &str) -> Level {
    match log_level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" | "warning" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    }
}

/// Install the global tracing subscriber
///
/// `format` is `json` for structured output; anything else selects the
/// pretty human-readable formatter.
pub fn init_tracing(log_level: &str, format: &str) -> Result<(), AppError> {
    let filter = tracing_subscriber::filter::LevelFilter::from_level(parse_level(log_level));

    let result = if format.eq_ignore_ascii_case("json") {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().json())
            .try_init()
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer())
            .try_init()
    };

    result.map_err(|e| AppError::Telemetry(e.to_string()))
}
