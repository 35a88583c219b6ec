//! Configuration management for liked-sync
//!
//! This module handles loading, parsing, and validating application configuration
//! from YAML files and environment variables. All settings are plain numbers,
//! booleans and strings loaded once at startup.

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Main application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Config {
    /// Remote track source configuration
    #[serde(default)]
    pub source: SourceConfig,

    /// Sync engine configuration
    #[serde(default)]
    pub sync: SyncConfig,

    /// Retry policy for page fetches
    #[serde(default)]
    pub retry: RetryConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Config {
    /// Load configuration from a YAML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref())
            .map_err(|e| ConfigError::FileRead(format!("Failed to read config file: {}", e)))?;
        Self::from_yaml(&content)
    }

    /// Parse configuration from a YAML string
    pub fn from_yaml(yaml: &str) -> Result<Self, ConfigError> {
        let expanded = expand_env_vars(yaml);
        let config: Config = serde_yaml::from_str(&expanded)
            .map_err(|e| ConfigError::Parse(format!("Failed to parse YAML: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from environment variables with prefix LIKED_SYNC_
    pub fn from_env() -> Result<Self, ConfigError> {
        let mut config = Config::default();

        if let Ok(url) = std::env::var("LIKED_SYNC_SOURCE_BASE_URL") {
            config.source.base_url = url;
        }
        if let Ok(size) = std::env::var("LIKED_SYNC_PAGE_SIZE") {
            config.sync.default_page_size = size
                .parse()
                .map_err(|_| ConfigError::Parse("Invalid page size".to_string()))?;
        }
        if let Ok(secs) = std::env::var("LIKED_SYNC_POLL_INTERVAL_SECS") {
            config.sync.poll_interval_secs = secs
                .parse()
                .map_err(|_| ConfigError::Parse("Invalid poll interval".to_string()))?;
        }
        if let Ok(level) = std::env::var("LIKED_SYNC_LOG_LEVEL") {
            config.logging.level = level;
        }

        config.validate()?;
        Ok(config)
    }

    /// Check cross-field constraints
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.sync.max_page_size == 0 {
            return Err(ConfigError::InvalidValue(
                "sync.max_page_size must be at least 1".to_string(),
            ));
        }
        if self.sync.default_page_size == 0 || self.sync.default_page_size > self.sync.max_page_size
        {
            return Err(ConfigError::InvalidValue(format!(
                "sync.default_page_size must be between 1 and {}",
                self.sync.max_page_size
            )));
        }
        if self.sync.poll_interval_secs == 0 {
            return Err(ConfigError::InvalidValue(
                "sync.poll_interval_secs must be at least 1".to_string(),
            ));
        }
        if self.retry.max_attempts == 0 {
            return Err(ConfigError::InvalidValue(
                "retry.max_attempts must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

/// Remote track source configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SourceConfig {
    /// Base URL of the library service
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Path of the paginated tracks endpoint
    #[serde(default = "default_tracks_path")]
    pub tracks_path: String,

    /// Per-request timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,

    /// Rate limiting configuration
    #[serde(default)]
    pub rate_limit: RateLimitConfig,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            tracks_path: default_tracks_path(),
            timeout_secs: default_timeout(),
            rate_limit: RateLimitConfig::default(),
        }
    }
}

fn default_base_url() -> String {
    "http://127.0.0.1:8080".to_string()
}

fn default_tracks_path() -> String {
    "/tracks".to_string()
}

fn default_timeout() -> u64 {
    30
}

/// Sync engine configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SyncConfig {
    /// Items requested per page
    #[serde(default = "default_page_size")]
    pub default_page_size: usize,

    /// Upper bound accepted for any page request
    #[serde(default = "default_max_page_size")]
    pub max_page_size: usize,

    /// Interval between scheduled incremental checks
    #[serde(default = "default_poll_interval")]
    pub poll_interval_secs: u64,

    /// Pause between backfill pages
    #[serde(default = "default_backfill_delay")]
    pub backfill_delay_ms: u64,

    /// Minimum spacing between accepted manual/event checks
    #[serde(default = "default_debounce")]
    pub debounce_ms: u64,

    /// Start a background backfill once the first page is loaded
    #[serde(default = "default_backfill_on_start")]
    pub backfill_on_start: bool,

    /// Suppress user-facing notifications
    #[serde(default)]
    pub quiet: bool,
}

impl SyncConfig {
    /// Poll interval as a `Duration`
    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_secs)
    }

    /// Backfill page delay as a `Duration`
    pub fn backfill_delay(&self) -> Duration {
        Duration::from_millis(self.backfill_delay_ms)
    }

    /// Debounce interval as a `Duration`
    pub fn debounce_interval(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            default_page_size: default_page_size(),
            max_page_size: default_max_page_size(),
            poll_interval_secs: default_poll_interval(),
            backfill_delay_ms: default_backfill_delay(),
            debounce_ms: default_debounce(),
            backfill_on_start: default_backfill_on_start(),
            quiet: false,
        }
    }
}

fn default_page_size() -> usize {
    50
}

fn default_max_page_size() -> usize {
    100
}

fn default_poll_interval() -> u64 {
    180 // 3 minutes
}

fn default_backfill_delay() -> u64 {
    500
}

fn default_debounce() -> u64 {
    10_000
}

fn default_backfill_on_start() -> bool {
    true
}

/// Retry configuration for page fetches
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RetryConfig {
    /// Total number of attempts, including the first one
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,

    /// Delay before the first retry in milliseconds
    #[serde(default = "default_initial_delay")]
    pub initial_delay_ms: u64,

    /// Double the delay after every failed attempt
    #[serde(default = "default_exponential")]
    pub exponential: bool,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
            initial_delay_ms: default_initial_delay(),
            exponential: default_exponential(),
        }
    }
}

fn default_max_attempts() -> u32 {
    3
}

fn default_initial_delay() -> u64 {
    2000
}

fn default_exponential() -> bool {
    true
}

/// Rate limiting configuration for HTTP clients
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RateLimitConfig {
    /// Minimum interval between requests in milliseconds
    #[serde(default)]
    pub min_interval_ms: u64,

    /// Maximum number of concurrent requests
    #[serde(default = "default_max_concurrent")]
    pub max_concurrent: usize,

    /// Wait time when rate limited without a Retry-After header (in seconds)
    #[serde(default = "default_rate_limit_wait")]
    pub rate_limit_wait_secs: u64,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            min_interval_ms: 0,
            max_concurrent: default_max_concurrent(),
            rate_limit_wait_secs: default_rate_limit_wait(),
        }
    }
}

fn default_max_concurrent() -> usize {
    2
}

fn default_rate_limit_wait() -> u64 {
    60
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LoggingConfig {
    /// Log level
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Log format (`pretty` or `json`)
    #[serde(default = "default_log_format")]
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

/// Configuration error types
#[derive(Debug, thiserror::Error, Clone, PartialEq)]
pub enum ConfigError {
    /// Error reading configuration file
    #[error("Failed to read configuration file: {0}")]
    FileRead(String),

    /// Error parsing configuration
    #[error("Failed to parse configuration: {0}")]
    Parse(String),

    /// Invalid configuration value
    #[error("Invalid configuration value: {0}")]
    InvalidValue(String),
}

/// Expand environment variables in a string
///
/// Supports `${VAR_NAME}` syntax
fn expand_env_vars(input: &str) -> String {
    let re = regex_lite::Regex::new(r"\$\{([^}]+)\}")
        .expect("Invalid regex pattern for environment variable expansion");

    re.replace_all(input, |caps: &regex_lite::Captures| {
        let var_name = &caps[1];
        std::env::var(var_name).unwrap_or_else(|_| caps[0].to_string())
    })
    .into_owned()
}
