//! Configuration management for the ferrovias tracker
//!
//! Handles loading configuration from files, environment variables,
//! and provides validation for all configuration settings.

use crate::TrackerError;
use anyhow::{Context, Result};
use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Root configuration structure for the tracker
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct TrackerConfig {
    /// Station status feed configuration
    #[serde(default)]
    pub feed: FeedConfig,
    /// Snapshot cache configuration
    #[serde(default)]
    pub cache: CacheConfig,
    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
    /// HTTP server configuration
    #[serde(default)]
    pub server: ServerConfig,
    /// Line topology configuration
    #[serde(default)]
    pub topology: TopologyConfig,
}

/// Station status feed settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeedConfig {
    /// URL returning the status of every station
    #[serde(default = "default_feed_url")]
    pub url: String,
    /// Request timeout in seconds
    #[serde(default = "default_feed_timeout")]
    pub timeout_seconds: u32,
    /// Maximum number of retries for failed requests
    #[serde(default = "default_feed_max_retries")]
    pub max_retries: u32,
    /// Seconds between polling cycles
    #[serde(default = "default_poll_interval")]
    pub poll_interval_seconds: u32,
    /// Use the bundled sample snapshot when the feed and cache both fail
    #[serde(default = "default_fallback_to_sample")]
    pub fallback_to_sample: bool,
}

/// Snapshot cache settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    /// Keep the last live snapshot as a fallback
    #[serde(default = "default_cache_enabled")]
    pub enabled: bool,
    /// Seconds a cached snapshot stays usable
    #[serde(default = "default_cache_ttl")]
    pub ttl_seconds: u32,
    /// Cache directory location
    #[serde(default = "default_cache_location")]
    pub location: String,
}

/// Logging configuration settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (error, warn, info, debug, trace)
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Log format (pretty or json)
    #[serde(default = "default_log_format")]
    pub format: String,
}

/// HTTP server settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_server_host")]
    pub host: String,
    #[serde(default = "default_server_port")]
    pub port: u16,
}

/// Line topology source
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct TopologyConfig {
    /// JSON topology file; the built-in Belgrano Norte line is used when absent
    pub path: Option<String>,
}

// Default value functions
fn default_feed_url() -> String {
    "https://ferrovias.fdiaznem.com.ar/stations/all/status".to_string()
}

fn default_feed_timeout() -> u32 {
    10
}

fn default_feed_max_retries() -> u32 {
    2
}

fn default_poll_interval() -> u32 {
    30
}

fn default_fallback_to_sample() -> bool {
    true
}

fn default_cache_enabled() -> bool {
    true
}

fn default_cache_ttl() -> u32 {
    120
}

fn default_cache_location() -> String {
    dirs::cache_dir()
        .map(|dir| dir.join("ferrovias").to_string_lossy().into_owned())
        .unwrap_or_else(|| ".cache/ferrovias".to_string())
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

fn default_server_host() -> String {
    "0.0.0.0".to_string()
}

fn default_server_port() -> u16 {
    8080
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            url: default_feed_url(),
            timeout_seconds: default_feed_timeout(),
            max_retries: default_feed_max_retries(),
            poll_interval_seconds: default_poll_interval(),
            fallback_to_sample: default_fallback_to_sample(),
        }
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            enabled: default_cache_enabled(),
            ttl_seconds: default_cache_ttl(),
            location: default_cache_location(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_server_host(),
            port: default_server_port(),
        }
    }
}

impl TrackerConfig {
    /// Load configuration from file and environment variables
    pub fn load() -> Result<Self> {
        Self::load_from_path(None)
    }

    /// Load configuration from specified path
    pub fn load_from_path(config_path: Option<PathBuf>) -> Result<Self> {
        let mut builder = Config::builder();

        // Load from file if path is provided or use default location
        let config_file = config_path.unwrap_or_else(|| {
            Self::get_config_path().unwrap_or_else(|| PathBuf::from("config.toml"))
        });

        if config_file.exists() {
            builder = builder.add_source(
                File::from(config_file.clone())
                    .required(false)
                    .format(config::FileFormat::Toml),
            );
        }

        // Environment overrides such as FERROVIAS__FEED__URL
        builder = builder.add_source(
            Environment::with_prefix("FERROVIAS")
                .separator("__")
                .try_parsing(true),
        );

        let settings = builder
            .build()
            .with_context(|| "Failed to build configuration")?;

        let mut config: TrackerConfig = settings
            .try_deserialize()
            .with_context(|| "Failed to deserialize configuration")?;

        // Apply defaults for missing values
        config.apply_defaults();

        // Validate configuration
        config.validate()?;

        Ok(config)
    }

    /// Get the default configuration file path
    #[must_use]
    pub fn get_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("ferrovias").join("config.toml"))
    }

    /// Apply default values to missing configuration fields
    pub fn apply_defaults(&mut self) {
        if self.feed.url.is_empty() {
            self.feed.url = default_feed_url();
        }
        if self.feed.timeout_seconds == 0 {
            self.feed.timeout_seconds = default_feed_timeout();
        }
        if self.feed.poll_interval_seconds == 0 {
            self.feed.poll_interval_seconds = default_poll_interval();
        }
        if self.cache.ttl_seconds == 0 {
            self.cache.ttl_seconds = default_cache_ttl();
        }
        if self.cache.location.is_empty() {
            self.cache.location = default_cache_location();
        }
        if self.logging.level.is_empty() {
            self.logging.level = default_log_level();
        }
        if self.logging.format.is_empty() {
            self.logging.format = default_log_format();
        }
        if self.server.host.is_empty() {
            self.server.host = default_server_host();
        }
    }

    /// Validate all configuration settings
    pub fn validate(&self) -> Result<()> {
        self.validate_numeric_ranges()?;
        self.validate_string_values()?;
        Ok(())
    }

    /// Validate numeric configuration ranges
    fn validate_numeric_ranges(&self) -> Result<()> {
        if self.feed.timeout_seconds > 120 {
            return Err(TrackerError::config("Feed timeout cannot exceed 120 seconds").into());
        }

        if self.feed.max_retries > 10 {
            return Err(TrackerError::config("Feed max retries cannot exceed 10").into());
        }

        if self.feed.poll_interval_seconds < 5 || self.feed.poll_interval_seconds > 3600 {
            return Err(TrackerError::config(
                "Poll interval must be between 5 and 3600 seconds",
            )
            .into());
        }

        if self.cache.ttl_seconds > 3600 {
            return Err(TrackerError::config(
                "Cache TTL cannot exceed 3600 seconds; older snapshots no longer describe the line",
            )
            .into());
        }

        if self.server.port == 0 {
            return Err(TrackerError::config("Server port cannot be 0").into());
        }

        Ok(())
    }

    /// Validate string configuration values
    fn validate_string_values(&self) -> Result<()> {
        let valid_log_levels = ["error", "warn", "info", "debug", "trace"];
        if !valid_log_levels.contains(&self.logging.level.as_str()) {
            return Err(TrackerError::config(format!(
                "Invalid log level '{}'. Must be one of: {}",
                self.logging.level,
                valid_log_levels.join(", ")
            ))
            .into());
        }

        let valid_log_formats = ["pretty", "json"];
        if !valid_log_formats.contains(&self.logging.format.as_str()) {
            return Err(TrackerError::config(format!(
                "Invalid log format '{}'. Must be one of: {}",
                self.logging.format,
                valid_log_formats.join(", ")
            ))
            .into());
        }

        if !self.feed.url.starts_with("http://") && !self.feed.url.starts_with("https://") {
            return Err(
                TrackerError::config("Feed URL must be a valid HTTP or HTTPS URL").into(),
            );
        }

        Ok(())
    }
}
