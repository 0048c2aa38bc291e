//! Runtime configuration loaded from `config.json`.

use crate::logging::{DropPolicy, LogLevel};

use serde::Deserialize;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Errors returned while loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to open config file: {0}")]
    FileOpenFailed(#[source] io::Error),
    #[error("failed to parse config: {0}")]
    ParseFailed(String),
}

/// WebSocket subscription parameters.
#[derive(Debug, Clone, Deserialize)]
pub struct SubscriptionConfig {
    pub channels: Vec<String>,
    pub market_tickers: Vec<String>,
}

/// Socket timeout and reconnect policy.
#[derive(Debug, Clone, Deserialize)]
pub struct WsSettings {
    #[serde(default = "default_handshake_timeout_ms")]
    pub handshake_timeout_ms: u64,
    #[serde(default = "default_idle_timeout_ms")]
    pub idle_timeout_ms: u64,
    #[serde(default = "default_true")]
    pub keep_alive_pings: bool,
    #[serde(default = "default_true")]
    pub auto_reconnect: bool,
    #[serde(default = "default_reconnect_initial_delay_ms")]
    pub reconnect_initial_delay_ms: u64,
    #[serde(default = "default_reconnect_max_delay_ms")]
    pub reconnect_max_delay_ms: u64,
}

impl Default for WsSettings {
    fn default() -> Self {
        Self {
            handshake_timeout_ms: default_handshake_timeout_ms(),
            idle_timeout_ms: default_idle_timeout_ms(),
            keep_alive_pings: true,
            auto_reconnect: true,
            reconnect_initial_delay_ms: default_reconnect_initial_delay_ms(),
            reconnect_max_delay_ms: default_reconnect_max_delay_ms(),
        }
    }
}

/// Async logger configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: LogLevel,
    #[serde(default = "default_queue_size")]
    pub queue_size: usize,
    #[serde(default = "default_drop_policy")]
    pub drop_policy: DropPolicy,
    #[serde(default = "default_true")]
    pub include_raw_on_parse_error: bool,
    #[serde(default)]
    pub log_raw_messages: bool,
    #[serde(default = "default_log_output_path")]
    pub output_path: PathBuf,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            queue_size: default_queue_size(),
            drop_policy: default_drop_policy(),
            include_raw_on_parse_error: true,
            log_raw_messages: false,
            output_path: default_log_output_path(),
        }
    }
}

/// Destination for raw message capture.
#[derive(Debug, Clone, Deserialize)]
pub struct OutputConfig {
    #[serde(default = "default_raw_messages_path")]
    pub raw_messages_path: PathBuf,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            raw_messages_path: default_raw_messages_path(),
        }
    }
}

/// Top-level runtime configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub env: String,
    pub ws_url: String,
    pub subscription: SubscriptionConfig,
    #[serde(default)]
    pub ws: WsSettings,
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub output: OutputConfig,
}

/// Load and validate a configuration file.
pub fn load_config(path: impl AsRef<Path>) -> Result<Config, ConfigError> {
    let contents = fs::read_to_string(path).map_err(ConfigError::FileOpenFailed)?;
    let config: Config =
        serde_json::from_str(&contents).map_err(|err| ConfigError::ParseFailed(err.to_string()))?;
    validate(&config)?;
    Ok(config)
}

fn validate(config: &Config) -> Result<(), ConfigError> {
    if config.subscription.channels.is_empty() {
        return Err(ConfigError::ParseFailed(
            "subscription.channels must not be empty".to_string(),
        ));
    }
    if config.logging.queue_size == 0 {
        return Err(ConfigError::ParseFailed(
            "logging.queue_size must be greater than zero".to_string(),
        ));
    }
    if config.logging.output_path.as_os_str().is_empty() {
        return Err(ConfigError::ParseFailed(
            "logging.output_path must not be empty".to_string(),
        ));
    }
    if config.output.raw_messages_path.as_os_str().is_empty() {
        return Err(ConfigError::ParseFailed(
            "output.raw_messages_path must not be empty".to_string(),
        ));
    }
    Ok(())
}

fn default_true() -> bool {
    true
}

fn default_handshake_timeout_ms() -> u64 {
    30_000
}

fn default_idle_timeout_ms() -> u64 {
    60_000
}

fn default_reconnect_initial_delay_ms() -> u64 {
    500
}

fn default_reconnect_max_delay_ms() -> u64 {
    30_000
}

fn default_log_level() -> LogLevel {
    LogLevel::Info
}

fn default_queue_size() -> usize {
    10_000
}

fn default_drop_policy() -> DropPolicy {
    DropPolicy::DropOldest
}

fn default_log_output_path() -> PathBuf {
    PathBuf::from("logs/kalshi.log.json")
}

fn default_raw_messages_path() -> PathBuf {
    PathBuf::from("logs/ws_messages.json")
}
