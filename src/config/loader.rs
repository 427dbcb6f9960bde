//! Configuration Loader
//!
//! Loads and validates configuration from TOML files matching config/monitor.toml.
//! Every key has a default, so a partial file (or an empty one) is valid.

use serde::Deserialize;
use std::path::Path;
use std::time::Duration;
use thiserror::Error;

use crate::adapters::meteora::{MeteoraConfig, DEFAULT_PAIRS_URL};
use crate::adapters::telegram::TelegramConfig;
use crate::domain::tracker::{Thresholds, DEFAULT_MAX_LOOPS, DEFAULT_MIN_LIQUIDITY, DEFAULT_MIN_VOLUME};

/// Main configuration structure matching config/monitor.toml
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub monitor: MonitorSection,
    #[serde(default)]
    pub api: ApiSection,
    #[serde(default)]
    pub telegram: TelegramSection,
}

/// Thresholds and loop timing
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct MonitorSection {
    /// Minimum summed liquidity in USD for an alert
    pub min_liquidity: f64,
    /// Minimum summed 24h volume in USD for an alert
    pub min_volume: f64,
    /// Number of cycles a new token is watched before it is dropped
    pub max_loops: u64,
    /// Seconds between polling cycles
    pub check_interval_secs: u64,
    /// Seconds between startup fetch attempts
    pub bootstrap_retry_secs: u64,
    /// Recovery pause after an unexpected cycle error
    pub error_backoff_secs: u64,
}

impl Default for MonitorSection {
    fn default() -> Self {
        Self {
            min_liquidity: DEFAULT_MIN_LIQUIDITY,
            min_volume: DEFAULT_MIN_VOLUME,
            max_loops: DEFAULT_MAX_LOOPS,
            check_interval_secs: 60,
            bootstrap_retry_secs: 30,
            error_backoff_secs: 10,
        }
    }
}

/// Pool listing API
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ApiSection {
    /// Pair listing endpoint
    pub url: String,
    /// Request timeout in seconds
    pub timeout_secs: u64,
    /// Attempts per fetch
    pub max_retries: u32,
    /// Fixed delay between attempts in seconds
    pub retry_delay_secs: u64,
}

impl Default for ApiSection {
    fn default() -> Self {
        Self {
            url: DEFAULT_PAIRS_URL.to_string(),
            timeout_secs: 10,
            max_retries: 3,
            retry_delay_secs: 5,
        }
    }
}

impl ApiSection {
    /// Get listing URL with environment variable override
    /// Checks POOL_API_URL env var first, falls back to config value
    pub fn get_url(&self) -> String {
        std::env::var("POOL_API_URL")
            .ok()
            .filter(|url| !url.trim().is_empty())
            .unwrap_or_else(|| self.url.clone())
    }
}

/// Telegram alert channel (optional)
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct TelegramSection {
    /// Send alerts to Telegram when credentials are present
    pub enabled: bool,
    /// Bot token
    pub bot_token: String,
    /// Destination chat id
    pub chat_id: String,
    /// Append best liquidity/volume to the alert instead of the bare mint
    pub include_metrics: bool,
}

impl Default for TelegramSection {
    fn default() -> Self {
        Self {
            enabled: true,
            bot_token: String::new(),
            chat_id: String::new(),
            include_metrics: false,
        }
    }
}

impl TelegramSection {
    /// Get bot token with environment variable fallback
    /// Checks TELEGRAM_BOT_TOKEN env var if config value is empty
    pub fn get_bot_token(&self) -> Option<String> {
        non_empty(&self.bot_token).or_else(|| env_non_empty("TELEGRAM_BOT_TOKEN"))
    }

    /// Get chat id with environment variable fallback
    /// Checks TELEGRAM_CHAT_ID env var if config value is empty
    pub fn get_chat_id(&self) -> Option<String> {
        non_empty(&self.chat_id).or_else(|| env_non_empty("TELEGRAM_CHAT_ID"))
    }

    /// Telegram settings if enabled and fully configured, None otherwise
    pub fn resolve(&self) -> Option<TelegramConfig> {
        if !self.enabled {
            return None;
        }
        match (self.get_bot_token(), self.get_chat_id()) {
            (Some(token), Some(chat_id)) => Some(TelegramConfig::new(token, chat_id)),
            _ => None,
        }
    }
}

fn non_empty(value: &str) -> Option<String> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

fn env_non_empty(key: &str) -> Option<String> {
    std::env::var(key).ok().and_then(|v| non_empty(&v))
}

/// Configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    IoError(#[from] std::io::Error),
    #[error("Failed to parse TOML: {0}")]
    ParseError(#[from] toml::de::Error),
    #[error("Validation failed: {0}")]
    ValidationError(String),
}

/// Load configuration from a TOML file
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<Config, ConfigError> {
    let content = std::fs::read_to_string(path)?;
    parse_config(&content)
}

/// Parse and validate configuration from TOML text
pub fn parse_config(content: &str) -> Result<Config, ConfigError> {
    let config: Config = toml::from_str(content)?;
    config.validate()?;
    Ok(config)
}

impl Config {
    /// Validate all configuration parameters
    pub fn validate(&self) -> Result<(), ConfigError> {
        Thresholds::from(self)
            .validate()
            .map_err(|e| ConfigError::ValidationError(e.to_string()))?;

        if self.monitor.check_interval_secs == 0 {
            return Err(ConfigError::ValidationError(
                "check_interval_secs must be > 0".to_string(),
            ));
        }

        if self.api.url.trim().is_empty() {
            return Err(ConfigError::ValidationError(
                "api url cannot be empty".to_string(),
            ));
        }

        if self.api.max_retries == 0 {
            return Err(ConfigError::ValidationError(
                "max_retries must be > 0".to_string(),
            ));
        }

        if self.api.timeout_secs == 0 {
            return Err(ConfigError::ValidationError(
                "timeout_secs must be > 0".to_string(),
            ));
        }

        Ok(())
    }

    pub fn check_interval(&self) -> Duration {
        Duration::from_secs(self.monitor.check_interval_secs)
    }

    pub fn bootstrap_retry(&self) -> Duration {
        Duration::from_secs(self.monitor.bootstrap_retry_secs)
    }

    pub fn error_backoff(&self) -> Duration {
        Duration::from_secs(self.monitor.error_backoff_secs)
    }
}

impl From<&Config> for Thresholds {
    fn from(config: &Config) -> Self {
        Thresholds {
            min_liquidity: config.monitor.min_liquidity,
            min_volume: config.monitor.min_volume,
            max_loops: config.monitor.max_loops,
        }
    }
}

impl From<&Config> for MeteoraConfig {
    fn from(config: &Config) -> Self {
        MeteoraConfig {
            pairs_url: config.api.get_url(),
            timeout: Duration::from_secs(config.api.timeout_secs),
            max_retries: config.api.max_retries,
            retry_delay: Duration::from_secs(config.api.retry_delay_secs),
        }
    }
}
