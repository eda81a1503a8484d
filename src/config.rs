//! Configuration module for the sales bot
//!
//! This module handles configuration loading from TOML files and
//! environment variables, and validates the values the bot cannot run without.

use serde::{Deserialize, Serialize};
use solana_sdk::pubkey::Pubkey;
use std::collections::HashMap;
use std::str::FromStr;
use std::time::Duration;
use thiserror::Error;

/// Environment variable holding the watched address
pub const ENV_PROJECT_ADDRESS: &str = "PROJECT_ADDRESS";
/// Environment variable holding the notification webhook URL
pub const ENV_WEBHOOK_URL: &str = "DISCORD_URL";
pub const ENV_RPC_URL: &str = "SOLANA_RPC_URL";
pub const ENV_BACKFILL: &str = "SALES_BOT_BACKFILL";
pub const ENV_WEBHOOK_ENABLED: &str = "SALES_BOT_WEBHOOK_ENABLED";

/// Placeholder substituted with the transaction signature in explorer links
pub const SIGNATURE_PLACEHOLDER: &str = "{signature}";

/// Configuration errors, all fatal at startup
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Missing required configuration value: {0}")]
    MissingValue(&'static str),

    #[error("Invalid address for {field}: {value}")]
    InvalidAddress { field: String, value: String },

    #[error("Invalid URL for {field}: {value}")]
    InvalidUrl { field: &'static str, value: String },

    #[error("Invalid value for {field}: {message}")]
    InvalidValue { field: &'static str, message: String },

    #[error("Failed to read config file {path}: {message}")]
    Io { path: String, message: String },

    #[error("Failed to parse config file {path}: {message}")]
    Parse { path: String, message: String },
}

/// Main application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Address whose transactions are watched
    #[serde(default)]
    pub project_address: String,

    /// Webhook receiving sale notifications
    #[serde(default)]
    pub webhook_url: String,

    /// Chain RPC settings
    #[serde(default)]
    pub rpc: RpcConfig,

    /// Polling cadence and back-fill policy
    #[serde(default)]
    pub polling: PollingConfig,

    /// Metadata resolution settings
    #[serde(default)]
    pub metadata: MetadataConfig,

    /// Notification sinks
    #[serde(default)]
    pub notifier: NotifierConfig,

    /// Marketplace program address -> display name
    #[serde(default = "default_marketplaces")]
    pub marketplaces: HashMap<String, String>,

    /// Monitoring and metrics
    #[serde(default)]
    pub monitoring: MonitoringConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RpcConfig {
    /// JSON-RPC endpoint
    #[serde(default = "default_rpc_url")]
    pub url: String,

    /// Commitment level (processed, confirmed, finalized)
    #[serde(default = "default_commitment")]
    pub commitment: String,

    /// Request timeout in seconds
    #[serde(default = "default_rpc_timeout")]
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PollingConfig {
    /// Minimum spacing between network calls in milliseconds (0 disables pacing)
    #[serde(default = "default_request_interval")]
    pub request_interval_ms: u64,

    /// Wait after a tick that found no new signatures, in milliseconds
    #[serde(default = "default_idle_interval")]
    pub idle_interval_ms: u64,

    /// Notify sales that happened before the process started
    #[serde(default)]
    pub backfill: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetadataConfig {
    /// Timeout for the off-chain document request in seconds
    #[serde(default = "default_http_timeout")]
    pub http_timeout_secs: u64,

    /// Extra attempts for the off-chain document request
    #[serde(default = "default_metadata_retries")]
    pub max_retries: usize,

    /// Delay between attempts in milliseconds
    #[serde(default = "default_metadata_retry_delay")]
    pub retry_delay_ms: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotifierConfig {
    /// Print sales to the log
    #[serde(default = "default_true")]
    pub console: bool,

    /// Deliver sales to the webhook
    #[serde(default)]
    pub webhook_enabled: bool,

    /// Explorer link template, `{signature}` is replaced
    #[serde(default = "default_explorer_template")]
    pub explorer_url_template: String,

    /// Timeout for the webhook request in seconds
    #[serde(default = "default_http_timeout")]
    pub http_timeout_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MonitoringConfig {
    /// Enable the Prometheus endpoint
    #[serde(default)]
    pub enable_metrics: bool,

    /// Metrics port
    #[serde(default = "default_metrics_port")]
    pub metrics_port: u16,
}

// Default value functions
fn default_rpc_url() -> String { "https://api.mainnet-beta.solana.com".to_string() }
fn default_commitment() -> String { "confirmed".to_string() }
fn default_rpc_timeout() -> u64 { 30 }
fn default_request_interval() -> u64 { 1000 }
fn default_idle_interval() -> u64 { 2000 }
fn default_http_timeout() -> u64 { 10 }
fn default_metadata_retries() -> usize { 2 }
fn default_metadata_retry_delay() -> u64 { 500 }
fn default_explorer_template() -> String { "https://explorer.solana.com/tx/{signature}".to_string() }
fn default_metrics_port() -> u16 { 9090 }
fn default_true() -> bool { true }

/// Known marketplace programs
pub fn default_marketplaces() -> HashMap<String, String> {
    [
        ("MEisE1HzehtrDpAAT8PnLHjpSSkRYakotTuJRPjTpo8", "Magic Eden"),
        ("HZaWndaNWHFDd9Dhk5pqUUtsmoBCqzb1MLu3NAh1VX6B", "Alpha Art"),
        ("617jbWo616ggkDxvW1Le8pV38XLbVSyWY8ae6QUmGBAU", "Solsea"),
        ("CJsLwbP1iu5DuUikHEJnLfANgKy6stB2uFgvBBHoyxwz", "Solanart"),
        ("A7p8451ktDCHq5yYaHczeLMYsjRsAkzc3hCXcSrwYHU7", "Digital Eyes"),
    ]
    .into_iter()
    .map(|(address, name)| (address.to_string(), name.to_string()))
    .collect()
}

impl Default for RpcConfig {
    fn default() -> Self {
        Self {
            url: default_rpc_url(),
            commitment: default_commitment(),
            timeout_secs: default_rpc_timeout(),
        }
    }
}

impl Default for PollingConfig {
    fn default() -> Self {
        Self {
            request_interval_ms: default_request_interval(),
            idle_interval_ms: default_idle_interval(),
            backfill: false,
        }
    }
}

impl Default for MetadataConfig {
    fn default() -> Self {
        Self {
            http_timeout_secs: default_http_timeout(),
            max_retries: default_metadata_retries(),
            retry_delay_ms: default_metadata_retry_delay(),
        }
    }
}

impl Default for NotifierConfig {
    fn default() -> Self {
        Self {
            console: default_true(),
            webhook_enabled: false,
            explorer_url_template: default_explorer_template(),
            http_timeout_secs: default_http_timeout(),
        }
    }
}

impl Default for MonitoringConfig {
    fn default() -> Self {
        Self {
            enable_metrics: false,
            metrics_port: default_metrics_port(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            project_address: String::new(),
            webhook_url: String::new(),
            rpc: RpcConfig::default(),
            polling: PollingConfig::default(),
            metadata: MetadataConfig::default(),
            notifier: NotifierConfig::default(),
            marketplaces: default_marketplaces(),
            monitoring: MonitoringConfig::default(),
        }
    }
}

impl Config {
    /// Load configuration from TOML file
    pub fn from_file(path: &str) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.to_string(),
            message: e.to_string(),
        })?;
        toml::from_str(&content).map_err(|e| ConfigError::Parse {
            path: path.to_string(),
            message: e.to_string(),
        })
    }

    /// Load the file when present, then `.env` and process environment overrides,
    /// then validate
    pub fn load(path: &str) -> Result<Self, ConfigError> {
        let mut config = if std::path::Path::new(path).exists() {
            Self::from_file(path)?
        } else {
            tracing::warn!("Config file '{}' not found, using defaults", path);
            Self::default()
        };

        dotenvy::dotenv().ok();
        config.apply_env(|key| std::env::var(key).ok())?;
        config.validate()?;
        Ok(config)
    }

    /// Apply environment overrides from an arbitrary lookup. A flag value
    /// that is not a recognised boolean is rejected.
    pub fn apply_env<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(address) = non_empty(ENV_PROJECT_ADDRESS) {
            self.project_address = address.trim().to_string();
        }
        if let Some(url) = non_empty(ENV_WEBHOOK_URL) {
            self.webhook_url = url.trim().to_string();
        }
        if let Some(url) = non_empty(ENV_RPC_URL) {
            self.rpc.url = url.trim().to_string();
        }
        if let Some(value) = non_empty(ENV_BACKFILL) {
            self.polling.backfill = parse_flag(ENV_BACKFILL, &value)?;
        }
        if let Some(value) = non_empty(ENV_WEBHOOK_ENABLED) {
            self.notifier.webhook_enabled = parse_flag(ENV_WEBHOOK_ENABLED, &value)?;
        }
        Ok(())
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.project_address.is_empty() {
            return Err(ConfigError::MissingValue(ENV_PROJECT_ADDRESS));
        }
        if self.webhook_url.is_empty() {
            return Err(ConfigError::MissingValue(ENV_WEBHOOK_URL));
        }

        Pubkey::from_str(&self.project_address).map_err(|_| ConfigError::InvalidAddress {
            field: "project_address".to_string(),
            value: self.project_address.clone(),
        })?;

        for (field, url) in [("webhook_url", &self.webhook_url), ("rpc.url", &self.rpc.url)] {
            if !url.starts_with("http://") && !url.starts_with("https://") {
                return Err(ConfigError::InvalidUrl {
                    field,
                    value: url.clone(),
                });
            }
        }

        if !matches!(self.rpc.commitment.as_str(), "processed" | "confirmed" | "finalized") {
            return Err(ConfigError::InvalidValue {
                field: "rpc.commitment",
                message: format!("unknown commitment '{}'", self.rpc.commitment),
            });
        }

        if !self
            .notifier
            .explorer_url_template
            .contains(SIGNATURE_PLACEHOLDER)
        {
            return Err(ConfigError::InvalidValue {
                field: "notifier.explorer_url_template",
                message: format!("must contain {}", SIGNATURE_PLACEHOLDER),
            });
        }

        if self.marketplaces.is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "marketplaces",
                message: "at least one marketplace program is required".to_string(),
            });
        }
        for address in self.marketplaces.keys() {
            Pubkey::from_str(address).map_err(|_| ConfigError::InvalidAddress {
                field: format!("marketplaces.{}", address),
                value: address.clone(),
            })?;
        }

        Ok(())
    }

    /// Parsed watched address; only valid after `validate`
    pub fn project_pubkey(&self) -> Result<Pubkey, ConfigError> {
        Pubkey::from_str(&self.project_address).map_err(|_| ConfigError::InvalidAddress {
            field: "project_address".to_string(),
            value: self.project_address.clone(),
        })
    }

    pub fn request_interval(&self) -> Duration {
        Duration::from_millis(self.polling.request_interval_ms)
    }

    pub fn idle_interval(&self) -> Duration {
        Duration::from_millis(self.polling.idle_interval_ms)
    }
}

fn parse_flag(field: &'static str, value: &str) -> Result<bool, ConfigError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(ConfigError::InvalidValue {
            field,
            message: format!("expected a boolean, got '{}'", value.trim()),
        }),
    }
}
