mod channels;
mod defaults;

#[cfg(test)]
mod tests;

pub use channels::*;

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::ReelError;
use defaults::*;

/// Top-level Reelbot configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub bot: BotConfig,
    #[serde(default)]
    pub channel: ChannelConfig,
    #[serde(default)]
    pub download: DownloadConfig,
    #[serde(default)]
    pub api: ApiConfig,
}

/// General bot settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BotConfig {
    #[serde(default = "default_name")]
    pub name: String,
    /// Base directory for downloads and logs.
    #[serde(default = "default_data_dir")]
    pub data_dir: String,
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for BotConfig {
    fn default() -> Self {
        Self {
            name: default_name(),
            data_dir: default_data_dir(),
            log_level: default_log_level(),
        }
    }
}

/// Download negotiation and fetch settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DownloadConfig {
    /// Sources longer than this are rejected before any selection is stored.
    #[serde(default = "default_max_duration")]
    pub max_duration_secs: u64,
    /// Ceiling for the "standard" quality offer.
    #[serde(default = "default_standard_height")]
    pub standard_height: u32,
    /// Ceiling for the "high" quality offer.
    #[serde(default = "default_high_height")]
    pub high_height: u32,
    /// Path or name of the extraction binary.
    #[serde(default = "default_ytdlp_bin")]
    pub ytdlp_bin: String,
    /// Wall-clock ceiling for a single extractor invocation.
    #[serde(default = "default_fetch_timeout")]
    pub timeout_secs: u64,
}

impl Default for DownloadConfig {
    fn default() -> Self {
        Self {
            max_duration_secs: default_max_duration(),
            standard_height: default_standard_height(),
            high_height: default_high_height(),
            ytdlp_bin: default_ytdlp_bin(),
            timeout_secs: default_fetch_timeout(),
        }
    }
}

/// HTTP health endpoint configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    #[serde(default)]
    pub enabled: bool,
    #[serde(default = "default_api_host")]
    pub host: String,
    #[serde(default = "default_api_port")]
    pub port: u16,
    /// Bearer token for API requests. Empty = no auth.
    #[serde(default)]
    pub api_key: String,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            host: default_api_host(),
            port: default_api_port(),
            api_key: String::new(),
        }
    }
}

/// Expand `~` to home directory.
pub fn shellexpand(path: &str) -> String {
    if let Some(rest) = path.strip_prefix("~/") {
        if let Some(home) = std::env::var_os("HOME") {
            return format!("{}/{rest}", home.to_string_lossy());
        }
    }
    path.to_string()
}

/// Load configuration from a TOML file.
///
/// Falls back to defaults if the file does not exist.
pub fn load(path: &str) -> Result<Config, ReelError> {
    let path = Path::new(path);
    if !path.exists() {
        tracing::info!(
            "Config file not found at {}, using defaults",
            path.display()
        );
        return Ok(Config::default());
    }

    let content = std::fs::read_to_string(path)
        .map_err(|e| ReelError::Config(format!("failed to read {}: {}", path.display(), e)))?;

    let config: Config = toml::from_str(&content)
        .map_err(|e| ReelError::Config(format!("failed to parse config: {}", e)))?;

    Ok(config)
}
