//! Configuration types for the device status service

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

use crate::labels::Locale;

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Base URL of the device management API, e.g. `http://localhost:8080`
    #[serde(default = "default_api_base_url")]
    pub api_base_url: String,
    /// Delay before re-checking an unreachable device
    #[serde(default = "default_retry_delay")]
    pub retry_delay_seconds: u64,
    /// Language tag used for display labels
    #[serde(default = "default_locale")]
    pub locale: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_base_url: default_api_base_url(),
            retry_delay_seconds: default_retry_delay(),
            locale: default_locale(),
        }
    }
}

impl Config {
    /// Never shorter than one second, so a zero set through code cannot spin.
    pub fn retry_delay(&self) -> Duration {
        Duration::from_secs(self.retry_delay_seconds.max(1))
    }

    pub fn locale(&self) -> Locale {
        Locale::from_tag(&self.locale)
    }
}

fn default_api_base_url() -> String {
    "http://localhost:8080".to_string()
}

fn default_retry_delay() -> u64 {
    30
}

fn default_locale() -> String {
    "en".to_string()
}

/// Load configuration from a JSON file
pub fn load_config(path: &Path) -> crate::Result<Config> {
    let content = std::fs::read_to_string(path).map_err(|e| {
        crate::DeviceStatusError::Config(format!("Failed to read config file {:?}: {}", path, e))
    })?;
    let config: Config = serde_json::from_str(&content)?;
    if config.retry_delay_seconds == 0 {
        return Err(crate::DeviceStatusError::Config(
            "retry_delay_seconds must be greater than zero".to_string(),
        ));
    }
    Ok(config)
}
