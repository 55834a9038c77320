//! Configuration types for the fluxwatch client

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Main configuration structure
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// Base address of the resource backend
    #[serde(default = "default_backend_url")]
    pub backend_url: String,
    /// Period of the background (silent) sync while a view is mounted
    #[serde(default = "default_poll_interval")]
    pub poll_interval_seconds: u64,
    #[serde(default = "default_request_timeout")]
    pub request_timeout_seconds: u64,
    /// Drop sync responses that settle after a newer one was applied
    #[serde(default)]
    pub discard_stale_responses: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            backend_url: default_backend_url(),
            poll_interval_seconds: default_poll_interval(),
            request_timeout_seconds: default_request_timeout(),
            discard_stale_responses: false,
        }
    }
}

impl Config {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_seconds)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_seconds)
    }

    /// Endpoint of the resource collection, `{backend}/api/resources`
    pub fn resources_url(&self) -> String {
        format!("{}/api/resources", self.backend_url.trim_end_matches('/'))
    }

    /// Reject values that would make the client unusable
    pub fn validate(&self) -> crate::Result<()> {
        let url = self.backend_url.trim();
        if url.is_empty() {
            return Err(crate::FluxwatchError::Config(
                "backend_url must not be empty".to_string(),
            ));
        }
        if !(url.starts_with("http://") || url.starts_with("https://")) {
            return Err(crate::FluxwatchError::Config(format!(
                "backend_url must start with http:// or https://, got {:?}",
                self.backend_url
            )));
        }
        if self.poll_interval_seconds == 0 {
            return Err(crate::FluxwatchError::Config(
                "poll_interval_seconds must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }
}

fn default_backend_url() -> String {
    "http://localhost:8000".to_string()
}

fn default_poll_interval() -> u64 {
    10
}

fn default_request_timeout() -> u64 {
    10
}

/// Load configuration from a JSON file
pub fn load_config(path: &Path) -> crate::Result<Config> {
    let content = std::fs::read_to_string(path).map_err(|e| {
        crate::FluxwatchError::Config(format!("Failed to read config file {:?}: {}", path, e))
    })?;
    let config: Config = serde_json::from_str(&content)?;
    Ok(config)
}
