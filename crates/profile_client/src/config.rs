//! Client configuration

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Client configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Profile server URL
    #[serde(default = "default_server_url")]
    pub server_url: String,

    /// Timeout for each round-trip, in seconds
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,

    /// Directory of the file-backed profile cache
    #[serde(default)]
    pub cache_dir: Option<PathBuf>,
}

fn default_server_url() -> String {
    "http://localhost:54880".to_string()
}

fn default_request_timeout() -> u64 {
    10
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            server_url: default_server_url(),
            request_timeout_secs: default_request_timeout(),
            cache_dir: None,
        }
    }
}

impl ClientConfig {
    /// Load configuration from an optional config file and the environment.
    ///
    /// Environment variables take precedence over the file.
    pub fn load() -> Result<Self, ConfigError> {
        // Load .env file if present
        dotenvy::dotenv().ok();

        let base = match Self::find_config_file() {
            Some(path) => Self::from_file(&path)?,
            None => Self::default(),
        };

        Ok(base.with_overrides(|key| std::env::var(key).ok()))
    }

    /// Parse a TOML config file.
    pub fn from_file(path: &std::path::Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        let config: Self = toml::from_str(&contents)?;

        if config.request_timeout_secs == 0 {
            return Err(ConfigError::Invalid(
                "request_timeout_secs must be at least 1".to_string(),
            ));
        }

        Ok(config)
    }

    /// Apply `LOCALGIGS_*` overrides through a variable lookup.
    pub fn with_overrides<F>(mut self, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = lookup("LOCALGIGS_SERVER_URL") {
            self.server_url = url;
        }

        if let Some(timeout) = lookup("LOCALGIGS_REQUEST_TIMEOUT") {
            match timeout.parse() {
                Ok(secs) if secs > 0 => self.request_timeout_secs = secs,
                _ => tracing::warn!(value = %timeout, "Ignoring invalid LOCALGIGS_REQUEST_TIMEOUT"),
            }
        }

        if let Some(dir) = lookup("LOCALGIGS_CACHE_DIR") {
            self.cache_dir = Some(PathBuf::from(dir));
        }

        self
    }

    /// Find the config file in standard locations
    fn find_config_file() -> Option<PathBuf> {
        let mut locations = vec![PathBuf::from("localgigs-client.toml")];
        if let Some(dir) = dirs::config_dir() {
            locations.push(dir.join("localgigs").join("client.toml"));
        }

        locations.into_iter().find(|p| p.exists())
    }

    /// Timeout applied to each round-trip.
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// Cache directory, defaulting to the platform cache dir.
    pub fn cache_dir(&self) -> PathBuf {
        self.cache_dir.clone().unwrap_or_else(|| {
            dirs::cache_dir()
                .unwrap_or_else(std::env::temp_dir)
                .join("localgigs")
                .join("profiles")
        })
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    FileRead(#[from] std::io::Error),

    #[error("Failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}
