//! API client configuration.

use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;
use url::Url;

/// Default collaborator base URL (the local mock backend).
pub const DEFAULT_BASE_URL: &str = "http://localhost:5000";

/// Environment variable overriding the base URL.
pub const ENV_BASE_URL: &str = "STOREFRONT_API_URL";

/// Environment variable overriding the request timeout in seconds.
pub const ENV_TIMEOUT_SECS: &str = "STOREFRONT_API_TIMEOUT_SECS";

/// Configuration errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Could not read the config file.
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    /// Could not parse the config file.
    #[error("failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),

    /// Base URL is not a valid URL.
    #[error("invalid base url {url}: {source}")]
    InvalidUrl {
        url: String,
        source: url::ParseError,
    },

    /// The HTTP client could not be constructed.
    #[error("failed to build http client: {0}")]
    Client(String),
}

/// Configuration for the HTTP adapter.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Collaborator base URL.
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Per-request timeout in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    /// Optional User-Agent header.
    #[serde(default)]
    pub user_agent: Option<String>,
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

fn default_timeout_secs() -> u64 {
    30
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_secs: default_timeout_secs(),
            user_agent: None,
        }
    }
}

impl ApiConfig {
    /// Load from a TOML file.
    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Ok(toml::from_str(&contents)?)
    }

    /// Defaults overridden by environment variables.
    pub fn from_env() -> Self {
        let mut config = Self::default();
        if let Ok(url) = std::env::var(ENV_BASE_URL) {
            if !url.is_empty() {
                config.base_url = url;
            }
        }
        if let Ok(secs) = std::env::var(ENV_TIMEOUT_SECS) {
            if let Ok(secs) = secs.parse() {
                config.timeout_secs = secs;
            }
        }
        config
    }

    /// Parse and validate the base URL.
    pub fn parsed_base_url(&self) -> Result<Url, ConfigError> {
        Url::parse(&self.base_url).map_err(|source| ConfigError::InvalidUrl {
            url: self.base_url.clone(),
            source,
        })
    }
}
