use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Public endpoint of the Rick and Morty GraphQL API.
pub const DEFAULT_ENDPOINT: &str = "https://rickandmortyapi.com/graphql";

/// How a screen uses previously fetched payloads while refetching.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FetchPolicy {
    /// Show a cached payload for the same variables while the network answers.
    #[default]
    CacheAndNetwork,
    /// Always wait for the network; only the screen's own last payload stays visible.
    NetworkOnly,
}

/// Application configuration from `Rickdex.yaml`, overridable via `RICKDEX_*`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub endpoint: String,
    pub request_timeout_secs: u64,
    pub fetch_policy: FetchPolicy,
    pub debug_mode: bool,
    pub log_to_console: bool,
    pub log_dir: String,
    /// Extra HTTP headers sent with every query, in declaration order.
    pub extra_headers: IndexMap<String, String>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            request_timeout_secs: 30,
            fetch_policy: FetchPolicy::default(),
            debug_mode: false,
            log_to_console: true,
            log_dir: "logs".to_string(),
            extra_headers: IndexMap::new(),
        }
    }
}

#[derive(Error, Debug, PartialEq, Eq)]
pub enum ConfigError {
    #[error("endpoint must not be empty")]
    EmptyEndpoint,

    #[error("endpoint {0:?} must start with http:// or https://")]
    UnsupportedScheme(String),

    #[error("request_timeout_secs must be greater than zero")]
    ZeroTimeout,

    #[error("invalid header name {0:?}")]
    InvalidHeaderName(String),
}

impl AppConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        let endpoint = self.endpoint.trim();
        if endpoint.is_empty() {
            return Err(ConfigError::EmptyEndpoint);
        }
        if !(endpoint.starts_with("http://") || endpoint.starts_with("https://")) {
            return Err(ConfigError::UnsupportedScheme(endpoint.to_string()));
        }
        if self.request_timeout_secs == 0 {
            return Err(ConfigError::ZeroTimeout);
        }
        if let Some(bad) = self
            .extra_headers
            .keys()
            .find(|name| reqwest::header::HeaderName::from_bytes(name.as_bytes()).is_err())
        {
            return Err(ConfigError::InvalidHeaderName(bad.clone()));
        }
        Ok(())
    }

    pub fn request_timeout(&self) -> std::time::Duration {
        std::time::Duration::from_secs(self.request_timeout_secs)
    }
}
