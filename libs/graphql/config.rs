//! Client configuration
//!
//! ```yaml
//! endpoint: https://api.example.com/graphql
//! headers:
//!   Authorization: Bearer <token>
//! timeout_ms: 10000
//! log_level: info
//! options:
//!   credentials: include
//! ```

use crate::options::ClientOptions;
use hypersockets::Headers;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::path::Path;
use thiserror::Error;
use tracing::info;

/// Environment variable that overrides `endpoint`
pub const ENDPOINT_ENV: &str = "GRAPHQL_ENDPOINT";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to load config file: {0}")]
    FileError(#[from] std::io::Error),

    #[error("Failed to parse YAML: {0}")]
    YamlError(#[from] serde_yaml::Error),

    #[error("Invalid configuration: {0}")]
    ValidationError(String),
}

pub type Result<T> = std::result::Result<T, ConfigError>;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClientConfig {
    pub endpoint: String,

    /// Default headers
    #[serde(default)]
    pub headers: Headers,

    /// HTTP request timeout
    #[serde(default)]
    pub timeout_ms: Option<u64>,

    /// Log level (error, warn, info, debug, trace)
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Extra transport options, also sent as part of `connection_init`
    #[serde(default)]
    pub options: Map<String, Value>,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl ClientConfig {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            headers: Headers::new(),
            timeout_ms: None,
            log_level: default_log_level(),
            options: Map::new(),
        }
    }

    /// Load configuration from a YAML file
    ///
    /// Applies environment overrides, then validates.
    pub fn load(config_path: impl AsRef<Path>) -> Result<Self> {
        let yaml_content = std::fs::read_to_string(config_path)?;
        let mut config = Self::from_yaml_str(&yaml_content)?;
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    /// Parse without overrides or validation
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(yaml)?)
    }

    pub fn apply_env_overrides(&mut self) {
        self.override_endpoint(std::env::var(ENDPOINT_ENV).ok());
    }

    fn override_endpoint(&mut self, endpoint: Option<String>) {
        if let Some(endpoint) = endpoint.filter(|e| !e.is_empty()) {
            info!("Overriding endpoint from {}", ENDPOINT_ENV);
            self.endpoint = endpoint;
        }
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<()> {
        if self.endpoint.trim().is_empty() {
            return Err(ConfigError::ValidationError(
                "endpoint must not be empty".to_string(),
            ));
        }

        // Requests are POSTed here; subscriptions derive the ws address from it
        let scheme_ok = ["http://", "https://"]
            .iter()
            .any(|scheme| self.endpoint.starts_with(scheme));
        if !scheme_ok {
            return Err(ConfigError::ValidationError(format!(
                "endpoint must use http or https: {}",
                self.endpoint
            )));
        }

        if self.timeout_ms == Some(0) {
            return Err(ConfigError::ValidationError(
                "timeout_ms must be greater than 0".to_string(),
            ));
        }

        let valid_levels = ["error", "warn", "info", "debug", "trace"];
        if !valid_levels.contains(&self.log_level.to_lowercase().as_str()) {
            return Err(ConfigError::ValidationError(format!(
                "log_level must be one of {:?}",
                valid_levels
            )));
        }

        Ok(())
    }

    /// The option bag for a client built from this config
    pub fn client_options(&self) -> ClientOptions {
        ClientOptions {
            headers: self.headers.clone(),
            timeout_ms: self.timeout_ms,
            extra: self.options.clone(),
        }
    }
}
