//! CLI utilities for binaries
//!
//! Handles configuration paths and command line arguments
//! for all binary executables.

use anyhow::Context;
use graphql::{variables, Variables};
use std::path::PathBuf;

/// Type of configuration to load
#[derive(Debug, Clone)]
pub enum ConfigType {
    /// Client configuration (config/graphql.yaml)
    Client,
    /// Custom path
    Custom(String),
}

impl ConfigType {
    /// Get the default path for this config type
    pub fn default_path(&self) -> &str {
        match self {
            ConfigType::Client => "config/graphql.yaml",
            ConfigType::Custom(path) => path,
        }
    }

    /// Get the environment variable name for this config type
    pub fn env_var_name(&self) -> &str {
        "GRAPHQL_CONFIG_PATH"
    }
}

/// Load configuration path from environment or use default
///
/// A custom path always wins over the environment.
///
/// # Examples
/// ```
/// use graphql_request::bin_common::{load_config_from_env, ConfigType};
///
/// let path = load_config_from_env(ConfigType::Custom("my.yaml".into()));
/// assert_eq!(path.to_str(), Some("my.yaml"));
/// ```
pub fn load_config_from_env(config_type: ConfigType) -> PathBuf {
    if let ConfigType::Custom(path) = config_type {
        return path.into();
    }

    std::env::var(config_type.env_var_name())
        .unwrap_or_else(|_| config_type.default_path().to_string())
        .into()
}

/// Parse command line arguments for a binary
///
/// Returns a vector of arguments (excluding the program name)
pub fn parse_args() -> Vec<String> {
    std::env::args().skip(1).collect()
}

/// Parse an optional JSON object argument into variables
pub fn parse_variables(arg: Option<&str>) -> anyhow::Result<Option<Variables>> {
    let Some(arg) = arg else {
        return Ok(None);
    };

    let value: serde_json::Value =
        serde_json::from_str(arg).context("variables must be valid JSON")?;
    match variables(value) {
        Some(vars) => Ok(Some(vars)),
        None => anyhow::bail!("variables must be a JSON object"),
    }
}
