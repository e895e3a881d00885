//! Binary runner utilities
//!
//! Provides a standardized way to run binaries with proper
//! configuration, logging and shutdown banners.

use graphql::config::ENDPOINT_ENV;
use graphql::ClientConfig;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Configuration for running a binary application
#[derive(Debug, Clone)]
pub struct RunConfig {
    /// Name of the binary (for logging)
    pub name: String,
    /// Client configuration file
    pub config_path: PathBuf,
}

impl RunConfig {
    /// Create a new run configuration
    pub fn new(name: impl Into<String>, config_path: impl Into<PathBuf>) -> Self {
        Self {
            name: name.into(),
            config_path: config_path.into(),
        }
    }
}

/// Load the client configuration for a binary
///
/// Without a config file, `GRAPHQL_ENDPOINT` alone is enough.
pub fn load_client_config(path: &Path) -> anyhow::Result<ClientConfig> {
    if path.exists() {
        return Ok(ClientConfig::load(path)?);
    }

    match std::env::var(ENDPOINT_ENV) {
        Ok(endpoint) => {
            warn!(
                "Config file {} not found, using {} only",
                path.display(),
                ENDPOINT_ENV
            );
            let config = ClientConfig::new(endpoint);
            config.validate()?;
            Ok(config)
        }
        Err(_) => anyhow::bail!(
            "No config file at {} and {} is not set",
            path.display(),
            ENDPOINT_ENV
        ),
    }
}

/// Trait for binary applications
pub trait BinaryRunner {
    /// Run the application
    async fn run(&mut self) -> anyhow::Result<()>;

    /// Get the run configuration
    fn config(&self) -> &RunConfig;

    /// Print startup banner
    fn print_banner(&self) {
        let config = self.config();
        info!("========================================");
        info!("Starting {}", config.name);
        info!("Config: {}", config.config_path.display());
        info!("========================================");
    }

    /// Print shutdown banner
    fn print_shutdown(&self, stats: Option<&str>) {
        let config = self.config();
        info!("========================================");
        info!("{} finished", config.name);
        if let Some(stats) = stats {
            info!("{}", stats);
        }
        info!("========================================");
    }

    /// Execute the binary with banners around the run
    async fn execute(&mut self) -> anyhow::Result<()> {
        self.print_banner();
        let result = self.run().await;
        self.print_shutdown(None);
        result
    }
}
