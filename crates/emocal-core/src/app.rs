use anyhow::Result;
use std::sync::Arc;

use crate::Config;

/// Application handle: validated configuration shared by the services.
pub struct App {
    config: Arc<Config>,
}

impl App {
    /// Load and validate configuration from the default location.
    pub fn new() -> Result<Self> {
        let (config, validation) = Config::load_validated()?;
        tracing::info!(
            "Configuration loaded ({} warnings)",
            validation.warnings.len()
        );
        Ok(Self::with_config(config))
    }

    /// Build an application around an already-loaded configuration.
    pub fn with_config(config: Config) -> Self {
        Self {
            config: Arc::new(config),
        }
    }

    /// Get reference to application config
    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn shutdown(&mut self) -> Result<()> {
        tracing::info!("Shutting down application");
        Ok(())
    }
}
