//! Configuration loading utilities
//!
//! Batcher options can come from a YAML or JSON file, or from environment
//! variables (`COALESCE_MAX_BATCH_SIZE`, `COALESCE_DELAY_WINDOW_MS`).

use super::models::BatcherConfig;
use super::validation::Validate;
use crate::utils::error::{CoalesceError, Result};
use std::path::Path;
use tracing::{debug, info};

/// Environment variable prefix for batcher options
pub const ENV_PREFIX: &str = "COALESCE";

impl BatcherConfig {
    /// Load configuration from a YAML or JSON file
    pub async fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        info!("Loading batcher configuration from: {:?}", path);

        let content = tokio::fs::read_to_string(path).await.map_err(|e| {
            CoalesceError::Config(format!("Failed to read config file {:?}: {}", path, e))
        })?;

        let is_json = path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));

        let config: Self = if is_json {
            serde_json::from_str(&content)?
        } else {
            serde_yaml::from_str(&content)?
        };

        config.validate().map_err(CoalesceError::Validation)?;

        debug!(?config, "Batcher configuration loaded");
        Ok(config)
    }

    /// Load configuration from `COALESCE_*` environment variables
    pub fn from_env() -> Result<Self> {
        Self::from_env_with_prefix(ENV_PREFIX)
    }

    /// Load configuration from environment variables with a custom prefix.
    ///
    /// Unset variables fall back to the defaults.
    pub fn from_env_with_prefix(prefix: &str) -> Result<Self> {
        debug!(prefix, "Loading batcher configuration from environment variables");

        let settings = config::Config::builder()
            .add_source(config::Environment::with_prefix(prefix).try_parsing(true))
            .build()
            .map_err(|e| CoalesceError::Config(format!("Failed to read environment: {}", e)))?;

        let config: Self = settings
            .try_deserialize()
            .map_err(|e| CoalesceError::Config(format!("Invalid batcher options: {}", e)))?;

        config.validate().map_err(CoalesceError::Validation)?;
        Ok(config)
    }
}
