//! Configuration validation

use super::models::BatcherConfig;
use tracing::debug;

/// Validation trait for configuration structures
pub trait Validate {
    fn validate(&self) -> Result<(), String>;
}

impl Validate for BatcherConfig {
    fn validate(&self) -> Result<(), String> {
        debug!("Validating batcher configuration");

        if self.max_batch_size == 0 {
            return Err("Batcher max batch size must be greater than 0".to_string());
        }

        Ok(())
    }
}
