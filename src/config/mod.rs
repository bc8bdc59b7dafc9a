//! Configuration management for batchers
//!
//! This module handles loading, validation, and defaults of batcher options.

mod loader;
mod models;
mod validation;

pub use models::{BatcherConfig, DEFAULT_DELAY_WINDOW_MS, DEFAULT_MAX_BATCH_SIZE};
pub use validation::Validate;
