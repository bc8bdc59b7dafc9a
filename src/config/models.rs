//! Batcher configuration model

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Default cap on unique keys per batch
pub const DEFAULT_MAX_BATCH_SIZE: usize = 25;

/// Default delay window; zero means "dispatch on the next scheduler tick"
pub const DEFAULT_DELAY_WINDOW_MS: u64 = 0;

/// Batcher options
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatcherConfig {
    /// Maximum number of unique keys in one batch
    #[serde(default = "default_max_batch_size")]
    pub max_batch_size: usize,
    /// Fixed window, from batch creation, before the batch is dispatched
    #[serde(default = "default_delay_window_ms")]
    pub delay_window_ms: u64,
}

impl Default for BatcherConfig {
    fn default() -> Self {
        Self {
            max_batch_size: default_max_batch_size(),
            delay_window_ms: default_delay_window_ms(),
        }
    }
}

impl BatcherConfig {
    /// Create a new config with defaults
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the maximum batch size
    pub fn with_max_batch_size(mut self, max_batch_size: usize) -> Self {
        self.max_batch_size = max_batch_size;
        self
    }

    /// Set the delay window in milliseconds
    pub fn with_delay_window_ms(mut self, delay_window_ms: u64) -> Self {
        self.delay_window_ms = delay_window_ms;
        self
    }

    /// Delay window as a [`Duration`]
    pub fn delay_window(&self) -> Duration {
        Duration::from_millis(self.delay_window_ms)
    }

    /// Merge batcher configurations, preferring non-default values of `other`
    pub fn merge(mut self, other: Self) -> Self {
        if other.max_batch_size != default_max_batch_size() {
            self.max_batch_size = other.max_batch_size;
        }
        if other.delay_window_ms != default_delay_window_ms() {
            self.delay_window_ms = other.delay_window_ms;
        }
        self
    }
}

fn default_max_batch_size() -> usize {
    DEFAULT_MAX_BATCH_SIZE
}

fn default_delay_window_ms() -> u64 {
    DEFAULT_DELAY_WINDOW_MS
}
