//! Utility modules
//!
//! - **error**: batch and crate error types
//! - **logging**: `tracing` subscriber setup

pub mod error;
pub mod logging;

pub use error::{BatchError, CoalesceError, Result};
pub use logging::{LogFormat, LoggingConfig, init_logging};
