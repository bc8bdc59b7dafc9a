//! Logging setup
//!
//! The library itself only emits `tracing` events; binaries and tests decide
//! where they go by installing a subscriber with [`init_logging`].

mod setup;

pub use setup::{LogFormat, LoggingConfig, init_logging};
