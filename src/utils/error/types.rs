//! Error types for the batcher

use std::sync::Arc;
use thiserror::Error;

/// Result type alias for crate-level operations
pub type Result<T> = std::result::Result<T, CoalesceError>;

/// Crate-level error type
#[derive(Error, Debug)]
pub enum CoalesceError {
    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Validation errors
    #[error("Validation error: {0}")]
    Validation(String),

    /// Method batcher registry errors
    #[error("Registry error: {0}")]
    Registry(String),

    /// Logging setup errors
    #[error("Logging error: {0}")]
    Logging(String),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// YAML parsing errors
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// JSON parsing errors
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Error an enqueued future settles with.
///
/// Errors are reference counted so that every waiter of a failed batch sees
/// the very same error value, and so that deduplicated callers can share one
/// outcome.
#[derive(Error, Debug)]
pub enum BatchError<E> {
    /// The executor failed as a whole; every key of the batch carries it
    #[error("Batch executor failed: {0}")]
    Executor(Arc<E>),

    /// The executor panicked; treated the same as [`BatchError::Executor`]
    #[error("Batch executor panicked: {0}")]
    Panicked(Arc<str>),

    /// The executor flagged this key's outcome as an error
    #[error("Key failed: {0}")]
    Key(Arc<E>),

    /// The executor returned the wrong number of outcomes
    #[error("Batch executor returned {actual} outcomes for {expected} keys")]
    ContractViolation { expected: usize, actual: usize },

    /// The batch was dropped before it could settle (runtime shut down)
    #[error("Batch was dropped before it settled")]
    Cancelled,
}

impl<E> Clone for BatchError<E> {
    fn clone(&self) -> Self {
        match self {
            Self::Executor(err) => Self::Executor(Arc::clone(err)),
            Self::Panicked(message) => Self::Panicked(Arc::clone(message)),
            Self::Key(err) => Self::Key(Arc::clone(err)),
            Self::ContractViolation { expected, actual } => Self::ContractViolation {
                expected: *expected,
                actual: *actual,
            },
            Self::Cancelled => Self::Cancelled,
        }
    }
}
