//! Helper functions for creating and inspecting errors

use super::types::{BatchError, CoalesceError};
use std::sync::Arc;

/// Helper functions for creating specific errors
impl CoalesceError {
    pub fn config<S: Into<String>>(message: S) -> Self {
        Self::Config(message.into())
    }

    pub fn validation<S: Into<String>>(message: S) -> Self {
        Self::Validation(message.into())
    }

    pub fn registry<S: Into<String>>(message: S) -> Self {
        Self::Registry(message.into())
    }
}

impl<E> BatchError<E> {
    /// The executor's own error, if this failure carries one
    pub fn source_error(&self) -> Option<&E> {
        match self {
            Self::Executor(err) | Self::Key(err) => Some(err.as_ref()),
            _ => None,
        }
    }

    /// Whether the whole batch failed rather than this key alone
    pub fn is_batch_failure(&self) -> bool {
        !matches!(self, Self::Key(_))
    }

    /// Whether two errors are the same shared instance.
    ///
    /// Failures fanned out from one executor call point at the same
    /// allocation.
    pub fn same_instance(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Executor(a), Self::Executor(b)) | (Self::Key(a), Self::Key(b)) => {
                Arc::ptr_eq(a, b)
            }
            (Self::Panicked(a), Self::Panicked(b)) => Arc::ptr_eq(a, b),
            _ => false,
        }
    }

    /// Build a panic error from a caught panic payload
    pub(crate) fn from_panic(payload: Box<dyn std::any::Any + Send>) -> Self {
        let message = if let Some(message) = payload.downcast_ref::<&str>() {
            (*message).to_string()
        } else if let Some(message) = payload.downcast_ref::<String>() {
            message.clone()
        } else {
            "unknown panic payload".to_string()
        };
        Self::Panicked(Arc::from(message))
    }
}
