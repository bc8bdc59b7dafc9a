//! Common test utilities for coalesce-rs
//!
//! - Recording executors that answer `<key>-index-<i>`
//! - Custom assertions on batch outcomes

pub mod assertions;
pub mod fixtures;

pub use fixtures::{FixtureError, RecordingExecutor, recording_batcher};

/// Assert that a result is Ok and return the value
#[macro_export]
macro_rules! assert_ok {
    ($expr:expr) => {
        match $expr {
            Ok(v) => v,
            Err(e) => panic!("Expected Ok, got Err: {:?}", e),
        }
    };
}

/// Assert that a result is Err and return the error
#[macro_export]
macro_rules! assert_err {
    ($expr:expr) => {
        match $expr {
            Ok(v) => panic!("Expected Err, got Ok: {:?}", v),
            Err(e) => e,
        }
    };
}
