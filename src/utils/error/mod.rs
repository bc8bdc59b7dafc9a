//! Error handling for the batcher
//!
//! Two layers of errors live here: [`BatchError`], which is what an enqueued
//! future settles with when its batch fails, and [`CoalesceError`], the crate
//! error for configuration, registry and setup failures.

mod helpers;
mod types;


pub use types::{BatchError, CoalesceError, Result};
