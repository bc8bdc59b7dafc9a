//! # coalesce-rs
//!
//! Async request coalescing: callers enqueue keys one at a time, and keys
//! arriving together are executed in a single deduplicated bulk call.
//!
//! ## Features
//!
//! - **Batching**: keys enqueued in the same window share one executor call
//! - **Deduplication**: a key enqueued twice in a window is executed once
//! - **Size caps**: batches close early at `max_batch_size` unique keys
//! - **Partial failure**: one key's error never fails its siblings
//! - **Per-instance batchers**: batch calls of a bulk method per object
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use coalesce_rs::{Batcher, BatcherConfig, executor_fn};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let batcher = Batcher::with_config(
//!         executor_fn(|ids: Vec<u64>| async move {
//!             // One round trip for the whole batch
//!             let names: Vec<Result<String, std::io::Error>> =
//!                 ids.iter().map(|id| Ok(format!("user-{}", id))).collect();
//!             Ok::<_, std::io::Error>(names)
//!         }),
//!         BatcherConfig::new().with_max_batch_size(50),
//!     );
//!
//!     let (a, b, c) = tokio::join!(batcher.enqueue(1), batcher.enqueue(2), batcher.enqueue(1));
//!     println!("{} {} {}", a?, b?, c?);
//!
//!     Ok(())
//! }
//! ```

#![allow(missing_docs)]
#![warn(clippy::all)]
#![allow(clippy::module_inception)]

pub mod config;
pub mod core;
pub mod utils;

// Re-export main types
pub use crate::config::{BatcherConfig, Validate};
pub use crate::core::{
    BatchExecutor, BatchOutcomes, Batcher, BatcherStats, DispatchSchedule, Enqueued, FnExecutor,
    MethodBatcher, MethodBatchers, MethodError, MethodExecutor, Outcome, executor_fn,
};
pub use crate::utils::error::{BatchError, CoalesceError, Result};
pub use crate::utils::logging::{LogFormat, LoggingConfig, init_logging};

// Version information
/// Current version of the crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
/// Name of the crate
pub const NAME: &str = env!("CARGO_PKG_NAME");
