//! Core batching functionality
//!
//! - [`batcher`]: batch accumulation, scheduling, dispatch and fan-out
//! - [`registry`]: lazily created batchers per instance and method

pub mod batcher;
pub mod registry;

pub use batcher::{
    BatchExecutor, BatchOutcomes, Batcher, BatcherStats, DispatchSchedule, Enqueued, FnExecutor,
    Outcome, executor_fn,
};
pub use registry::{MethodBatcher, MethodBatchers, MethodError, MethodExecutor};
