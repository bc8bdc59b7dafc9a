//! Request coalescing
//!
//! Callers enqueue keys one at a time; keys arriving in the same window are
//! collected into a [`Batcher`]'s current batch, deduplicated, and handed to
//! a [`BatchExecutor`] in a single call. Each caller's [`Enqueued`] future
//! then settles with the outcome for its key.
//!
//! # Windows
//!
//! - `delay_window_ms == 0`: everything enqueued before the caller yields to
//!   the scheduler lands in one batch.
//! - `delay_window_ms > 0`: a batch stays open for a fixed window measured
//!   from its creation; later keys do not extend it.
//!
//! Either way a batch also closes early once it holds `max_batch_size`
//! unique keys, and the next key starts a fresh batch.
//!
//! On a current-thread runtime "before the caller yields" is exact. On a
//! multi-thread runtime a worker may pick up the dispatch task while the
//! burst is still running; the burst is then split across batches, but no
//! key is ever lost or executed twice.

mod batch;
mod engine;
mod executor;
mod future;
mod schedule;
mod stats;


pub use engine::Batcher;
pub use executor::{BatchExecutor, BatchOutcomes, FnExecutor, executor_fn};
pub use future::{Enqueued, Outcome};
pub use schedule::DispatchSchedule;
pub use stats::BatcherStats;
