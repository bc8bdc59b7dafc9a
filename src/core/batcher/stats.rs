//! Batcher statistics

use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};

/// Snapshot of a batcher's counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatcherStats {
    /// Calls to `enqueue`
    pub enqueued: u64,
    /// Calls that joined a future already queued for the same key
    pub deduplicated: u64,
    /// Batches handed to the executor
    pub batches_dispatched: u64,
    /// Unique keys handed to the executor
    pub keys_dispatched: u64,
    /// Batches failed as a whole
    pub batch_failures: u64,
    /// Keys failed individually
    pub key_failures: u64,
}

impl BatcherStats {
    /// Average unique keys per dispatched batch
    pub fn average_batch_size(&self) -> f64 {
        if self.batches_dispatched == 0 {
            return 0.0;
        }
        self.keys_dispatched as f64 / self.batches_dispatched as f64
    }
}

#[derive(Debug, Default)]
pub(crate) struct StatsRecorder {
    enqueued: AtomicU64,
    deduplicated: AtomicU64,
    batches_dispatched: AtomicU64,
    keys_dispatched: AtomicU64,
    batch_failures: AtomicU64,
    key_failures: AtomicU64,
}

impl StatsRecorder {
    pub(crate) fn record_enqueue(&self, deduplicated: bool) {
        self.enqueued.fetch_add(1, Ordering::Relaxed);
        if deduplicated {
            self.deduplicated.fetch_add(1, Ordering::Relaxed);
        }
    }

    pub(crate) fn record_dispatch(&self, keys: usize) {
        self.batches_dispatched.fetch_add(1, Ordering::Relaxed);
        self.keys_dispatched.fetch_add(keys as u64, Ordering::Relaxed);
    }

    pub(crate) fn record_batch_failure(&self) {
        self.batch_failures.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_key_failure(&self) {
        self.key_failures.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn snapshot(&self) -> BatcherStats {
        BatcherStats {
            enqueued: self.enqueued.load(Ordering::Relaxed),
            deduplicated: self.deduplicated.load(Ordering::Relaxed),
            batches_dispatched: self.batches_dispatched.load(Ordering::Relaxed),
            keys_dispatched: self.keys_dispatched.load(Ordering::Relaxed),
            batch_failures: self.batch_failures.load(Ordering::Relaxed),
            key_failures: self.key_failures.load(Ordering::Relaxed),
        }
    }
}
