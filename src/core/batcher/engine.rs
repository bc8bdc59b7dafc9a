//! Batcher engine: routes keys into batches and dispatches them

use super::batch::{Batch, Waiter};
use super::executor::{BatchExecutor, BatchOutcomes};
use super::future::{Enqueued, Settler};
use super::schedule::DispatchSchedule;
use super::stats::{BatcherStats, StatsRecorder};
use crate::config::{BatcherConfig, Validate};
use crate::utils::error::{BatchError, CoalesceError, Result};
use futures::FutureExt;
use parking_lot::Mutex;
use std::hash::Hash;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::{debug, error, trace, warn};

type SharedBatch<K, V, E> = Arc<Mutex<Batch<K, V, E>>>;

/// Coalesces individually enqueued keys into batched executor calls.
///
/// Keys enqueued during the same window share one executor call, and a key
/// enqueued more than once before its batch is dispatched is executed only
/// once. The handle is cheap to clone; clones feed the same batches.
///
/// Enqueueing spawns the dispatch task with [`tokio::spawn`], so it must
/// happen inside a tokio runtime.
pub struct Batcher<K, V, X>
where
    K: Send + 'static,
    V: Send + 'static,
    X: BatchExecutor<K, V>,
{
    inner: Arc<Inner<K, V, X>>,
}

struct Inner<K, V, X>
where
    K: Send + 'static,
    V: Send + 'static,
    X: BatchExecutor<K, V>,
{
    executor: X,
    config: BatcherConfig,
    schedule: DispatchSchedule,
    /// Batch currently accepting keys
    current: Mutex<Option<SharedBatch<K, V, X::Error>>>,
    next_batch_id: AtomicU64,
    stats: StatsRecorder,
}

impl<K, V, X> Clone for Batcher<K, V, X>
where
    K: Send + 'static,
    V: Send + 'static,
    X: BatchExecutor<K, V>,
{
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<K, V, X> std::fmt::Debug for Batcher<K, V, X>
where
    K: Send + 'static,
    V: Send + 'static,
    X: BatchExecutor<K, V>,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Batcher")
            .field("config", &self.inner.config)
            .field("stats", &self.inner.stats.snapshot())
            .finish_non_exhaustive()
    }
}

impl<K, V, X> Batcher<K, V, X>
where
    K: Hash + Eq + Clone + Send + 'static,
    V: Clone + Send + Sync + 'static,
    X: BatchExecutor<K, V>,
    X::Error: std::fmt::Display,
{
    /// Create a batcher with the default options
    pub fn new(executor: X) -> Self {
        Self::with_config(executor, BatcherConfig::default())
    }

    /// Create a batcher with the given options.
    ///
    /// A zero `max_batch_size` is raised to 1.
    pub fn with_config(executor: X, mut config: BatcherConfig) -> Self {
        config.max_batch_size = config.max_batch_size.max(1);
        let schedule = DispatchSchedule::from_config(&config);

        Self {
            inner: Arc::new(Inner {
                executor,
                config,
                schedule,
                current: Mutex::new(None),
                next_batch_id: AtomicU64::new(1),
                stats: StatsRecorder::default(),
            }),
        }
    }

    /// Create a batcher, rejecting invalid options instead of adjusting them
    pub fn try_with_config(executor: X, config: BatcherConfig) -> Result<Self> {
        config.validate().map_err(CoalesceError::Validation)?;
        Ok(Self::with_config(executor, config))
    }

    /// Options in effect
    pub fn config(&self) -> &BatcherConfig {
        &self.inner.config
    }

    /// The executor this batcher drives
    pub fn executor(&self) -> &X {
        &self.inner.executor
    }

    /// Snapshot of this batcher's counters
    pub fn stats(&self) -> BatcherStats {
        self.inner.stats.snapshot()
    }

    /// Queue `key` for the next executor call.
    ///
    /// Returns immediately; the future settles once the batch holding the
    /// key has been executed.
    pub fn enqueue(&self, key: K) -> Enqueued<V, X::Error> {
        let mut current = self.inner.current.lock();

        if let Some(batch) = current.as_ref() {
            let mut batch = batch.lock();
            if batch.is_open() && batch.len() < self.inner.config.max_batch_size {
                let deduplicated = batch.contains(&key);
                self.inner.stats.record_enqueue(deduplicated);
                trace!(batch_id = batch.id(), deduplicated, "Key joined current batch");
                return batch.append(key);
            }
        }

        let batch = self.start_batch();
        let enqueued = batch.lock().append(key);
        self.inner.stats.record_enqueue(false);
        *current = Some(batch);
        enqueued
    }

    /// Create a batch and schedule its one and only dispatch
    fn start_batch(&self) -> SharedBatch<K, V, X::Error> {
        let id = self.inner.next_batch_id.fetch_add(1, Ordering::Relaxed);
        let batch = Arc::new(Mutex::new(Batch::new(id)));
        let trigger = self.inner.schedule.arm();

        debug!(batch_id = id, schedule = ?self.inner.schedule, "Started new batch");

        let inner = Arc::clone(&self.inner);
        let guard = CloseOnDrop(Arc::clone(&batch));
        tokio::spawn(async move {
            trigger.fire().await;
            inner.dispatch(&guard.0).await;
        });

        batch
    }
}

/// Closes a batch when its dispatch task goes away.
///
/// If the task is dropped before dispatching (runtime shut down), the
/// waiters' settlers are dropped so their futures resolve to
/// [`BatchError::Cancelled`], and the batch stops accepting keys.
struct CloseOnDrop<K, V, E>(SharedBatch<K, V, E>)
where
    K: Hash + Eq + Clone,
    V: Clone;

impl<K, V, E> Drop for CloseOnDrop<K, V, E>
where
    K: Hash + Eq + Clone,
    V: Clone,
{
    fn drop(&mut self) {
        let abandoned = self.0.lock().close();
        if !abandoned.is_empty() {
            warn!(
                keys = abandoned.len(),
                "Dispatch task dropped before its batch ran; cancelling keys"
            );
        }
    }
}

impl<K, V, X> Inner<K, V, X>
where
    K: Hash + Eq + Clone + Send + 'static,
    V: Clone + Send + Sync + 'static,
    X: BatchExecutor<K, V>,
    X::Error: std::fmt::Display,
{
    /// Close `batch`, run the executor and settle every waiter
    async fn dispatch(&self, batch: &SharedBatch<K, V, X::Error>) {
        let (batch_id, waiters) = {
            let mut current = self.current.lock();
            if current.as_ref().is_some_and(|c| Arc::ptr_eq(c, batch)) {
                *current = None;
            }
            let mut batch = batch.lock();
            (batch.id(), batch.close())
        };

        if waiters.is_empty() {
            return;
        }

        let (keys, settlers): (Vec<K>, Vec<Settler<V, X::Error>>) = waiters
            .into_iter()
            .map(|Waiter { key, settler }| (key, settler))
            .unzip();

        debug!(batch_id, keys = keys.len(), "Dispatching batch");
        self.stats.record_dispatch(keys.len());

        match self.run_executor(keys).await {
            Ok(outcomes) if outcomes.len() == settlers.len() => {
                for (settler, outcome) in settlers.into_iter().zip(outcomes) {
                    match outcome {
                        Ok(value) => settler.resolve(value),
                        Err(err) => {
                            self.stats.record_key_failure();
                            settler.reject(BatchError::Key(Arc::new(err)));
                        }
                    }
                }
            }
            Ok(outcomes) => {
                warn!(
                    batch_id,
                    expected = settlers.len(),
                    actual = outcomes.len(),
                    "Batch executor returned the wrong number of outcomes"
                );
                let err = BatchError::ContractViolation {
                    expected: settlers.len(),
                    actual: outcomes.len(),
                };
                self.reject_all(settlers, err);
            }
            Err(err) => {
                error!(batch_id, error = %err, "Batch executor failed");
                self.reject_all(settlers, err);
            }
        }
    }

    async fn run_executor(
        &self,
        keys: Vec<K>,
    ) -> std::result::Result<Vec<std::result::Result<V, X::Error>>, BatchError<X::Error>> {
        // A panic while building the future counts the same as one while polling it
        let call = std::panic::catch_unwind(AssertUnwindSafe(|| self.executor.execute(keys)))
            .map_err(BatchError::from_panic)?;

        let outcomes: BatchOutcomes<V, X::Error> = AssertUnwindSafe(call)
            .catch_unwind()
            .await
            .map_err(BatchError::from_panic)?;

        outcomes.map_err(|err| BatchError::Executor(Arc::new(err)))
    }

    fn reject_all(&self, settlers: Vec<Settler<V, X::Error>>, err: BatchError<X::Error>) {
        self.stats.record_batch_failure();
        for settler in settlers {
            settler.reject(err.clone());
        }
    }
}
