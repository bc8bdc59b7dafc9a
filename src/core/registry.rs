//! Per-instance, per-method batchers
//!
//! [`MethodBatchers`] lets a bulk method (one that takes many keys) be called
//! one key at a time: calls made on the same instance and method are
//! transparently batched, while distinct instances never share a batcher.
//!
//! The registry is a side-table keyed by the instance's `Arc` allocation and
//! the method name. It only holds [`Weak`] references, so registering a
//! batcher never keeps an instance alive.

use super::batcher::{BatchExecutor, BatchOutcomes, Batcher, Enqueued};
use crate::config::BatcherConfig;
use crate::utils::error::{CoalesceError, Result};
use async_trait::async_trait;
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use futures::future::BoxFuture;
use std::any::Any;
use std::future::Future;
use std::hash::Hash;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Weak};
use thiserror::Error;
use tracing::debug;

/// Error produced by a batched method call
#[derive(Error, Debug)]
pub enum MethodError<E> {
    /// The bulk method itself failed
    #[error("{0}")]
    Method(E),

    /// The instance was dropped before its batch was dispatched
    #[error("Instance was dropped before its batch was dispatched")]
    InstanceDropped,
}

type BulkMethod<I, K, V, E> =
    dyn Fn(Arc<I>, Vec<K>) -> BoxFuture<'static, std::result::Result<Vec<V>, E>> + Send + Sync;

/// Executor that calls a bulk method on one instance
pub struct MethodExecutor<I, K, V, E> {
    instance: Weak<I>,
    method: Arc<BulkMethod<I, K, V, E>>,
}

#[async_trait]
impl<I, K, V, E> BatchExecutor<K, V> for MethodExecutor<I, K, V, E>
where
    I: Send + Sync + 'static,
    K: Send + 'static,
    V: Send + 'static,
    E: Send + Sync + 'static,
{
    type Error = MethodError<E>;

    async fn execute(&self, keys: Vec<K>) -> BatchOutcomes<V, MethodError<E>> {
        let instance = self.instance.upgrade().ok_or(MethodError::InstanceDropped)?;
        let values = (self.method)(instance, keys)
            .await
            .map_err(MethodError::Method)?;
        Ok(values.into_iter().map(Ok).collect())
    }
}

/// Batcher type created for a registered method
pub type MethodBatcher<I, K, V, E> = Batcher<K, V, MethodExecutor<I, K, V, E>>;

struct RegistryEntry<I> {
    instance: Weak<I>,
    batcher: Arc<dyn Any + Send + Sync>,
}

/// Entry count below which dead entries are left for the next sweep
const MIN_SWEEP_THRESHOLD: usize = 32;

/// Lazily created batchers, one per `(instance, method)` pair.
///
/// Entries of dropped instances are swept automatically whenever the table
/// has doubled since the last sweep, so it stays within twice the live
/// entries (or [`MIN_SWEEP_THRESHOLD`]).
pub struct MethodBatchers<I> {
    entries: DashMap<(usize, &'static str), RegistryEntry<I>>,
    sweep_at: AtomicUsize,
}

impl<I> Default for MethodBatchers<I> {
    fn default() -> Self {
        Self {
            entries: DashMap::new(),
            sweep_at: AtomicUsize::new(MIN_SWEEP_THRESHOLD),
        }
    }
}

impl<I> std::fmt::Debug for MethodBatchers<I> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MethodBatchers")
            .field("entries", &self.entries.len())
            .finish()
    }
}

impl<I> MethodBatchers<I>
where
    I: Send + Sync + 'static,
{
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the batcher for `instance.method`, creating it on first use.
    ///
    /// `config` and `method` are only used when the batcher is created.
    /// Asking for an existing pair with different key, value or error types
    /// is an error.
    pub fn get_or_create<K, V, E, F, Fut>(
        &self,
        instance: &Arc<I>,
        method: &'static str,
        config: &BatcherConfig,
        bulk: F,
    ) -> Result<MethodBatcher<I, K, V, E>>
    where
        K: Hash + Eq + Clone + Send + 'static,
        V: Clone + Send + Sync + 'static,
        E: std::fmt::Display + Send + Sync + 'static,
        F: Fn(Arc<I>, Vec<K>) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = std::result::Result<Vec<V>, E>> + Send + 'static,
    {
        let id = (instance_id(instance), method);

        let created = match self.entries.entry(id) {
            Entry::Occupied(mut occupied) => {
                let alive = occupied
                    .get()
                    .instance
                    .upgrade()
                    .is_some_and(|existing| Arc::ptr_eq(&existing, instance));

                if alive {
                    return occupied
                        .get()
                        .batcher
                        .downcast_ref::<MethodBatcher<I, K, V, E>>()
                        .cloned()
                        .ok_or_else(|| {
                            CoalesceError::registry(format!(
                                "method `{}` is already registered with different types",
                                method
                            ))
                        });
                }

                // Allocation address reused by a new instance
                let batcher = Self::build(instance, method, config, bulk);
                occupied.insert(Self::entry(instance, &batcher));
                Ok(batcher)
            }
            Entry::Vacant(vacant) => {
                let batcher = Self::build(instance, method, config, bulk);
                vacant.insert(Self::entry(instance, &batcher));
                Ok(batcher)
            }
        };

        // The entry's shard lock is released here
        self.sweep_if_grown();
        created
    }

    /// Enqueue `key` on `instance.method`
    pub fn enqueue<K, V, E, F, Fut>(
        &self,
        instance: &Arc<I>,
        method: &'static str,
        config: &BatcherConfig,
        bulk: F,
        key: K,
    ) -> Result<Enqueued<V, MethodError<E>>>
    where
        K: Hash + Eq + Clone + Send + 'static,
        V: Clone + Send + Sync + 'static,
        E: std::fmt::Display + Send + Sync + 'static,
        F: Fn(Arc<I>, Vec<K>) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = std::result::Result<Vec<V>, E>> + Send + 'static,
    {
        let batcher = self.get_or_create(instance, method, config, bulk)?;
        Ok(batcher.enqueue(key))
    }

    /// Drop batchers whose instance no longer exists; returns how many
    pub fn prune(&self) -> usize {
        let before = self.entries.len();
        self.entries.retain(|_, entry| entry.instance.strong_count() > 0);
        let pruned = before.saturating_sub(self.entries.len());
        if pruned > 0 {
            debug!(pruned, "Pruned batchers of dropped instances");
        }
        pruned
    }

    fn sweep_if_grown(&self) {
        if self.entries.len() < self.sweep_at.load(Ordering::Relaxed) {
            return;
        }
        self.prune();
        let next = (self.entries.len() * 2).max(MIN_SWEEP_THRESHOLD);
        self.sweep_at.store(next, Ordering::Relaxed);
    }

    /// Number of registered batchers
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn build<K, V, E, F, Fut>(
        instance: &Arc<I>,
        method: &'static str,
        config: &BatcherConfig,
        bulk: F,
    ) -> MethodBatcher<I, K, V, E>
    where
        K: Hash + Eq + Clone + Send + 'static,
        V: Clone + Send + Sync + 'static,
        E: std::fmt::Display + Send + Sync + 'static,
        F: Fn(Arc<I>, Vec<K>) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = std::result::Result<Vec<V>, E>> + Send + 'static,
    {
        debug!(method, "Creating method batcher");

        let method: Arc<BulkMethod<I, K, V, E>> = Arc::new(move |instance: Arc<I>, keys: Vec<K>| {
            let call: BoxFuture<'static, std::result::Result<Vec<V>, E>> =
                Box::pin(bulk(instance, keys));
            call
        });
        let executor = MethodExecutor {
            instance: Arc::downgrade(instance),
            method,
        };
        Batcher::with_config(executor, config.clone())
    }

    fn entry<K, V, E>(instance: &Arc<I>, batcher: &MethodBatcher<I, K, V, E>) -> RegistryEntry<I>
    where
        K: Hash + Eq + Clone + Send + 'static,
        V: Clone + Send + Sync + 'static,
        E: std::fmt::Display + Send + Sync + 'static,
    {
        RegistryEntry {
            instance: Arc::downgrade(instance),
            batcher: Arc::new(batcher.clone()),
        }
    }
}

fn instance_id<I>(instance: &Arc<I>) -> usize {
    Arc::as_ptr(instance) as *const () as usize
}
