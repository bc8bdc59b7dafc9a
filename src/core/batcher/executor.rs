//! The bulk operation a batcher drives
//!
//! An executor receives the ordered, deduplicated keys of one batch and must
//! return exactly one outcome per key, in the same order. Returning `Err`
//! fails the whole batch; an `Err` inside the vector fails that key only.
//! A panic, whether raised while building the future or while it runs, is
//! handled like a whole-batch `Err`.

use async_trait::async_trait;
use std::future::Future;

/// Outcomes for one batch, index-aligned with the keys it received
pub type BatchOutcomes<V, E> = Result<Vec<Result<V, E>>, E>;

/// Bulk operation invoked once per batch
#[async_trait]
pub trait BatchExecutor<K, V>: Send + Sync + 'static
where
    K: Send + 'static,
    V: Send + 'static,
{
    /// Error type for both whole-batch and per-key failures
    type Error: Send + Sync + 'static;

    /// Execute one batch of unique keys
    async fn execute(&self, keys: Vec<K>) -> BatchOutcomes<V, Self::Error>;
}

/// Executor backed by an async closure
pub struct FnExecutor<F> {
    f: F,
}

impl<F> std::fmt::Debug for FnExecutor<F> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FnExecutor").finish_non_exhaustive()
    }
}

/// Wrap an async closure as a [`BatchExecutor`]
///
/// # Example
/// ```rust,ignore
/// use coalesce_rs::{Batcher, executor_fn};
///
/// let batcher = Batcher::new(executor_fn(|ids: Vec<u64>| async move {
///     let users = db.load_users(&ids).await?;
///     Ok(users.into_iter().map(Ok).collect())
/// }));
///
/// let user = batcher.enqueue(42).await?;
/// ```
pub fn executor_fn<F>(f: F) -> FnExecutor<F> {
    FnExecutor { f }
}

#[async_trait]
impl<K, V, E, F, Fut> BatchExecutor<K, V> for FnExecutor<F>
where
    K: Send + 'static,
    V: Send + 'static,
    E: Send + Sync + 'static,
    F: Fn(Vec<K>) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = BatchOutcomes<V, E>> + Send,
{
    type Error = E;

    async fn execute(&self, keys: Vec<K>) -> BatchOutcomes<V, E> {
        (self.f)(keys).await
    }
}
