//! One accumulation window of unique keys

use super::future::{Enqueued, Settler, pending};
use std::collections::HashMap;
use std::hash::Hash;

/// A key waiting for its batch to be dispatched
pub(crate) struct Waiter<K, V, E> {
    pub(crate) key: K,
    pub(crate) settler: Settler<V, E>,
}

/// Accumulator for one batching window.
///
/// `waiters` holds exactly one entry per unique key in first-seen order and
/// is what the executor receives; `unique` lets repeated keys share the
/// future created for the first occurrence.
pub(crate) struct Batch<K, V, E> {
    id: u64,
    open: bool,
    unique: HashMap<K, Enqueued<V, E>>,
    waiters: Vec<Waiter<K, V, E>>,
}

impl<K, V, E> Batch<K, V, E>
where
    K: Hash + Eq + Clone,
    V: Clone,
{
    pub(crate) fn new(id: u64) -> Self {
        Self {
            id,
            open: true,
            unique: HashMap::new(),
            waiters: Vec::new(),
        }
    }

    pub(crate) fn id(&self) -> u64 {
        self.id
    }

    pub(crate) fn is_open(&self) -> bool {
        self.open
    }

    /// Number of unique keys queued
    pub(crate) fn len(&self) -> usize {
        self.waiters.len()
    }

    pub(crate) fn contains(&self, key: &K) -> bool {
        self.unique.contains_key(key)
    }

    /// Queue `key`, or join the future already queued for it
    pub(crate) fn append(&mut self, key: K) -> Enqueued<V, E> {
        if let Some(existing) = self.unique.get(&key) {
            return existing.clone();
        }

        let (settler, enqueued) = pending();
        self.unique.insert(key.clone(), enqueued.clone());
        self.waiters.push(Waiter { key, settler });
        enqueued
    }

    /// Stop accepting keys and hand over the waiters for dispatch.
    ///
    /// Only the first call returns waiters.
    pub(crate) fn close(&mut self) -> Vec<Waiter<K, V, E>> {
        self.open = false;
        self.unique.clear();
        std::mem::take(&mut self.waiters)
    }
}
