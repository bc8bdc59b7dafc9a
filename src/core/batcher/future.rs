//! The future handed back by `enqueue`

use crate::utils::error::BatchError;
use futures::future::{FutureExt, Map, Shared};
use pin_project_lite::pin_project;
use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};
use tokio::sync::oneshot;

/// Outcome a caller observes for one key
pub type Outcome<V, E> = Result<V, BatchError<E>>;

type Received<V, E> = Result<Outcome<V, E>, oneshot::error::RecvError>;
type Settle<V, E> = fn(Received<V, E>) -> Outcome<V, E>;
type SharedOutcome<V, E> = Shared<Map<oneshot::Receiver<Outcome<V, E>>, Settle<V, E>>>;

pin_project! {
    /// Eventual value for an enqueued key.
    ///
    /// Cloning is cheap and every clone observes the same outcome, which is
    /// how duplicate keys in one batch share a single result. Dropping it
    /// has no effect on the batch.
    #[must_use = "futures do nothing unless polled"]
    pub struct Enqueued<V, E> {
        #[pin]
        inner: SharedOutcome<V, E>,
    }
}

impl<V, E> Clone for Enqueued<V, E> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl<V, E> std::fmt::Debug for Enqueued<V, E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Enqueued").finish_non_exhaustive()
    }
}

impl<V: Clone, E> Future for Enqueued<V, E> {
    type Output = Outcome<V, E>;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        self.project().inner.poll(cx)
    }
}

/// Sending half of an [`Enqueued`] future; settles it exactly once
pub(crate) struct Settler<V, E> {
    tx: oneshot::Sender<Outcome<V, E>>,
}

impl<V, E> Settler<V, E> {
    pub(crate) fn resolve(self, value: V) {
        self.settle(Ok(value));
    }

    pub(crate) fn reject(self, error: BatchError<E>) {
        self.settle(Err(error));
    }

    fn settle(self, outcome: Outcome<V, E>) {
        // Every caller holding the future may have dropped it already
        let _ = self.tx.send(outcome);
    }
}

/// Create a pending future together with the handle that settles it
pub(crate) fn pending<V: Clone, E>() -> (Settler<V, E>, Enqueued<V, E>) {
    let (tx, rx) = oneshot::channel();
    let settle: Settle<V, E> = settle_received::<V, E>;
    let enqueued = Enqueued {
        inner: rx.map(settle).shared(),
    };
    (Settler { tx }, enqueued)
}

fn settle_received<V, E>(received: Received<V, E>) -> Outcome<V, E> {
    received.unwrap_or(Err(BatchError::Cancelled))
}
