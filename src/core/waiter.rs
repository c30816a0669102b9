//! One-shot completion waiter.
//!
//! A [`Deferred`] is the producing half, held by the registry; a [`Pending`]
//! is the consuming half, handed to whichever caller wants to block on the
//! outcome. Fan-out to many subscribers is a list of independent pairs, one
//! per subscriber, all settled together.

use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};

use tokio::sync::oneshot;

use crate::core::ExecutionError;

type Outcome<T> = Result<T, ExecutionError>;

/// Producing half of a completion waiter. Settled exactly once.
#[derive(Debug)]
pub struct Deferred<T> {
    tx: oneshot::Sender<Outcome<T>>,
}

/// Consuming half of a completion waiter; a future resolving to the outcome.
#[derive(Debug)]
pub struct Pending<T> {
    rx: oneshot::Receiver<Outcome<T>>,
}

/// Create a connected waiter pair.
#[must_use]
pub fn deferred<T>() -> (Deferred<T>, Pending<T>) {
    let (tx, rx) = oneshot::channel();
    (Deferred { tx }, Pending { rx })
}

impl<T> Deferred<T> {
    /// Fulfill the waiter. A caller that stopped waiting simply misses it.
    pub fn resolve(self, value: T) {
        let _ = self.tx.send(Ok(value));
    }

    /// Fail the waiter with `error`.
    pub fn reject(self, error: ExecutionError) {
        let _ = self.tx.send(Err(error));
    }

    /// Whether the consuming half has been dropped.
    #[must_use]
    pub fn is_abandoned(&self) -> bool {
        self.tx.is_closed()
    }
}

impl<T> Future for Pending<T> {
    type Output = Outcome<T>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        Pin::new(&mut self.rx)
            .poll(cx)
            .map(|received| received.unwrap_or(Err(ExecutionError::WaiterClosed)))
    }
}
