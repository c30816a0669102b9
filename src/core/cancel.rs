//! Cancelable handles attached to running executions.

/// Handle the engine exposes to stop a running execution.
///
/// Cancellation is cooperative: the handle is signalled, the execution may
/// keep running for a while.
pub trait CancelHandle: Send + Sync {
    /// Signal the execution to stop.
    fn cancel(&self);
}

impl CancelHandle for tokio::task::AbortHandle {
    fn cancel(&self) {
        self.abort();
    }
}
