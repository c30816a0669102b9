//! Admission control contract consumed by the registry.

use async_trait::async_trait;

use crate::core::{AdmissionError, ExecutionSummary, JobId, SubmissionMode};

/// Governs how many executions of a given mode may be active at once.
///
/// The slot pool is only ever mutated through this trait. The registry
/// acquires before an execution becomes active and releases exactly once
/// when it stops being tracked.
#[async_trait]
pub trait AdmissionController: Send + Sync {
    /// Obtain a slot for `id`, suspending until one is free. Exempt modes
    /// and disabled controllers grant immediately.
    async fn acquire(&self, mode: SubmissionMode, id: &JobId) -> Result<(), AdmissionError>;

    /// Return one slot to the pool. No-op once [`disable`](Self::disable)
    /// has been called.
    fn release(&self, mode: SubmissionMode);

    /// Stop `release` from making capacity available again.
    fn disable(&self);

    /// Release capacity for a whole batch at once, evicting anything still
    /// waiting for a slot.
    fn force_release_all(&self, executions: &[ExecutionSummary]);
}
