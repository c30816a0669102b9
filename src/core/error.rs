//! Error types for execution tracking operations.

use thiserror::Error;

use crate::core::execution::JobId;

/// Failures surfaced by an admission controller while acquiring a slot.
#[derive(Debug, Error)]
pub enum AdmissionError {
    /// The caller was waiting for a slot and got evicted from the queue.
    #[error("execution {0} was evicted while waiting for a slot")]
    Evicted(JobId),
    /// Backend-specific failure with context.
    #[error("admission backend error: {0}")]
    Backend(String),
}

/// Errors produced by the execution registry and its collaborators.
#[derive(Debug, Error)]
pub enum ExecutionError {
    /// No active execution is tracked under this id.
    #[error("no active execution found: {0}")]
    NotFound(JobId),
    /// The execution was cancelled before it produced a result.
    #[error("execution {0} was cancelled")]
    Cancelled(JobId),
    /// Admission failed; the submission was aborted before it became active.
    #[error(transparent)]
    Admission(#[from] AdmissionError),
    /// Persistence collaborator failure with context.
    #[error("persistence error: {0}")]
    Persistence(String),
    /// The waiter was dropped without being resolved or rejected.
    #[error("completion waiter closed without a result")]
    WaiterClosed,
    /// Configuration failed validation.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

impl ExecutionError {
    /// Whether this error reports an explicit cancellation.
    #[must_use]
    pub const fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled(_))
    }
}

/// Application-facing result using anyhow for higher-level contexts.
pub type AppResult<T> = Result<T, anyhow::Error>;
