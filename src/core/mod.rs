//! Core execution tracking: admission, registry, draining and failure handling.

pub mod admission;
pub mod cancel;
pub mod concurrency;
pub mod drain;
pub mod error;
pub mod execution;
pub mod hooks;
pub mod registry;
pub mod repository;
pub mod stalled;
pub mod waiter;

pub use admission::AdmissionController;
pub use cancel::CancelHandle;
pub use concurrency::ConcurrencyControl;
pub use drain::{DrainReport, ShutdownDrainer};
pub use error::{AdmissionError, AppResult, ExecutionError};
pub use execution::{
    ExecutionFailure, ExecutionRequest, ExecutionStatus, ExecutionSummary, JobId,
    ResponsePayload, RunResult, SubmissionMode,
};
pub use hooks::CompletionHooks;
pub use registry::{CompletionFuture, ExecutionRegistry};
pub use repository::{ExecutionRecord, ExecutionRepository, ExecutionUpdate, NewExecution};
pub use stalled::{FailureOutcome, StalledJobGuard};
pub use waiter::{deferred, Deferred, Pending};
