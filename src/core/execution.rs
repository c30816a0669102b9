//! Execution domain types shared by the registry and its collaborators.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

/// Opaque execution identifier, assigned by the repository for new executions.
pub type JobId = String;

/// Payload delivered to a caller waiting on a request/response style submission.
pub type ResponsePayload = Value;

/// How an execution was triggered. Only used as a throttling dimension.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubmissionMode {
    /// Started from the command line.
    Cli,
    /// Error workflow triggered by another failed execution.
    Error,
    /// Integrated sub-execution.
    Integrated,
    /// Internal system execution.
    Internal,
    /// Started manually by a user.
    Manual,
    /// Retry of a previous execution.
    Retry,
    /// Started by a trigger.
    Trigger,
    /// Started by an incoming webhook.
    Webhook,
}

impl SubmissionMode {
    /// Production modes are the only ones subject to concurrency throttling.
    #[must_use]
    pub const fn is_production(self) -> bool {
        matches!(self, Self::Trigger | Self::Webhook)
    }
}

/// Lifecycle status of an execution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExecutionStatus {
    /// Persisted but not yet admitted.
    New,
    /// Admitted and running.
    Running,
    /// Finished successfully.
    Success,
    /// Finished with an error.
    Error,
    /// Cancelled before finishing.
    Canceled,
    /// The process running it died.
    Crashed,
    /// Paused until a later resume.
    Waiting,
}

impl ExecutionStatus {
    /// Terminal statuses never transition again.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(
            self,
            Self::Success | Self::Error | Self::Canceled | Self::Crashed
        )
    }
}

/// Submission request carried by an active execution.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExecutionRequest {
    /// Submission mode.
    pub mode: SubmissionMode,
    /// Workflow the execution belongs to, if persisted.
    pub workflow_id: Option<String>,
    /// Execution this one retries, if any.
    pub retry_of: Option<JobId>,
    /// Workflow definition handed to the engine.
    pub workflow: Value,
    /// Execution data (input, resume state).
    pub data: Value,
}

impl ExecutionRequest {
    /// Create a request for the given mode and workflow definition.
    #[must_use]
    pub fn new(mode: SubmissionMode, workflow: Value) -> Self {
        Self {
            mode,
            workflow_id: None,
            retry_of: None,
            workflow,
            data: Value::Null,
        }
    }

    /// Set the workflow id.
    #[must_use]
    pub fn with_workflow_id(mut self, workflow_id: impl Into<String>) -> Self {
        self.workflow_id = Some(workflow_id.into());
        self
    }

    /// Mark this request as a retry of another execution.
    #[must_use]
    pub fn with_retry_of(mut self, retry_of: impl Into<JobId>) -> Self {
        self.retry_of = Some(retry_of.into());
        self
    }

    /// Set the execution data.
    #[must_use]
    pub fn with_data(mut self, data: Value) -> Self {
        self.data = data;
        self
    }
}

/// Error reported by the engine when an execution fails.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
#[error("{message}")]
pub struct ExecutionFailure {
    /// Human readable message.
    pub message: String,
    /// Optional extra context such as a stack trace.
    pub details: Option<String>,
}

impl ExecutionFailure {
    /// Failure with a message only.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            details: None,
        }
    }
}

/// Final result of an execution, handed to every completion waiter.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunResult {
    /// Submission mode of the execution.
    pub mode: SubmissionMode,
    /// Final status.
    pub status: ExecutionStatus,
    /// Whether the execution finished successfully.
    pub finished: bool,
    /// Start time (ms since epoch).
    pub started_at_ms: u128,
    /// Stop time (ms since epoch).
    pub stopped_at_ms: Option<u128>,
    /// Result data produced by the engine.
    pub data: Value,
    /// Failure, when the execution did not succeed.
    pub error: Option<ExecutionFailure>,
}

impl RunResult {
    /// Successful run stopped now.
    #[must_use]
    pub fn success(mode: SubmissionMode, started_at_ms: u128, data: Value) -> Self {
        Self {
            mode,
            status: ExecutionStatus::Success,
            finished: true,
            started_at_ms,
            stopped_at_ms: Some(crate::util::clock::now_ms()),
            data,
            error: None,
        }
    }

    /// Failed run stopped now.
    #[must_use]
    pub fn failed(mode: SubmissionMode, started_at_ms: u128, failure: ExecutionFailure) -> Self {
        Self {
            mode,
            status: ExecutionStatus::Error,
            finished: false,
            started_at_ms,
            stopped_at_ms: Some(crate::util::clock::now_ms()),
            data: Value::Null,
            error: Some(failure),
        }
    }
}

/// Read-only view of an active execution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecutionSummary {
    /// Execution id.
    pub id: JobId,
    /// Execution this one retries, if any.
    pub retry_of: Option<JobId>,
    /// When the execution became active (ms since epoch).
    pub started_at_ms: u128,
    /// Submission mode.
    pub mode: SubmissionMode,
    /// Workflow id, if any.
    pub workflow_id: Option<String>,
    /// Current status.
    pub status: ExecutionStatus,
}
