//! Persistence collaborator contract.
//!
//! Durability is delegated entirely to an implementation of
//! [`ExecutionRepository`]; the registry only needs to create records for new
//! executions, update records it resumes, and read back the finished flag.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::core::{ExecutionError, ExecutionStatus, JobId, SubmissionMode};

/// Persisted execution record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExecutionRecord {
    /// Execution id.
    pub id: JobId,
    /// Persisted status.
    pub status: ExecutionStatus,
    /// Whether the execution finished successfully.
    pub finished: bool,
    /// Submission mode.
    pub mode: SubmissionMode,
    /// Start time (ms since epoch).
    pub started_at_ms: u128,
    /// Stop time (ms since epoch).
    pub stopped_at_ms: Option<u128>,
    /// Execution this one retries, if any.
    pub retry_of: Option<JobId>,
    /// Workflow id, if any.
    pub workflow_id: Option<String>,
    /// Deferred-resume time (ms since epoch) for waiting executions.
    pub wait_till_ms: Option<u128>,
    /// Workflow definition.
    pub workflow: Value,
    /// Execution data.
    pub data: Value,
}

/// Record for a brand-new execution; the repository assigns the id.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewExecution {
    /// Initial status, always `new` when created by the registry.
    pub status: ExecutionStatus,
    /// Always `false` on creation.
    pub finished: bool,
    /// Submission mode.
    pub mode: SubmissionMode,
    /// Start time (ms since epoch).
    pub started_at_ms: u128,
    /// Execution this one retries, if any.
    pub retry_of: Option<JobId>,
    /// Workflow id, if any.
    pub workflow_id: Option<String>,
    /// Workflow definition.
    pub workflow: Value,
    /// Execution data.
    pub data: Value,
}

/// Partial update applied when an existing execution is resumed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExecutionUpdate {
    /// New status.
    pub status: ExecutionStatus,
    /// Replacement execution data.
    pub data: Value,
    /// Deferred-resume time; `None` clears it.
    pub wait_till_ms: Option<u128>,
}

/// Durable storage of execution records.
#[async_trait]
pub trait ExecutionRepository: Send + Sync {
    /// Persist a new execution and return its id.
    async fn create_new_execution(&self, record: NewExecution) -> Result<JobId, ExecutionError>;

    /// Apply `update` to an existing execution.
    async fn update_existing_execution(
        &self,
        id: &JobId,
        update: ExecutionUpdate,
    ) -> Result<(), ExecutionError>;

    /// Read back a persisted record, if any.
    async fn get_record(&self, id: &JobId) -> Result<Option<ExecutionRecord>, ExecutionError>;
}
