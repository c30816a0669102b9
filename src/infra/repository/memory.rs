//! In-memory execution repository.

use std::collections::HashMap;

use async_trait::async_trait;
use parking_lot::RwLock;
use uuid::Uuid;

use crate::core::repository::{ExecutionRecord, ExecutionRepository, ExecutionUpdate, NewExecution};
use crate::core::{ExecutionError, JobId};

/// Simple in-memory repository for development and testing.
#[derive(Default)]
pub struct InMemoryExecutionRepository {
    records: RwLock<HashMap<JobId, ExecutionRecord>>,
}

impl InMemoryExecutionRepository {
    /// Create an empty repository.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Store `record` as-is, replacing any record with the same id.
    pub fn insert(&self, record: ExecutionRecord) {
        self.records.write().insert(record.id.clone(), record);
    }

    /// Copy of the stored record for `id`.
    #[must_use]
    pub fn record(&self, id: &str) -> Option<ExecutionRecord> {
        self.records.read().get(id).cloned()
    }

    /// Number of stored records.
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.read().len()
    }

    /// Whether no record is stored.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.read().is_empty()
    }
}

#[async_trait]
impl ExecutionRepository for InMemoryExecutionRepository {
    async fn create_new_execution(&self, record: NewExecution) -> Result<JobId, ExecutionError> {
        let id = Uuid::new_v4().to_string();
        self.insert(ExecutionRecord {
            id: id.clone(),
            status: record.status,
            finished: record.finished,
            mode: record.mode,
            started_at_ms: record.started_at_ms,
            stopped_at_ms: None,
            retry_of: record.retry_of,
            workflow_id: record.workflow_id,
            wait_till_ms: None,
            workflow: record.workflow,
            data: record.data,
        });
        Ok(id)
    }

    async fn update_existing_execution(
        &self,
        id: &JobId,
        update: ExecutionUpdate,
    ) -> Result<(), ExecutionError> {
        let mut records = self.records.write();
        let record = records
            .get_mut(id)
            .ok_or_else(|| ExecutionError::Persistence(format!("execution {id} not persisted")))?;
        record.status = update.status;
        record.data = update.data;
        record.wait_till_ms = update.wait_till_ms;
        Ok(())
    }

    async fn get_record(&self, id: &JobId) -> Result<Option<ExecutionRecord>, ExecutionError> {
        Ok(self.record(id))
    }
}
