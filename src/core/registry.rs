//! Registry of executions active in this worker.
//!
//! An entry exists exactly while its execution occupies an admission slot.
//! The entry map sits behind one `parking_lot::Mutex`; every operation locks
//! it for a short, non-suspending critical section. Nothing awaits while the
//! lock is held, and entries are re-validated after every suspension point
//! (admission, persistence).
//!
//! Removal, cancellation and forced drain all funnel through
//! [`ExecutionRegistry::take`], which pulls the entry out of the map under
//! the lock. Whichever path takes the entry first settles the waiters and
//! releases the slot; any later call for the same id finds nothing and is a
//! no-op.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::Mutex;
use tracing::{debug, info, warn};

use crate::core::repository::{ExecutionRepository, ExecutionUpdate, NewExecution};
use crate::core::waiter::{deferred, Deferred, Pending};
use crate::core::{
    AdmissionController, CancelHandle, ExecutionError, ExecutionRequest, ExecutionStatus,
    ExecutionSummary, JobId, ResponsePayload, RunResult,
};
use crate::util::clock::now_ms;

/// Future returned to completion subscribers.
pub type CompletionFuture = Pending<Option<RunResult>>;

struct ActiveExecution {
    request: ExecutionRequest,
    started_at_ms: u128,
    status: ExecutionStatus,
    /// Settled in insertion order.
    completion_waiters: Vec<Deferred<Option<RunResult>>>,
    cancel_handle: Option<Box<dyn CancelHandle>>,
    response_waiter: Option<Deferred<ResponsePayload>>,
}

impl ActiveExecution {
    fn summary(&self, id: &JobId) -> ExecutionSummary {
        ExecutionSummary {
            id: id.clone(),
            retry_of: self.request.retry_of.clone(),
            started_at_ms: self.started_at_ms,
            mode: self.request.mode,
            workflow_id: self.request.workflow_id.clone(),
            status: self.status,
        }
    }
}

/// Tracks every execution currently running in this worker.
pub struct ExecutionRegistry {
    executions: Mutex<HashMap<JobId, ActiveExecution>>,
    repository: Arc<dyn ExecutionRepository>,
    admission: Arc<dyn AdmissionController>,
}

impl ExecutionRegistry {
    /// Create an empty registry.
    pub fn new(
        repository: Arc<dyn ExecutionRepository>,
        admission: Arc<dyn AdmissionController>,
    ) -> Self {
        Self {
            executions: Mutex::new(HashMap::new()),
            repository,
            admission,
        }
    }

    /// Admit an execution and start tracking it.
    ///
    /// Without `existing_id` a new record is persisted first; with one, the
    /// persisted record is resumed. Either way a slot is acquired before the
    /// execution becomes active.
    ///
    /// # Errors
    ///
    /// Propagates admission and persistence failures. No entry is created
    /// when either fails.
    pub async fn submit(
        &self,
        request: ExecutionRequest,
        existing_id: Option<JobId>,
    ) -> Result<JobId, ExecutionError> {
        let mode = request.mode;
        let id = match existing_id {
            None => {
                let record = NewExecution {
                    status: ExecutionStatus::New,
                    finished: false,
                    mode,
                    started_at_ms: now_ms(),
                    retry_of: request.retry_of.clone(),
                    workflow_id: request.workflow_id.clone(),
                    workflow: request.workflow.clone(),
                    data: request.data.clone(),
                };
                let id = self.repository.create_new_execution(record).await?;
                self.admission.acquire(mode, &id).await?;
                id
            }
            Some(id) => {
                self.admission.acquire(mode, &id).await?;
                let update = ExecutionUpdate {
                    status: ExecutionStatus::Running,
                    data: request.data.clone(),
                    wait_till_ms: None,
                };
                if let Err(err) = self.repository.update_existing_execution(&id, update).await {
                    self.admission.release(mode);
                    return Err(err);
                }
                id
            }
        };

        let entry = ActiveExecution {
            request,
            started_at_ms: now_ms(),
            status: ExecutionStatus::Running,
            completion_waiters: Vec::new(),
            cancel_handle: None,
            response_waiter: None,
        };
        let previous = self.executions.lock().insert(id.clone(), entry);
        if let Some(previous) = previous {
            warn!(
                execution_id = %id,
                waiters = previous.completion_waiters.len(),
                "execution was already active; replaced entry"
            );
            for waiter in previous.completion_waiters {
                waiter.resolve(None);
            }
            self.admission.release(previous.request.mode);
        }
        info!(execution_id = %id, ?mode, "execution added");
        Ok(id)
    }

    /// Whether `id` is active.
    #[must_use]
    pub fn has(&self, id: &str) -> bool {
        self.executions.lock().contains_key(id)
    }

    /// Attach the engine's cancel handle.
    ///
    /// # Errors
    ///
    /// [`ExecutionError::NotFound`] when `id` is not active.
    pub fn attach_cancel_handle(
        &self,
        id: &str,
        handle: Box<dyn CancelHandle>,
    ) -> Result<(), ExecutionError> {
        self.with_entry(id, |entry| entry.cancel_handle = Some(handle))
    }

    /// Attach the single response waiter for a request/response submission.
    ///
    /// # Errors
    ///
    /// [`ExecutionError::NotFound`] when `id` is not active.
    pub fn attach_response_waiter(
        &self,
        id: &str,
        waiter: Deferred<ResponsePayload>,
    ) -> Result<(), ExecutionError> {
        self.with_entry(id, |entry| entry.response_waiter = Some(waiter))
    }

    /// Deliver the response payload. Best effort: silently dropped when the
    /// execution is gone or nobody is waiting.
    pub fn resolve_response(&self, id: &str, response: ResponsePayload) {
        let waiter = self
            .executions
            .lock()
            .get_mut(id)
            .and_then(|entry| entry.response_waiter.take());
        if let Some(waiter) = waiter {
            waiter.resolve(response);
        }
    }

    /// Register a completion waiter and return the future to await.
    ///
    /// # Errors
    ///
    /// [`ExecutionError::NotFound`] when `id` is not active.
    pub fn subscribe(&self, id: &str) -> Result<CompletionFuture, ExecutionError> {
        let (waiter, pending) = deferred();
        self.with_entry(id, |entry| entry.completion_waiters.push(waiter))?;
        Ok(pending)
    }

    /// Wait until `id` completes. Resolves to the final result, or `None`
    /// when it was removed without one.
    ///
    /// # Errors
    ///
    /// [`ExecutionError::NotFound`] when `id` is not active at call time,
    /// [`ExecutionError::Cancelled`] when it gets cancelled.
    pub async fn await_completion(&self, id: &str) -> Result<Option<RunResult>, ExecutionError> {
        self.subscribe(id)?.await
    }

    /// Number of completion waiters attached to `id`; zero when not active.
    #[must_use]
    pub fn waiter_count(&self, id: &str) -> usize {
        self.executions
            .lock()
            .get(id)
            .map_or(0, |entry| entry.completion_waiters.len())
    }

    /// Stop tracking `id`, resolving every waiter with `result`.
    pub fn remove(&self, id: &str, result: Option<RunResult>) {
        let Some(entry) = self.take(id) else {
            return;
        };
        let waiters = entry.completion_waiters.len();
        for waiter in entry.completion_waiters {
            waiter.resolve(result.clone());
        }
        self.admission.release(entry.request.mode);
        debug!(execution_id = %id, waiters, "execution removed");
    }

    /// Cancel `id`: signal its handle, reject every waiter with
    /// [`ExecutionError::Cancelled`], and stop tracking it.
    pub fn cancel(&self, id: &str) {
        let Some(entry) = self.take(id) else {
            return;
        };
        if let Some(handle) = &entry.cancel_handle {
            handle.cancel();
        }
        let waiters = entry.completion_waiters.len();
        for waiter in entry.completion_waiters {
            waiter.reject(ExecutionError::Cancelled(id.to_string()));
        }
        self.admission.release(entry.request.mode);
        info!(execution_id = %id, waiters, "execution cancelled");
    }

    /// Summaries of every active execution, oldest first.
    #[must_use]
    pub fn snapshot(&self) -> Vec<ExecutionSummary> {
        let mut summaries: Vec<_> = self
            .executions
            .lock()
            .iter()
            .map(|(id, entry)| entry.summary(id))
            .collect();
        summaries.sort_by(|a, b| {
            a.started_at_ms
                .cmp(&b.started_at_ms)
                .then_with(|| a.id.cmp(&b.id))
        });
        summaries
    }

    /// Ids of every active execution.
    #[must_use]
    pub fn active_ids(&self) -> Vec<JobId> {
        self.executions.lock().keys().cloned().collect()
    }

    /// Number of active executions.
    #[must_use]
    pub fn len(&self) -> usize {
        self.executions.lock().len()
    }

    /// Whether nothing is active.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.executions.lock().is_empty()
    }

    /// Overwrite the status of `id`.
    ///
    /// # Errors
    ///
    /// [`ExecutionError::NotFound`] when `id` is not active.
    pub fn set_status(&self, id: &str, status: ExecutionStatus) -> Result<(), ExecutionError> {
        self.with_entry(id, |entry| entry.status = status)
    }

    /// Current status of `id`.
    ///
    /// # Errors
    ///
    /// [`ExecutionError::NotFound`] when `id` is not active.
    pub fn get_status(&self, id: &str) -> Result<ExecutionStatus, ExecutionError> {
        self.with_entry(id, |entry| entry.status)
    }

    fn with_entry<R>(
        &self,
        id: &str,
        f: impl FnOnce(&mut ActiveExecution) -> R,
    ) -> Result<R, ExecutionError> {
        let mut executions = self.executions.lock();
        let entry = executions
            .get_mut(id)
            .ok_or_else(|| ExecutionError::NotFound(id.to_string()))?;
        Ok(f(entry))
    }

    fn take(&self, id: &str) -> Option<ActiveExecution> {
        self.executions.lock().remove(id)
    }
}
