//! Failure path with duplicate-delivery suppression.
//!
//! A distributed queue can redeliver an execution whose worker stalled after
//! another delivery already finished it. Reporting that redelivery's failure
//! would fire completion hooks a second time for one logical execution.

use std::sync::Arc;

use tracing::{debug, warn};

use crate::config::ConcurrencyModeFlag;
use crate::core::repository::ExecutionRepository;
use crate::core::{
    CompletionHooks, ExecutionError, ExecutionFailure, ExecutionRegistry, JobId, RunResult,
    SubmissionMode,
};

/// Result of [`StalledJobGuard::process_error`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureOutcome {
    /// The execution had already finished elsewhere; nothing was reported.
    Suppressed,
    /// The failure was recorded and hooks were invoked.
    Reported,
}

/// Routes engine failures to the registry and completion hooks.
pub struct StalledJobGuard {
    registry: Arc<ExecutionRegistry>,
    repository: Arc<dyn ExecutionRepository>,
    mode: ConcurrencyModeFlag,
}

impl StalledJobGuard {
    /// Create a guard.
    pub fn new(
        registry: Arc<ExecutionRegistry>,
        repository: Arc<dyn ExecutionRepository>,
        mode: ConcurrencyModeFlag,
    ) -> Self {
        Self {
            registry,
            repository,
            mode,
        }
    }

    /// Handle a failure reported for `id`.
    ///
    /// In distributed mode, a persisted record that is already finished with
    /// a terminal status marks a stalled redelivery and short-circuits.
    /// Otherwise the execution is removed with a failed result and the
    /// hooks run exactly once.
    ///
    /// # Errors
    ///
    /// Propagates persistence failures from the finished-status lookup.
    pub async fn process_error(
        &self,
        failure: ExecutionFailure,
        started_at_ms: u128,
        mode: SubmissionMode,
        id: &JobId,
        hooks: Option<&dyn CompletionHooks>,
    ) -> Result<FailureOutcome, ExecutionError> {
        if self.mode.is_distributed() {
            let record = self.repository.get_record(id).await?;
            if record.is_some_and(|record| record.finished && record.status.is_terminal()) {
                debug!(execution_id = %id, "ignoring failure of already finished execution");
                return Ok(FailureOutcome::Suppressed);
            }
        }

        warn!(execution_id = %id, error = %failure, "execution failed");
        let run = RunResult::failed(mode, started_at_ms, failure);
        self.registry.remove(id, Some(run.clone()));
        if let Some(hooks) = hooks {
            hooks.execute_after(id, &run).await;
        }
        Ok(FailureOutcome::Reported)
    }
}
