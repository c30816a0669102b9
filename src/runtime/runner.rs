//! Tokio-driven runner that takes an execution through the registry.
//!
//! The runner owns no state of its own: it submits to the registry, spawns
//! the engine on the tokio runtime, attaches the task's abort handle as the
//! cancel handle, and on exit either removes the execution with its result
//! or routes the failure through the [`StalledJobGuard`]. A panicking engine
//! is reported as a failure like any other.
//!
//! Both exits remove the execution before completion hooks run.

use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use async_trait::async_trait;
use futures::FutureExt;
use serde_json::Value;
use tracing::{debug, error};

use crate::core::{
    deferred, CompletionHooks, Deferred, ExecutionError, ExecutionFailure, ExecutionRegistry,
    ExecutionRequest, FailureOutcome, JobId, Pending, ResponsePayload, RunResult,
    StalledJobGuard,
};
use crate::util::clock::now_ms;

/// The execution engine seam: runs one execution to completion.
#[async_trait]
pub trait JobExecutor: Send + Sync + 'static {
    /// Run the execution and return its result data.
    async fn execute(
        &self,
        id: JobId,
        request: ExecutionRequest,
        responder: ResponseSender,
    ) -> Result<Value, ExecutionFailure>;
}

/// Lets a running execution answer a caller waiting for a response.
#[derive(Clone)]
pub struct ResponseSender {
    registry: Arc<ExecutionRegistry>,
    id: JobId,
}

impl ResponseSender {
    /// Deliver `response`; dropped silently when nobody is waiting.
    pub fn send(&self, response: ResponsePayload) {
        self.registry.resolve_response(&self.id, response);
    }
}

/// Runs executions on the tokio runtime through the registry.
pub struct JobRunner<E> {
    registry: Arc<ExecutionRegistry>,
    guard: Arc<StalledJobGuard>,
    executor: Arc<E>,
}

impl<E> JobRunner<E>
where
    E: JobExecutor,
{
    /// Create a runner.
    pub fn new(
        registry: Arc<ExecutionRegistry>,
        guard: Arc<StalledJobGuard>,
        executor: Arc<E>,
    ) -> Self {
        Self {
            registry,
            guard,
            executor,
        }
    }

    /// Submit and start an execution; returns once it is active.
    ///
    /// # Errors
    ///
    /// Propagates admission and persistence failures from submission.
    pub async fn run(
        &self,
        request: ExecutionRequest,
        existing_id: Option<JobId>,
        hooks: Option<Arc<dyn CompletionHooks>>,
    ) -> Result<JobId, ExecutionError> {
        self.start(request, existing_id, hooks, None).await
    }

    /// Like [`run`](Self::run), also returning a future for the response
    /// payload the execution may send before it finishes.
    ///
    /// # Errors
    ///
    /// Propagates admission and persistence failures from submission.
    pub async fn run_with_response(
        &self,
        request: ExecutionRequest,
        existing_id: Option<JobId>,
        hooks: Option<Arc<dyn CompletionHooks>>,
    ) -> Result<(JobId, Pending<ResponsePayload>), ExecutionError> {
        let (waiter, response) = deferred();
        let id = self.start(request, existing_id, hooks, Some(waiter)).await?;
        Ok((id, response))
    }

    async fn start(
        &self,
        request: ExecutionRequest,
        existing_id: Option<JobId>,
        hooks: Option<Arc<dyn CompletionHooks>>,
        response: Option<Deferred<ResponsePayload>>,
    ) -> Result<JobId, ExecutionError> {
        let mode = request.mode;
        let id = self.registry.submit(request.clone(), existing_id).await?;
        if let Some(waiter) = response {
            self.registry.attach_response_waiter(&id, waiter)?;
        }
        let started_at_ms = now_ms();

        let registry = Arc::clone(&self.registry);
        let guard = Arc::clone(&self.guard);
        let executor = Arc::clone(&self.executor);
        let responder = ResponseSender {
            registry: Arc::clone(&self.registry),
            id: id.clone(),
        };
        let task_id = id.clone();

        let task = tokio::spawn(async move {
            let outcome = AssertUnwindSafe(executor.execute(task_id.clone(), request, responder))
                .catch_unwind()
                .await
                .unwrap_or_else(|panic| Err(panic_failure(panic.as_ref())));

            match outcome {
                Ok(data) => {
                    let run = RunResult::success(mode, started_at_ms, data);
                    registry.remove(&task_id, Some(run.clone()));
                    if let Some(hooks) = &hooks {
                        hooks.execute_after(&task_id, &run).await;
                    }
                }
                Err(failure) => {
                    let outcome = guard
                        .process_error(failure, started_at_ms, mode, &task_id, hooks.as_deref())
                        .await;
                    match outcome {
                        Ok(FailureOutcome::Reported) => {}
                        // Already finished elsewhere: free the slot, fire nothing.
                        Ok(FailureOutcome::Suppressed) => registry.remove(&task_id, None),
                        Err(err) => {
                            error!(execution_id = %task_id, error = %err, "failed to process execution error");
                            registry.remove(&task_id, None);
                        }
                    }
                }
            }
        });

        if self
            .registry
            .attach_cancel_handle(&id, Box::new(task.abort_handle()))
            .is_err()
        {
            debug!(execution_id = %id, "execution finished before its cancel handle was attached");
        }
        Ok(id)
    }
}

fn panic_failure(payload: &(dyn Any + Send)) -> ExecutionFailure {
    let message = payload
        .downcast_ref::<&str>()
        .map(ToString::to_string)
        .or_else(|| payload.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "execution panicked".to_string());
    ExecutionFailure::new(format!("execution panicked: {message}"))
}
