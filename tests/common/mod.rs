//! Shared test doubles for integration tests.
#![allow(dead_code)]

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;
use prometheus_active_executions::core::{
    AdmissionController, AdmissionError, CancelHandle, CompletionHooks, ExecutionRegistry,
    ExecutionRequest, ExecutionSummary, JobId, RunResult, SubmissionMode,
};
use prometheus_active_executions::infra::InMemoryExecutionRepository;
use serde_json::json;

/// Admission controller that grants everything and counts calls.
#[derive(Default)]
pub struct CountingAdmission {
    pub acquired: AtomicUsize,
    pub released: AtomicUsize,
    pub disabled: AtomicBool,
    pub force_released: Mutex<Vec<Vec<JobId>>>,
    pub fail_acquire: AtomicBool,
}

impl CountingAdmission {
    pub fn released(&self) -> usize {
        self.released.load(Ordering::SeqCst)
    }

    pub fn acquired(&self) -> usize {
        self.acquired.load(Ordering::SeqCst)
    }

    pub fn is_disabled(&self) -> bool {
        self.disabled.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl AdmissionController for CountingAdmission {
    async fn acquire(&self, _mode: SubmissionMode, id: &JobId) -> Result<(), AdmissionError> {
        if self.fail_acquire.load(Ordering::SeqCst) {
            return Err(AdmissionError::Backend(format!("refused {id}")));
        }
        self.acquired.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn release(&self, _mode: SubmissionMode) {
        self.released.fetch_add(1, Ordering::SeqCst);
    }

    fn disable(&self) {
        self.disabled.store(true, Ordering::SeqCst);
    }

    fn force_release_all(&self, executions: &[ExecutionSummary]) {
        self.force_released
            .lock()
            .push(executions.iter().map(|e| e.id.clone()).collect());
    }
}

/// Cancel handle counting how often it was signalled.
#[derive(Clone, Default)]
pub struct CountingCancel {
    pub calls: Arc<AtomicUsize>,
}

impl CountingCancel {
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl CancelHandle for CountingCancel {
    fn cancel(&self) {
        self.calls.fetch_add(1, Ordering::SeqCst);
    }
}

/// Completion hooks recording every invocation.
#[derive(Default)]
pub struct RecordingHooks {
    pub calls: Mutex<Vec<(JobId, RunResult)>>,
}

impl RecordingHooks {
    pub fn count(&self) -> usize {
        self.calls.lock().len()
    }
}

#[async_trait]
impl CompletionHooks for RecordingHooks {
    async fn execute_after(&self, id: &JobId, run: &RunResult) {
        self.calls.lock().push((id.clone(), run.clone()));
    }
}

pub fn request(mode: SubmissionMode) -> ExecutionRequest {
    ExecutionRequest::new(mode, json!({"nodes": []}))
        .with_workflow_id("wf1")
        .with_data(json!({"input": 1}))
}

pub struct Harness {
    pub repository: Arc<InMemoryExecutionRepository>,
    pub admission: Arc<CountingAdmission>,
    pub registry: Arc<ExecutionRegistry>,
}

pub fn harness() -> Harness {
    let repository = Arc::new(InMemoryExecutionRepository::new());
    let admission = Arc::new(CountingAdmission::default());
    let registry = Arc::new(ExecutionRegistry::new(
        repository.clone(),
        admission.clone(),
    ));
    Harness {
        repository,
        admission,
        registry,
    }
}
