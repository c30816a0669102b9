//! Wire the execution-tracking components of one worker from configuration.

use std::sync::Arc;

use crate::config::{ConcurrencyModeFlag, ExecutionsConfig};
use crate::core::{
    ConcurrencyControl, ExecutionError, ExecutionRegistry, ExecutionRepository, ShutdownDrainer,
    StalledJobGuard,
};
use crate::runtime::{JobExecutor, JobRunner};

/// Every component of a worker, sharing one registry and one slot pool.
pub struct Worker<E> {
    /// Runtime-settable concurrency mode.
    pub mode: ConcurrencyModeFlag,
    /// Local concurrency control.
    pub admission: Arc<ConcurrencyControl>,
    /// Active execution registry.
    pub registry: Arc<ExecutionRegistry>,
    /// Failure path guard.
    pub guard: Arc<StalledJobGuard>,
    /// Shutdown drainer.
    pub drainer: ShutdownDrainer,
    /// Runner driving executions through the registry.
    pub runner: JobRunner<E>,
}

/// Build a worker from configuration, a repository and an engine.
///
/// # Errors
///
/// [`ExecutionError::InvalidConfig`] when `cfg` fails validation.
pub fn build_worker<E>(
    cfg: &ExecutionsConfig,
    repository: Arc<dyn ExecutionRepository>,
    executor: E,
) -> Result<Worker<E>, ExecutionError>
where
    E: JobExecutor,
{
    cfg.validate().map_err(ExecutionError::InvalidConfig)?;

    let mode = ConcurrencyModeFlag::new(cfg.mode);
    let admission = Arc::new(ConcurrencyControl::new(cfg.production_limit(), &mode));
    let registry = Arc::new(ExecutionRegistry::new(
        Arc::clone(&repository),
        admission.clone(),
    ));
    let guard = Arc::new(StalledJobGuard::new(
        Arc::clone(&registry),
        repository,
        mode.clone(),
    ));
    let drainer = ShutdownDrainer::new(Arc::clone(&registry), admission.clone(), mode.clone(), cfg);
    let runner = JobRunner::new(Arc::clone(&registry), Arc::clone(&guard), Arc::new(executor));

    Ok(Worker {
        mode,
        admission,
        registry,
        guard,
        drainer,
        runner,
    })
}
