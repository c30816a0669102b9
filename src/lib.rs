//! # Prometheus Active Executions
//!
//! In-process tracking of the executions running inside a single worker.
//!
//! This library decides which submitted executions may run concurrently in a
//! worker, tracks every execution currently active there, and coordinates how
//! callers learn that an execution finished. Durable storage and the
//! execution engine itself are collaborators behind traits.
//!
//! ## Key Features
//!
//! - **Admission Control**: production executions are throttled to a slot
//!   limit; exempt modes are admitted immediately
//! - **Execution Registry**: one live entry per active execution, with fan-out
//!   of the final result to any number of completion subscribers
//! - **Cooperative Cancellation**: cancelling signals the engine and rejects
//!   every subscriber deterministically
//! - **Graceful Drain**: shutdown stops handing slots back out, optionally
//!   cancels everything, then waits for the registry to empty
//! - **Stalled-Job Guard**: failures of executions a distributed queue
//!   redelivered after they already finished do not fire hooks twice
//!
//! ## Registry
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use prometheus_active_executions::config::{ConcurrencyModeFlag, ConcurrencyMode};
//! use prometheus_active_executions::core::{
//!     ConcurrencyControl, ExecutionRegistry, ExecutionRequest, SubmissionMode,
//! };
//! use prometheus_active_executions::infra::InMemoryExecutionRepository;
//!
//! let mode = ConcurrencyModeFlag::new(ConcurrencyMode::Local);
//! let admission = Arc::new(ConcurrencyControl::new(Some(10), &mode));
//! let registry = ExecutionRegistry::new(Arc::new(InMemoryExecutionRepository::new()), admission);
//!
//! let id = registry
//!     .submit(ExecutionRequest::new(SubmissionMode::Webhook, workflow), None)
//!     .await?;
//! let done = registry.subscribe(&id)?;
//! registry.remove(&id, Some(run));
//! let result = done.await?;
//! ```
//!
//! ## Worker
//!
//! ```rust,ignore
//! use prometheus_active_executions::builders::build_worker;
//! use prometheus_active_executions::config::ExecutionsConfig;
//!
//! let worker = build_worker(&ExecutionsConfig::from_env()?, repository, my_engine)?;
//! let id = worker.runner.run(request, None, Some(hooks)).await?;
//!
//! // On shutdown
//! worker.drainer.drain(false).await;
//! ```

#![deny(missing_docs)]
#![deny(unsafe_code)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]

/// Core execution tracking: registry, admission, draining, failure handling.
pub mod core;
/// Configuration models for concurrency and shutdown.
pub mod config;
/// Builders to construct worker components from configuration.
pub mod builders;
/// Infrastructure adapters for execution persistence.
pub mod infra;
/// Runtime adapters driving executions on tokio.
pub mod runtime;
/// Shared utilities.
pub mod util;
