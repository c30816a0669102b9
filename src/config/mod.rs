//! Configuration models for execution concurrency and shutdown.

pub mod executions;

pub use executions::{ConcurrencyMode, ConcurrencyModeFlag, ExecutionsConfig};
