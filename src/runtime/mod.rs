//! Runtime glue driving executions on tokio.

pub mod runner;

pub use runner::{JobExecutor, JobRunner, ResponseSender};
