//! Builders to construct worker components from configuration.

pub mod worker_builder;

pub use worker_builder::{build_worker, Worker};
