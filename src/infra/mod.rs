//! Infrastructure adapters for execution persistence.

pub mod repository;

pub use repository::InMemoryExecutionRepository;
