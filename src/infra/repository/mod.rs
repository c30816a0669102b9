//! Execution repository backends.

pub mod memory;

pub use memory::InMemoryExecutionRepository;
