//! Completion hooks fired once an execution has a final result.

use async_trait::async_trait;

use crate::core::{JobId, RunResult};

/// Side effects run after an execution finishes (notifications, persistence
/// of the final result, error workflows).
#[async_trait]
pub trait CompletionHooks: Send + Sync {
    /// Invoked once per logical execution with its final result.
    async fn execute_after(&self, id: &JobId, run: &RunResult);
}
