//! Local concurrency control for production executions.
//!
//! Slots are tracked in a single counter guarded by a `parking_lot::Mutex`
//! together with a FIFO of parked acquirers. A release hands the slot
//! directly to the oldest parked acquirer when there is one, so capacity is
//! never observable as free while someone is queued for it.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use parking_lot::Mutex;
use tokio::sync::oneshot;
use tracing::{debug, info};

use crate::config::ConcurrencyModeFlag;
use crate::core::{AdmissionController, AdmissionError, ExecutionSummary, JobId, SubmissionMode};

struct Parked {
    id: JobId,
    grant: oneshot::Sender<()>,
}

struct SlotState {
    available: u32,
    parked: VecDeque<Parked>,
}

/// Concurrency control throttling production executions to a fixed limit.
pub struct ConcurrencyControl {
    limit: u32,
    limited: bool,
    mode: ConcurrencyModeFlag,
    /// Set during shutdown so released slots are not handed out again.
    disabled: AtomicBool,
    state: Mutex<SlotState>,
}

impl ConcurrencyControl {
    /// Create a controller. `limit` of `None` means unlimited; distributed
    /// mode disables local throttling entirely. The mode flag is consulted on
    /// every call, so switching it takes effect for the next acquire.
    #[must_use]
    pub fn new(limit: Option<u32>, mode: &ConcurrencyModeFlag) -> Self {
        let limited = limit.is_some();
        let limit = limit.unwrap_or(0);
        if limited && !mode.is_distributed() {
            info!(limit, "production concurrency control enabled");
        } else {
            debug!("production concurrency control disabled");
        }
        Self {
            limit,
            limited,
            mode: mode.clone(),
            disabled: AtomicBool::new(false),
            state: Mutex::new(SlotState {
                available: limit,
                parked: VecDeque::new(),
            }),
        }
    }

    /// Whether this controller currently throttles anything at all.
    #[must_use]
    pub fn is_enabled(&self) -> bool {
        self.limited && !self.mode.is_distributed()
    }

    /// Free slots.
    #[must_use]
    pub fn available(&self) -> u32 {
        self.state.lock().available
    }

    /// Acquirers parked waiting for a slot.
    #[must_use]
    pub fn queued(&self) -> usize {
        self.state.lock().parked.len()
    }

    fn throttles(&self, mode: SubmissionMode) -> bool {
        self.is_enabled() && mode.is_production()
    }

    fn return_slot(state: &mut SlotState, limit: u32) {
        while let Some(parked) = state.parked.pop_front() {
            if parked.grant.send(()).is_ok() {
                debug!(execution_id = %parked.id, "slot handed to throttled execution");
                return;
            }
        }
        state.available = (state.available + 1).min(limit);
    }
}

#[async_trait]
impl AdmissionController for ConcurrencyControl {
    async fn acquire(&self, mode: SubmissionMode, id: &JobId) -> Result<(), AdmissionError> {
        if !self.throttles(mode) {
            return Ok(());
        }

        let granted = {
            let mut state = self.state.lock();
            if state.available > 0 {
                state.available -= 1;
                return Ok(());
            }
            let (grant, granted) = oneshot::channel();
            state.parked.push_back(Parked {
                id: id.clone(),
                grant,
            });
            granted
        };

        debug!(execution_id = %id, "execution throttled");
        granted
            .await
            .map_err(|_| AdmissionError::Evicted(id.clone()))
    }

    fn release(&self, mode: SubmissionMode) {
        if !self.limited || !mode.is_production() || self.disabled.load(Ordering::Acquire) {
            return;
        }
        let mut state = self.state.lock();
        if self.mode.is_distributed() {
            // Throttling was switched off while acquirers were parked.
            for parked in state.parked.drain(..) {
                let _ = parked.grant.send(());
            }
            return;
        }
        Self::return_slot(&mut state, self.limit);
    }

    fn disable(&self) {
        self.disabled.store(true, Ordering::Release);
    }

    fn force_release_all(&self, executions: &[ExecutionSummary]) {
        if !self.is_enabled() {
            return;
        }
        let mut state = self.state.lock();
        let evicted = state.parked.len();
        state.parked.clear();

        let throttled = executions
            .iter()
            .filter(|execution| execution.mode.is_production())
            .count();
        let restored = u32::try_from(throttled).unwrap_or(u32::MAX);
        state.available = state.available.saturating_add(restored).min(self.limit);
        info!(evicted, restored, "released all production slots");
    }
}
