//! Graceful and forced shutdown draining.

use std::sync::Arc;
use std::time::Duration;

use tracing::info;

use crate::config::{ConcurrencyModeFlag, ExecutionsConfig};
use crate::core::{AdmissionController, ExecutionRegistry};

/// What happened while draining.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DrainReport {
    /// Executions cancelled up front.
    pub cancelled: usize,
    /// Sleep-and-recheck cycles performed.
    pub polls: u32,
    /// Progress lines logged.
    pub progress_reports: u32,
}

/// Waits for the registry to empty, optionally cancelling everything first.
///
/// There is no built-in deadline; the caller owns any outer timeout.
pub struct ShutdownDrainer {
    registry: Arc<ExecutionRegistry>,
    admission: Arc<dyn AdmissionController>,
    mode: ConcurrencyModeFlag,
    poll_interval: Duration,
    report_every: u32,
}

impl ShutdownDrainer {
    /// Create a drainer polling with the configured interval and cadence.
    pub fn new(
        registry: Arc<ExecutionRegistry>,
        admission: Arc<dyn AdmissionController>,
        mode: ConcurrencyModeFlag,
        cfg: &ExecutionsConfig,
    ) -> Self {
        Self {
            registry,
            admission,
            mode,
            poll_interval: cfg.drain_poll_interval(),
            report_every: cfg.drain_report_every.max(1),
        }
    }

    /// Block until no execution is active.
    ///
    /// In local mode admission is disabled first so slots freed during the
    /// drain are not handed to throttled executions. With `force_cancel`,
    /// every active execution is cancelled; in local mode all slots are
    /// force-released beforehand so a stalled cancellation cannot pin one.
    pub async fn drain(&self, force_cancel: bool) -> DrainReport {
        let local = !self.mode.is_distributed();
        let mut report = DrainReport::default();

        if local {
            self.admission.disable();
        }

        if force_cancel {
            if local {
                self.admission.force_release_all(&self.registry.snapshot());
            }
            let ids = self.registry.active_ids();
            report.cancelled = ids.len();
            for id in &ids {
                self.registry.cancel(id);
            }
        }

        let mut remaining = self.registry.len();
        let mut count: u32 = 0;
        while remaining != 0 {
            if count % self.report_every == 0 {
                info!(remaining, "waiting for active executions to finish");
                report.progress_reports += 1;
            }
            count = count.wrapping_add(1);

            tokio::time::sleep(self.poll_interval).await;
            report.polls += 1;
            remaining = self.registry.len();
        }

        info!(polls = report.polls, "all active executions finished");
        report
    }
}
