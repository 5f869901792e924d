//! Daily maintenance scheduler anchored to 00:00 UTC.
//!
//! The next target is recomputed after every fire instead of sleeping a
//! fixed 24 hours. Waits are sliced so wall-clock jumps (suspend, NTP
//! corrections) are noticed within one slice.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use logkeep_domain::{MaintenanceState, delay_until, next_midnight_utc};
use tokio::sync::watch;
use tracing::{error, info};

use crate::log_ports::Clock;
use crate::maintenance_service::MaintenanceJob;

/// Longest single sleep before the wall clock is checked again.
const MAX_WAIT_SLICE: Duration = Duration::from_secs(15 * 60);

/// Snapshot published by the scheduler after every transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SchedulerStatus {
    /// Whether a tick is currently running.
    pub state: MaintenanceState,
    /// Next planned tick.
    pub next_run_at: Option<DateTime<Utc>>,
    /// Completion time of the latest tick.
    pub last_completed_at: Option<DateTime<Utc>>,
}

impl Default for SchedulerStatus {
    fn default() -> Self {
        Self {
            state: MaintenanceState::Idle,
            next_run_at: None,
            last_completed_at: None,
        }
    }
}

/// Fires a maintenance job once per UTC midnight.
pub struct MaintenanceScheduler {
    job: Arc<dyn MaintenanceJob>,
    clock: Arc<dyn Clock>,
    status: watch::Sender<SchedulerStatus>,
}

impl MaintenanceScheduler {
    /// Creates an idle scheduler.
    #[must_use]
    pub fn new(job: Arc<dyn MaintenanceJob>, clock: Arc<dyn Clock>) -> Self {
        let (status, _) = watch::channel(SchedulerStatus::default());
        Self { job, clock, status }
    }

    /// Returns a receiver observing status transitions.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<SchedulerStatus> {
        self.status.subscribe()
    }

    /// Runs one tick immediately: Idle, Running, then Idle again.
    pub async fn tick(&self) {
        self.status.send_modify(|status| status.state = MaintenanceState::Running);

        self.job.run_tick().await;

        let completed_at = self.clock.now();
        self.status.send_modify(|status| {
            status.state = MaintenanceState::Idle;
            status.last_completed_at = Some(completed_at);
        });
    }

    /// Fires the job at every UTC midnight until `shutdown` becomes true or
    /// its sender is dropped. An in-flight tick always finishes first.
    pub async fn run(self, mut shutdown: watch::Receiver<bool>) {
        let mut previous_target: Option<DateTime<Utc>> = None;

        loop {
            if *shutdown.borrow() {
                break;
            }

            let now = self.clock.now();
            let anchor = previous_target.map_or(now, |target| target.max(now));
            let Some(target) = next_midnight_utc(anchor) else {
                error!(anchor = %anchor, "no representable next maintenance time");
                break;
            };

            self.status.send_modify(|status| status.next_run_at = Some(target));
            info!(next_run_at = %target, "next maintenance tick scheduled");

            if !self.wait_until(target, &mut shutdown).await {
                break;
            }

            previous_target = Some(target);
            self.tick().await;
        }

        info!("maintenance scheduler stopped");
    }

    /// Sleeps until the wall clock reaches `target`. Returns false when
    /// shutdown was requested first.
    async fn wait_until(
        &self,
        target: DateTime<Utc>,
        shutdown: &mut watch::Receiver<bool>,
    ) -> bool {
        loop {
            let now = self.clock.now();
            if now >= target {
                return true;
            }

            let slice = delay_until(now, target).min(MAX_WAIT_SLICE);
            tokio::select! {
                biased;
                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        return false;
                    }
                }
                () = tokio::time::sleep(slice) => {}
            }
        }
    }
}
