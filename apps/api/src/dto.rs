use chrono::{DateTime, Utc};
use logkeep_application::SchedulerStatus;
use logkeep_domain::MaintenanceState;
use serde::Serialize;

/// API error payload.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub message: String,
}

/// Health response payload.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub maintenance: MaintenanceStatusResponse,
}

/// Scheduler snapshot exposed on `/health`.
#[derive(Debug, Serialize)]
pub struct MaintenanceStatusResponse {
    pub state: MaintenanceState,
    pub next_run_at: Option<DateTime<Utc>>,
    pub last_completed_at: Option<DateTime<Utc>>,
}

impl From<SchedulerStatus> for MaintenanceStatusResponse {
    fn from(value: SchedulerStatus) -> Self {
        Self {
            state: value.state,
            next_run_at: value.next_run_at,
            last_completed_at: value.last_completed_at,
        }
    }
}
