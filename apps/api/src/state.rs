use logkeep_application::{DailyLogWriter, SchedulerStatus};
use tokio::sync::watch;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub log_writer: DailyLogWriter,
    pub scheduler_status: watch::Receiver<SchedulerStatus>,
}
