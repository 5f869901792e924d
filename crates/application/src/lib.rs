//! Application services and ports.

#![forbid(unsafe_code)]

mod log_ports;
mod log_writer_service;
mod maintenance_scheduler;
mod maintenance_service;
mod retention_ports;
mod retention_service;

pub use log_ports::{Clock, LogSink};
pub use log_writer_service::DailyLogWriter;
pub use maintenance_scheduler::{MaintenanceScheduler, SchedulerStatus};
pub use maintenance_service::{MaintenanceJob, MaintenanceRun, MaintenanceService, RuleOutcome};
pub use retention_ports::{RetentionStore, StoreEntry};
pub use retention_service::{
    DEFAULT_ENTRY_TIMEOUT, EntryFailure, EntryOperation, RetentionReport, RetentionService,
};
