//! Domain entities and invariants.

#![forbid(unsafe_code)]

mod log_line;
mod retention;
mod schedule;

pub use log_line::{LOG_FILE_EXTENSION, LogLevel, LogLine, daily_log_file_name};
pub use retention::{
    ARCHIVE_AFTER_DAYS, ARCHIVE_DIR_NAME, LogDirectories, PURGE_AFTER_DAYS, RetentionAction,
    RetentionRule,
};
pub use schedule::{MaintenanceState, delay_until, next_midnight_utc};
