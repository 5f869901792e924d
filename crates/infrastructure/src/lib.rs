//! Infrastructure adapters for application ports.

#![forbid(unsafe_code)]

mod console_log_sink;
mod daily_file_log_sink;
mod fs_retention_store;
mod log_directories;
mod system_clock;

pub use console_log_sink::ConsoleLogSink;
pub use daily_file_log_sink::DailyFileLogSink;
pub use fs_retention_store::FsRetentionStore;
pub use log_directories::ensure_log_directories;
pub use system_clock::SystemClock;
