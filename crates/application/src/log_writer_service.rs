//! Daily log writer.
//!
//! Every entry goes to the console sink first and then to the persistent
//! daily file. A failing persistent sink is reported through tracing and
//! never surfaces to the caller.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use logkeep_domain::{LogLevel, LogLine};
use tracing::{error, warn};

use crate::log_ports::{Clock, LogSink};

/// Application service appending leveled entries to the daily log.
#[derive(Clone)]
pub struct DailyLogWriter {
    persistent: Arc<dyn LogSink>,
    console: Arc<dyn LogSink>,
    clock: Arc<dyn Clock>,
}

impl DailyLogWriter {
    /// Creates a writer over a persistent and a console sink.
    #[must_use]
    pub fn new(
        persistent: Arc<dyn LogSink>,
        console: Arc<dyn LogSink>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            persistent,
            console,
            clock,
        }
    }

    /// Appends an entry stamped with the current time.
    pub async fn write(&self, level: LogLevel, message: impl Into<String>) {
        self.write_at(level, message, self.clock.now()).await;
    }

    /// Appends an entry stamped with an explicit time.
    pub async fn write_at(
        &self,
        level: LogLevel,
        message: impl Into<String>,
        timestamp: DateTime<Utc>,
    ) {
        self.write_line(LogLine::new(level, message, timestamp)).await;
    }

    /// Appends an already built entry.
    pub async fn write_line(&self, line: LogLine) {
        if let Err(error) = self.console.append(&line).await {
            warn!(error = %error, "failed to echo log entry to console");
        }

        if let Err(error) = self.persistent.append(&line).await {
            error!(
                file = %line.file_name(),
                level = %line.level(),
                error = %error,
                "failed to append daily log entry"
            );
        }
    }
}
