use async_trait::async_trait;
use chrono::{DateTime, Utc};
use logkeep_core::AppResult;
use logkeep_domain::LogLine;

/// Output port receiving rendered log lines.
#[async_trait]
pub trait LogSink: Send + Sync {
    /// Appends one entry.
    ///
    /// Implementations must write the rendered line in a single append so
    /// concurrent writers never interleave partial lines.
    async fn append(&self, line: &LogLine) -> AppResult<()>;
}

/// Source of wall-clock time.
pub trait Clock: Send + Sync {
    /// Returns the current UTC instant.
    fn now(&self) -> DateTime<Utc>;
}
