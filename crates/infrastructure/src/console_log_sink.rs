//! Console sink echoing every log line to standard output.

use async_trait::async_trait;
use logkeep_application::LogSink;
use logkeep_core::{AppError, AppResult};
use logkeep_domain::LogLine;
use tokio::io::{AsyncWriteExt, Stdout};
use tokio::sync::Mutex;

/// Log sink writing rendered lines to stdout.
///
/// Writes are serialised so lines from concurrent requests never interleave.
pub struct ConsoleLogSink {
    stdout: Mutex<Stdout>,
}

impl ConsoleLogSink {
    /// Creates a console sink bound to the process stdout.
    #[must_use]
    pub fn new() -> Self {
        Self {
            stdout: Mutex::new(tokio::io::stdout()),
        }
    }
}

impl Default for ConsoleLogSink {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl LogSink for ConsoleLogSink {
    async fn append(&self, line: &LogLine) -> AppResult<()> {
        let rendered = line.render();
        let mut stdout = self.stdout.lock().await;
        stdout
            .write_all(rendered.as_bytes())
            .await
            .map_err(|error| AppError::from_io("failed to write log line to stdout", &error))?;
        stdout
            .flush()
            .await
            .map_err(|error| AppError::from_io("failed to flush stdout", &error))
    }
}
