//! Persistent sink appending to `<root>/<YYYY-MM-DD>.log`.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use logkeep_application::LogSink;
use logkeep_core::{AppError, AppResult};
use logkeep_domain::LogLine;
use tokio::fs::{self, OpenOptions};
use tokio::io::AsyncWriteExt;

/// Log sink appending each line to the file of its UTC date.
///
/// Files are opened in append mode and every line is a single write, so
/// concurrent appends land as whole lines at the end of the file.
#[derive(Debug, Clone)]
pub struct DailyFileLogSink {
    root: PathBuf,
}

impl DailyFileLogSink {
    /// Creates a sink writing into `root`.
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Returns the directory receiving daily files.
    #[must_use]
    pub fn root(&self) -> &Path {
        self.root.as_path()
    }

    /// Returns the file a line is appended to.
    #[must_use]
    pub fn path_for(&self, line: &LogLine) -> PathBuf {
        self.root.join(line.file_name())
    }
}

#[async_trait]
impl LogSink for DailyFileLogSink {
    async fn append(&self, line: &LogLine) -> AppResult<()> {
        fs::create_dir_all(&self.root).await.map_err(|error| {
            AppError::from_io(
                format!("failed to create log directory {}", self.root.display()),
                &error,
            )
        })?;

        let path = self.path_for(line);
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .await
            .map_err(|error| {
                AppError::from_io(format!("failed to open {}", path.display()), &error)
            })?;

        file.write_all(line.render().as_bytes())
            .await
            .map_err(|error| {
                AppError::from_io(format!("failed to append to {}", path.display()), &error)
            })?;
        file.flush().await.map_err(|error| {
            AppError::from_io(format!("failed to flush {}", path.display()), &error)
        })
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use chrono::{TimeZone, Utc};
    use logkeep_application::LogSink;
    use logkeep_domain::{LogLevel, LogLine};

    use super::DailyFileLogSink;

    #[tokio::test]
    async fn creates_missing_root_and_appends_line() {
        let temp = tempfile::tempdir();
        assert!(temp.is_ok());
        let temp = temp.unwrap_or_else(|_| unreachable!());
        let sink = DailyFileLogSink::new(temp.path().join("nested").join("logs"));
        let timestamp = Utc
            .with_ymd_and_hms(2024, 1, 10, 9, 0, 0)
            .single()
            .unwrap_or_default();

        let first = LogLine::new(LogLevel::Setup, "directories ready", timestamp);
        let second = LogLine::new(LogLevel::Info, "GET / from 127.0.0.1", timestamp);
        assert!(sink.append(&first).await.is_ok());
        assert!(sink.append(&second).await.is_ok());

        let contents = tokio::fs::read_to_string(sink.root().join("2024-01-10.log")).await;
        assert!(contents.is_ok());
        assert_eq!(
            contents.unwrap_or_default(),
            "2024-01-10T09:00:00.000Z [SETUP] directories ready\n\
             2024-01-10T09:00:00.000Z [INFO] GET / from 127.0.0.1\n"
        );
    }

    #[tokio::test]
    async fn lines_go_to_the_file_of_their_own_date() {
        let temp = tempfile::tempdir();
        assert!(temp.is_ok());
        let temp = temp.unwrap_or_else(|_| unreachable!());
        let sink = DailyFileLogSink::new(temp.path());
        let before_midnight = Utc
            .with_ymd_and_hms(2024, 1, 10, 23, 59, 59)
            .single()
            .unwrap_or_default();
        let after_midnight = Utc
            .with_ymd_and_hms(2024, 1, 11, 0, 0, 0)
            .single()
            .unwrap_or_default();

        assert!(
            sink.append(&LogLine::new(LogLevel::Info, "late", before_midnight))
                .await
                .is_ok()
        );
        assert!(
            sink.append(&LogLine::new(LogLevel::Info, "early", after_midnight))
                .await
                .is_ok()
        );

        assert!(temp.path().join("2024-01-10.log").is_file());
        assert!(temp.path().join("2024-01-11.log").is_file());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_appends_never_interleave() {
        let temp = tempfile::tempdir();
        assert!(temp.is_ok());
        let temp = temp.unwrap_or_else(|_| unreachable!());
        let sink = Arc::new(DailyFileLogSink::new(temp.path()));
        let timestamp = Utc
            .with_ymd_and_hms(2024, 1, 10, 12, 0, 0)
            .single()
            .unwrap_or_default();

        let mut handles = Vec::new();
        for index in 0..64 {
            let sink = sink.clone();
            handles.push(tokio::spawn(async move {
                let message = format!("request {index} {}", "x".repeat(256));
                sink.append(&LogLine::new(LogLevel::Info, message, timestamp))
                    .await
            }));
        }
        for handle in handles {
            let joined = handle.await;
            assert!(matches!(joined, Ok(Ok(()))));
        }

        let contents = tokio::fs::read_to_string(temp.path().join("2024-01-10.log")).await;
        assert!(contents.is_ok());
        let contents = contents.unwrap_or_default();
        let lines: Vec<&str> = contents.lines().collect();
        assert_eq!(lines.len(), 64);
        for line in lines {
            assert!(line.starts_with("2024-01-10T12:00:00.000Z [INFO] request "));
            assert!(line.ends_with(&"x".repeat(256)));
        }
    }
}
