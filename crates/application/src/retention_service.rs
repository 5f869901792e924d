//! Retention policy engine.
//!
//! Applies one [`RetentionRule`] to a materialised snapshot of its source
//! directory. Each entry is handled independently: a failing stat, move or
//! delete is captured in the [`RetentionReport`] and the scan continues.
//! Entries that disappear between listing and handling are counted as
//! vanished rather than failed.

use std::future::Future;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use logkeep_core::{AppError, AppResult};
use logkeep_domain::{RetentionAction, RetentionRule};
use tracing::debug;

use crate::retention_ports::{RetentionStore, StoreEntry};

/// Default cap for a single listing, stat, move or delete.
pub const DEFAULT_ENTRY_TIMEOUT: Duration = Duration::from_secs(30);

/// Filesystem operation attempted on an entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryOperation {
    /// Reading the last-modified time.
    Stat,
    /// Renaming into the archive.
    Move,
    /// Permanent deletion.
    Delete,
}

impl EntryOperation {
    /// Returns the verb used in log messages.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Stat => "stat",
            Self::Move => "move",
            Self::Delete => "delete",
        }
    }
}

/// A single entry the engine could not process.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntryFailure {
    /// Path of the failing entry.
    pub path: PathBuf,
    /// Operation that failed.
    pub operation: EntryOperation,
    /// Rendered error.
    pub error: String,
}

/// Outcome of applying one rule to its directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetentionReport {
    /// Rule that produced this report.
    pub rule: RetentionRule,
    /// Entries present in the listing snapshot.
    pub scanned: usize,
    /// Destination paths of archived files.
    pub archived: Vec<PathBuf>,
    /// Paths of purged files.
    pub purged: Vec<PathBuf>,
    /// Directories left untouched.
    pub skipped_directories: usize,
    /// Files at or under the threshold.
    pub not_yet_eligible: usize,
    /// Files that disappeared mid-scan.
    pub vanished: usize,
    /// Per-entry failures.
    pub failures: Vec<EntryFailure>,
}

impl RetentionReport {
    fn new(rule: RetentionRule, scanned: usize) -> Self {
        Self {
            rule,
            scanned,
            archived: Vec::new(),
            purged: Vec::new(),
            skipped_directories: 0,
            not_yet_eligible: 0,
            vanished: 0,
            failures: Vec::new(),
        }
    }

    /// Returns true when no entry failed.
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }

    /// Returns the number of files archived or purged.
    #[must_use]
    pub fn applied(&self) -> usize {
        self.archived.len() + self.purged.len()
    }

    fn fail(&mut self, entry: &StoreEntry, operation: EntryOperation, error: &AppError) {
        self.failures.push(EntryFailure {
            path: entry.path.clone(),
            operation,
            error: error.to_string(),
        });
    }
}

/// Application service applying retention rules through a store port.
#[derive(Clone)]
pub struct RetentionService {
    store: Arc<dyn RetentionStore>,
    entry_timeout: Duration,
}

impl RetentionService {
    /// Creates a retention service with the default per-entry timeout.
    #[must_use]
    pub fn new(store: Arc<dyn RetentionStore>) -> Self {
        Self::with_entry_timeout(store, DEFAULT_ENTRY_TIMEOUT)
    }

    /// Creates a retention service with an explicit per-entry timeout.
    #[must_use]
    pub fn with_entry_timeout(store: Arc<dyn RetentionStore>, entry_timeout: Duration) -> Self {
        Self {
            store,
            entry_timeout,
        }
    }

    /// Applies `rule` with ages measured against `now`.
    ///
    /// Only a failure to list the source directory is returned as an error;
    /// everything after the listing is reported per entry.
    pub async fn apply_rule(
        &self,
        rule: &RetentionRule,
        now: DateTime<Utc>,
    ) -> AppResult<RetentionReport> {
        let entries = self
            .bounded(
                "list",
                rule.source_dir(),
                self.store.list_entries(rule.source_dir()),
            )
            .await?;

        let mut report = RetentionReport::new(rule.clone(), entries.len());

        for entry in &entries {
            if entry.is_dir {
                report.skipped_directories += 1;
                continue;
            }

            let modified_at = match self
                .bounded("stat", &entry.path, self.store.modified_at(&entry.path))
                .await
            {
                Ok(modified_at) => modified_at,
                Err(error) if error.is_not_found() => {
                    report.vanished += 1;
                    continue;
                }
                Err(error) => {
                    report.fail(entry, EntryOperation::Stat, &error);
                    continue;
                }
            };

            if !rule.is_eligible(now, modified_at) {
                report.not_yet_eligible += 1;
                continue;
            }

            match rule.action() {
                RetentionAction::Archive { destination } => {
                    match self
                        .bounded(
                            "move",
                            &entry.path,
                            self.store.move_into(&entry.path, destination),
                        )
                        .await
                    {
                        Ok(target) => {
                            debug!(
                                source = %entry.path.display(),
                                target = %target.display(),
                                "archived log file"
                            );
                            report.archived.push(target);
                        }
                        Err(error) if error.is_not_found() => report.vanished += 1,
                        Err(error) => report.fail(entry, EntryOperation::Move, &error),
                    }
                }
                RetentionAction::Purge => {
                    match self
                        .bounded("delete", &entry.path, self.store.remove(&entry.path))
                        .await
                    {
                        Ok(()) => {
                            debug!(path = %entry.path.display(), "purged log file");
                            report.purged.push(entry.path.clone());
                        }
                        Err(error) if error.is_not_found() => report.vanished += 1,
                        Err(error) => report.fail(entry, EntryOperation::Delete, &error),
                    }
                }
            }
        }

        Ok(report)
    }

    async fn bounded<T>(
        &self,
        operation: &str,
        path: &Path,
        future: impl Future<Output = AppResult<T>>,
    ) -> AppResult<T> {
        match tokio::time::timeout(self.entry_timeout, future).await {
            Ok(result) => result,
            Err(_) => Err(AppError::Timeout(format!(
                "{operation} of {} exceeded {} ms",
                path.display(),
                self.entry_timeout.as_millis()
            ))),
        }
    }
}
