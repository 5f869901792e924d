//! Retention rules for daily log files.

use std::path::{Path, PathBuf};

use chrono::{DateTime, NaiveDate, TimeDelta, Utc};

use crate::daily_log_file_name;

/// Days after which a root-level log file moves into the archive.
pub const ARCHIVE_AFTER_DAYS: u32 = 7;

/// Days after which an archived log file is deleted (six months).
pub const PURGE_AFTER_DAYS: u32 = 183;

/// Name of the archive subdirectory under the root log directory.
pub const ARCHIVE_DIR_NAME: &str = "archive";

/// What happens to a file once it passes the rule threshold.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RetentionAction {
    /// Rename the file into the destination directory, keeping its name.
    Archive {
        /// Directory receiving archived files.
        destination: PathBuf,
    },
    /// Delete the file permanently.
    Purge,
}

impl RetentionAction {
    /// Returns a short label used in logs and reports.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Archive { .. } => "archive",
            Self::Purge => "purge",
        }
    }
}

/// A directory, an age threshold in whole days, and the action applied to
/// files older than that threshold.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetentionRule {
    source_dir: PathBuf,
    threshold_days: u32,
    action: RetentionAction,
}

impl RetentionRule {
    /// Creates a rule archiving files of `source_dir` into `destination`.
    #[must_use]
    pub fn archive(
        source_dir: impl Into<PathBuf>,
        destination: impl Into<PathBuf>,
        threshold_days: u32,
    ) -> Self {
        Self {
            source_dir: source_dir.into(),
            threshold_days,
            action: RetentionAction::Archive {
                destination: destination.into(),
            },
        }
    }

    /// Creates a rule deleting files of `source_dir`.
    #[must_use]
    pub fn purge(source_dir: impl Into<PathBuf>, threshold_days: u32) -> Self {
        Self {
            source_dir: source_dir.into(),
            threshold_days,
            action: RetentionAction::Purge,
        }
    }

    /// Returns the scanned directory.
    #[must_use]
    pub fn source_dir(&self) -> &Path {
        self.source_dir.as_path()
    }

    /// Returns the threshold in whole days.
    #[must_use]
    pub fn threshold_days(&self) -> u32 {
        self.threshold_days
    }

    /// Returns the threshold as a duration.
    #[must_use]
    pub fn threshold(&self) -> TimeDelta {
        TimeDelta::days(i64::from(self.threshold_days))
    }

    /// Returns the action applied to eligible files.
    #[must_use]
    pub fn action(&self) -> &RetentionAction {
        &self.action
    }

    /// Returns true when a file last modified at `modified_at` is strictly
    /// older than the threshold at `now`.
    #[must_use]
    pub fn is_eligible(&self, now: DateTime<Utc>, modified_at: DateTime<Utc>) -> bool {
        now.signed_duration_since(modified_at) > self.threshold()
    }
}

/// Root and archive directories of the daily log store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogDirectories {
    root: PathBuf,
    archive: PathBuf,
}

impl LogDirectories {
    /// Creates the layout rooted at `root`, with the archive as a child.
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        let root = root.into();
        let archive = root.join(ARCHIVE_DIR_NAME);
        Self { root, archive }
    }

    /// Returns the directory receiving today's log file.
    #[must_use]
    pub fn root(&self) -> &Path {
        self.root.as_path()
    }

    /// Returns the archive directory.
    #[must_use]
    pub fn archive(&self) -> &Path {
        self.archive.as_path()
    }

    /// Returns the path of the daily log file for `date`.
    #[must_use]
    pub fn daily_log_path(&self, date: NaiveDate) -> PathBuf {
        self.root.join(daily_log_file_name(date))
    }

    /// Returns the fixed rules in execution order: archive, then purge.
    #[must_use]
    pub fn retention_rules(&self) -> Vec<RetentionRule> {
        vec![
            RetentionRule::archive(&self.root, &self.archive, ARCHIVE_AFTER_DAYS),
            RetentionRule::purge(&self.archive, PURGE_AFTER_DAYS),
        ]
    }
}
