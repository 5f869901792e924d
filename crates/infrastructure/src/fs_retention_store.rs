//! Local filesystem adapter for the retention engine.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use logkeep_application::{RetentionStore, StoreEntry};
use logkeep_core::{AppError, AppResult};
use tokio::fs;
use tracing::debug;

/// Retention store backed by `tokio::fs`.
///
/// Moves never overwrite: the file is hard-linked under the destination
/// name first, which fails atomically when that name is taken, and the
/// source is unlinked only after the link exists.
#[derive(Debug, Clone, Copy, Default)]
pub struct FsRetentionStore;

impl FsRetentionStore {
    /// Creates a filesystem retention store.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl RetentionStore for FsRetentionStore {
    async fn list_entries(&self, directory: &Path) -> AppResult<Vec<StoreEntry>> {
        let mut reader = fs::read_dir(directory).await.map_err(|error| {
            AppError::from_io(format!("failed to list {}", directory.display()), &error)
        })?;

        let mut entries = Vec::new();
        while let Some(entry) = reader.next_entry().await.map_err(|error| {
            AppError::from_io(format!("failed to list {}", directory.display()), &error)
        })? {
            let path = entry.path();
            let is_dir = match entry.file_type().await {
                Ok(file_type) if file_type.is_symlink() => fs::metadata(&path)
                    .await
                    .map(|metadata| metadata.is_dir())
                    .unwrap_or(false),
                Ok(file_type) => file_type.is_dir(),
                Err(_) => false,
            };

            entries.push(StoreEntry {
                file_name: entry.file_name().to_string_lossy().into_owned(),
                path,
                is_dir,
            });
        }

        entries.sort_by(|left, right| left.file_name.cmp(&right.file_name));
        Ok(entries)
    }

    async fn modified_at(&self, path: &Path) -> AppResult<DateTime<Utc>> {
        let metadata = fs::metadata(path).await.map_err(|error| {
            AppError::from_io(format!("failed to stat {}", path.display()), &error)
        })?;
        let modified = metadata.modified().map_err(|error| {
            AppError::from_io(
                format!("failed to read modification time of {}", path.display()),
                &error,
            )
        })?;

        Ok(DateTime::<Utc>::from(modified))
    }

    async fn move_into(&self, path: &Path, destination_dir: &Path) -> AppResult<PathBuf> {
        let file_name = path.file_name().ok_or_else(|| {
            AppError::Validation(format!("{} has no file name", path.display()))
        })?;
        let target = destination_dir.join(file_name);

        match fs::hard_link(path, &target).await {
            Ok(()) => {
                fs::remove_file(path).await.map_err(|error| {
                    AppError::Io(format!(
                        "linked {} into {} but failed to remove the source: {error}",
                        path.display(),
                        target.display()
                    ))
                })?;
            }
            Err(error) if error.kind() == ErrorKind::AlreadyExists => {
                return Err(AppError::Conflict(format!(
                    "{} already exists, keeping {}",
                    target.display(),
                    path.display()
                )));
            }
            Err(error)
                if matches!(
                    error.kind(),
                    ErrorKind::Unsupported | ErrorKind::CrossesDevices | ErrorKind::PermissionDenied
                ) =>
            {
                debug!(
                    source = %path.display(),
                    error = %error,
                    "hard link unavailable, renaming instead"
                );
                rename_if_absent(path, &target).await?;
            }
            // A missing archive directory must not be mistaken for a vanished source.
            Err(error)
                if error.kind() == ErrorKind::NotFound
                    && fs::try_exists(path).await.unwrap_or(false) =>
            {
                return Err(AppError::Io(format!(
                    "failed to move {} into {}: {error}",
                    path.display(),
                    destination_dir.display()
                )));
            }
            Err(error) => {
                return Err(AppError::from_io(
                    format!("failed to move {} to {}", path.display(), target.display()),
                    &error,
                ));
            }
        }

        Ok(target)
    }

    async fn remove(&self, path: &Path) -> AppResult<()> {
        fs::remove_file(path).await.map_err(|error| {
            AppError::from_io(format!("failed to delete {}", path.display()), &error)
        })
    }
}

async fn rename_if_absent(path: &Path, target: &Path) -> AppResult<()> {
    let exists = fs::try_exists(target).await.map_err(|error| {
        AppError::from_io(format!("failed to check {}", target.display()), &error)
    })?;
    if exists {
        return Err(AppError::Conflict(format!(
            "{} already exists, keeping {}",
            target.display(),
            path.display()
        )));
    }

    fs::rename(path, target).await.map_err(|error| {
        AppError::from_io(
            format!("failed to move {} to {}", path.display(), target.display()),
            &error,
        )
    })
}

#[cfg(test)]
mod tests {
    use std::fs::File;
    use std::path::Path;
    use std::sync::Arc;
    use std::time::{Duration, SystemTime};

    use chrono::Utc;
    use logkeep_application::{EntryOperation, RetentionService, RetentionStore};
    use logkeep_core::AppError;
    use logkeep_domain::LogDirectories;

    use crate::ensure_log_directories;

    use super::FsRetentionStore;

    const DAY: Duration = Duration::from_secs(86_400);

    fn write_aged(path: &Path, contents: &str, age: Duration) {
        assert!(std::fs::write(path, contents).is_ok());
        let file = File::options().write(true).open(path);
        assert!(file.is_ok());
        let modified = SystemTime::now()
            .checked_sub(age)
            .unwrap_or(SystemTime::UNIX_EPOCH);
        assert!(
            file.unwrap_or_else(|_| unreachable!())
                .set_modified(modified)
                .is_ok()
        );
    }

    async fn layout() -> (tempfile::TempDir, LogDirectories) {
        let temp = tempfile::tempdir();
        assert!(temp.is_ok());
        let temp = temp.unwrap_or_else(|_| unreachable!());
        let directories = LogDirectories::new(temp.path().join("logs"));
        assert!(ensure_log_directories(&directories).await.is_ok());
        (temp, directories)
    }

    #[tokio::test]
    async fn lists_sorted_entries_and_flags_directories() {
        let (_temp, directories) = layout().await;
        write_aged(&directories.root().join("2024-01-10.log"), "b", DAY);
        write_aged(&directories.root().join("2024-01-01.log"), "a", DAY);

        let entries = FsRetentionStore::new()
            .list_entries(directories.root())
            .await;
        assert!(entries.is_ok());
        let entries = entries.unwrap_or_default();

        let names: Vec<(&str, bool)> = entries
            .iter()
            .map(|entry| (entry.file_name.as_str(), entry.is_dir))
            .collect();
        assert_eq!(
            names,
            vec![
                ("2024-01-01.log", false),
                ("2024-01-10.log", false),
                ("archive", true),
            ]
        );
    }

    #[tokio::test]
    async fn stat_of_missing_file_is_not_found() {
        let (_temp, directories) = layout().await;

        let result = FsRetentionStore::new()
            .modified_at(&directories.root().join("gone.log"))
            .await;
        assert!(matches!(result, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn move_into_never_overwrites_existing_archive_file() {
        let (_temp, directories) = layout().await;
        let source = directories.root().join("2024-01-01.log");
        let existing = directories.archive().join("2024-01-01.log");
        write_aged(&source, "fresh copy\n", 10 * DAY);
        write_aged(&existing, "archived copy\n", 11 * DAY);

        let result = FsRetentionStore::new()
            .move_into(&source, directories.archive())
            .await;

        assert!(matches!(result, Err(AppError::Conflict(_))));
        assert_eq!(
            std::fs::read_to_string(&source).unwrap_or_default(),
            "fresh copy\n"
        );
        assert_eq!(
            std::fs::read_to_string(&existing).unwrap_or_default(),
            "archived copy\n"
        );
    }

    #[tokio::test]
    async fn missing_archive_directory_is_an_error_not_a_vanish() {
        let (_temp, directories) = layout().await;
        let source = directories.root().join("2024-01-01.log");
        write_aged(&source, "keep me\n", 10 * DAY);
        assert!(std::fs::remove_dir(directories.archive()).is_ok());

        let result = FsRetentionStore::new()
            .move_into(&source, directories.archive())
            .await;

        assert!(matches!(result, Err(AppError::Io(_))));
        assert!(source.is_file());
    }

    #[tokio::test]
    async fn one_tick_archives_old_logs_and_purges_expired_archives() {
        let (_temp, directories) = layout().await;
        write_aged(&directories.root().join("2024-01-01.log"), "old\n", 10 * DAY);
        write_aged(&directories.root().join("2024-01-10.log"), "new\n", 2 * DAY);
        write_aged(&directories.archive().join("old.log"), "ancient\n", 200 * DAY);
        let service = RetentionService::new(Arc::new(FsRetentionStore::new()));
        let now = Utc::now();

        for rule in directories.retention_rules() {
            let report = service.apply_rule(&rule, now).await;
            assert!(report.is_ok());
            assert!(report.unwrap_or_else(|_| unreachable!()).is_clean());
        }

        assert!(directories.archive().join("2024-01-01.log").is_file());
        assert!(!directories.root().join("2024-01-01.log").exists());
        assert!(directories.root().join("2024-01-10.log").is_file());
        assert!(!directories.archive().join("old.log").exists());
        assert!(!directories.root().join("old.log").exists());
        assert!(directories.archive().is_dir());
    }

    #[tokio::test]
    async fn collision_is_reported_once_and_rerun_is_stable() {
        let (_temp, directories) = layout().await;
        write_aged(&directories.root().join("2024-01-01.log"), "a\n", 10 * DAY);
        write_aged(&directories.archive().join("2024-01-01.log"), "b\n", 10 * DAY);
        let service = RetentionService::new(Arc::new(FsRetentionStore::new()));
        let rule = directories.retention_rules().remove(0);

        for _ in 0..2 {
            let report = service.apply_rule(&rule, Utc::now()).await;
            assert!(report.is_ok());
            let report = report.unwrap_or_else(|_| unreachable!());
            assert_eq!(report.failures.len(), 1);
            assert_eq!(report.failures[0].operation, EntryOperation::Move);
        }

        assert!(directories.root().join("2024-01-01.log").is_file());
    }
}
