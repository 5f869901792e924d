use std::path::{Path, PathBuf};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use logkeep_core::AppResult;

/// One immediate child of a scanned directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreEntry {
    /// Full path of the entry.
    pub path: PathBuf,
    /// Final path component.
    pub file_name: String,
    /// Whether the entry is a directory.
    pub is_dir: bool,
}

/// Storage port used by the retention engine.
///
/// Operations on an entry that no longer exists must fail with
/// `AppError::NotFound`.
#[async_trait]
pub trait RetentionStore: Send + Sync {
    /// Lists the immediate entries of a directory, sorted by file name.
    async fn list_entries(&self, directory: &Path) -> AppResult<Vec<StoreEntry>>;

    /// Returns the last-modified time of a file.
    async fn modified_at(&self, path: &Path) -> AppResult<DateTime<Utc>>;

    /// Moves a file into `destination_dir` under the same name and returns
    /// the new path.
    ///
    /// Fails with `AppError::Conflict` when the destination name is taken,
    /// leaving the source in place.
    async fn move_into(&self, path: &Path, destination_dir: &Path) -> AppResult<PathBuf>;

    /// Deletes a file permanently.
    async fn remove(&self, path: &Path) -> AppResult<()>;
}
