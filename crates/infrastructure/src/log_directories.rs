use logkeep_core::{AppError, AppResult};
use logkeep_domain::LogDirectories;
use tokio::fs;

/// Creates the root and archive directories, parents included.
///
/// Succeeds when they already exist.
pub async fn ensure_log_directories(directories: &LogDirectories) -> AppResult<()> {
    for directory in [directories.root(), directories.archive()] {
        fs::create_dir_all(directory).await.map_err(|error| {
            AppError::from_io(
                format!("failed to create log directory {}", directory.display()),
                &error,
            )
        })?;
    }

    Ok(())
}
