//! Shared primitives for all Rust crates in logkeep.

#![forbid(unsafe_code)]

use std::io;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Result type used across logkeep crates.
pub type AppResult<T> = Result<T, AppError>;

/// A validated non-empty UTF-8 string.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NonEmptyString(String);

impl NonEmptyString {
    /// Creates a validated non-empty string.
    pub fn new(value: impl Into<String>) -> AppResult<Self> {
        let value = value.into();
        if value.trim().is_empty() {
            return Err(AppError::Validation(
                "value must not be empty or whitespace".to_owned(),
            ));
        }

        Ok(Self(value))
    }

    /// Returns the underlying string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl From<NonEmptyString> for String {
    fn from(value: NonEmptyString) -> Self {
        value.0
    }
}

/// Common application error categories.
#[derive(Debug, Error)]
pub enum AppError {
    /// Invalid input or violated invariant.
    #[error("validation error: {0}")]
    Validation(String),

    /// Requested resource does not exist.
    #[error("not found: {0}")]
    NotFound(String),

    /// Write operation conflicts with existing state.
    #[error("conflict: {0}")]
    Conflict(String),

    /// Filesystem or stream operation failed.
    #[error("io error: {0}")]
    Io(String),

    /// Operation did not finish within its time budget.
    #[error("timed out: {0}")]
    Timeout(String),

    /// Internal unexpected error.
    #[error("internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// Maps an I/O error into an application error, keeping the
    /// not-found and already-exists kinds distinguishable.
    #[must_use]
    pub fn from_io(context: impl AsRef<str>, error: &io::Error) -> Self {
        let message = format!("{}: {error}", context.as_ref());
        match error.kind() {
            io::ErrorKind::NotFound => Self::NotFound(message),
            io::ErrorKind::AlreadyExists => Self::Conflict(message),
            _ => Self::Io(message),
        }
    }

    /// Returns true when the error means the target no longer exists.
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }
}

#[cfg(test)]
mod tests {
    use std::io;

    use super::{AppError, NonEmptyString};

    #[test]
    fn non_empty_string_rejects_whitespace() {
        let result = NonEmptyString::new("   ");
        assert!(result.is_err());
    }

    #[test]
    fn io_not_found_maps_to_not_found() {
        let error = io::Error::new(io::ErrorKind::NotFound, "gone");
        let mapped = AppError::from_io("failed to stat logs/a.log", &error);
        assert!(mapped.is_not_found());
        assert_eq!(mapped.to_string(), "not found: failed to stat logs/a.log: gone");
    }

    #[test]
    fn io_already_exists_maps_to_conflict() {
        let error = io::Error::new(io::ErrorKind::AlreadyExists, "exists");
        let mapped = AppError::from_io("failed to move", &error);
        assert!(matches!(mapped, AppError::Conflict(_)));
    }

    #[test]
    fn io_permission_denied_maps_to_io() {
        let error = io::Error::new(io::ErrorKind::PermissionDenied, "denied");
        let mapped = AppError::from_io("failed to remove", &error);
        assert!(matches!(mapped, AppError::Io(_)));
    }
}
