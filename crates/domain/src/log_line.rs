//! Daily log line format and file naming.

use std::fmt::{Display, Formatter};

use chrono::{DateTime, NaiveDate, SecondsFormat, Utc};
use logkeep_core::{AppError, AppResult, NonEmptyString};

/// Extension used for every daily log file.
pub const LOG_FILE_EXTENSION: &str = "log";

/// Severity label written between brackets on each line.
///
/// The set is open: anything outside the well-known labels is kept as an
/// upper-cased custom label.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum LogLevel {
    /// Regular request traffic.
    Info,
    /// Failures reported through the log file.
    Error,
    /// Process startup events.
    Setup,
    /// Retention maintenance summaries.
    Maintenance,
    /// Any other upper-cased label.
    Custom(NonEmptyString),
}

impl LogLevel {
    /// Parses a level label, normalising it to upper case.
    pub fn parse(value: &str) -> AppResult<Self> {
        let normalized = value.trim().to_ascii_uppercase();
        match normalized.as_str() {
            "INFO" => Ok(Self::Info),
            "ERROR" => Ok(Self::Error),
            "SETUP" => Ok(Self::Setup),
            "MAINTENANCE" => Ok(Self::Maintenance),
            _ => {
                if normalized
                    .chars()
                    .any(|character| !(character.is_ascii_alphanumeric() || character == '_'))
                {
                    return Err(AppError::Validation(format!(
                        "log level '{value}' must contain only letters, digits or '_'"
                    )));
                }

                NonEmptyString::new(normalized).map(Self::Custom)
            }
        }
    }

    /// Returns the label as written to the log file.
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Info => "INFO",
            Self::Error => "ERROR",
            Self::Setup => "SETUP",
            Self::Maintenance => "MAINTENANCE",
            Self::Custom(label) => label.as_str(),
        }
    }
}

impl Display for LogLevel {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        formatter.write_str(self.as_str())
    }
}

/// One timestamped, leveled entry of a daily log file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogLine {
    timestamp: DateTime<Utc>,
    level: LogLevel,
    message: String,
}

impl LogLine {
    /// Creates a log line stamped at the given instant.
    #[must_use]
    pub fn new(level: LogLevel, message: impl Into<String>, timestamp: DateTime<Utc>) -> Self {
        Self {
            timestamp,
            level,
            message: message.into(),
        }
    }

    /// Returns the instant the entry was recorded.
    #[must_use]
    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    /// Returns the entry level.
    #[must_use]
    pub fn level(&self) -> &LogLevel {
        &self.level
    }

    /// Returns the raw, unescaped message.
    #[must_use]
    pub fn message(&self) -> &str {
        self.message.as_str()
    }

    /// Returns the UTC calendar date that selects the target file.
    #[must_use]
    pub fn date(&self) -> NaiveDate {
        self.timestamp.date_naive()
    }

    /// Returns the daily file name this entry belongs to.
    #[must_use]
    pub fn file_name(&self) -> String {
        daily_log_file_name(self.date())
    }

    /// Renders the entry as a single newline-terminated line.
    ///
    /// Embedded line breaks are escaped so one entry never spans two lines.
    #[must_use]
    pub fn render(&self) -> String {
        format!(
            "{} [{}] {}\n",
            self.timestamp.to_rfc3339_opts(SecondsFormat::Millis, true),
            self.level,
            escape_line_breaks(self.message.as_str())
        )
    }
}

/// Returns `YYYY-MM-DD.log` for the given date.
#[must_use]
pub fn daily_log_file_name(date: NaiveDate) -> String {
    format!("{}.{LOG_FILE_EXTENSION}", date.format("%Y-%m-%d"))
}

fn escape_line_breaks(message: &str) -> String {
    message.replace('\r', "\\r").replace('\n', "\\n")
}
