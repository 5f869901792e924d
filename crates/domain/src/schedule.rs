//! Wall-clock anchoring of the daily maintenance tick.

use std::time::Duration;

use chrono::{DateTime, Days, Utc};
use serde::{Deserialize, Serialize};

/// Lifecycle of the maintenance scheduler.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MaintenanceState {
    /// Waiting for the next tick.
    Idle,
    /// A tick is applying retention rules.
    Running,
}

impl MaintenanceState {
    /// Returns the serialized label.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Running => "running",
        }
    }
}

/// Returns the first 00:00 UTC strictly after `after`.
///
/// Returns `None` only at the end of the representable calendar.
#[must_use]
pub fn next_midnight_utc(after: DateTime<Utc>) -> Option<DateTime<Utc>> {
    after
        .date_naive()
        .checked_add_days(Days::new(1))?
        .and_hms_opt(0, 0, 0)
        .map(|midnight| midnight.and_utc())
}

/// Returns how long to wait from `now` until `target`, zero if it passed.
#[must_use]
pub fn delay_until(now: DateTime<Utc>, target: DateTime<Utc>) -> Duration {
    target
        .signed_duration_since(now)
        .to_std()
        .unwrap_or(Duration::ZERO)
}
