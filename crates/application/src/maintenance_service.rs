//! One maintenance run: every retention rule, in order, with results written
//! back to the daily log.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use logkeep_domain::{LogLevel, RetentionRule};
use tracing::{info, warn};

use crate::log_ports::Clock;
use crate::log_writer_service::DailyLogWriter;
use crate::retention_service::{RetentionReport, RetentionService};

/// Work fired by the scheduler on each tick.
#[async_trait]
pub trait MaintenanceJob: Send + Sync {
    /// Runs one tick to completion. Never fails: problems are reported by
    /// the job itself.
    async fn run_tick(&self);
}

/// Result of one rule within a run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RuleOutcome {
    /// The directory was listed and every entry was handled or reported.
    Completed(RetentionReport),
    /// The directory could not be listed; the rule did nothing this run.
    Abandoned {
        /// Rule that was abandoned.
        rule: RetentionRule,
        /// Rendered listing error.
        error: String,
    },
}

/// An executed maintenance run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MaintenanceRun {
    /// Instant every file age was measured against.
    pub started_at: DateTime<Utc>,
    /// One outcome per rule, in execution order.
    pub outcomes: Vec<RuleOutcome>,
}

impl MaintenanceRun {
    /// Returns the number of per-entry failures plus abandoned rules.
    #[must_use]
    pub fn error_count(&self) -> usize {
        self.outcomes
            .iter()
            .map(|outcome| match outcome {
                RuleOutcome::Completed(report) => report.failures.len(),
                RuleOutcome::Abandoned { .. } => 1,
            })
            .sum()
    }
}

/// Application service applying the fixed retention rules.
#[derive(Clone)]
pub struct MaintenanceService {
    retention_service: RetentionService,
    rules: Vec<RetentionRule>,
    clock: Arc<dyn Clock>,
    log_writer: DailyLogWriter,
}

impl MaintenanceService {
    /// Creates a maintenance service applying `rules` in order.
    #[must_use]
    pub fn new(
        retention_service: RetentionService,
        rules: Vec<RetentionRule>,
        clock: Arc<dyn Clock>,
        log_writer: DailyLogWriter,
    ) -> Self {
        Self {
            retention_service,
            rules,
            clock,
            log_writer,
        }
    }

    /// Runs every rule with ages measured from the current time.
    pub async fn run(&self) -> MaintenanceRun {
        self.run_at(self.clock.now()).await
    }

    /// Runs every rule with ages measured from `started_at`.
    ///
    /// A rule that cannot list its directory does not stop the next rule.
    pub async fn run_at(&self, started_at: DateTime<Utc>) -> MaintenanceRun {
        info!(started_at = %started_at, rules = self.rules.len(), "maintenance run started");

        let mut outcomes = Vec::with_capacity(self.rules.len());
        for rule in &self.rules {
            let outcome = match self.retention_service.apply_rule(rule, started_at).await {
                Ok(report) => {
                    self.record_report(&report).await;
                    RuleOutcome::Completed(report)
                }
                Err(error) => {
                    warn!(
                        action = rule.action().as_str(),
                        directory = %rule.source_dir().display(),
                        error = %error,
                        "retention rule abandoned"
                    );
                    self.log_writer
                        .write(
                            LogLevel::Error,
                            format!(
                                "{} rule abandoned: failed to list {}: {error}",
                                rule.action().as_str(),
                                rule.source_dir().display()
                            ),
                        )
                        .await;
                    RuleOutcome::Abandoned {
                        rule: rule.clone(),
                        error: error.to_string(),
                    }
                }
            };
            outcomes.push(outcome);
        }

        let run = MaintenanceRun {
            started_at,
            outcomes,
        };
        info!(errors = run.error_count(), "maintenance run finished");
        run
    }

    async fn record_report(&self, report: &RetentionReport) {
        let action = report.rule.action().as_str();

        for target in &report.archived {
            self.log_writer
                .write(
                    LogLevel::Maintenance,
                    format!("archived {}", target.display()),
                )
                .await;
        }

        for path in &report.purged {
            self.log_writer
                .write(LogLevel::Maintenance, format!("purged {}", path.display()))
                .await;
        }

        for failure in &report.failures {
            warn!(
                action,
                operation = failure.operation.as_str(),
                path = %failure.path.display(),
                error = %failure.error,
                "retention entry failed"
            );
            self.log_writer
                .write(
                    LogLevel::Error,
                    format!(
                        "{action} rule failed to {} {}: {}",
                        failure.operation.as_str(),
                        failure.path.display(),
                        failure.error
                    ),
                )
                .await;
        }

        info!(
            action,
            directory = %report.rule.source_dir().display(),
            scanned = report.scanned,
            applied = report.applied(),
            not_yet_eligible = report.not_yet_eligible,
            failed = report.failures.len(),
            "retention rule applied"
        );
        self.log_writer
            .write(
                LogLevel::Maintenance,
                format!(
                    "{action} rule on {} (older than {} days): scanned={} archived={} purged={} not_yet_eligible={} skipped_directories={} vanished={} failed={}",
                    report.rule.source_dir().display(),
                    report.rule.threshold_days(),
                    report.scanned,
                    report.archived.len(),
                    report.purged.len(),
                    report.not_yet_eligible,
                    report.skipped_directories,
                    report.vanished,
                    report.failures.len()
                ),
            )
            .await;
    }
}

#[async_trait]
impl MaintenanceJob for MaintenanceService {
    async fn run_tick(&self) {
        self.run().await;
    }
}
