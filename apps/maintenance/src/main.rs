//! logkeep one-shot maintenance runner.
//!
//! Applies the archive and purge rules once against the configured log
//! directory and exits. Used to re-run a tick by hand; the API process
//! schedules the same work at every UTC midnight.

#![forbid(unsafe_code)]

use std::env;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use logkeep_application::{
    Clock, DEFAULT_ENTRY_TIMEOUT, DailyLogWriter, MaintenanceService, RetentionService,
    RuleOutcome,
};
use logkeep_core::{AppError, AppResult};
use logkeep_domain::LogDirectories;
use logkeep_infrastructure::{
    ConsoleLogSink, DailyFileLogSink, FsRetentionStore, SystemClock, ensure_log_directories,
};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Clone)]
struct MaintenanceConfig {
    log_dir: PathBuf,
    entry_timeout: Duration,
}

#[tokio::main]
async fn main() -> Result<(), AppError> {
    dotenvy::dotenv().ok();
    init_tracing();

    let config = MaintenanceConfig::load()?;
    let directories = LogDirectories::new(config.log_dir.clone());
    ensure_log_directories(&directories).await?;

    let clock: Arc<dyn Clock> = Arc::new(SystemClock::new());
    let log_writer = DailyLogWriter::new(
        Arc::new(DailyFileLogSink::new(directories.root())),
        Arc::new(ConsoleLogSink::new()),
        clock.clone(),
    );
    let maintenance_service = MaintenanceService::new(
        RetentionService::with_entry_timeout(
            Arc::new(FsRetentionStore::new()),
            config.entry_timeout,
        ),
        directories.retention_rules(),
        clock,
        log_writer,
    );

    info!(
        log_dir = %directories.root().display(),
        entry_timeout_ms = config.entry_timeout.as_millis(),
        "logkeep-maintenance started"
    );

    let run = maintenance_service.run().await;
    for outcome in &run.outcomes {
        match outcome {
            RuleOutcome::Completed(report) => info!(
                rule = %report.rule.action().as_str(),
                source = %report.rule.source_dir().display(),
                applied = report.applied(),
                failures = report.failures.len(),
                "rule completed"
            ),
            RuleOutcome::Abandoned { rule, error } => warn!(
                rule = %rule.action().as_str(),
                source = %rule.source_dir().display(),
                error = %error,
                "rule abandoned"
            ),
        }
    }

    let error_count = run.error_count();
    if error_count > 0 {
        return Err(AppError::Internal(format!(
            "maintenance run started at {} finished with {error_count} error(s)",
            run.started_at.to_rfc3339()
        )));
    }

    info!(started_at = %run.started_at, "logkeep-maintenance finished");
    Ok(())
}

impl MaintenanceConfig {
    fn load() -> AppResult<Self> {
        let log_dir = env::var("LOGKEEP_LOG_DIR")
            .ok()
            .map(|value| value.trim().to_owned())
            .filter(|value| !value.is_empty())
            .map_or_else(|| PathBuf::from("./logs"), PathBuf::from);
        let entry_timeout_secs =
            parse_env_u64("LOGKEEP_ENTRY_TIMEOUT_SECS", DEFAULT_ENTRY_TIMEOUT.as_secs())?;

        if entry_timeout_secs == 0 {
            return Err(AppError::Validation(
                "LOGKEEP_ENTRY_TIMEOUT_SECS must be greater than zero".to_owned(),
            ));
        }

        Ok(Self {
            log_dir,
            entry_timeout: Duration::from_secs(entry_timeout_secs),
        })
    }
}

fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .compact()
        .init();
}

fn parse_env_u64(name: &str, default: u64) -> AppResult<u64> {
    match env::var(name) {
        Ok(value) if value.trim().is_empty() => Ok(default),
        Ok(value) => value.trim().parse::<u64>().map_err(|error| {
            AppError::Validation(format!("invalid {name} value '{value}': {error}"))
        }),
        Err(_) => Ok(default),
    }
}
