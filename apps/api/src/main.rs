//! logkeep API composition root.

#![forbid(unsafe_code)]

mod api_config;
mod api_router;
mod dto;
mod error;
mod handlers;
mod shutdown;
mod state;

use std::net::SocketAddr;
use std::sync::Arc;

use logkeep_application::{
    Clock, DailyLogWriter, MaintenanceScheduler, MaintenanceService, RetentionService,
};
use logkeep_core::AppError;
use logkeep_domain::{LogDirectories, LogLevel};
use logkeep_infrastructure::{
    ConsoleLogSink, DailyFileLogSink, FsRetentionStore, SystemClock, ensure_log_directories,
};
use tokio::sync::watch;
use tracing::{info, warn};

use crate::api_config::{ApiConfig, init_tracing};
use crate::api_router::build_router;
use crate::shutdown::shutdown_signal;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<(), AppError> {
    dotenvy::dotenv().ok();
    init_tracing();

    let config = ApiConfig::load()?;
    let address = config.socket_address()?;
    let directories = LogDirectories::new(config.log_dir.clone());

    ensure_log_directories(&directories).await?;

    let clock: Arc<dyn Clock> = Arc::new(SystemClock::new());
    let log_writer = DailyLogWriter::new(
        Arc::new(DailyFileLogSink::new(directories.root())),
        Arc::new(ConsoleLogSink::new()),
        clock.clone(),
    );
    log_writer
        .write(
            LogLevel::Setup,
            format!(
                "log directory {} and archive directory {} ready",
                directories.root().display(),
                directories.archive().display()
            ),
        )
        .await;

    let maintenance_service = MaintenanceService::new(
        RetentionService::with_entry_timeout(
            Arc::new(FsRetentionStore::new()),
            config.entry_timeout,
        ),
        directories.retention_rules(),
        clock.clone(),
        log_writer.clone(),
    );
    let scheduler = MaintenanceScheduler::new(Arc::new(maintenance_service), clock);
    let app_state = AppState {
        log_writer,
        scheduler_status: scheduler.subscribe(),
    };

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let run_on_start = config.run_maintenance_on_start;
    let scheduler_task = tokio::spawn(async move {
        if run_on_start {
            scheduler.tick().await;
        }
        scheduler.run(shutdown_rx).await;
    });

    let listener = tokio::net::TcpListener::bind(address)
        .await
        .map_err(|error| AppError::Internal(format!("failed to bind listener: {error}")))?;

    info!(
        %address,
        log_dir = %directories.root().display(),
        "logkeep-api listening"
    );

    let served = axum::serve(
        listener,
        build_router(app_state).into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await
    .map_err(|error| AppError::Internal(format!("api server error: {error}")));

    let _ = shutdown_tx.send(true);
    if let Err(error) = scheduler_task.await {
        warn!(error = %error, "maintenance scheduler task failed");
    }

    info!("logkeep-api stopped");
    served
}
