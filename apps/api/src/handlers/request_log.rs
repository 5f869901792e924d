use std::net::SocketAddr;

use axum::extract::{ConnectInfo, State};
use axum::http::{Method, Uri};
use logkeep_domain::LogLevel;

use crate::state::AppState;

pub const REQUEST_LOGGED_BODY: &str = "Request logged.\n";

/// Answers immediately; the INFO entry is written in the background.
pub async fn request_log_handler(
    State(state): State<AppState>,
    ConnectInfo(peer): ConnectInfo<SocketAddr>,
    method: Method,
    uri: Uri,
) -> &'static str {
    let message = format!("{method} {} from {}", uri.path(), peer.ip());
    let log_writer = state.log_writer;

    tokio::spawn(async move {
        log_writer.write(LogLevel::Info, message).await;
    });

    REQUEST_LOGGED_BODY
}
