use axum::Json;
use axum::extract::State;

use crate::dto::HealthResponse;
use crate::state::AppState;

pub async fn health_handler(State(state): State<AppState>) -> Json<HealthResponse> {
    let maintenance = *state.scheduler_status.borrow();

    Json(HealthResponse {
        status: "ok",
        maintenance: maintenance.into(),
    })
}
