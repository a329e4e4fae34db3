use axum::extract::State;
use axum::Json;
use serde::Serialize;

use super::AppState;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthReport {
    pub status: &'static str,
    pub mode: &'static str,
    pub started_at: chrono::DateTime<chrono::Utc>,
    pub uptime_seconds: u64,
    pub active_sessions: usize,
}

/// Handler for `GET /health`: uptime and the number of live sessions.
pub async fn health(State(state): State<AppState>) -> Json<HealthReport> {
    Json(HealthReport {
        status: "ok",
        mode: state.mode.as_str(),
        started_at: state.started_at,
        uptime_seconds: state.started.elapsed().as_secs(),
        active_sessions: state.sessions.len().await,
    })
}
