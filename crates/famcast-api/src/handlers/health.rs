//! Health check handlers.

use axum::Json;
use axum::extract::State;
use serde::{Deserialize, Serialize};

use famcast_relay::metrics::MetricsSnapshot;

use crate::state::AppState;

/// Basic health response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    /// Always `"ok"` while the process serves requests.
    pub status: String,
    /// Server version.
    pub version: String,
}

/// Detailed health response with relay counters.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DetailedHealthResponse {
    /// Always `"ok"` while the process serves requests.
    pub status: String,
    /// Total live WebSocket connections.
    pub ws_connections: usize,
    /// Active pairing channels.
    pub active_rooms: usize,
    /// Relay metrics counters.
    pub metrics: MetricsSnapshot,
}

/// GET /api/health
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// GET /api/health/detailed
pub async fn health_detailed(State(state): State<AppState>) -> Json<DetailedHealthResponse> {
    Json(DetailedHealthResponse {
        status: "ok".to_string(),
        ws_connections: state.engine.directory.len(),
        active_rooms: state.engine.channels.channel_count(),
        metrics: state.engine.metrics_snapshot(),
    })
}
