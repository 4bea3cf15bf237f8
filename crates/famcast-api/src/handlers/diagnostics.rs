//! Read-only operational diagnostics.

use axum::Json;
use axum::extract::State;

use famcast_relay::engine::RelaySnapshot;

use crate::state::AppState;

/// GET /api/connections — current connections and active rooms.
pub async fn connections(State(state): State<AppState>) -> Json<RelaySnapshot> {
    Json(state.engine.snapshot())
}
