//! Health check handlers.

use axum::Json;
use axum::extract::State;

use crate::dto::response::HealthResponse;
use crate::state::AppState;

/// GET /api/health
pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    let store_ok = state.snapshots.health_check().await.unwrap_or(false);
    Json(HealthResponse {
        status: if store_ok { "ok" } else { "degraded" }.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        store: if store_ok { "connected" } else { "unreachable" }.to_string(),
    })
}
