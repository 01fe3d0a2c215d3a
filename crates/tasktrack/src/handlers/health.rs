//! Health check endpoints.
//!
//! - `/livez` - Basic liveness probe (immediate 200, no checks)
//! - `/healthz` - Cache-aside counters (passive, no backend calls)

use axum::{extract::State, http::StatusCode, Json};
use serde::Serialize;

use tasktrack_core::cache::CacheStats;

use crate::state::AppState;

/// Body of `/healthz`.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    #[serde(flatten)]
    pub stats: CacheStats,
    pub hit_rate: f64,
}

/// GET /livez - Basic liveness probe.
#[axum::debug_handler]
pub async fn livez() -> StatusCode {
    StatusCode::OK
}

/// GET /healthz - Cache counters since startup.
#[axum::debug_handler]
pub async fn healthz(State(state): State<AppState>) -> Json<HealthResponse> {
    let stats = state.cache_stats();
    Json(HealthResponse {
        hit_rate: stats.hit_rate(),
        stats,
    })
}
