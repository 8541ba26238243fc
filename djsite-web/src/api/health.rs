//! Health check endpoint

use axum::{extract::State, routing::get, Json, Router};
use serde::Serialize;

use crate::AppContext;

/// Health check response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub module: String,
    pub version: String,
    pub git_hash: String,
    pub uptime_seconds: u64,
    pub sets: usize,
}

/// GET /health
///
/// Reports `degraded` when the set store cannot be read.
pub async fn health_check(State(ctx): State<AppContext>) -> Json<HealthResponse> {
    let (status, sets) = match ctx.store.count().await {
        Ok(count) => ("ok", count),
        Err(e) => {
            tracing::warn!("Health check: set store unavailable: {}", e);
            ("degraded", 0)
        }
    };

    Json(HealthResponse {
        status: status.to_string(),
        module: "djsite-web".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        git_hash: env!("GIT_HASH").to_string(),
        uptime_seconds: ctx.startup_time.elapsed().as_secs(),
        sets,
    })
}

pub fn health_routes() -> Router<AppContext> {
    Router::new().route("/health", get(health_check))
}
