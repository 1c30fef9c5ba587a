//! Health check endpoint

use axum::{extract::State, Json};
use chrono::Utc;
use serde::Serialize;

use crate::services::CacheStats;
use crate::AppState;

/// Module name reported by the health endpoint
pub const MODULE_NAME: &str = "vaip-as";

/// Health check response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub success: bool,
    pub message: String,
    pub module: String,
    /// Crate version from Cargo.toml
    pub version: String,
    /// Seconds since service started
    pub uptime_seconds: u64,
    #[serde(rename = "cacheStats")]
    pub cache_stats: CacheStats,
}

/// GET /api/health
pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    let uptime = Utc::now().signed_duration_since(state.startup_time);
    let uptime_seconds = uptime.num_seconds().max(0) as u64;

    Json(HealthResponse {
        success: true,
        message: "Airport service is running".to_string(),
        module: MODULE_NAME.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime_seconds,
        cache_stats: state.resolver.cache().stats().await,
    })
}
