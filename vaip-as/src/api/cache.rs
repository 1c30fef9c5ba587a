//! Cache administration

use axum::extract::State;
use axum::Json;
use tracing::info;

use super::MessageResponse;
use crate::AppState;

/// POST /api/cache/clear
pub async fn clear_cache(State(state): State<AppState>) -> Json<MessageResponse> {
    let removed = state.resolver.cache().clear_all().await;
    info!(removed, "Airport cache cleared");
    Json(MessageResponse::ok("Cache cleared"))
}
