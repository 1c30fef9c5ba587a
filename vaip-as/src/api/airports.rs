//! Airport endpoints
//!
//! Resolution never fails at the HTTP level: an airport that could not be
//! fetched comes back with HTTP 200 and an `error` field in `data`.

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::Json;
use vaip_common::models::AirportRecord;

use super::{DataResponse, ListResponse};
use crate::AppState;

/// GET /api/airport/:code
pub async fn get_airport(
    State(state): State<AppState>,
    Path(code): Path<String>,
) -> Json<DataResponse<Arc<AirportRecord>>> {
    let record = state.resolver.resolve(&code).await;
    Json(DataResponse::ok(record))
}

/// GET /api/airports
///
/// Every configured aerodrome, in configured order.
pub async fn get_airports(
    State(state): State<AppState>,
) -> Json<ListResponse<Arc<Vec<AirportRecord>>>> {
    let records = state.resolver.resolve_all(&state.airports).await;
    Json(ListResponse::ok(records.len(), records))
}
