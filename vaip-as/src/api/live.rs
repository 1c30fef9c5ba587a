//! Live network status endpoints (IVAO, openAIP)

use axum::extract::{Path, State};
use axum::Json;

use super::{DataResponse, ListResponse};
use crate::error::ApiResult;
use crate::services::{Airspace, AtcClient, ControllerStatus};
use crate::AppState;

/// GET /api/ivao/gmmm-ctr
pub async fn centre_status(State(state): State<AppState>) -> Json<DataResponse<ControllerStatus>> {
    Json(DataResponse::ok(state.ivao.centre_status().await))
}

/// GET /api/ivao/controller/:callsign
pub async fn controller_status(
    State(state): State<AppState>,
    Path(callsign): Path<String>,
) -> Json<DataResponse<ControllerStatus>> {
    Json(DataResponse::ok(state.ivao.controller_status(&callsign).await))
}

/// GET /api/ivao/controllers
pub async fn regional_controllers(
    State(state): State<AppState>,
) -> Json<ListResponse<Vec<AtcClient>>> {
    let controllers = state.ivao.regional_controllers().await;
    Json(ListResponse::ok(controllers.len(), controllers))
}

/// GET /api/airspace/firs
pub async fn fir_boundaries(
    State(state): State<AppState>,
) -> ApiResult<Json<ListResponse<Vec<Airspace>>>> {
    let firs = state.airspace.fir_boundaries().await?;
    Ok(Json(ListResponse::ok(firs.len(), firs)))
}

/// GET /api/airspace/fir/:name
///
/// `data` is null when no FIR matches.
pub async fn fir_by_name(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> ApiResult<Json<DataResponse<Option<Airspace>>>> {
    let fir = state.airspace.fir_by_name(&name).await?;
    Ok(Json(DataResponse::ok(fir)))
}
