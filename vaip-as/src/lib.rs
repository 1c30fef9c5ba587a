//! vaip-as library - Airport Service
//!
//! Enrichment proxy between AirportDB and the vAIP map: resolves Moroccan
//! aerodromes (upstream + local fallback + TTL cache) and relays the live
//! IVAO and openAIP status the map overlays.

use std::any::Any;
use std::sync::Arc;

use axum::http::HeaderValue;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::Router;
use chrono::{DateTime, Utc};
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::cors::{self, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::warn;

pub mod api;
pub mod config;
pub mod error;
pub mod services;

use error::ApiError;
use services::{AirportResolver, AirspaceService, IvaoService};

/// Application state shared across HTTP handlers
#[derive(Clone)]
pub struct AppState {
    pub resolver: Arc<AirportResolver>,
    pub ivao: Arc<IvaoService>,
    pub airspace: Arc<AirspaceService>,
    /// Codes served by `/api/airports`, in display order
    pub airports: Arc<Vec<String>>,
    /// Used for uptime in the health response
    pub startup_time: DateTime<Utc>,
}

impl AppState {
    pub fn new(
        resolver: Arc<AirportResolver>,
        ivao: Arc<IvaoService>,
        airspace: Arc<AirspaceService>,
        airports: Vec<String>,
    ) -> Self {
        Self {
            resolver,
            ivao,
            airspace,
            airports: Arc::new(airports),
            startup_time: Utc::now(),
        }
    }
}

/// Build application router
///
/// All endpoints live under `/api`. Unknown paths and unsupported methods
/// both answer 404 with the JSON envelope.
pub fn build_router(state: AppState, cors_origins: &[String]) -> Router {
    let not_found = api::endpoint_not_found;

    let routes = Router::new()
        .route("/airport/:code", get(api::get_airport).fallback(not_found))
        .route("/airports", get(api::get_airports).fallback(not_found))
        .route("/health", get(api::health_check).fallback(not_found))
        .route("/cache/clear", post(api::clear_cache).fallback(not_found))
        .route("/ivao/gmmm-ctr", get(api::centre_status).fallback(not_found))
        .route(
            "/ivao/controller/:callsign",
            get(api::controller_status).fallback(not_found),
        )
        .route(
            "/ivao/controllers",
            get(api::regional_controllers).fallback(not_found),
        )
        .route("/airspace/firs", get(api::fir_boundaries).fallback(not_found))
        .route("/airspace/fir/:name", get(api::fir_by_name).fallback(not_found));

    Router::new()
        .nest("/api", routes)
        .fallback(not_found)
        .layer(CatchPanicLayer::custom(handle_panic))
        .layer(cors_layer(cors_origins))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// CORS restricted to the configured frontend origins
pub fn cors_layer(origins: &[String]) -> CorsLayer {
    let allowed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                warn!(origin = %origin, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(allowed)
        .allow_methods(cors::Any)
        .allow_headers(cors::Any)
}

fn handle_panic(err: Box<dyn Any + Send + 'static>) -> Response {
    let detail = if let Some(s) = err.downcast_ref::<String>() {
        s.clone()
    } else if let Some(s) = err.downcast_ref::<&str>() {
        s.to_string()
    } else {
        "unknown panic".to_string()
    };

    ApiError::Internal(detail).into_response()
}
