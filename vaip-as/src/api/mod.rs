//! HTTP API handlers for vaip-as

pub mod airports;
pub mod cache;
pub mod health;
pub mod live;

use axum::response::{IntoResponse, Response};
use serde::Serialize;

use crate::error::{ApiError, NOT_FOUND_MESSAGE};

pub use airports::{get_airport, get_airports};
pub use cache::clear_cache;
pub use health::health_check;
pub use live::{
    centre_status, controller_status, fir_boundaries, fir_by_name, regional_controllers,
};

/// `{success: true, data}`
#[derive(Debug, Serialize)]
pub struct DataResponse<T> {
    pub success: bool,
    pub data: T,
}

impl<T> DataResponse<T> {
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data,
        }
    }
}

/// `{success: true, count, data: [...]}`
#[derive(Debug, Serialize)]
pub struct ListResponse<T> {
    pub success: bool,
    pub count: usize,
    pub data: T,
}

impl<T> ListResponse<T> {
    pub fn ok(count: usize, data: T) -> Self {
        Self {
            success: true,
            count,
            data,
        }
    }
}

/// `{success: true, message}`
#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub success: bool,
    pub message: String,
}

impl MessageResponse {
    pub fn ok(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
        }
    }
}

/// Fallback for unknown paths and unsupported methods
pub async fn endpoint_not_found() -> Response {
    ApiError::NotFound(NOT_FOUND_MESSAGE.to_string()).into_response()
}
