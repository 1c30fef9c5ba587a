//! Common error types for vAIP

use thiserror::Error;

/// Common result type for vAIP operations
pub type Result<T> = std::result::Result<T, Error>;

/// Common error types across vAIP services
#[derive(Error, Debug)]
pub enum Error {
    /// JSON (de)serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Configuration loading or validation error
    #[error("Configuration error: {0}")]
    Config(String),
}
