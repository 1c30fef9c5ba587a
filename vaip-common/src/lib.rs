//! # vAIP Common Library
//!
//! Shared code for the vAIP Morocco services:
//! - Canonical airport data model (AirportRecord, RunwayRecord, FrequencyBundle)
//! - The fixed list of Moroccan aerodromes served to the map
//! - Configuration loading (TOML bootstrap + config file discovery)
//! - Common error type

pub mod config;
pub mod error;
pub mod icao;
pub mod models;

pub use error::{Error, Result};
pub use models::{AirportRecord, RunwayRecord};
