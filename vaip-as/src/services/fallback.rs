//! Local fallback dataset
//!
//! Airports AirportDB cannot serve are recorded locally in the upstream
//! raw shape. The table is loaded once at startup and never modified.

use crate::services::normalizer::RawAirport;
use std::collections::HashMap;
use std::path::Path;
use tracing::info;
use vaip_common::icao::normalize_code;
use vaip_common::{Error, Result};

/// Fallback dataset compiled into the binary
const BUILTIN_FALLBACK: &str = include_str!("../../data/missing-airports.json");

/// Immutable ICAO → raw airport mapping
#[derive(Debug, Clone, Default)]
pub struct FallbackTable {
    entries: HashMap<String, RawAirport>,
}

impl FallbackTable {
    /// Table with no entries (every code goes upstream)
    pub fn empty() -> Self {
        Self::default()
    }

    /// The dataset shipped with the service
    pub fn builtin() -> Result<Self> {
        Self::from_json(BUILTIN_FALLBACK)
    }

    /// Parse a JSON object keyed by ICAO code
    pub fn from_json(json: &str) -> Result<Self> {
        let parsed: HashMap<String, RawAirport> = serde_json::from_str(json)?;

        let entries = parsed
            .into_iter()
            .map(|(code, raw)| (normalize_code(&code), raw))
            .collect();

        Ok(Self { entries })
    }

    /// Load a replacement dataset from disk
    pub fn load(path: &Path) -> Result<Self> {
        let json = std::fs::read_to_string(path).map_err(|e| {
            Error::Config(format!("Read fallback table {} failed: {}", path.display(), e))
        })?;
        let table = Self::from_json(&json)?;
        info!(
            entries = table.len(),
            "Loaded fallback table from {}",
            path.display()
        );
        Ok(table)
    }

    /// Built-in table, or the file named in configuration
    pub fn from_config(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::load(path),
            None => Self::builtin(),
        }
    }

    /// Raw entry for a code (case-insensitive)
    pub fn get(&self, code: &str) -> Option<&RawAirport> {
        self.entries.get(&normalize_code(code))
    }

    pub fn contains(&self, code: &str) -> bool {
        self.get(code).is_some()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Covered codes, sorted
    pub fn codes(&self) -> Vec<String> {
        let mut codes: Vec<String> = self.entries.keys().cloned().collect();
        codes.sort();
        codes
    }
}
