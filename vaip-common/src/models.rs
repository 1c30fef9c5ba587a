//! Canonical airport data model
//!
//! Records are serialized with the field names the map frontend reads
//! (`icao`, `elevation_m`, `lighting`, `all_frequencies`, ...).

use serde::Serialize;
use serde_json::Value;

/// Feet to metres conversion factor
pub const METERS_PER_FOOT: f64 = 0.3048;

/// Convert a length in feet to whole metres
pub fn feet_to_meters(feet: i64) -> i64 {
    (feet as f64 * METERS_PER_FOOT).round() as i64
}

/// Enriched airport record served to the frontend
///
/// A degraded record (failed fetch) carries no details and serializes as
/// `{icao, runways: [], error}`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AirportRecord {
    /// ICAO location identifier (uppercase)
    pub icao: String,
    /// Identity, geometry and classification; absent on degraded records
    #[serde(flatten)]
    pub details: Option<AirportDetails>,
    /// Runways in upstream order
    pub runways: Vec<RunwayRecord>,
    /// Failure message when the record could not be resolved
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl AirportRecord {
    /// Minimal record standing in for an airport that could not be resolved
    pub fn failed(icao: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            icao: icao.into(),
            details: None,
            runways: Vec::new(),
            error: Some(error.into()),
        }
    }

    /// True when the record represents a failed fetch
    pub fn is_degraded(&self) -> bool {
        self.error.is_some()
    }

    /// Reported country code, if the record has details
    pub fn country(&self) -> Option<&str> {
        self.details.as_ref().map(|d| d.country.as_str())
    }
}

/// Everything a resolved airport record carries besides its code and runways
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AirportDetails {
    /// IATA code (3 letters) when the airport has one
    pub iata: Option<String>,
    pub name: Option<String>,
    /// Municipality served
    pub city: Option<String>,
    /// Always [`crate::icao::COUNTRY_CODE`]
    pub country: String,
    /// Degrees, WGS84
    pub latitude: Option<f64>,
    /// Degrees, WGS84
    pub longitude: Option<f64>,
    pub elevation_ft: Option<i64>,
    /// Derived from `elevation_ft`
    pub elevation_m: Option<i64>,
    #[serde(rename = "type")]
    pub category: AirportCategory,
    pub scheduled_service: bool,
    pub frequencies: FrequencyBundle,
    /// Navigation aids, passed through untouched
    pub navaids: Vec<Value>,
    #[serde(flatten)]
    pub links: AirportLinks,
}

/// Airport size classification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum AirportCategory {
    #[serde(rename = "large_airport")]
    Large,
    #[serde(rename = "medium_airport")]
    Medium,
    #[serde(rename = "small_airport")]
    Small,
    #[serde(rename = "other")]
    Other,
}

impl AirportCategory {
    /// Map the upstream `type` field
    pub fn from_raw(raw: Option<&str>) -> Self {
        match raw.map(str::trim) {
            Some("large_airport") => AirportCategory::Large,
            Some("medium_airport") => AirportCategory::Medium,
            Some("small_airport") => AirportCategory::Small,
            _ => AirportCategory::Other,
        }
    }
}

/// Reference links shown in the airport panel
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct AirportLinks {
    pub wikipedia_link: Option<String>,
    pub home_link: Option<String>,
}

/// Normalized runway
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RunwayRecord {
    /// `le_ident/he_ident`, e.g. `17L/35R`
    pub identifier: String,
    pub length_m: Option<i64>,
    pub length_ft: Option<i64>,
    pub width_m: Option<i64>,
    pub width_ft: Option<i64>,
    /// Human-readable surface (`Asphalt`, `Concrete`, or the raw code)
    pub surface: Option<String>,
    pub lighting: bool,
    pub closed: bool,
    pub le_ident: Option<String>,
    pub he_ident: Option<String>,
    /// True heading in degrees
    pub le_heading: Option<f64>,
    pub he_heading: Option<f64>,
    pub le_elevation_ft: Option<i64>,
    pub he_elevation_ft: Option<i64>,
    /// Instrument landing system descriptor, opaque
    pub le_ils: Option<Value>,
    pub he_ils: Option<Value>,
}

/// Primary frequency per service plus the full raw list
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct FrequencyBundle {
    pub tower: Option<String>,
    pub ground: Option<String>,
    pub approach: Option<String>,
    pub atis: Option<String>,
    pub unicom: Option<String>,
    /// Raw `{type, frequency_mhz, ...}` entries in source order
    pub all_frequencies: Vec<Value>,
}
