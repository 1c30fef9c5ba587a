//! Test Helper Utilities
//!
//! Mock upstream and live-feed sources for vaip-as integration tests.
//! Each mock counts calls so tests can assert when the network was (or was
//! not) consulted.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use serde_json::{json, Value};
use vaip_as::services::{
    AirportCache, AirportResolver, AirportSource, Airspace, AirspaceService, AirspaceSource,
    BatchSettings, FallbackTable, IvaoService, LiveFeedError, RawAirport, SourceError, Whazzup,
    WhazzupSource,
};
use vaip_as::AppState;
use vaip_common::config::{IvaoConfig, OpenAipConfig};

// ============================================================================
// AirportDB mock
// ============================================================================

/// Scripted AirportDB stand-in
///
/// Known codes answer with their JSON body; unknown codes answer 404 unless
/// `answer_everything` is set, in which case a minimal airport is made up.
pub struct MockAirportSource {
    airports: HashMap<String, Value>,
    answer_everything: bool,
    latency: Duration,
    calls: AtomicUsize,
    calls_by_code: Mutex<HashMap<String, usize>>,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
}

impl MockAirportSource {
    pub fn new() -> Self {
        Self {
            airports: HashMap::new(),
            answer_everything: false,
            latency: Duration::ZERO,
            calls: AtomicUsize::new(0),
            calls_by_code: Mutex::new(HashMap::new()),
            in_flight: AtomicUsize::new(0),
            max_in_flight: AtomicUsize::new(0),
        }
    }

    /// Answer any code with a generated airport
    pub fn answering_everything() -> Self {
        Self {
            answer_everything: true,
            ..Self::new()
        }
    }

    pub fn with_airport(mut self, code: &str, body: Value) -> Self {
        self.airports.insert(code.to_string(), body);
        self
    }

    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn calls_for(&self, code: &str) -> usize {
        self.calls_by_code
            .lock()
            .unwrap()
            .get(code)
            .copied()
            .unwrap_or(0)
    }

    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }

    fn body_for(&self, icao: &str) -> Option<Value> {
        let known = self.airports.get(icao).cloned();
        known.or_else(|| {
            self.answer_everything
                .then(|| json!({"ident": icao, "name": format!("Airport {}", icao)}))
        })
    }
}

#[async_trait]
impl AirportSource for MockAirportSource {
    fn name(&self) -> &'static str {
        "mock"
    }

    async fn fetch_airport(&self, icao: &str) -> Result<RawAirport, SourceError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        *self
            .calls_by_code
            .lock()
            .unwrap()
            .entry(icao.to_string())
            .or_insert(0) += 1;

        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);

        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }

        self.in_flight.fetch_sub(1, Ordering::SeqCst);

        match self.body_for(icao) {
            Some(body) => {
                serde_json::from_value(body).map_err(|e| SourceError::Parse(e.to_string()))
            }
            None => Err(SourceError::NotFound(icao.to_string())),
        }
    }
}

// ============================================================================
// Live feed mocks
// ============================================================================

/// Whazzup stand-in; `None` means the feed is down
pub struct MockWhazzupSource {
    body: Option<Value>,
    calls: AtomicUsize,
}

impl MockWhazzupSource {
    pub fn online(atcs: Value) -> Self {
        Self {
            body: Some(json!({"clients": {"atcs": atcs}})),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn down() -> Self {
        Self {
            body: None,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl WhazzupSource for MockWhazzupSource {
    async fn fetch_whazzup(&self) -> Result<Whazzup, LiveFeedError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match self.body.clone() {
            Some(body) => {
                serde_json::from_value(body).map_err(|e| LiveFeedError::Parse(e.to_string()))
            }
            None => Err(LiveFeedError::Network("connection refused".to_string())),
        }
    }
}

/// openAIP stand-in; `None` means the feed is down
pub struct MockAirspaceSource {
    items: Option<Value>,
}

impl MockAirspaceSource {
    pub fn with_items(items: Value) -> Self {
        Self {
            items: Some(items),
        }
    }

    pub fn down() -> Self {
        Self {
            items: None,
        }
    }
}

#[async_trait]
impl AirspaceSource for MockAirspaceSource {
    async fn fetch_airspaces(&self) -> Result<Vec<Airspace>, LiveFeedError> {
        match self.items.clone() {
            Some(items) => {
                serde_json::from_value(items).map_err(|e| LiveFeedError::Parse(e.to_string()))
            }
            None => Err(LiveFeedError::Api(503, "maintenance".to_string())),
        }
    }
}

// ============================================================================
// Fixtures
// ============================================================================

/// AirportDB-shaped body with string-encoded numbers, as the API sends them
pub fn airportdb_body(icao: &str, name: &str) -> Value {
    json!({
        "ident": icao,
        "iata_code": "RAK",
        "name": name,
        "municipality": "Marrakech",
        "iso_country": "MA",
        "latitude_deg": "31.6069",
        "longitude_deg": "-8.0363",
        "elevation_ft": "1640",
        "type": "large_airport",
        "scheduled_service": "yes",
        "runways": [{
            "le_ident": "10",
            "he_ident": "28",
            "length_ft": "10171",
            "width_ft": "148",
            "surface": "ASP",
            "lighted": "1",
            "closed": "0",
            "le_heading_degT": "97",
            "he_heading_degT": "277"
        }],
        "freqs": [
            {"type": "TWR", "frequency_mhz": "119.1"},
            {"type": "GND", "frequency_mhz": "121.9"},
            {"type": "TWR", "frequency_mhz": "118.5"}
        ],
        "navaids": [{"ident": "MAK", "type": "VOR-DME"}]
    })
}

/// Body as AirportDB really sends it: `country` and `region` are objects,
/// extra keys the service does not read are present
pub fn airportdb_nested_body(icao: &str, name: &str) -> Value {
    let mut body = airportdb_body(icao, name);
    let extra = json!({
        "id": 2907,
        "gps_code": icao,
        "local_code": "",
        "continent": "AF",
        "iso_region": "MA-07",
        "country": {"id": 302645, "code": "MA", "name": "Morocco", "continent": "AF"},
        "region": {"id": 303379, "code": "MA-07", "local_code": "07", "name": "Marrakech-Safi"},
        "keywords": null,
        "icao_code": icao,
        "station": {"icao_code": icao, "distance": 0}
    });
    if let (Some(target), Some(fields)) = (body.as_object_mut(), extra.as_object()) {
        target.extend(fields.clone());
    }
    body
}

/// Airspace page items: one FIR, one CTR
pub fn airspace_items() -> Value {
    json!([
        {"name": "CASABLANCA FIR", "type": 0, "geometry": {"type": "Polygon", "coordinates": []}},
        {"name": "MARRAKECH CTR", "type": 4}
    ])
}

pub fn fast_batches() -> BatchSettings {
    BatchSettings {
        size: 3,
        delay: Duration::ZERO,
    }
}

pub fn resolver_with(
    source: Arc<MockAirportSource>,
    fallback: FallbackTable,
    batch: BatchSettings,
) -> AirportResolver {
    AirportResolver::new(
        Arc::new(AirportCache::new(Duration::from_secs(3600))),
        Arc::new(fallback),
        source,
        Duration::from_secs(5),
        batch,
    )
}

/// Resolver over the built-in fallback table
pub fn builtin_resolver(source: Arc<MockAirportSource>) -> AirportResolver {
    let fallback = FallbackTable::builtin().expect("embedded fallback table must parse");
    resolver_with(source, fallback, fast_batches())
}

/// Application state over mocks, serving `airports`
pub fn test_state(
    source: Arc<MockAirportSource>,
    whazzup: Arc<MockWhazzupSource>,
    airspace: Arc<MockAirspaceSource>,
    airports: &[&str],
) -> AppState {
    AppState::new(
        Arc::new(builtin_resolver(source)),
        Arc::new(IvaoService::new(whazzup, &IvaoConfig::default())),
        Arc::new(AirspaceService::new(airspace, &OpenAipConfig::default())),
        airports.iter().map(|c| c.to_string()).collect(),
    )
}
