//! Raw airport normalization
//!
//! AirportDB responses and fallback entries share one raw shape, but the
//! upstream encodes numbers and booleans as strings (`"1640"`, `"1"`) while
//! the fallback table uses native JSON values. [`LooseScalar`] accepts both
//! so the normalizer has a single typed entry point.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};
use serde_json::Value;
use std::collections::HashMap;
use tracing::debug;
use vaip_common::icao::{normalize_code, COUNTRY_CODE};
use vaip_common::models::{
    feet_to_meters, AirportCategory, AirportDetails, AirportLinks, AirportRecord,
    FrequencyBundle, RunwayRecord,
};

/// JSON scalar that may arrive as a string, number or boolean
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum LooseScalar {
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
}

impl LooseScalar {
    /// Integer value, `parseInt`-style for text (`"1640.5"` → 1640)
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            LooseScalar::Int(n) => Some(*n),
            LooseScalar::Float(f) if f.is_finite() => Some(f.trunc() as i64),
            LooseScalar::Text(s) => parse_leading_int(s),
            _ => None,
        }
    }

    /// Floating point value
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            LooseScalar::Int(n) => Some(*n as f64),
            LooseScalar::Float(f) if f.is_finite() => Some(*f),
            LooseScalar::Text(s) => s.trim().parse::<f64>().ok().filter(|f| f.is_finite()),
            _ => None,
        }
    }

    /// Flag value: native booleans pass through, `"1"` / `1` mean set
    pub fn is_set(&self) -> bool {
        match self {
            LooseScalar::Bool(b) => *b,
            LooseScalar::Int(n) => *n == 1,
            LooseScalar::Float(_) => false,
            LooseScalar::Text(s) => s.trim() == "1",
        }
    }

    /// `"yes"` / `"no"` encoded flag
    pub fn is_yes(&self) -> bool {
        match self {
            LooseScalar::Bool(b) => *b,
            LooseScalar::Text(s) => s.trim() == "yes",
            _ => false,
        }
    }
}

fn parse_leading_int(text: &str) -> Option<i64> {
    let text = text.trim_start();
    let (sign, digits) = match text.strip_prefix('-') {
        Some(rest) => (-1, rest),
        None => (1, text.strip_prefix('+').unwrap_or(text)),
    };
    let end = digits
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(digits.len());
    digits[..end].parse::<i64>().ok().map(|n| sign * n)
}

/// Field that reads as `None` when the value has an unexpected shape
///
/// AirportDB nests some fields (`country`, `region`) as objects; one odd
/// field must not reject the whole body.
fn lenient<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let value = Value::deserialize(deserializer)?;
    Ok(serde_json::from_value::<Option<T>>(value).ok().flatten())
}

/// List whose malformed entries are skipped; null or non-array is empty
fn lenient_list<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let items = match Value::deserialize(deserializer)? {
        Value::Array(items) => items,
        _ => return Ok(Vec::new()),
    };
    Ok(items
        .into_iter()
        .filter_map(|item| serde_json::from_value(item).ok())
        .collect())
}

/// Airport in AirportDB shape
///
/// Fallback entries use `icao`/`iata`/`city`/`country` where the upstream
/// uses `ident`/`iata_code`/`municipality`/`iso_country`; both spellings
/// are accepted. Fields of the wrong JSON type read as absent.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RawAirport {
    #[serde(deserialize_with = "lenient")]
    pub ident: Option<String>,
    #[serde(deserialize_with = "lenient")]
    pub icao_code: Option<String>,
    #[serde(deserialize_with = "lenient")]
    pub icao: Option<String>,
    #[serde(deserialize_with = "lenient")]
    pub iata_code: Option<String>,
    #[serde(deserialize_with = "lenient")]
    pub iata: Option<String>,
    #[serde(deserialize_with = "lenient")]
    pub name: Option<String>,
    #[serde(deserialize_with = "lenient")]
    pub municipality: Option<String>,
    #[serde(deserialize_with = "lenient")]
    pub city: Option<String>,
    #[serde(deserialize_with = "lenient")]
    pub iso_country: Option<String>,
    #[serde(deserialize_with = "lenient")]
    pub country: Option<String>,
    #[serde(deserialize_with = "lenient")]
    pub latitude_deg: Option<LooseScalar>,
    #[serde(deserialize_with = "lenient")]
    pub longitude_deg: Option<LooseScalar>,
    #[serde(deserialize_with = "lenient")]
    pub elevation_ft: Option<LooseScalar>,
    #[serde(rename = "type", deserialize_with = "lenient")]
    pub kind: Option<String>,
    #[serde(deserialize_with = "lenient")]
    pub scheduled_service: Option<LooseScalar>,
    #[serde(deserialize_with = "lenient_list")]
    pub runways: Vec<RawRunway>,
    #[serde(deserialize_with = "lenient_list")]
    pub freqs: Vec<Value>,
    #[serde(deserialize_with = "lenient_list")]
    pub navaids: Vec<Value>,
    #[serde(deserialize_with = "lenient")]
    pub wikipedia_link: Option<String>,
    #[serde(deserialize_with = "lenient")]
    pub home_link: Option<String>,
}

/// Runway in AirportDB shape
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RawRunway {
    #[serde(deserialize_with = "lenient")]
    pub le_ident: Option<String>,
    #[serde(deserialize_with = "lenient")]
    pub he_ident: Option<String>,
    #[serde(deserialize_with = "lenient")]
    pub length_ft: Option<LooseScalar>,
    #[serde(deserialize_with = "lenient")]
    pub width_ft: Option<LooseScalar>,
    #[serde(deserialize_with = "lenient")]
    pub surface: Option<String>,
    #[serde(deserialize_with = "lenient")]
    pub lighted: Option<LooseScalar>,
    #[serde(deserialize_with = "lenient")]
    pub closed: Option<LooseScalar>,
    #[serde(rename = "le_heading_degT", deserialize_with = "lenient")]
    pub le_heading_deg_t: Option<LooseScalar>,
    #[serde(rename = "he_heading_degT", deserialize_with = "lenient")]
    pub he_heading_deg_t: Option<LooseScalar>,
    #[serde(deserialize_with = "lenient")]
    pub le_heading: Option<LooseScalar>,
    #[serde(deserialize_with = "lenient")]
    pub he_heading: Option<LooseScalar>,
    #[serde(deserialize_with = "lenient")]
    pub le_elevation_ft: Option<LooseScalar>,
    #[serde(deserialize_with = "lenient")]
    pub he_elevation_ft: Option<LooseScalar>,
    pub le_ils: Option<Value>,
    pub he_ils: Option<Value>,
}

/// Where a raw airport came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RawSource {
    Upstream,
    Fallback,
}

/// Raw airport tagged with its source
#[derive(Debug, Clone, Copy)]
pub struct RawAirportInput<'a> {
    pub source: RawSource,
    pub raw: &'a RawAirport,
}

impl<'a> RawAirportInput<'a> {
    pub fn upstream(raw: &'a RawAirport) -> Self {
        Self {
            source: RawSource::Upstream,
            raw,
        }
    }

    pub fn fallback(raw: &'a RawAirport) -> Self {
        Self {
            source: RawSource::Fallback,
            raw,
        }
    }
}

fn non_empty(value: &Option<String>) -> Option<String> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

fn int_of(value: &Option<LooseScalar>) -> Option<i64> {
    value.as_ref().and_then(LooseScalar::as_i64)
}

fn float_of(value: &Option<LooseScalar>) -> Option<f64> {
    value.as_ref().and_then(LooseScalar::as_f64)
}

fn flag_of(value: &Option<LooseScalar>) -> bool {
    value.as_ref().is_some_and(LooseScalar::is_set)
}

/// Map coded surface types to readable names
pub fn map_surface(raw: Option<&str>, source: RawSource) -> Option<String> {
    match raw.map(str::trim) {
        Some("ASP") => Some("Asphalt".to_string()),
        Some("CON") => Some("Concrete".to_string()),
        Some(code) if !code.is_empty() => Some(code.to_string()),
        _ => match source {
            RawSource::Fallback => Some("Unknown".to_string()),
            RawSource::Upstream => raw.map(str::to_string),
        },
    }
}

fn frequency_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Group raw frequencies by lowercased type; first entry per type is primary
pub fn bundle_frequencies(freqs: &[Value]) -> FrequencyBundle {
    let mut groups: HashMap<String, Vec<String>> = HashMap::new();

    for freq in freqs {
        let kind = freq
            .get("type")
            .and_then(Value::as_str)
            .map(str::to_lowercase)
            .unwrap_or_else(|| "other".to_string());
        let value = freq
            .get("frequency_mhz")
            .filter(|v| !v.is_null())
            .or_else(|| freq.get("frequency"))
            .and_then(frequency_text);

        groups.entry(kind).or_default().extend(value);
    }

    let primary = |kind: &str| groups.get(kind).and_then(|values| values.first()).cloned();

    FrequencyBundle {
        tower: primary("twr"),
        ground: primary("gnd"),
        approach: primary("app"),
        atis: primary("atis"),
        unicom: primary("unicom"),
        all_frequencies: freqs.to_vec(),
    }
}

fn normalize_runway(rwy: &RawRunway, source: RawSource) -> RunwayRecord {
    let length_ft = int_of(&rwy.length_ft);
    let width_ft = int_of(&rwy.width_ft);

    RunwayRecord {
        identifier: format!(
            "{}/{}",
            rwy.le_ident.as_deref().unwrap_or_default(),
            rwy.he_ident.as_deref().unwrap_or_default()
        ),
        length_m: length_ft.map(feet_to_meters),
        length_ft,
        width_m: width_ft.map(feet_to_meters),
        width_ft,
        surface: map_surface(rwy.surface.as_deref(), source),
        lighting: flag_of(&rwy.lighted),
        closed: flag_of(&rwy.closed),
        le_ident: rwy.le_ident.clone(),
        he_ident: rwy.he_ident.clone(),
        le_heading: float_of(&rwy.le_heading_deg_t).or_else(|| float_of(&rwy.le_heading)),
        he_heading: float_of(&rwy.he_heading_deg_t).or_else(|| float_of(&rwy.he_heading)),
        le_elevation_ft: int_of(&rwy.le_elevation_ft),
        he_elevation_ft: int_of(&rwy.he_elevation_ft),
        le_ils: rwy.le_ils.clone().filter(|v| !v.is_null()),
        he_ils: rwy.he_ils.clone().filter(|v| !v.is_null()),
    }
}

/// Convert a raw airport into the canonical record
///
/// `requested` is the code the caller asked for; it names the record when
/// the raw data carries no identifier.
pub fn normalize(requested: &str, input: RawAirportInput<'_>) -> AirportRecord {
    let raw = input.raw;

    let icao = non_empty(&raw.ident)
        .or_else(|| non_empty(&raw.icao_code))
        .or_else(|| non_empty(&raw.icao))
        .map(|code| normalize_code(&code))
        .unwrap_or_else(|| normalize_code(requested));

    if let Some(reported) = non_empty(&raw.iso_country).or_else(|| non_empty(&raw.country)) {
        if reported != COUNTRY_CODE {
            debug!(icao = %icao, reported = %reported, "Reporting country as {}", COUNTRY_CODE);
        }
    }

    let elevation_ft = int_of(&raw.elevation_ft);

    let details = AirportDetails {
        iata: non_empty(&raw.iata_code).or_else(|| non_empty(&raw.iata)),
        name: non_empty(&raw.name),
        city: non_empty(&raw.municipality).or_else(|| non_empty(&raw.city)),
        country: COUNTRY_CODE.to_string(),
        latitude: float_of(&raw.latitude_deg),
        longitude: float_of(&raw.longitude_deg),
        elevation_ft,
        elevation_m: elevation_ft.map(feet_to_meters),
        category: AirportCategory::from_raw(raw.kind.as_deref()),
        scheduled_service: raw
            .scheduled_service
            .as_ref()
            .is_some_and(LooseScalar::is_yes),
        frequencies: bundle_frequencies(&raw.freqs),
        navaids: raw.navaids.clone(),
        links: AirportLinks {
            wikipedia_link: non_empty(&raw.wikipedia_link),
            home_link: non_empty(&raw.home_link),
        },
    };

    AirportRecord {
        icao,
        details: Some(details),
        runways: raw
            .runways
            .iter()
            .map(|rwy| normalize_runway(rwy, input.source))
            .collect(),
        error: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn raw(value: Value) -> RawAirport {
        serde_json::from_value(value).expect("raw airport should deserialize")
    }

    fn upstream_sample() -> RawAirport {
        raw(json!({
            "ident": "GMFF",
            "icao_code": "GMFX",
            "iata_code": "FEZ",
            "name": "Saïss Airport",
            "municipality": "Fes",
            "iso_country": "MA",
            "latitude_deg": "33.927299",
            "longitude_deg": "-4.977960",
            "elevation_ft": "1900",
            "type": "medium_airport",
            "scheduled_service": "yes",
            "runways": [{
                "le_ident": "09",
                "he_ident": "27",
                "length_ft": "10499",
                "width_ft": "148",
                "surface": "ASP",
                "lighted": "1",
                "closed": "0",
                "le_heading_degT": "86",
                "he_heading_degT": "266",
                "le_elevation_ft": "1867",
                "he_elevation_ft": "1900",
                "le_ils": {"freq": 109.5, "course": 86},
                "he_ils": null
            }],
            "freqs": [
                {"type": "TWR", "description": "TWR", "frequency_mhz": "118.5"},
                {"type": "APP", "description": "APP", "frequency_mhz": "119.7"},
                {"type": "TWR", "description": "TWR secondary", "frequency_mhz": "121.3"}
            ],
            "navaids": [{"ident": "FES", "type": "VOR-DME"}],
            "wikipedia_link": "https://en.wikipedia.org/wiki/Fes%E2%80%93Sa%C3%AFss_Airport",
            "home_link": ""
        }))
    }

    #[test]
    fn test_upstream_record_is_normalized() {
        let source = upstream_sample();
        let record = normalize("gmff", RawAirportInput::upstream(&source));
        let details = record.details.as_ref().unwrap();

        assert_eq!(record.icao, "GMFF");
        assert_eq!(details.iata.as_deref(), Some("FEZ"));
        assert_eq!(details.city.as_deref(), Some("Fes"));
        assert_eq!(details.latitude, Some(33.927299));
        assert_eq!(details.longitude, Some(-4.97796));
        assert_eq!(details.elevation_ft, Some(1900));
        assert_eq!(details.elevation_m, Some(579));
        assert_eq!(details.category, AirportCategory::Medium);
        assert!(details.scheduled_service);
        assert_eq!(details.navaids.len(), 1);
        assert!(details.links.home_link.is_none());
        assert!(record.error.is_none());

        let rwy = &record.runways[0];
        assert_eq!(rwy.identifier, "09/27");
        assert_eq!(rwy.length_ft, Some(10499));
        assert_eq!(rwy.length_m, Some(3200));
        assert_eq!(rwy.width_m, Some(45));
        assert_eq!(rwy.surface.as_deref(), Some("Asphalt"));
        assert!(rwy.lighting);
        assert!(!rwy.closed);
        assert_eq!(rwy.le_heading, Some(86.0));
        assert_eq!(rwy.he_elevation_ft, Some(1900));
        assert!(rwy.le_ils.is_some());
        assert!(rwy.he_ils.is_none());
    }

    #[test]
    fn test_primary_identifier_preferred_over_alias() {
        let source = upstream_sample();
        let record = normalize("GMFF", RawAirportInput::upstream(&source));
        assert_eq!(record.icao, "GMFF");

        let alias_only = raw(json!({"icao_code": "gmfx"}));
        let record = normalize("GMFF", RawAirportInput::upstream(&alias_only));
        assert_eq!(record.icao, "GMFX");

        let anonymous = raw(json!({}));
        let record = normalize(" gmaz ", RawAirportInput::upstream(&anonymous));
        assert_eq!(record.icao, "GMAZ");
    }

    #[test]
    fn test_country_is_always_morocco() {
        let southern = raw(json!({"ident": "GMML", "iso_country": "EH"}));
        let record = normalize("GMML", RawAirportInput::upstream(&southern));
        assert_eq!(record.country(), Some("MA"));

        let fallback = raw(json!({"icao": "GMMA", "country": "EH"}));
        let record = normalize("GMMA", RawAirportInput::fallback(&fallback));
        assert_eq!(record.country(), Some("MA"));
    }

    #[test]
    fn test_surface_mapping() {
        assert_eq!(map_surface(Some("ASP"), RawSource::Upstream).as_deref(), Some("Asphalt"));
        assert_eq!(map_surface(Some("CON"), RawSource::Upstream).as_deref(), Some("Concrete"));
        assert_eq!(map_surface(Some("GRE"), RawSource::Upstream).as_deref(), Some("GRE"));
        assert_eq!(map_surface(None, RawSource::Upstream), None);
        assert_eq!(map_surface(Some("GRE"), RawSource::Fallback).as_deref(), Some("GRE"));
        assert_eq!(map_surface(None, RawSource::Fallback).as_deref(), Some("Unknown"));
        assert_eq!(map_surface(Some(""), RawSource::Fallback).as_deref(), Some("Unknown"));
    }

    #[test]
    fn test_lighting_flag_encodings() {
        let source = raw(json!({
            "runways": [
                {"le_ident": "01", "he_ident": "19", "lighted": "1"},
                {"le_ident": "02", "he_ident": "20", "lighted": "0"},
                {"le_ident": "03", "he_ident": "21"},
                {"le_ident": "04", "he_ident": "22", "lighted": true, "closed": true},
                {"le_ident": "05", "he_ident": "23", "lighted": false}
            ]
        }));
        let record = normalize("GMXX", RawAirportInput::fallback(&source));
        let lit: Vec<bool> = record.runways.iter().map(|r| r.lighting).collect();

        assert_eq!(lit, vec![true, false, false, true, false]);
        assert!(record.runways[3].closed);
        assert!(!record.runways[0].closed);
    }

    #[test]
    fn test_elevation_conversion() {
        let source = raw(json!({"elevation_ft": 1640}));
        let record = normalize("GMXX", RawAirportInput::fallback(&source));
        assert_eq!(record.details.as_ref().unwrap().elevation_m, Some(500));

        let source = raw(json!({"elevation_ft": "1640"}));
        let record = normalize("GMXX", RawAirportInput::upstream(&source));
        assert_eq!(record.details.as_ref().unwrap().elevation_m, Some(500));
    }

    #[test]
    fn test_unparseable_numbers_become_null() {
        let source = raw(json!({
            "elevation_ft": "unknown",
            "latitude_deg": "n/a",
            "runways": [{"le_ident": "10", "he_ident": "28", "length_ft": "", "width_ft": null}]
        }));
        let record = normalize("GMXX", RawAirportInput::upstream(&source));
        let details = record.details.as_ref().unwrap();

        assert_eq!(details.elevation_ft, None);
        assert_eq!(details.elevation_m, None);
        assert_eq!(details.latitude, None);
        let rwy = &record.runways[0];
        assert_eq!((rwy.length_ft, rwy.length_m), (None, None));
        assert_eq!((rwy.width_ft, rwy.width_m), (None, None));
    }

    #[test]
    fn test_frequency_grouping_first_occurrence_wins() {
        let freqs = vec![
            json!({"type": "twr", "frequency_mhz": "118.1"}),
            json!({"type": "GND", "frequency_mhz": "121.9"}),
            json!({"type": "TWR", "frequency_mhz": "118.5"}),
            json!({"type": "ATIS", "frequency": 127.45}),
            json!({"frequency_mhz": "122.8"}),
        ];
        let bundle = bundle_frequencies(&freqs);

        assert_eq!(bundle.tower.as_deref(), Some("118.1"));
        assert_eq!(bundle.ground.as_deref(), Some("121.9"));
        assert_eq!(bundle.atis.as_deref(), Some("127.45"));
        assert_eq!(bundle.approach, None);
        assert_eq!(bundle.unicom, None);
        assert_eq!(bundle.all_frequencies, freqs);
    }

    #[test]
    fn test_null_collections_are_empty() {
        let source = raw(json!({"ident": "GMAT", "runways": null, "freqs": null, "navaids": null}));
        let record = normalize("GMAT", RawAirportInput::upstream(&source));

        assert!(record.runways.is_empty());
        let details = record.details.unwrap();
        assert!(details.navaids.is_empty());
        assert!(details.frequencies.all_frequencies.is_empty());
    }

    #[test]
    fn test_loose_scalar_parsing() {
        assert_eq!(LooseScalar::Text("1640.7".into()).as_i64(), Some(1640));
        assert_eq!(LooseScalar::Text(" -12ft".into()).as_i64(), Some(-12));
        assert_eq!(LooseScalar::Text("abc".into()).as_i64(), None);
        assert_eq!(LooseScalar::Float(99.9).as_i64(), Some(99));
        assert_eq!(LooseScalar::Bool(true).as_i64(), None);
        assert!(LooseScalar::Int(1).is_set());
        assert!(!LooseScalar::Text("yes".into()).is_set());
        assert!(LooseScalar::Text("yes".into()).is_yes());
        assert!(!LooseScalar::Text("no".into()).is_yes());
    }

    #[test]
    fn test_nested_upstream_objects_do_not_reject_body() {
        let source = raw(json!({
            "ident": "GMMX",
            "name": "Menara Airport",
            "iso_country": "MA",
            "country": {"id": 302645, "code": "MA", "name": "Morocco", "continent": "AF"},
            "region": {"id": 303379, "code": "MA-07", "local_code": "07", "name": "Marrakech-Safi"},
            "municipality": "Marrakech",
            "elevation_ft": {"value": 1545},
            "gps_code": "GMMX",
            "home_link": 42,
            "runways": [
                {"le_ident": "10", "he_ident": "28", "length_ft": "10171", "surface": {"code": "ASP"}},
                "not a runway"
            ],
            "freqs": {"type": "TWR"},
            "navaids": [{"ident": "MAK"}]
        }));
        let record = normalize("GMMX", RawAirportInput::upstream(&source));
        let details = record.details.as_ref().unwrap();

        assert_eq!(record.icao, "GMMX");
        assert_eq!(details.name.as_deref(), Some("Menara Airport"));
        assert_eq!(details.city.as_deref(), Some("Marrakech"));
        assert_eq!(details.country, "MA");
        assert_eq!(details.elevation_ft, None);
        assert!(details.links.home_link.is_none());
        assert!(details.frequencies.all_frequencies.is_empty());
        assert_eq!(details.navaids.len(), 1);

        assert_eq!(record.runways.len(), 1);
        assert_eq!(record.runways[0].length_ft, Some(10171));
        assert_eq!(record.runways[0].surface, None);
    }
}
