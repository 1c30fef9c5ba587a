//! Runtime configuration for vaip-as
//!
//! Each setting resolves command line → environment → TOML file → compiled
//! default. The command-line and environment tiers arrive together through
//! clap's `env` support as [`Overrides`].

use std::path::PathBuf;
use std::time::Duration;

use tracing_subscriber::EnvFilter;

use vaip_common::config::{
    AirportDbConfig, BatchConfig, CacheConfig, IvaoConfig, OpenAipConfig, TomlConfig,
};
use vaip_common::icao::{default_airports, normalize_code};

/// Module name used for config file discovery
pub const MODULE_NAME: &str = "vaip-as";

/// Environment variable naming the config file
pub const CONFIG_ENV_VAR: &str = "VAIP_CONFIG";

/// Settings that may come from the command line or environment
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub port: Option<u16>,
    pub bind_address: Option<String>,
    pub airportdb_token: Option<String>,
    pub openaip_key: Option<String>,
    pub fallback_path: Option<PathBuf>,
}

/// Fully resolved service configuration
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    pub bind_address: String,
    pub port: u16,
    pub airports: Vec<String>,
    pub fallback_path: Option<PathBuf>,
    pub cors_origins: Vec<String>,
    pub log_level: String,
    pub airportdb: AirportDbConfig,
    pub cache: CacheConfig,
    pub batch: BatchConfig,
    pub ivao: IvaoConfig,
    pub openaip: OpenAipConfig,
}

impl ServiceConfig {
    pub fn resolve(overrides: Overrides, toml: TomlConfig) -> Self {
        let mut airportdb = toml.airportdb;
        airportdb.api_token = non_empty(overrides.airportdb_token)
            .or_else(|| non_empty(airportdb.api_token));

        let mut openaip = toml.openaip;
        openaip.api_key = non_empty(overrides.openaip_key).or_else(|| non_empty(openaip.api_key));

        let airports = toml
            .airports
            .map(|codes| airport_list(&codes))
            .filter(|codes| !codes.is_empty())
            .unwrap_or_else(default_airports);

        Self {
            bind_address: non_empty(overrides.bind_address).unwrap_or(toml.bind_address),
            port: overrides.port.unwrap_or(toml.port),
            airports,
            fallback_path: overrides.fallback_path.or(toml.fallback_path),
            cors_origins: toml.cors_origins,
            log_level: toml.logging.level,
            airportdb,
            cache: toml.cache,
            batch: toml.batch,
            ivao: toml.ivao,
            openaip,
        }
    }

    pub fn listen_addr(&self) -> String {
        format!("{}:{}", self.bind_address, self.port)
    }

    pub fn record_ttl(&self) -> Duration {
        Duration::from_secs(self.cache.record_ttl_secs)
    }

    pub fn upstream_timeout(&self) -> Duration {
        Duration::from_secs(self.airportdb.timeout_secs)
    }
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self::resolve(Overrides::default(), TomlConfig::default())
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

/// Normalized codes, blanks and repeats dropped, order kept
fn airport_list(codes: &[String]) -> Vec<String> {
    let mut list: Vec<String> = Vec::with_capacity(codes.len());
    for code in codes.iter().map(|c| normalize_code(c)) {
        if !code.is_empty() && !list.contains(&code) {
            list.push(code);
        }
    }
    list
}

/// Log filter: `RUST_LOG` directives when present, else `level`
pub fn log_filter(rust_log: Option<&str>, level: &str) -> EnvFilter {
    rust_log
        .filter(|directives| !directives.trim().is_empty())
        .and_then(|directives| EnvFilter::try_new(directives).ok())
        .unwrap_or_else(|| EnvFilter::new(level))
}
