//! Configuration loading and config file resolution
//!
//! Bootstrap settings live in a TOML file. Every section is optional: a
//! missing file or missing key falls back to compiled defaults, a malformed
//! file is an error.

use crate::{Error, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Bootstrap configuration loaded from TOML file
///
/// These settings cannot change during runtime. The service must restart
/// to pick up changes to the TOML file.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct TomlConfig {
    /// Interface the HTTP server binds to
    pub bind_address: String,

    /// HTTP server port
    pub port: u16,

    /// Replacement for the built-in fallback dataset (JSON, keyed by ICAO)
    pub fallback_path: Option<PathBuf>,

    /// Replacement for the built-in list of served airports
    pub airports: Option<Vec<String>>,

    /// Origins allowed by CORS
    pub cors_origins: Vec<String>,

    pub logging: LoggingConfig,
    pub airportdb: AirportDbConfig,
    pub cache: CacheConfig,
    pub batch: BatchConfig,
    pub ivao: IvaoConfig,
    pub openaip: OpenAipConfig,
}

impl Default for TomlConfig {
    fn default() -> Self {
        Self {
            bind_address: "127.0.0.1".to_string(),
            port: 3001,
            fallback_path: None,
            airports: None,
            cors_origins: vec![
                "http://localhost:3000".to_string(),
                "http://localhost:3001".to_string(),
                "http://localhost:3002".to_string(),
            ],
            logging: LoggingConfig::default(),
            airportdb: AirportDbConfig::default(),
            cache: CacheConfig::default(),
            batch: BatchConfig::default(),
            ivao: IvaoConfig::default(),
            openaip: OpenAipConfig::default(),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

/// AirportDB upstream settings
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AirportDbConfig {
    pub base_url: String,
    pub api_token: Option<String>,
    /// Upstream calls slower than this are treated as failures
    pub timeout_secs: u64,
}

impl Default for AirportDbConfig {
    fn default() -> Self {
        Self {
            base_url: "https://airportdb.io/api/v1/airport".to_string(),
            api_token: None,
            timeout_secs: 15,
        }
    }
}

/// Airport record cache settings
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    pub record_ttl_secs: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            record_ttl_secs: 3600,
        }
    }
}

/// Batch resolution settings for the full airport list
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct BatchConfig {
    /// Airports resolved concurrently per batch
    pub size: usize,
    /// Pause between consecutive batches
    pub delay_ms: u64,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            size: 3,
            delay_ms: 500,
        }
    }
}

/// IVAO network status feed
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct IvaoConfig {
    pub whazzup_url: String,
    pub ttl_secs: u64,
    pub timeout_secs: u64,
    /// Centre position reported by `/api/ivao/gmmm-ctr`
    pub centre_callsign: String,
    /// Callsign prefix identifying the region's controllers
    pub controller_prefix: String,
}

impl Default for IvaoConfig {
    fn default() -> Self {
        Self {
            whazzup_url: "https://api.ivao.aero/v2/tracker/whazzup".to_string(),
            ttl_secs: 60,
            timeout_secs: 10,
            centre_callsign: "GMMM_CTR".to_string(),
            controller_prefix: "GMMM".to_string(),
        }
    }
}

/// openAIP airspace feed
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct OpenAipConfig {
    pub base_url: String,
    pub api_key: Option<String>,
    pub country: String,
    pub ttl_secs: u64,
    pub timeout_secs: u64,
}

impl Default for OpenAipConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.core.openaip.net/api".to_string(),
            api_key: None,
            country: "MA".to_string(),
            ttl_secs: 60,
            timeout_secs: 10,
        }
    }
}

/// Parse TOML configuration text
pub fn parse_toml_config(content: &str) -> Result<TomlConfig> {
    toml::from_str(content).map_err(|e| Error::Config(format!("Parse TOML failed: {}", e)))
}

/// Load TOML configuration from a file
pub fn load_toml_config(path: &Path) -> Result<TomlConfig> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| Error::Config(format!("Read {} failed: {}", path.display(), e)))?;
    parse_toml_config(&content)
}

/// Config file resolution following priority order:
/// 1. Command-line argument (highest priority)
/// 2. Environment variable
/// 3. Platform config directory (`<config_dir>/vaip/<module>.toml`)
/// 4. System-wide `/etc/vaip/<module>.toml` (Linux)
///
/// Returns `None` when nothing was named and no default file exists.
pub fn resolve_config_path(
    cli_arg: Option<&Path>,
    env_var_name: &str,
    module_name: &str,
) -> Option<PathBuf> {
    if let Some(path) = cli_arg {
        return Some(path.to_path_buf());
    }

    if let Ok(path) = std::env::var(env_var_name) {
        if !path.trim().is_empty() {
            return Some(PathBuf::from(path));
        }
    }

    let file_name = format!("{}.toml", module_name);

    if let Some(user_config) = dirs::config_dir().map(|d| d.join("vaip").join(&file_name)) {
        if user_config.exists() {
            return Some(user_config);
        }
    }

    if cfg!(target_os = "linux") {
        let system_config = PathBuf::from("/etc/vaip").join(&file_name);
        if system_config.exists() {
            return Some(system_config);
        }
    }

    None
}

/// Load configuration, degrading to defaults when no file is available
///
/// A file that was named explicitly but does not exist only produces a
/// warning; a file that exists but does not parse is an error.
pub fn load_or_default(path: Option<&Path>) -> Result<TomlConfig> {
    match path {
        Some(path) if path.exists() => {
            let config = load_toml_config(path)?;
            info!("Loaded configuration from {}", path.display());
            Ok(config)
        }
        Some(path) => {
            warn!(
                "Config file {} not found, using compiled defaults",
                path.display()
            );
            Ok(TomlConfig::default())
        }
        None => {
            info!("No config file found, using compiled defaults");
            Ok(TomlConfig::default())
        }
    }
}
