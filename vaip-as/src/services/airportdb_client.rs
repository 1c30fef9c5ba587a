//! AirportDB API client
//!
//! Single GET per airport: `{base_url}/{ICAO}?apiToken=...`. The response
//! body is the raw airport object consumed by the normalizer.

use crate::services::normalizer::RawAirport;
use async_trait::async_trait;
use std::time::Duration;
use thiserror::Error;
use vaip_common::config::AirportDbConfig;

pub(crate) const USER_AGENT: &str = concat!("vAIP-Morocco/", env!("CARGO_PKG_VERSION"));

/// Upstream fetch errors
#[derive(Debug, Error)]
pub enum SourceError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("Upstream did not answer within {0:?}")]
    Timeout(Duration),

    #[error("Airport not found upstream: {0}")]
    NotFound(String),

    #[error("API error {0}: {1}")]
    Api(u16, String),

    #[error("Parse error: {0}")]
    Parse(String),
}

/// Provider of raw airport records
#[async_trait]
pub trait AirportSource: Send + Sync {
    /// Source name for logging
    fn name(&self) -> &'static str;

    /// Fetch the raw record for an uppercase ICAO code
    async fn fetch_airport(&self, icao: &str) -> Result<RawAirport, SourceError>;
}

/// AirportDB HTTP client
pub struct AirportDbClient {
    http_client: reqwest::Client,
    base_url: String,
    api_token: String,
}

impl AirportDbClient {
    pub fn new(config: &AirportDbConfig) -> Result<Self, SourceError> {
        let http_client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| SourceError::Network(e.to_string()))?;

        if config.api_token.is_none() {
            tracing::warn!("AirportDB API token not configured, upstream requests will be rejected");
        }

        Ok(Self {
            http_client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_token: config.api_token.clone().unwrap_or_default(),
        })
    }

    fn airport_url(&self, icao: &str) -> String {
        format!("{}/{}", self.base_url, icao)
    }
}

#[async_trait]
impl AirportSource for AirportDbClient {
    fn name(&self) -> &'static str {
        "airportdb"
    }

    async fn fetch_airport(&self, icao: &str) -> Result<RawAirport, SourceError> {
        let url = self.airport_url(icao);
        tracing::debug!(icao = %icao, url = %url, "Querying AirportDB");

        let response = self
            .http_client
            .get(&url)
            .query(&[("apiToken", self.api_token.as_str())])
            .send()
            .await
            .map_err(|e| SourceError::Network(e.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| SourceError::Network(e.to_string()))?;

        parse_airport_response(icao, status, &body)
    }
}

/// Map an AirportDB answer to a raw airport or a source error
///
/// 404 means the code is unknown upstream; any other non-2xx keeps the
/// status and body text.
pub fn parse_airport_response(
    icao: &str,
    status: reqwest::StatusCode,
    body: &str,
) -> Result<RawAirport, SourceError> {
    if status == reqwest::StatusCode::NOT_FOUND {
        return Err(SourceError::NotFound(icao.to_string()));
    }

    if !status.is_success() {
        return Err(SourceError::Api(status.as_u16(), body.to_string()));
    }

    serde_json::from_str::<RawAirport>(body).map_err(|e| SourceError::Parse(e.to_string()))
}
