//! openAIP airspace data
//!
//! Airspace polygons for the configured country. FIR boundaries are the
//! entries with airspace type 0.

use crate::services::airportdb_client::USER_AGENT;
use crate::services::live_cache::{LiveFeedError, StaleOnErrorCache};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::sync::Arc;
use std::time::Duration;
use vaip_common::config::OpenAipConfig;

/// openAIP airspace type for flight information regions
pub const FIR_AIRSPACE_TYPE: i64 = 0;

const PAGE_LIMIT: &str = "100";

/// One airspace; geometry and limits pass through untouched
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct Airspace {
    pub name: Option<String>,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub kind: Option<i64>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Airspace {
    pub fn is_fir(&self) -> bool {
        self.kind == Some(FIR_AIRSPACE_TYPE)
    }

    fn name_contains(&self, needle: &str) -> bool {
        self.name
            .as_deref()
            .is_some_and(|n| n.to_uppercase().contains(&needle.to_uppercase()))
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct AirspacePage {
    items: Vec<Airspace>,
}

/// Provider of airspace lists
#[async_trait]
pub trait AirspaceSource: Send + Sync {
    async fn fetch_airspaces(&self) -> Result<Vec<Airspace>, LiveFeedError>;
}

/// openAIP REST client
pub struct OpenAipClient {
    http_client: reqwest::Client,
    base_url: String,
    api_key: Option<String>,
    country: String,
}

impl OpenAipClient {
    pub fn new(config: &OpenAipConfig) -> Result<Self, LiveFeedError> {
        let http_client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| LiveFeedError::Network(e.to_string()))?;

        if config.api_key.is_none() {
            tracing::warn!("openAIP API key not configured, airspace endpoints will be unavailable");
        }

        Ok(Self {
            http_client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
            country: config.country.clone(),
        })
    }
}

#[async_trait]
impl AirspaceSource for OpenAipClient {
    async fn fetch_airspaces(&self) -> Result<Vec<Airspace>, LiveFeedError> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or_else(|| LiveFeedError::NotConfigured("openAIP API key missing".to_string()))?;

        let url = format!("{}/airspaces", self.base_url);
        tracing::debug!(url = %url, country = %self.country, "Fetching openAIP airspaces");

        let response = self
            .http_client
            .get(&url)
            .query(&[
                ("apiKey", api_key),
                ("country", self.country.as_str()),
                ("limit", PAGE_LIMIT),
            ])
            .send()
            .await
            .map_err(|e| LiveFeedError::Network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(LiveFeedError::Api(status.as_u16(), error_text));
        }

        let page = response
            .json::<AirspacePage>()
            .await
            .map_err(|e| LiveFeedError::Parse(e.to_string()))?;

        Ok(page.items)
    }
}

/// Airspace queries over the cached list
pub struct AirspaceService {
    source: Arc<dyn AirspaceSource>,
    cache: StaleOnErrorCache<Arc<Vec<Airspace>>>,
}

impl AirspaceService {
    pub fn new(source: Arc<dyn AirspaceSource>, config: &OpenAipConfig) -> Self {
        Self {
            source,
            cache: StaleOnErrorCache::new("openaip", Duration::from_secs(config.ttl_secs)),
        }
    }

    pub async fn airspaces(&self) -> Result<Arc<Vec<Airspace>>, LiveFeedError> {
        self.cache
            .get_or_refresh(|| async { self.source.fetch_airspaces().await.map(Arc::new) })
            .await
    }

    pub async fn fir_boundaries(&self) -> Result<Vec<Airspace>, LiveFeedError> {
        let airspaces = self.airspaces().await?;
        Ok(airspaces.iter().filter(|a| a.is_fir()).cloned().collect())
    }

    /// First FIR whose name contains `name` (case-insensitive)
    pub async fn fir_by_name(&self, name: &str) -> Result<Option<Airspace>, LiveFeedError> {
        let airspaces = self.airspaces().await?;
        Ok(airspaces
            .iter()
            .find(|a| a.is_fir() && a.name_contains(name))
            .cloned())
    }
}
