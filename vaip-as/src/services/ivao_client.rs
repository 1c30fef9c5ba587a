//! IVAO network status
//!
//! Polls the IVAO whazzup feed (controllers currently online) through a
//! stale-on-error cache.

use crate::services::airportdb_client::USER_AGENT;
use crate::services::live_cache::{LiveFeedError, StaleOnErrorCache};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::sync::Arc;
use std::time::Duration;
use tracing::warn;
use vaip_common::config::IvaoConfig;

/// Whazzup snapshot (only the parts vAIP reads)
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Whazzup {
    pub clients: WhazzupClients,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct WhazzupClients {
    pub atcs: Vec<AtcClient>,
}

/// Connected controller; unknown fields are preserved
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default, rename_all = "camelCase")]
pub struct AtcClient {
    pub callsign: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rating: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub server_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub atc_session: Option<AtcSession>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl AtcClient {
    fn matches(&self, callsign: &str) -> bool {
        self.callsign
            .as_deref()
            .is_some_and(|c| c.eq_ignore_ascii_case(callsign))
    }

    fn has_prefix(&self, prefix: &str) -> bool {
        self.callsign
            .as_deref()
            .is_some_and(|c| c.to_uppercase().starts_with(&prefix.to_uppercase()))
    }

    fn frequency(&self) -> Option<String> {
        let session = self.atc_session.as_ref().and_then(|s| s.frequency.as_ref());
        session
            .or_else(|| self.extra.get("frequency"))
            .and_then(|v| match v {
                Value::String(s) => Some(s.clone()),
                Value::Number(n) => Some(n.to_string()),
                _ => None,
            })
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct AtcSession {
    pub frequency: Option<Value>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Online/offline status of one controller position
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ControllerStatus {
    pub online: bool,
    pub callsign: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rating: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub frequency: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub atis: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub atis_code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub server_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ControllerStatus {
    fn offline(callsign: &str) -> Self {
        Self {
            online: false,
            callsign: callsign.to_string(),
            user_id: None,
            name: None,
            rating: None,
            frequency: None,
            atis: None,
            atis_code: None,
            time: None,
            server_id: None,
            error: None,
        }
    }

    fn online(atc: &AtcClient) -> Self {
        let extra_str = |key: &str| atc.extra.get(key).and_then(Value::as_str).map(str::to_string);

        Self {
            online: true,
            callsign: atc.callsign.clone().unwrap_or_default(),
            user_id: atc.user_id,
            name: Some(extra_str("name").unwrap_or_else(|| "Unknown".to_string())),
            rating: atc.rating.clone(),
            frequency: Some(atc.frequency().unwrap_or_else(|| "N/A".to_string())),
            atis: atc.extra.get("atis").filter(|v| !v.is_null()).cloned(),
            atis_code: extra_str("atisCode"),
            time: atc.extra.get("time").filter(|v| !v.is_null()).cloned(),
            server_id: atc.server_id.clone(),
            error: None,
        }
    }
}

/// Provider of whazzup snapshots
#[async_trait]
pub trait WhazzupSource: Send + Sync {
    async fn fetch_whazzup(&self) -> Result<Whazzup, LiveFeedError>;
}

/// IVAO whazzup HTTP client
pub struct IvaoClient {
    http_client: reqwest::Client,
    url: String,
}

impl IvaoClient {
    pub fn new(config: &IvaoConfig) -> Result<Self, LiveFeedError> {
        let http_client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| LiveFeedError::Network(e.to_string()))?;

        Ok(Self {
            http_client,
            url: config.whazzup_url.clone(),
        })
    }
}

#[async_trait]
impl WhazzupSource for IvaoClient {
    async fn fetch_whazzup(&self) -> Result<Whazzup, LiveFeedError> {
        tracing::debug!(url = %self.url, "Fetching IVAO whazzup data");

        let response = self
            .http_client
            .get(&self.url)
            .send()
            .await
            .map_err(|e| LiveFeedError::Network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(LiveFeedError::Api(status.as_u16(), error_text));
        }

        response
            .json::<Whazzup>()
            .await
            .map_err(|e| LiveFeedError::Parse(e.to_string()))
    }
}

/// Controller presence queries over the cached feed
pub struct IvaoService {
    source: Arc<dyn WhazzupSource>,
    cache: StaleOnErrorCache<Arc<Whazzup>>,
    centre_callsign: String,
    controller_prefix: String,
}

impl IvaoService {
    pub fn new(source: Arc<dyn WhazzupSource>, config: &IvaoConfig) -> Self {
        Self {
            source,
            cache: StaleOnErrorCache::new("ivao", Duration::from_secs(config.ttl_secs)),
            centre_callsign: config.centre_callsign.clone(),
            controller_prefix: config.controller_prefix.clone(),
        }
    }

    /// Current snapshot (fresh, or stale when IVAO is unreachable)
    pub async fn whazzup(&self) -> Result<Arc<Whazzup>, LiveFeedError> {
        self.cache
            .get_or_refresh(|| async { self.source.fetch_whazzup().await.map(Arc::new) })
            .await
    }

    /// Status of one position; never fails
    pub async fn controller_status(&self, callsign: &str) -> ControllerStatus {
        match self.whazzup().await {
            Ok(data) => data
                .clients
                .atcs
                .iter()
                .find(|atc| atc.matches(callsign))
                .map(ControllerStatus::online)
                .unwrap_or_else(|| ControllerStatus::offline(callsign)),
            Err(e) => {
                warn!(callsign = %callsign, error = %e, "Controller status unavailable");
                ControllerStatus {
                    error: Some(e.to_string()),
                    ..ControllerStatus::offline(callsign)
                }
            }
        }
    }

    /// Status of the configured centre position
    pub async fn centre_status(&self) -> ControllerStatus {
        self.controller_status(&self.centre_callsign).await
    }

    /// Online controllers in the region; empty when the feed is unavailable
    pub async fn regional_controllers(&self) -> Vec<AtcClient> {
        match self.whazzup().await {
            Ok(data) => data
                .clients
                .atcs
                .iter()
                .filter(|atc| atc.has_prefix(&self.controller_prefix))
                .cloned()
                .collect(),
            Err(e) => {
                warn!(error = %e, "Regional controllers unavailable");
                Vec::new()
            }
        }
    }
}
