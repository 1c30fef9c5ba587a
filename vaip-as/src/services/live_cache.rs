//! Single-value cache for live network status feeds
//!
//! Fresh values are served until the TTL elapses. When a refresh fails the
//! last good value keeps being served, however old, until a refresh
//! succeeds. Without any previous value the refresh error is returned.
//! Concurrent callers that find the value expired share one refresh.

use std::future::Future;
use std::time::{Duration, Instant};
use thiserror::Error;
use tokio::sync::{Mutex, RwLock};
use tracing::{debug, warn};

/// Live feed fetch errors
#[derive(Debug, Error)]
pub enum LiveFeedError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("API error {0}: {1}")]
    Api(u16, String),

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Feed not configured: {0}")]
    NotConfigured(String),
}

struct Snapshot<T> {
    value: T,
    fetched_at: Instant,
}

/// Stale-on-error cache holding one value
pub struct StaleOnErrorCache<T> {
    name: &'static str,
    ttl: Duration,
    slot: RwLock<Option<Snapshot<T>>>,
    refresh_lock: Mutex<()>,
}

impl<T: Clone> StaleOnErrorCache<T> {
    pub fn new(name: &'static str, ttl: Duration) -> Self {
        Self {
            name,
            ttl,
            slot: RwLock::new(None),
            refresh_lock: Mutex::new(()),
        }
    }

    /// Fresh cached value, or the result of `refresh`
    pub async fn get_or_refresh<F, Fut, E>(&self, refresh: F) -> Result<T, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, E>>,
        E: std::fmt::Display,
    {
        if let Some(value) = self.fresh().await {
            return Ok(value);
        }

        let _refreshing = self.refresh_lock.lock().await;

        // Another caller may have refreshed while this one waited
        if let Some(value) = self.fresh().await {
            return Ok(value);
        }

        debug!(feed = self.name, "Refreshing live feed");
        match refresh().await {
            Ok(value) => {
                *self.slot.write().await = Some(Snapshot {
                    value: value.clone(),
                    fetched_at: Instant::now(),
                });
                Ok(value)
            }
            Err(e) => match self.slot.read().await.as_ref() {
                Some(snapshot) => {
                    warn!(
                        feed = self.name,
                        error = %e,
                        age_secs = snapshot.fetched_at.elapsed().as_secs(),
                        "Refresh failed, serving stale data"
                    );
                    Ok(snapshot.value.clone())
                }
                None => Err(e),
            },
        }
    }

    async fn fresh(&self) -> Option<T> {
        self.slot
            .read()
            .await
            .as_ref()
            .filter(|snapshot| snapshot.fetched_at.elapsed() < self.ttl)
            .map(|snapshot| snapshot.value.clone())
    }
}
