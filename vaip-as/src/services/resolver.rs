//! Airport resolution
//!
//! Single airports go cache → fallback table → upstream. Fallback entries
//! are authoritative: a code present in the table never reaches AirportDB.
//! Upstream failures become degraded records and are not cached, so the
//! next request retries.
//!
//! The full list is resolved in small sequential batches (concurrent within
//! a batch) to stay under AirportDB rate limits, then cached as a whole
//! under the aggregate key, degraded entries included.

use crate::services::airportdb_client::{AirportSource, SourceError};
use crate::services::fallback::FallbackTable;
use crate::services::normalizer::{normalize, RawAirport, RawAirportInput};
use crate::services::record_cache::AirportCache;
use futures::future::join_all;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};
use vaip_common::config::BatchConfig;
use vaip_common::icao::normalize_code;
use vaip_common::models::AirportRecord;

/// Batch shape for full-list resolution
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BatchSettings {
    /// Airports resolved concurrently
    pub size: usize,
    /// Pause between batches
    pub delay: Duration,
}

impl Default for BatchSettings {
    fn default() -> Self {
        Self::from(&BatchConfig::default())
    }
}

impl From<&BatchConfig> for BatchSettings {
    fn from(config: &BatchConfig) -> Self {
        Self {
            size: config.size.max(1),
            delay: Duration::from_millis(config.delay_ms),
        }
    }
}

/// Resolves airport codes into enriched records
pub struct AirportResolver {
    cache: Arc<AirportCache>,
    fallback: Arc<FallbackTable>,
    source: Arc<dyn AirportSource>,
    upstream_timeout: Duration,
    batch: BatchSettings,
}

impl AirportResolver {
    pub fn new(
        cache: Arc<AirportCache>,
        fallback: Arc<FallbackTable>,
        source: Arc<dyn AirportSource>,
        upstream_timeout: Duration,
        batch: BatchSettings,
    ) -> Self {
        Self {
            cache,
            fallback,
            source,
            upstream_timeout,
            batch: BatchSettings {
                size: batch.size.max(1),
                ..batch
            },
        }
    }

    pub fn cache(&self) -> &Arc<AirportCache> {
        &self.cache
    }

    /// Resolve one airport; failures come back as degraded records
    pub async fn resolve(&self, code: &str) -> Arc<AirportRecord> {
        let icao = normalize_code(code);

        if let Some(record) = self.cache.get_record(&icao).await {
            debug!(icao = %icao, "Cache hit");
            return record;
        }

        if let Some(raw) = self.fallback.get(&icao) {
            info!(icao = %icao, "Missing from upstream, using local fallback");
            let record = Arc::new(normalize(&icao, RawAirportInput::fallback(raw)));
            self.cache.put_record(&icao, Arc::clone(&record)).await;
            return record;
        }

        match self.fetch_upstream(&icao).await {
            Ok(raw) => {
                let record = Arc::new(normalize(&icao, RawAirportInput::upstream(&raw)));
                self.cache.put_record(&icao, Arc::clone(&record)).await;
                info!(icao = %icao, runways = record.runways.len(), "Fetched and cached");
                record
            }
            Err(e) => {
                warn!(icao = %icao, source = self.source.name(), error = %e, "Upstream fetch failed");
                Arc::new(AirportRecord::failed(icao, e.to_string()))
            }
        }
    }

    async fn fetch_upstream(&self, icao: &str) -> Result<RawAirport, SourceError> {
        tokio::time::timeout(self.upstream_timeout, self.source.fetch_airport(icao))
            .await
            .unwrap_or(Err(SourceError::Timeout(self.upstream_timeout)))
    }

    /// Resolve every code, preserving input order
    pub async fn resolve_all(&self, codes: &[String]) -> Arc<Vec<AirportRecord>> {
        if let Some(records) = self.cache.get_all().await {
            debug!(count = records.len(), "Using cached airport list");
            return records;
        }

        info!("Fetching data for {} airports", codes.len());

        let batch_count = codes.len().div_ceil(self.batch.size);
        let mut results = Vec::with_capacity(codes.len());

        for (index, batch) in codes.chunks(self.batch.size).enumerate() {
            let resolved = join_all(batch.iter().map(|code| self.resolve(code))).await;
            results.extend(resolved.iter().map(|record| AirportRecord::clone(record)));

            if index + 1 < batch_count && !self.batch.delay.is_zero() {
                tokio::time::sleep(self.batch.delay).await;
            }
        }

        let failed = results.iter().filter(|r| r.is_degraded()).count();
        if failed > 0 {
            warn!(failed, "Airport list cached with degraded entries");
        }

        let results = Arc::new(results);
        self.cache.put_all(Arc::clone(&results)).await;
        info!(total = results.len(), failed, "Fetched all airports");

        results
    }
}
