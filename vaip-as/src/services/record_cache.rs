//! In-memory TTL cache for airport records
//!
//! Expiry is checked lazily on read: an expired entry counts as a miss and
//! is evicted at that point. Nothing survives a restart.

use serde::Serialize;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::RwLock;
use vaip_common::models::AirportRecord;

/// Hit/miss counters and live key count
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    pub keys: usize,
}

struct CacheEntry<V> {
    value: V,
    expires_at: Instant,
}

impl<V> CacheEntry<V> {
    fn is_live(&self, now: Instant) -> bool {
        self.expires_at > now
    }
}

/// Keyed store where each entry lives for a fixed time
pub struct TtlCache<V> {
    default_ttl: Duration,
    entries: RwLock<HashMap<String, CacheEntry<V>>>,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl<V: Clone> TtlCache<V> {
    pub fn new(default_ttl: Duration) -> Self {
        Self {
            default_ttl,
            entries: RwLock::new(HashMap::new()),
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
        }
    }

    pub fn default_ttl(&self) -> Duration {
        self.default_ttl
    }

    /// Live value for `key`, if any
    pub async fn get(&self, key: &str) -> Option<V> {
        let now = Instant::now();
        {
            let entries = self.entries.read().await;
            match entries.get(key) {
                Some(entry) if entry.is_live(now) => {
                    self.hits.fetch_add(1, Ordering::Relaxed);
                    return Some(entry.value.clone());
                }
                Some(_) => {}
                None => {
                    self.misses.fetch_add(1, Ordering::Relaxed);
                    return None;
                }
            }
        }

        // Expired: evict unless a writer refreshed it in the meantime
        let mut entries = self.entries.write().await;
        if entries.get(key).is_some_and(|entry| !entry.is_live(now)) {
            entries.remove(key);
        }
        self.misses.fetch_add(1, Ordering::Relaxed);
        None
    }

    /// Store with the default TTL
    pub async fn set(&self, key: impl Into<String>, value: V) {
        self.set_with_ttl(key, value, self.default_ttl).await;
    }

    /// Store with an explicit TTL
    pub async fn set_with_ttl(&self, key: impl Into<String>, value: V, ttl: Duration) {
        let entry = CacheEntry {
            value,
            expires_at: Instant::now() + ttl,
        };
        self.entries.write().await.insert(key.into(), entry);
    }

    /// Drop every entry; returns how many were removed
    pub async fn clear_all(&self) -> usize {
        let mut entries = self.entries.write().await;
        let removed = entries.len();
        entries.clear();
        removed
    }

    pub async fn stats(&self) -> CacheStats {
        let now = Instant::now();
        let keys = self
            .entries
            .read()
            .await
            .values()
            .filter(|entry| entry.is_live(now))
            .count();

        CacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            keys,
        }
    }
}

/// Value stored under a code or under the aggregate key
#[derive(Debug, Clone)]
pub enum CachedAirports {
    One(Arc<AirportRecord>),
    All(Arc<Vec<AirportRecord>>),
}

/// Cache for resolved airports, keyed by ICAO code plus one aggregate entry
pub struct AirportCache {
    inner: TtlCache<CachedAirports>,
}

impl AirportCache {
    /// Key holding the resolved full airport list
    pub const AGGREGATE_KEY: &'static str = "all";

    pub fn new(ttl: Duration) -> Self {
        Self {
            inner: TtlCache::new(ttl),
        }
    }

    pub async fn get_record(&self, code: &str) -> Option<Arc<AirportRecord>> {
        match self.inner.get(code).await? {
            CachedAirports::One(record) => Some(record),
            CachedAirports::All(_) => None,
        }
    }

    pub async fn put_record(&self, code: &str, record: Arc<AirportRecord>) {
        self.inner.set(code, CachedAirports::One(record)).await;
    }

    pub async fn get_all(&self) -> Option<Arc<Vec<AirportRecord>>> {
        match self.inner.get(Self::AGGREGATE_KEY).await? {
            CachedAirports::All(records) => Some(records),
            CachedAirports::One(_) => None,
        }
    }

    pub async fn put_all(&self, records: Arc<Vec<AirportRecord>>) {
        self.inner
            .set(Self::AGGREGATE_KEY, CachedAirports::All(records))
            .await;
    }

    pub async fn clear_all(&self) -> usize {
        self.inner.clear_all().await
    }

    pub async fn stats(&self) -> CacheStats {
        self.inner.stats().await
    }

    pub fn ttl(&self) -> Duration {
        self.inner.default_ttl()
    }
}
