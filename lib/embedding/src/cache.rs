//! Bounded embedding cache
//!
//! Memoizes text → vector resolution in front of an [`EmbeddingProvider`].
//! Keys are exact strings. Entries are evicted least-recently-used once the
//! capacity is reached and, when a TTL is configured, expire against an
//! injected [`Clock`].
//!
//! The lock is never held across the provider call: concurrent misses on the
//! same text may both reach the provider, and the later insert wins. An entry
//! is inserted only after its vector is complete, so a cancelled resolution
//! leaves nothing behind.

use crate::provider::EmbeddingProvider;
use futures_util::future::try_join_all;
use lru::LruCache;
use parking_lot::Mutex;
use pricematch_core::{Error, Result, Vector};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::num::NonZeroUsize;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::debug;

/// Time source for TTL checks
pub trait Clock: Send + Sync {
    fn now(&self) -> Instant;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

/// Manually advanced clock for tests and simulations
#[derive(Debug)]
pub struct ManualClock {
    now: Mutex<Instant>,
}

impl Default for ManualClock {
    fn default() -> Self {
        Self {
            now: Mutex::new(Instant::now()),
        }
    }
}

impl ManualClock {
    pub fn advance(&self, by: Duration) {
        *self.now.lock() += by;
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Instant {
        *self.now.lock()
    }
}

/// Cache and provider-call settings
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct EmbeddingCacheConfig {
    /// Maximum number of cached vectors; 0 disables caching
    pub capacity: usize,
    /// Entries older than this are re-fetched
    pub ttl_secs: Option<u64>,
    /// Upper bound for a single provider call
    pub provider_timeout_ms: u64,
}

impl Default for EmbeddingCacheConfig {
    fn default() -> Self {
        Self {
            capacity: 10_000,
            ttl_secs: None,
            provider_timeout_ms: 10_000,
        }
    }
}

impl EmbeddingCacheConfig {
    pub fn validate(&self) -> Result<()> {
        if self.provider_timeout_ms == 0 {
            return Err(Error::InvalidConfig(
                "provider_timeout_ms must be greater than zero".to_string(),
            ));
        }
        if self.ttl_secs == Some(0) {
            return Err(Error::InvalidConfig(
                "ttl_secs must be greater than zero when set".to_string(),
            ));
        }
        Ok(())
    }
}

/// Counters exposed for observability
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    pub entries: usize,
    pub capacity: usize,
}

struct CacheEntry {
    vector: Arc<Vector>,
    inserted_at: Instant,
}

pub struct EmbeddingCache {
    provider: Arc<dyn EmbeddingProvider>,
    entries: Option<Mutex<LruCache<String, CacheEntry>>>,
    ttl: Option<Duration>,
    timeout: Duration,
    clock: Arc<dyn Clock>,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl fmt::Debug for EmbeddingCache {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EmbeddingCache")
            .field("provider", &self.provider.name())
            .field("stats", &self.stats())
            .finish()
    }
}

impl EmbeddingCache {
    pub fn new(provider: Arc<dyn EmbeddingProvider>, config: &EmbeddingCacheConfig) -> Result<Self> {
        Self::with_clock(provider, config, Arc::new(SystemClock))
    }

    pub fn with_clock(
        provider: Arc<dyn EmbeddingProvider>,
        config: &EmbeddingCacheConfig,
        clock: Arc<dyn Clock>,
    ) -> Result<Self> {
        config.validate()?;
        let entries = NonZeroUsize::new(config.capacity).map(|cap| Mutex::new(LruCache::new(cap)));

        Ok(Self {
            provider,
            entries,
            ttl: config.ttl_secs.map(Duration::from_secs),
            timeout: Duration::from_millis(config.provider_timeout_ms),
            clock,
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
        })
    }

    /// Vector for `text`, from cache or from one provider call
    pub async fn resolve(&self, text: &str) -> Result<Arc<Vector>> {
        if let Some(vector) = self.lookup(text) {
            self.hits.fetch_add(1, Ordering::Relaxed);
            debug!(provider = self.provider.name(), "embedding cache hit");
            return Ok(vector);
        }
        self.misses.fetch_add(1, Ordering::Relaxed);
        debug!(provider = self.provider.name(), chars = text.len(), "embedding cache miss");

        let vector = Arc::new(self.fetch(text).await?);
        self.insert(text, Arc::clone(&vector));
        Ok(vector)
    }

    /// Resolve several texts concurrently; fails if any one fails
    pub async fn resolve_many(&self, texts: &[String]) -> Result<Vec<Arc<Vector>>> {
        try_join_all(texts.iter().map(|text| self.resolve(text))).await
    }

    pub fn stats(&self) -> CacheStats {
        let (entries, capacity) = match &self.entries {
            Some(cache) => {
                let guard = cache.lock();
                (guard.len(), guard.cap().get())
            }
            None => (0, 0),
        };
        CacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            entries,
            capacity,
        }
    }

    fn lookup(&self, text: &str) -> Option<Arc<Vector>> {
        let cache = self.entries.as_ref()?;
        let now = self.clock.now();
        let mut guard = cache.lock();

        let expired = match guard.get(text) {
            None => return None,
            Some(entry) => match self.ttl {
                Some(ttl) if now.saturating_duration_since(entry.inserted_at) >= ttl => true,
                _ => return Some(Arc::clone(&entry.vector)),
            },
        };
        if expired {
            guard.pop(text);
        }
        None
    }

    fn insert(&self, text: &str, vector: Arc<Vector>) {
        if let Some(cache) = &self.entries {
            let entry = CacheEntry {
                vector,
                inserted_at: self.clock.now(),
            };
            cache.lock().put(text.to_string(), entry);
        }
    }

    async fn fetch(&self, text: &str) -> Result<Vector> {
        let expected = self.provider.dimension();
        let data = tokio::time::timeout(self.timeout, self.provider.embed(text))
            .await
            .map_err(|_| Error::ProviderTimeout {
                provider: self.provider.name().to_string(),
                timeout_ms: self.timeout.as_millis() as u64,
            })?
            .map_err(|e| Error::EmbeddingUnavailable(e.to_string()))?;

        if data.len() != expected {
            return Err(Error::DimensionMismatch {
                expected,
                actual: data.len(),
            });
        }
        Ok(Vector::new(data))
    }
}
