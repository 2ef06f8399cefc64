//! Two-tier price cache: an external key-value store with an in-process
//! fallback.
//!
//! The external tier, when reachable, is the source of truth: its answer is
//! returned as-is, including misses. The in-process map is consulted only
//! when the external tier errors or was never available. Nothing here is
//! durable; the cache starts empty on every process start.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use chrono::{DateTime, Utc};
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::clock::{Clock, SystemClock};

use super::redis_store::RedisStore;

/// Namespace prefix for keys written to the external store, so a shared
/// backend can be purged without touching unrelated data.
const EXTERNAL_KEY_PREFIX: &str = "price:";

/// External cache tier. Implementations map to a networked key-value
/// service; every method may fail, and the cache treats any failure as
/// "tier unavailable for this call".
#[async_trait::async_trait]
pub trait CacheStore: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<f64>>;

    /// Store a value with the backend's own expiry.
    async fn set_ex(&self, key: &str, value: f64, ttl: Duration) -> Result<()>;

    /// Remove every key starting with `prefix`.
    async fn clear_prefix(&self, prefix: &str) -> Result<()>;
}

pub struct PriceCache {
    external: Option<Arc<dyn CacheStore>>,
    memory: Mutex<HashMap<String, (f64, DateTime<Utc>)>>,
    clock: Arc<dyn Clock>,
}

impl PriceCache {
    /// Cache with no external tier.
    pub fn in_memory() -> Self {
        Self::with_store(None)
    }

    pub fn with_store(external: Option<Arc<dyn CacheStore>>) -> Self {
        Self {
            external,
            memory: Mutex::new(HashMap::new()),
            clock: Arc::new(SystemClock),
        }
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Reach for the external backend once. A missing URL or a failed
    /// connection downgrades to the in-process tier for the process
    /// lifetime; there is no reconnect logic.
    pub async fn connect(redis_url: Option<&str>) -> Self {
        let external = match redis_url {
            Some(url) => match RedisStore::connect(url).await {
                Ok(store) => {
                    info!("external price cache connected");
                    Some(Arc::new(store) as Arc<dyn CacheStore>)
                }
                Err(error) => {
                    warn!(%error, "external price cache unavailable, using in-process cache only");
                    None
                }
            },
            None => None,
        };
        Self::with_store(external)
    }

    /// Fresh cached price, or `None` on a miss or expiry.
    ///
    /// The in-process tier stores write timestamps, not deadlines, so `ttl`
    /// must be passed consistently per asset class: it is evaluated at read
    /// time against the entry's age, and a stale entry is evicted by the
    /// read that discovers it.
    pub async fn get(&self, key: &str, ttl: Duration) -> Option<f64> {
        if let Some(store) = &self.external {
            match store.get(&external_key(key)).await {
                Ok(value) => return value,
                Err(error) => {
                    debug!(key, %error, "external cache read failed, trying in-process tier");
                }
            }
        }

        let mut memory = self.memory.lock().await;
        match memory.get(key) {
            Some((value, cached_at)) => {
                let age = self.clock.now() - *cached_at;
                if age < chrono::Duration::from_std(ttl).unwrap_or(chrono::Duration::MAX) {
                    Some(*value)
                } else {
                    memory.remove(key);
                    None
                }
            }
            None => None,
        }
    }

    /// Cache a price. Writes go to the external tier when it accepts them;
    /// only a failed external write lands in the in-process map.
    pub async fn set(&self, key: &str, value: f64, ttl: Duration) {
        if let Some(store) = &self.external {
            match store.set_ex(&external_key(key), value, ttl).await {
                Ok(()) => return,
                Err(error) => {
                    debug!(key, %error, "external cache write failed, using in-process tier");
                }
            }
        }

        let mut memory = self.memory.lock().await;
        memory.insert(key.to_string(), (value, self.clock.now()));
    }

    /// Best-effort purge of the external price namespace, then an
    /// unconditional clear of the in-process map.
    pub async fn clear(&self) {
        if let Some(store) = &self.external {
            if let Err(error) = store.clear_prefix(EXTERNAL_KEY_PREFIX).await {
                warn!(%error, "failed to clear external cache tier");
            }
        }
        self.memory.lock().await.clear();
    }
}

fn external_key(key: &str) -> String {
    format!("{EXTERNAL_KEY_PREFIX}{key}")
}
