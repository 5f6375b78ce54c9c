//! Time-bounded flag record cache.

use crate::error::{FlagError, FlagResult};
use crate::flag::FlagRecord;
use crate::store::FlagStore;
use log::debug;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;
use tokio::time::Instant;

/// Default time a cached record may be served before being refreshed.
pub const DEFAULT_CACHE_TTL: Duration = Duration::from_secs(60);

struct CacheEntry {
    record: FlagRecord,
    fetched_at: Instant,
}

/// TTL-bounded read-through cache over a [`FlagStore`].
///
/// Expiry is checked lazily on access; there is no background sweeper.
/// Entries are replaced whole, so concurrent readers never observe a
/// partially written record. Negative results are never cached: a store
/// outage or an absent record costs one store call per lookup but cannot
/// stick a flag as missing beyond that call.
pub struct FlagCache {
    store: Arc<dyn FlagStore>,
    ttl: Duration,
    entries: RwLock<HashMap<String, CacheEntry>>,
}

impl FlagCache {
    /// Create a cache with the default TTL.
    pub fn new(store: Arc<dyn FlagStore>) -> Self {
        Self::with_ttl(store, DEFAULT_CACHE_TTL)
    }

    /// Create a cache with an explicit TTL.
    pub fn with_ttl(store: Arc<dyn FlagStore>, ttl: Duration) -> Self {
        Self {
            store,
            ttl,
            entries: RwLock::new(HashMap::new()),
        }
    }

    /// Get a record, reading through to the store on miss or expiry.
    pub async fn get(&self, name: &str) -> FlagResult<FlagRecord> {
        {
            let entries = self.entries.read().await;
            if let Some(entry) = entries.get(name)
                && entry.fetched_at.elapsed() < self.ttl
            {
                return Ok(entry.record.clone());
            }
        }

        match self.store.read_flag(name).await? {
            Some(record) => {
                debug!("flag cache refill: {name}");
                self.entries.write().await.insert(
                    name.to_string(),
                    CacheEntry {
                        record: record.clone(),
                        fetched_at: Instant::now(),
                    },
                );
                Ok(record)
            }
            None => {
                // Drop any expired entry for a record the store no longer has.
                self.entries.write().await.remove(name);
                Err(FlagError::NotFound(name.to_string()))
            }
        }
    }

    /// Remove a single cached entry.
    pub async fn invalidate(&self, name: &str) {
        self.entries.write().await.remove(name);
    }

    /// Remove every cached entry.
    pub async fn invalidate_all(&self) {
        self.entries.write().await.clear();
    }

    /// Number of cached entries, expired or not.
    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    /// True when nothing is cached.
    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }
}
