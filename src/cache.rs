//! Time-bounded response cache.
//!
//! Two tiers: a fast in-process map that lives for the session, and an
//! optional durable store that survives restarts. Entries carry the wall
//! clock time they were stored at and are never returned once older than
//! [`TTL_MS`].

use crate::store::DurableStore;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};
use tokio::sync::Mutex;
use tracing::{debug, warn};

/// Fixed freshness window: one hour.
pub const TTL_MS: u64 = 3_600_000;

/// Injected time source so tests control expiry without sleeping.
pub trait Clock: Send + Sync {
    fn now_millis(&self) -> u64;
}

pub struct SystemClock;

impl Clock for SystemClock {
    fn now_millis(&self) -> u64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis() as u64)
            .unwrap_or(0)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheEntry<V> {
    pub data: V,
    pub stored_at: u64,
}

/// Generic key-to-value cache with timestamp-based expiry.
///
/// Callers namespace their own keys (e.g. `balances:<address>:<credential>`);
/// the durable tier prefixes them with `cache:` on disk. All access is
/// funneled through a single async mutex on the in-process tier.
pub struct ResponseCache<V> {
    memory: Mutex<HashMap<String, CacheEntry<V>>>,
    store: Option<Arc<dyn DurableStore>>,
    clock: Arc<dyn Clock>,
}

impl<V> ResponseCache<V>
where
    V: Clone + Serialize + DeserializeOwned + Send + Sync,
{
    pub fn new(store: Option<Arc<dyn DurableStore>>, clock: Arc<dyn Clock>) -> Self {
        Self {
            memory: Mutex::new(HashMap::new()),
            store,
            clock,
        }
    }

    fn store_key(key: &str) -> String {
        format!("cache:{key}")
    }

    fn is_fresh(&self, entry_stored_at: u64) -> bool {
        self.clock.now_millis().saturating_sub(entry_stored_at) < TTL_MS
    }

    /// Two-tier lookup. Memory first; on miss the durable tier is consulted
    /// and a fresh hit is promoted into memory. An expired durable entry is
    /// deleted as a side effect of the failed lookup.
    async fn lookup(&self, key: &str) -> Option<CacheEntry<V>> {
        {
            let mut memory = self.memory.lock().await;
            if let Some(entry) = memory.get(key) {
                if self.is_fresh(entry.stored_at) {
                    debug!("Cache HIT (memory) for key: {key}");
                    return Some(entry.clone());
                }
                debug!("Cache entry expired (memory) for key: {key}");
                memory.remove(key);
            }
        }

        let store = self.store.as_ref()?;
        let raw = store.get(&Self::store_key(key)).await?;
        let entry: CacheEntry<V> = match serde_json::from_slice(&raw) {
            Ok(entry) => entry,
            Err(e) => {
                warn!("Discarding undecodable cache entry for {key}: {e}");
                store.remove(&Self::store_key(key)).await;
                return None;
            }
        };

        if !self.is_fresh(entry.stored_at) {
            debug!("Cache entry expired (durable) for key: {key}");
            store.remove(&Self::store_key(key)).await;
            return None;
        }

        debug!("Cache HIT (durable) for key: {key}, promoting to memory");
        let mut memory = self.memory.lock().await;
        memory.insert(key.to_string(), entry.clone());
        Some(entry)
    }

    pub async fn get(&self, key: &str) -> Option<V> {
        let value = self.lookup(key).await.map(|entry| entry.data);
        if value.is_none() {
            debug!("Cache MISS for key: {key}");
        }
        value
    }

    /// Time at which the cached value under `key` was stored, if still fresh.
    pub async fn timestamp(&self, key: &str) -> Option<u64> {
        self.lookup(key).await.map(|entry| entry.stored_at)
    }

    /// Writes both tiers with `stored_at = now`. A durable-tier failure is
    /// logged and swallowed; the in-process write still holds.
    pub async fn set(&self, key: &str, value: V) {
        let entry = CacheEntry {
            data: value,
            stored_at: self.clock.now_millis(),
        };

        if let Some(store) = &self.store {
            match serde_json::to_vec(&entry) {
                Ok(raw) => store.put(&Self::store_key(key), &raw).await,
                Err(e) => warn!("Failed to encode cache entry for {key}: {e}"),
            }
        }

        debug!("Cache PUT for key: {key}");
        let mut memory = self.memory.lock().await;
        memory.insert(key.to_string(), entry);
    }

    /// Unconditional removal from both tiers. No-op when the key is absent.
    pub async fn invalidate(&self, key: &str) {
        debug!("Cache INVALIDATE for key: {key}");
        self.memory.lock().await.remove(key);
        if let Some(store) = &self.store {
            store.remove(&Self::store_key(key)).await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;
    use std::sync::atomic::{AtomicU64, Ordering};

    struct ManualClock {
        now: AtomicU64,
    }

    impl ManualClock {
        fn new(start: u64) -> Self {
            Self {
                now: AtomicU64::new(start),
            }
        }

        fn advance(&self, ms: u64) {
            self.now.fetch_add(ms, Ordering::SeqCst);
        }
    }

    impl Clock for ManualClock {
        fn now_millis(&self) -> u64 {
            self.now.load(Ordering::SeqCst)
        }
    }

    fn cache_with(
        store: Option<Arc<dyn DurableStore>>,
        clock: Arc<ManualClock>,
    ) -> ResponseCache<String> {
        ResponseCache::new(store, clock)
    }

    #[tokio::test]
    async fn test_round_trip() {
        let clock = Arc::new(ManualClock::new(1_000));
        let cache = cache_with(Some(Arc::new(MemoryStore::new())), clock);

        assert!(cache.get("balances:0xabc:").await.is_none());

        cache.set("balances:0xabc:", "payload".to_string()).await;
        assert_eq!(
            cache.get("balances:0xabc:").await,
            Some("payload".to_string())
        );
        assert_eq!(cache.timestamp("balances:0xabc:").await, Some(1_000));
    }

    #[tokio::test]
    async fn test_expiry_makes_both_lookups_absent() {
        let clock = Arc::new(ManualClock::new(0));
        let cache = cache_with(Some(Arc::new(MemoryStore::new())), Arc::clone(&clock));

        cache.set("k", "v".to_string()).await;
        clock.advance(TTL_MS - 1);
        assert_eq!(cache.get("k").await, Some("v".to_string()));

        clock.advance(2);
        assert!(cache.get("k").await.is_none());
        assert!(cache.timestamp("k").await.is_none());
    }

    #[tokio::test]
    async fn test_durable_hit_promotes_to_memory() {
        let clock = Arc::new(ManualClock::new(500));
        let store: Arc<dyn DurableStore> = Arc::new(MemoryStore::new());

        let first = cache_with(Some(Arc::clone(&store)), Arc::clone(&clock));
        first.set("k", "v".to_string()).await;

        // Fresh instance simulates a restart: memory tier is empty.
        let second = cache_with(Some(Arc::clone(&store)), Arc::clone(&clock));
        assert_eq!(second.get("k").await, Some("v".to_string()));

        // Promotion means the value survives the durable tier going away.
        store.remove("cache:k").await;
        assert_eq!(second.get("k").await, Some("v".to_string()));
    }

    #[tokio::test]
    async fn test_expired_durable_entry_is_deleted_on_lookup() {
        let clock = Arc::new(ManualClock::new(0));
        let store: Arc<dyn DurableStore> = Arc::new(MemoryStore::new());

        let first = cache_with(Some(Arc::clone(&store)), Arc::clone(&clock));
        first.set("k", "v".to_string()).await;
        assert!(store.get("cache:k").await.is_some());

        clock.advance(TTL_MS + 1);
        let second = cache_with(Some(Arc::clone(&store)), Arc::clone(&clock));
        assert!(second.get("k").await.is_none());
        assert!(store.get("cache:k").await.is_none());
    }

    #[tokio::test]
    async fn test_invalidate_removes_both_tiers() {
        let clock = Arc::new(ManualClock::new(0));
        let store: Arc<dyn DurableStore> = Arc::new(MemoryStore::new());
        let cache = cache_with(Some(Arc::clone(&store)), clock);

        cache.set("k", "v".to_string()).await;
        cache.invalidate("k").await;

        assert!(cache.get("k").await.is_none());
        assert!(store.get("cache:k").await.is_none());

        // Absent key is a no-op.
        cache.invalidate("missing").await;
    }

    #[tokio::test]
    async fn test_memory_only_when_no_durable_store() {
        let clock = Arc::new(ManualClock::new(0));
        let cache = cache_with(None, clock);

        cache.set("k", "v".to_string()).await;
        assert_eq!(cache.get("k").await, Some("v".to_string()));
    }

    #[tokio::test]
    async fn test_undecodable_durable_entry_is_discarded() {
        let clock = Arc::new(ManualClock::new(0));
        let store: Arc<dyn DurableStore> = Arc::new(MemoryStore::new());
        store.put("cache:k", b"not json").await;

        let cache = cache_with(Some(Arc::clone(&store)), clock);
        assert!(cache.get("k").await.is_none());
        assert!(store.get("cache:k").await.is_none());
    }
}
