use crate::store::DurableStore;
use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::Mutex;

/// In-memory stand-in for the durable tier. Used in tests and on hosts
/// where no data directory can be resolved.
#[derive(Default)]
pub struct MemoryStore {
    inner: Mutex<HashMap<String, Vec<u8>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl DurableStore for MemoryStore {
    async fn get(&self, key: &str) -> Option<Vec<u8>> {
        self.inner.lock().await.get(key).cloned()
    }

    async fn put(&self, key: &str, value: &[u8]) {
        self.inner.lock().await.insert(key.to_string(), value.to_vec());
    }

    async fn remove(&self, key: &str) {
        self.inner.lock().await.remove(key);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_memory_store_round_trip() {
        let store = MemoryStore::new();

        assert!(store.get("key1").await.is_none());

        store.put("key1", b"value1").await;
        assert_eq!(store.get("key1").await, Some(b"value1".to_vec()));

        store.remove("key1").await;
        assert!(store.get("key1").await.is_none());
    }
}
