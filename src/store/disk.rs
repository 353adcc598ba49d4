use crate::store::DurableStore;
use anyhow::Result;
use async_trait::async_trait;
use fjall::{Keyspace, PartitionCreateOptions, PartitionHandle};
use std::path::Path;
use tracing::debug;

/// Fjall-backed durable store. Entries survive process restarts and are
/// scoped to the data directory the keyspace was opened in.
pub struct DiskStore {
    _keyspace: Keyspace,
    partition: PartitionHandle,
}

impl DiskStore {
    pub fn open(path: &Path) -> Result<Self> {
        std::fs::create_dir_all(path)?;
        let keyspace = fjall::Config::new(path).open()?;
        let partition = keyspace.open_partition("responses", PartitionCreateOptions::default())?;
        Ok(Self {
            _keyspace: keyspace,
            partition,
        })
    }
}

#[async_trait]
impl DurableStore for DiskStore {
    async fn get(&self, key: &str) -> Option<Vec<u8>> {
        match self.partition.get(key) {
            Ok(Some(value)) => Some(value.to_vec()),
            Ok(None) => None,
            Err(e) => {
                debug!("DiskStore get error for {key}: {e}");
                None
            }
        }
    }

    async fn put(&self, key: &str, value: &[u8]) {
        if let Err(e) = self.partition.insert(key, value) {
            debug!("DiskStore put error for {key}: {e}");
        }
    }

    async fn remove(&self, key: &str) {
        if let Err(e) = self.partition.remove(key) {
            debug!("DiskStore remove error for {key}: {e}");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[tokio::test]
    async fn test_disk_store_round_trip() {
        let dir = tempdir().unwrap();
        let store = DiskStore::open(dir.path()).unwrap();

        assert!(store.get("key1").await.is_none());

        store.put("key1", b"value1").await;
        assert_eq!(store.get("key1").await, Some(b"value1".to_vec()));

        store.remove("key1").await;
        assert!(store.get("key1").await.is_none());
    }

    #[tokio::test]
    async fn test_disk_store_survives_reopen() {
        let dir = tempdir().unwrap();
        {
            let store = DiskStore::open(dir.path()).unwrap();
            store.put("key1", b"persisted").await;
        }

        let store = DiskStore::open(dir.path()).unwrap();
        assert_eq!(store.get("key1").await, Some(b"persisted".to_vec()));
    }

    #[tokio::test]
    async fn test_disk_store_remove_missing_is_noop() {
        let dir = tempdir().unwrap();
        let store = DiskStore::open(dir.path()).unwrap();
        store.remove("missing").await;
        assert!(store.get("missing").await.is_none());
    }
}
