pub mod disk;
pub mod memory;

use async_trait::async_trait;

pub use disk::DiskStore;
pub use memory::MemoryStore;

/// Durable key/value tier behind the response cache.
///
/// Implementations own their failure handling: storage errors are logged and
/// swallowed so the cache degrades to memory-only instead of surfacing them.
#[async_trait]
pub trait DurableStore: Send + Sync {
    async fn get(&self, key: &str) -> Option<Vec<u8>>;
    async fn put(&self, key: &str, value: &[u8]);
    async fn remove(&self, key: &str);
}
