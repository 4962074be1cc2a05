use async_trait::async_trait;
use caudata_core::error::Result;

/// Entry count and total payload size of a cache
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    pub entries: usize,
    pub bytes: u64,
}

/// Port for caching raw remote responses by key
///
/// Keys are `/`-separated paths such as `gbif/Taricha_sierrae/0-300.json`.
#[async_trait]
pub trait ResponseCache: Send + Sync {
    /// Fetch a cached payload
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>>;

    /// Store a payload, replacing any previous value
    async fn put(&self, key: &str, payload: &[u8]) -> Result<()>;

    /// Remove every entry, returning how many were removed
    async fn clear(&self) -> Result<usize>;

    /// Number of cached entries
    async fn len(&self) -> Result<usize> {
        Ok(self.stats().await?.entries)
    }

    /// Entry count and total size
    async fn stats(&self) -> Result<CacheStats>;
}
