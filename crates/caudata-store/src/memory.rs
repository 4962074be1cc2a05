//! In-memory response cache, shared between clones.

use async_trait::async_trait;
use caudata_core::error::{CaudataError, Result};
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use crate::ports::{CacheStats, ResponseCache};

/// In-memory implementation of ResponseCache
#[derive(Debug, Clone, Default)]
pub struct MemoryCache {
    entries: Arc<RwLock<HashMap<String, Vec<u8>>>>,
}

impl MemoryCache {
    /// Create a new empty cache
    pub fn new() -> Self {
        Self::default()
    }
}

fn poisoned() -> CaudataError {
    CaudataError::Cache("memory cache lock poisoned".to_string())
}

#[async_trait]
impl ResponseCache for MemoryCache {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        let entries = self.entries.read().map_err(|_| poisoned())?;
        Ok(entries.get(key).cloned())
    }

    async fn put(&self, key: &str, payload: &[u8]) -> Result<()> {
        let mut entries = self.entries.write().map_err(|_| poisoned())?;
        entries.insert(key.to_string(), payload.to_vec());
        Ok(())
    }

    async fn clear(&self) -> Result<usize> {
        let mut entries = self.entries.write().map_err(|_| poisoned())?;
        let removed = entries.len();
        entries.clear();
        Ok(removed)
    }

    async fn stats(&self) -> Result<CacheStats> {
        let entries = self.entries.read().map_err(|_| poisoned())?;
        Ok(CacheStats {
            entries: entries.len(),
            bytes: entries.values().map(|v| v.len() as u64).sum(),
        })
    }
}
