//! Filesystem cache: one file per key under a root directory.

use async_trait::async_trait;
use caudata_core::error::{CaudataError, Result};
use std::path::{Component, Path, PathBuf};
use tokio::fs;

use crate::ports::{CacheStats, ResponseCache};

/// Filesystem implementation of ResponseCache
#[derive(Debug, Clone)]
pub struct FileCache {
    root: PathBuf,
}

impl FileCache {
    /// Create a cache rooted at `root`; the directory is created on first write
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Path of the file backing `key`
    ///
    /// Each `/`-separated segment is sanitized so a key can never escape the
    /// cache root.
    pub fn path_for(&self, key: &str) -> Result<PathBuf> {
        let mut path = self.root.clone();
        let mut segments = 0;
        for segment in key.split('/').filter(|s| !s.is_empty()) {
            let clean: String = segment
                .chars()
                .map(|c| if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_') { c } else { '_' })
                .collect();
            let component = Path::new(&clean);
            if !matches!(component.components().next(), Some(Component::Normal(_))) {
                return Err(CaudataError::Cache(format!("invalid cache key '{}'", key)));
            }
            path.push(clean);
            segments += 1;
        }
        if segments == 0 {
            return Err(CaudataError::Cache("empty cache key".to_string()));
        }
        Ok(path)
    }

    /// Walk every file under the root
    async fn files(&self) -> Result<Vec<(PathBuf, u64)>> {
        let mut files = Vec::new();
        if !fs::try_exists(&self.root).await? {
            return Ok(files);
        }

        let mut pending = vec![self.root.clone()];
        while let Some(dir) = pending.pop() {
            let mut entries = fs::read_dir(&dir).await?;
            while let Some(entry) = entries.next_entry().await? {
                let metadata = entry.metadata().await?;
                if metadata.is_dir() {
                    pending.push(entry.path());
                } else {
                    files.push((entry.path(), metadata.len()));
                }
            }
        }
        Ok(files)
    }
}

#[async_trait]
impl ResponseCache for FileCache {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        let path = self.path_for(key)?;
        match fs::read(&path).await {
            Ok(bytes) => {
                tracing::debug!(key, "Cache hit");
                Ok(Some(bytes))
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    async fn put(&self, key: &str, payload: &[u8]) -> Result<()> {
        let path = self.path_for(key)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).await?;
        }

        // Write beside the target and rename so readers never see a partial file
        let tmp = path.with_extension("partial");
        fs::write(&tmp, payload).await?;
        fs::rename(&tmp, &path).await?;
        Ok(())
    }

    async fn clear(&self) -> Result<usize> {
        let removed = self.files().await?.len();
        if fs::try_exists(&self.root).await? {
            fs::remove_dir_all(&self.root).await?;
        }
        tracing::info!(removed, root = %self.root.display(), "Cleared cache");
        Ok(removed)
    }

    async fn stats(&self) -> Result<CacheStats> {
        let files = self.files().await?;
        Ok(CacheStats { entries: files.len(), bytes: files.iter().map(|(_, size)| size).sum() })
    }
}
