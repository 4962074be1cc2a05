//! Integration tests for the cache adapters behind the port

use caudata_store::{FileCache, MemoryCache, ResponseCache};
use std::sync::Arc;
use tempfile::TempDir;

async fn exercise(cache: Arc<dyn ResponseCache>) {
    cache.put("gbif/Taricha_sierrae/0-300.json", br#"{"results":[]}"#).await.unwrap();
    cache.put("gbif/Taricha_sierrae/300-300.json", br#"{"results":[1]}"#).await.unwrap();

    // Overwrite keeps one entry
    cache.put("gbif/Taricha_sierrae/0-300.json", br#"{"results":[2]}"#).await.unwrap();
    assert_eq!(cache.len().await.unwrap(), 2);
    assert_eq!(
        cache.get("gbif/Taricha_sierrae/0-300.json").await.unwrap().as_deref(),
        Some(&br#"{"results":[2]}"#[..])
    );

    assert_eq!(cache.clear().await.unwrap(), 2);
    assert!(cache.get("gbif/Taricha_sierrae/0-300.json").await.unwrap().is_none());
}

#[tokio::test]
async fn test_memory_cache_contract() {
    exercise(Arc::new(MemoryCache::new())).await;
}

#[tokio::test]
async fn test_file_cache_contract() {
    let dir = TempDir::new().unwrap();
    exercise(Arc::new(FileCache::new(dir.path()))).await;
}

#[tokio::test]
async fn test_file_cache_persists_across_instances() {
    let dir = TempDir::new().unwrap();
    FileCache::new(dir.path()).put("terrain/6/9/24.tif", b"tile").await.unwrap();

    let reopened = FileCache::new(dir.path());
    assert_eq!(reopened.get("terrain/6/9/24.tif").await.unwrap(), Some(b"tile".to_vec()));
}
