use anyhow::{Context, Result};
use caudata_core::config::LayeredConfig;
use caudata_pipeline::{Pipeline, PipelineConfig};
use caudata_sources::{GbifClient, TerrainTileClient};
use caudata_store::{FileCache, ResponseCache};
use std::sync::Arc;

/// Remote sources sharing one response cache
pub struct Storage {
    pub occurrences: GbifClient,
    pub elevation: TerrainTileClient,
}

impl Storage {
    pub fn new(config: &LayeredConfig, no_cache: bool) -> Result<Self> {
        let mut occurrences = GbifClient::new(config.record_limit.value);
        let mut elevation = TerrainTileClient::new(config.zoom.value).context("Invalid terrain zoom")?;
        if !no_cache {
            let cache: Arc<dyn ResponseCache> = Arc::new(FileCache::new(config.cache_dir.value.clone()));
            occurrences = occurrences.with_cache(cache.clone());
            elevation = elevation.with_cache(cache);
        }

        Ok(Self { occurrences, elevation })
    }

    /// Pipeline over these sources
    pub fn into_pipeline(self, config: &LayeredConfig) -> Result<Pipeline<GbifClient, TerrainTileClient>> {
        let pipeline_config =
            PipelineConfig::from_layered(config).context("Failed to resolve the region boundary")?;
        Ok(Pipeline::new(self.occurrences, self.elevation, pipeline_config))
    }
}
