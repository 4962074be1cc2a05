use async_trait::async_trait;

use crate::error::Result;
use crate::models::{BoundingBox, OccurrenceTable, Raster, TaxonQuery};

/// Port for species-occurrence retrieval
#[async_trait]
pub trait OccurrenceSource: Send + Sync {
    /// Fetch every georeferenced record for the taxon and its synonyms
    ///
    /// Records of all queried names are concatenated in query order.
    /// Duplicates are kept.
    async fn fetch(&self, query: &TaxonQuery) -> Result<OccurrenceTable>;

    /// Human-readable source name used in logs and errors
    fn source_name(&self) -> &str;
}

/// Elevation resampled onto a regular lon/lat grid
#[derive(Debug, Clone, PartialEq)]
pub struct ElevationGrid {
    pub raster: Raster,
    /// Tile zoom level the grid was built from
    pub zoom: u8,
    /// Number of tiles fetched
    pub tile_count: usize,
}

/// Port for digital elevation model retrieval
#[async_trait]
pub trait ElevationSource: Send + Sync {
    /// Fetch elevation covering `extent` on a grid of `resolution` degrees
    async fn fetch_elevation(&self, extent: &BoundingBox, resolution: f64) -> Result<ElevationGrid>;

    /// Human-readable source name used in logs and errors
    fn source_name(&self) -> &str;
}
