//! AWS terrain-tile elevation source.
//!
//! Tiles are 512x512 single-band GeoTIFFs in Web Mercator, addressed with
//! slippy-map `{z}/{x}/{y}` coordinates. Every tile covering the requested
//! extent is fetched in row-major order, mosaicked, and resampled onto a
//! regular lon/lat grid.

pub mod tile;

use std::sync::Arc;

use async_trait::async_trait;
use caudata_core::config::MAX_ZOOM;
use caudata_core::error::{CaudataError, Result};
use caudata_core::models::BoundingBox;
use caudata_core::ports::{ElevationGrid, ElevationSource};
use caudata_geo::raster::{resample_to_lonlat, MercatorGrid};
use caudata_geo::transform::{tiles_covering, TileId};
use caudata_store::ResponseCache;

use crate::error::SourceError;
use crate::transport::{fetch_cached, HttpTransport, Transport};
use tile::{decode_tile, DecodedTile};

/// AWS Open Data bucket serving the GeoTIFF tiles
pub const TERRAIN_TILE_URL: &str = "https://s3.amazonaws.com/elevation-tiles-prod/geotiff";

const SOURCE_NAME: &str = "AWS terrain tiles";

pub struct TerrainTileClient {
    base_url: String,
    zoom: u8,
    transport: Arc<dyn Transport>,
    cache: Option<Arc<dyn ResponseCache>>,
}

impl TerrainTileClient {
    pub fn new(zoom: u8) -> Result<Self> {
        Self::with_transport(TERRAIN_TILE_URL, zoom, Arc::new(HttpTransport::new()))
    }

    pub fn with_transport(base_url: impl Into<String>, zoom: u8, transport: Arc<dyn Transport>) -> Result<Self> {
        if zoom > MAX_ZOOM {
            return Err(CaudataError::ConfigInvalid {
                key: "zoom".to_string(),
                reason: format!("{} exceeds the maximum tile zoom {}", zoom, MAX_ZOOM),
            });
        }
        Ok(Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            zoom,
            transport,
            cache: None,
        })
    }

    pub fn with_cache(mut self, cache: Arc<dyn ResponseCache>) -> Self {
        self.cache = Some(cache);
        self
    }

    pub fn zoom(&self) -> u8 {
        self.zoom
    }

    pub fn tile_url(&self, tile: &TileId) -> String {
        format!("{}/{}/{}/{}.tif", self.base_url, tile.z, tile.x, tile.y)
    }

    async fn fetch_tile(&self, tile: &TileId) -> Result<DecodedTile> {
        let url = self.tile_url(tile);
        let key = format!("terrain/{}/{}/{}.tif", tile.z, tile.x, tile.y);
        let query = format!("tile={}/{}/{} url={}", tile.z, tile.x, tile.y, url);

        let bytes = fetch_cached(self.transport.as_ref(), self.cache.as_deref(), &key, &url)
            .await
            .map_err(|e| e.into_fetch_error(SOURCE_NAME, query.clone()))?;
        decode_tile(&bytes, tile).map_err(|e| e.into_fetch_error(SOURCE_NAME, query))
    }

    /// Fetch and stitch every tile covering `extent`
    pub async fn mosaic(&self, extent: &BoundingBox) -> Result<(MercatorGrid, usize)> {
        let tiles = tiles_covering(extent, self.zoom);
        let (Some(first), Some(last)) = (tiles.first().copied(), tiles.last().copied()) else {
            return Err(CaudataError::EmptyExtent {
                operation: "tile lookup".to_string(),
                reason: format!("no tile at zoom {} covers {:?}", self.zoom, extent),
            });
        };
        let cols_tiles = (last.x - first.x + 1) as usize;
        let rows_tiles = (last.y - first.y + 1) as usize;
        tracing::info!(zoom = self.zoom, tiles = tiles.len(), "Fetching terrain tiles");

        let mut grid: Option<MercatorGrid> = None;
        let mut tile_size = 0;
        for id in &tiles {
            let decoded = self.fetch_tile(id).await?;
            if grid.is_none() {
                tile_size = decoded.width;
            }
            let grid = grid.get_or_insert_with(|| {
                MercatorGrid::for_tiles(self.zoom, first.x, first.y, cols_tiles, rows_tiles, tile_size)
            });

            if decoded.width != tile_size || decoded.height != tile_size {
                return Err(SourceError::TileSize {
                    tile: format!("{}/{}/{}", id.z, id.x, id.y),
                    width: decoded.width,
                    height: decoded.height,
                    expected: tile_size,
                }
                .into_fetch_error(SOURCE_NAME, self.tile_url(id)));
            }

            let row_offset = (id.y - first.y) as usize * tile_size;
            let col_offset = (id.x - first.x) as usize * tile_size;
            for row in 0..tile_size {
                for col in 0..tile_size {
                    grid.set(row_offset + row, col_offset + col, decoded.values[row * tile_size + col]);
                }
            }
            tracing::debug!(z = id.z, x = id.x, y = id.y, "Placed tile");
        }

        let grid = grid.ok_or_else(|| CaudataError::EmptyExtent {
            operation: "tile mosaic".to_string(),
            reason: "no tile was decoded".to_string(),
        })?;
        Ok((grid, tiles.len()))
    }
}

#[async_trait]
impl ElevationSource for TerrainTileClient {
    async fn fetch_elevation(&self, extent: &BoundingBox, resolution: f64) -> Result<ElevationGrid> {
        let (grid, tile_count) = self.mosaic(extent).await?;
        let raster = resample_to_lonlat(&grid, extent, resolution)?;
        tracing::info!(
            rows = raster.rows(),
            cols = raster.cols(),
            valid = raster.valid_count(),
            "Built elevation grid"
        );
        Ok(ElevationGrid { raster, zoom: self.zoom, tile_count })
    }

    fn source_name(&self) -> &str {
        SOURCE_NAME
    }
}
