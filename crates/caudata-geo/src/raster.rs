//! Elevation grid operations: reprojection from Web Mercator, crop and mask.

use crate::boundary::BoundaryMask;
use crate::transform::{lonlat_to_mercator, ORIGIN_SHIFT};
use caudata_core::error::{CaudataError, Result};
use caudata_core::models::{BoundingBox, Raster};

/// Tolerance for cell-edge alignment, in cells
const EDGE_EPSILON: f64 = 1e-9;

/// A north-up grid of square pixels in Web Mercator meters
#[derive(Debug, Clone, PartialEq)]
pub struct MercatorGrid {
    /// Western edge in meters
    pub min_x: f64,
    /// Northern edge in meters
    pub max_y: f64,
    /// Pixel side in meters
    pub pixel_size: f64,
    pub width: usize,
    pub height: usize,
    pub values: Vec<Option<f32>>,
}

impl MercatorGrid {
    /// Empty grid covering `cols_tiles` x `rows_tiles` tiles of `tile_size`
    /// pixels, anchored at a tile's north-west corner
    pub fn for_tiles(
        zoom: u8,
        first_x: u32,
        first_y: u32,
        cols_tiles: usize,
        rows_tiles: usize,
        tile_size: usize,
    ) -> Self {
        let tile_m = 2.0 * ORIGIN_SHIFT / (1u64 << zoom) as f64;
        let width = cols_tiles * tile_size;
        let height = rows_tiles * tile_size;
        Self {
            min_x: -ORIGIN_SHIFT + first_x as f64 * tile_m,
            max_y: ORIGIN_SHIFT - first_y as f64 * tile_m,
            pixel_size: tile_m / tile_size as f64,
            width,
            height,
            values: vec![None; width * height],
        }
    }

    pub fn get(&self, row: usize, col: usize) -> Option<f32> {
        if row >= self.height || col >= self.width {
            return None;
        }
        self.values[row * self.width + col]
    }

    pub fn set(&mut self, row: usize, col: usize, value: Option<f32>) {
        if row < self.height && col < self.width {
            self.values[row * self.width + col] = value;
        }
    }

    /// Bilinear sample at a Web Mercator coordinate
    ///
    /// Falls back to the nearest pixel when a neighbor is no-data; `None`
    /// outside the grid.
    pub fn sample(&self, x: f64, y: f64) -> Option<f32> {
        // Continuous pixel coordinates with pixel centers at integer + 0.5
        let px = (x - self.min_x) / self.pixel_size;
        let py = (self.max_y - y) / self.pixel_size;
        if px < 0.0 || py < 0.0 || px >= self.width as f64 || py >= self.height as f64 {
            return None;
        }

        let fx = (px - 0.5).max(0.0);
        let fy = (py - 0.5).max(0.0);
        let c0 = (fx.floor() as usize).min(self.width - 1);
        let r0 = (fy.floor() as usize).min(self.height - 1);
        let c1 = (c0 + 1).min(self.width - 1);
        let r1 = (r0 + 1).min(self.height - 1);
        let tx = (fx - c0 as f64).clamp(0.0, 1.0) as f32;
        let ty = (fy - r0 as f64).clamp(0.0, 1.0) as f32;

        match (self.get(r0, c0), self.get(r0, c1), self.get(r1, c0), self.get(r1, c1)) {
            (Some(a), Some(b), Some(c), Some(d)) => {
                let top = a + (b - a) * tx;
                let bottom = c + (d - c) * tx;
                Some(top + (bottom - top) * ty)
            }
            _ => self.get(py.floor() as usize, px.floor() as usize),
        }
    }
}

/// Resample a Web Mercator grid onto a regular lon/lat grid over `extent`
pub fn resample_to_lonlat(grid: &MercatorGrid, extent: &BoundingBox, resolution: f64) -> Result<Raster> {
    if extent.is_empty() || !(resolution > 0.0) {
        return Err(CaudataError::EmptyExtent {
            operation: "resample".to_string(),
            reason: format!("extent {:?} at resolution {}", extent, resolution),
        });
    }

    let cols = ((extent.width() / resolution) - EDGE_EPSILON).ceil().max(1.0) as usize;
    let rows = ((extent.height() / resolution) - EDGE_EPSILON).ceil().max(1.0) as usize;
    let target = BoundingBox::new(
        extent.min_lon,
        extent.max_lat - rows as f64 * resolution,
        extent.min_lon + cols as f64 * resolution,
        extent.max_lat,
    );

    let mut raster = Raster::filled(target, rows, cols, None)?;
    for row in 0..rows {
        for col in 0..cols {
            let (lon, lat) = raster.cell_center(row, col);
            let (x, y) = lonlat_to_mercator(lon, lat);
            raster.set(row, col, grid.sample(x, y));
        }
    }

    tracing::debug!(rows, cols, valid = raster.valid_count(), "Resampled elevation to lon/lat grid");
    Ok(raster)
}

/// Keep the cells lying entirely inside `bbox`
///
/// The cropped extent is always a subset of `bbox`.
pub fn crop(raster: &Raster, bbox: &BoundingBox) -> Result<Raster> {
    let empty = |reason: String| CaudataError::EmptyExtent { operation: "crop".to_string(), reason };

    let extent = raster.extent();
    extent
        .intersection(bbox)
        .ok_or_else(|| empty(format!("raster {:?} does not overlap {:?}", extent, bbox)))?;

    let cw = raster.cell_width();
    let ch = raster.cell_height();

    let col_start = (((bbox.min_lon - extent.min_lon) / cw) - EDGE_EPSILON).ceil().max(0.0) as usize;
    let col_end = ((((bbox.max_lon - extent.min_lon) / cw) + EDGE_EPSILON).floor() as usize).min(raster.cols());
    let row_start = (((extent.max_lat - bbox.max_lat) / ch) - EDGE_EPSILON).ceil().max(0.0) as usize;
    let row_end = ((((extent.max_lat - bbox.min_lat) / ch) + EDGE_EPSILON).floor() as usize).min(raster.rows());

    if col_end <= col_start || row_end <= row_start {
        return Err(empty(format!("no whole cell of the raster fits inside {:?}", bbox)));
    }

    let rows = row_end - row_start;
    let cols = col_end - col_start;
    let mut values = Vec::with_capacity(rows * cols);
    for row in row_start..row_end {
        for col in col_start..col_end {
            values.push(raster.get(row, col));
        }
    }

    let north_west = raster.cell_bounds(row_start, col_start);
    let south_east = raster.cell_bounds(row_end - 1, col_end - 1);
    let cropped_extent = BoundingBox::new(
        north_west.min_lon.max(bbox.min_lon),
        south_east.min_lat.max(bbox.min_lat),
        south_east.max_lon.min(bbox.max_lon),
        north_west.max_lat.min(bbox.max_lat),
    );

    Raster::new(cropped_extent, rows, cols, values)
}

/// Set every cell whose center lies outside the boundary to no-data
///
/// Returns the masked raster and the number of cells newly masked. Fails when
/// no valid cell remains.
pub fn mask(raster: &Raster, boundary: &BoundaryMask) -> Result<(Raster, usize)> {
    let mut masked = raster.clone();
    let mut newly_masked = 0;

    for row in 0..raster.rows() {
        for col in 0..raster.cols() {
            let (lon, lat) = raster.cell_center(row, col);
            if !boundary.contains(lon, lat) {
                if raster.get(row, col).is_some() {
                    newly_masked += 1;
                }
                masked.set(row, col, None);
            }
        }
    }

    if masked.valid_count() == 0 {
        return Err(CaudataError::EmptyExtent {
            operation: "mask".to_string(),
            reason: format!(
                "no valid cell of {:?} lies inside boundary '{}'",
                raster.extent(),
                boundary.name()
            ),
        });
    }

    Ok((masked, newly_masked))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::boundary::california;
    use crate::models::{Crs, Geometry, RegionBoundary};

    fn ramp(extent: BoundingBox, rows: usize, cols: usize) -> Raster {
        let values = (0..rows * cols).map(|v| Some(v as f32)).collect();
        Raster::new(extent, rows, cols, values).unwrap()
    }

    #[test]
    fn test_crop_is_subset() {
        let raster = ramp(BoundingBox::new(-126.0, 31.0, -112.0, 43.0), 12, 14);
        let bbox = BoundingBox::new(-125.0, 32.25, -113.0, 42.5);
        let cropped = crop(&raster, &bbox).unwrap();

        assert!(cropped.extent().is_within(&bbox));
        // Columns -125..-113, rows whose cells lie within 32.25..42.5
        assert_eq!(cropped.cols(), 12);
        assert_eq!(cropped.rows(), 9);
        assert_eq!(cropped.get(0, 0), raster.get(1, 1));
    }

    #[test]
    fn test_crop_outside_fails() {
        let raster = ramp(BoundingBox::new(0.0, 0.0, 1.0, 1.0), 2, 2);
        let result = crop(&raster, &BoundingBox::new(10.0, 10.0, 11.0, 11.0));
        assert!(matches!(result, Err(CaudataError::EmptyExtent { .. })));
    }

    #[test]
    fn test_mask_outside_cells() {
        let raster = ramp(BoundingBox::new(-125.0, 32.0, -113.0, 42.0), 10, 12);
        let boundary = BoundaryMask::new(&california()).unwrap();
        let (masked, count) = mask(&raster, &boundary).unwrap();

        assert!(count > 0);
        assert!(masked.valid_count() > 0);
        for row in 0..masked.rows() {
            for col in 0..masked.cols() {
                let (lon, lat) = masked.cell_center(row, col);
                if masked.get(row, col).is_none() {
                    assert!(!boundary.contains(lon, lat));
                }
            }
        }
    }

    #[test]
    fn test_mask_fully_outside_fails() {
        let raster = ramp(BoundingBox::new(0.0, 0.0, 1.0, 1.0), 2, 2);
        let boundary = BoundaryMask::new(&RegionBoundary {
            name: "far".to_string(),
            geometry: Geometry::polygon(vec![vec![
                [10.0, 10.0],
                [11.0, 10.0],
                [11.0, 11.0],
                [10.0, 10.0],
            ]]),
            crs: Crs::wgs84(),
        })
        .unwrap();
        assert!(matches!(mask(&raster, &boundary), Err(CaudataError::EmptyExtent { .. })));
    }

    #[test]
    fn test_resample_constant_grid() {
        let mut grid = MercatorGrid::for_tiles(0, 0, 0, 1, 1, 8);
        for v in grid.values.iter_mut() {
            *v = Some(250.0);
        }
        let extent = BoundingBox::new(-10.0, -10.0, 10.0, 10.0);
        let raster = resample_to_lonlat(&grid, &extent, 5.0).unwrap();

        assert_eq!(raster.rows(), 4);
        assert_eq!(raster.cols(), 4);
        assert!(raster.values().iter().all(|v| *v == Some(250.0)));
    }

    #[test]
    fn test_sample_outside_grid() {
        let grid = MercatorGrid::for_tiles(2, 1, 1, 1, 1, 4);
        assert_eq!(grid.sample(-ORIGIN_SHIFT * 0.99, ORIGIN_SHIFT * 0.99), None);
    }
}
