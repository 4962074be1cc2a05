//! Regular lon/lat grid used for elevation and the derived terrain layers.

use crate::error::{CaudataError, Result};
use crate::models::geometry::BoundingBox;
use serde::{Deserialize, Serialize};

/// Single-band raster with optional (no-data) cells.
///
/// Cells are stored row-major, row 0 at the northern edge, column 0 at the
/// western edge.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Raster {
    extent: BoundingBox,
    rows: usize,
    cols: usize,
    values: Vec<Option<f32>>,
}

/// Basic statistics over the valid cells of a raster
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RasterStats {
    pub min: f32,
    pub max: f32,
    pub mean: f64,
    pub valid_cells: usize,
    pub nodata_cells: usize,
}

impl Raster {
    /// Create a raster, checking the value count against the shape
    pub fn new(
        extent: BoundingBox,
        rows: usize,
        cols: usize,
        values: Vec<Option<f32>>,
    ) -> Result<Self> {
        if rows == 0 || cols == 0 || extent.is_empty() {
            return Err(CaudataError::EmptyExtent {
                operation: "raster construction".to_string(),
                reason: format!("{}x{} cells over {:?}", rows, cols, extent),
            });
        }
        if values.len() != rows * cols {
            return Err(CaudataError::RasterShape { expected: rows * cols, found: values.len() });
        }
        Ok(Self { extent, rows, cols, values })
    }

    /// A raster of the given shape with every cell set to `value`
    pub fn filled(extent: BoundingBox, rows: usize, cols: usize, value: Option<f32>) -> Result<Self> {
        Self::new(extent, rows, cols, vec![value; rows * cols])
    }

    /// Same grid, new values
    pub fn with_values(&self, values: Vec<Option<f32>>) -> Result<Self> {
        Self::new(self.extent, self.rows, self.cols, values)
    }

    pub fn extent(&self) -> BoundingBox {
        self.extent
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn values(&self) -> &[Option<f32>] {
        &self.values
    }

    /// Cell width in degrees of longitude
    pub fn cell_width(&self) -> f64 {
        self.extent.width() / self.cols as f64
    }

    /// Cell height in degrees of latitude
    pub fn cell_height(&self) -> f64 {
        self.extent.height() / self.rows as f64
    }

    pub fn get(&self, row: usize, col: usize) -> Option<f32> {
        if row >= self.rows || col >= self.cols {
            return None;
        }
        self.values[row * self.cols + col]
    }

    pub fn set(&mut self, row: usize, col: usize, value: Option<f32>) {
        if row < self.rows && col < self.cols {
            self.values[row * self.cols + col] = value;
        }
    }

    /// Geographic center of a cell as (lon, lat)
    pub fn cell_center(&self, row: usize, col: usize) -> (f64, f64) {
        let lon = self.extent.min_lon + (col as f64 + 0.5) * self.cell_width();
        let lat = self.extent.max_lat - (row as f64 + 0.5) * self.cell_height();
        (lon, lat)
    }

    /// Geographic bounds of a cell
    pub fn cell_bounds(&self, row: usize, col: usize) -> BoundingBox {
        let min_lon = self.extent.min_lon + col as f64 * self.cell_width();
        let max_lat = self.extent.max_lat - row as f64 * self.cell_height();
        BoundingBox::new(min_lon, max_lat - self.cell_height(), min_lon + self.cell_width(), max_lat)
    }

    /// Cell containing a coordinate, `None` outside the extent
    pub fn cell_at(&self, lon: f64, lat: f64) -> Option<(usize, usize)> {
        if !self.extent.contains(lon, lat) {
            return None;
        }
        let col = ((lon - self.extent.min_lon) / self.cell_width()).floor() as usize;
        let row = ((self.extent.max_lat - lat) / self.cell_height()).floor() as usize;
        Some((row.min(self.rows - 1), col.min(self.cols - 1)))
    }

    /// Number of cells holding a value
    pub fn valid_count(&self) -> usize {
        self.values.iter().filter(|v| v.is_some()).count()
    }

    /// Statistics over valid cells, `None` if every cell is no-data
    pub fn stats(&self) -> Option<RasterStats> {
        let mut min = f32::INFINITY;
        let mut max = f32::NEG_INFINITY;
        let mut sum = 0.0f64;
        let mut valid = 0usize;
        for value in self.values.iter().flatten() {
            min = min.min(*value);
            max = max.max(*value);
            sum += *value as f64;
            valid += 1;
        }
        if valid == 0 {
            return None;
        }
        Some(RasterStats {
            min,
            max,
            mean: sum / valid as f64,
            valid_cells: valid,
            nodata_cells: self.values.len() - valid,
        })
    }
}
