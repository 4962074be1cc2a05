//! Slope, aspect and hillshade from an elevation raster.
//!
//! Gradients use Horn's 3x3 finite-difference kernel with metric cell sizes
//! computed per row, since a degree of longitude shrinks with latitude. Cells
//! on the raster edge or next to a no-data cell have no derivative.

use crate::transform::meters_per_degree;
use caudata_core::error::Result;
use caudata_core::models::Raster;
use serde::{Deserialize, Serialize};

/// Aspect assigned to cells with no gradient
pub const FLAT_ASPECT_DEG: f32 = 90.0;

/// Fixed illumination of the hillshade
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Illumination {
    /// Sun altitude above the horizon in degrees
    pub altitude_deg: f64,
    /// Sun azimuth clockwise from north in degrees
    pub azimuth_deg: f64,
}

impl Default for Illumination {
    fn default() -> Self {
        Self { altitude_deg: 45.0, azimuth_deg: 315.0 }
    }
}

/// Terrain derivatives co-registered with the elevation grid
#[derive(Debug, Clone, PartialEq)]
pub struct TerrainLayers {
    /// Slope in degrees, 0 to 90
    pub slope: Raster,
    /// Downslope direction in degrees clockwise from north
    pub aspect: Raster,
    /// Grey level, 0 to 1
    pub hillshade: Raster,
}

/// Horn gradient at a cell: (dz/dx eastward, dz/dy southward), meters per meter
fn horn_gradient(elevation: &Raster, row: usize, col: usize) -> Option<(f64, f64)> {
    if row == 0 || col == 0 || row + 1 >= elevation.rows() || col + 1 >= elevation.cols() {
        return None;
    }

    let z = |dr: isize, dc: isize| -> Option<f64> {
        let r = (row as isize + dr) as usize;
        let c = (col as isize + dc) as usize;
        elevation.get(r, c).map(f64::from)
    };
    let (a, b, c) = (z(-1, -1)?, z(-1, 0)?, z(-1, 1)?);
    let (d, f) = (z(0, -1)?, z(0, 1)?);
    let (g, h, i) = (z(1, -1)?, z(1, 0)?, z(1, 1)?);
    elevation.get(row, col)?;

    let (_, lat) = elevation.cell_center(row, col);
    let (m_lon, m_lat) = meters_per_degree(lat);
    let dx = elevation.cell_width() * m_lon;
    let dy = elevation.cell_height() * m_lat;

    let dzdx = ((c + 2.0 * f + i) - (a + 2.0 * d + g)) / (8.0 * dx);
    let dzdy = ((g + 2.0 * h + i) - (a + 2.0 * b + c)) / (8.0 * dy);
    Some((dzdx, dzdy))
}

/// Slope in degrees from a gradient
fn slope_deg(dzdx: f64, dzdy: f64) -> f64 {
    (dzdx * dzdx + dzdy * dzdy).sqrt().atan().to_degrees()
}

/// Compass aspect in degrees from a gradient
fn aspect_deg(dzdx: f64, dzdy: f64) -> f64 {
    if dzdx == 0.0 && dzdy == 0.0 {
        return FLAT_ASPECT_DEG as f64;
    }
    let math = dzdy.atan2(-dzdx).to_degrees();
    let compass = if math < 0.0 {
        90.0 - math
    } else if math > 90.0 {
        360.0 - math + 90.0
    } else {
        90.0 - math
    };
    compass.rem_euclid(360.0)
}

/// Lambertian hillshade from slope and aspect, clamped to 0..1
pub fn shade(slope_deg: f64, aspect_deg: f64, light: &Illumination) -> f64 {
    let zenith = (90.0 - light.altitude_deg).to_radians();
    let slope = slope_deg.to_radians();
    let relative = (light.azimuth_deg - aspect_deg).to_radians();
    (slope.cos() * zenith.cos() + slope.sin() * zenith.sin() * relative.cos()).clamp(0.0, 1.0)
}

/// Derive slope, aspect and hillshade
pub fn derive_terrain(elevation: &Raster, light: &Illumination) -> Result<TerrainLayers> {
    let cells = elevation.rows() * elevation.cols();
    let mut slope = Vec::with_capacity(cells);
    let mut aspect = Vec::with_capacity(cells);
    let mut hillshade = Vec::with_capacity(cells);

    for row in 0..elevation.rows() {
        for col in 0..elevation.cols() {
            match horn_gradient(elevation, row, col) {
                Some((dzdx, dzdy)) => {
                    let s = slope_deg(dzdx, dzdy);
                    let a = aspect_deg(dzdx, dzdy);
                    slope.push(Some(s as f32));
                    aspect.push(Some(a as f32));
                    hillshade.push(Some(shade(s, a, light) as f32));
                }
                None => {
                    slope.push(None);
                    aspect.push(None);
                    hillshade.push(None);
                }
            }
        }
    }

    let layers = TerrainLayers {
        slope: elevation.with_values(slope)?,
        aspect: elevation.with_values(aspect)?,
        hillshade: elevation.with_values(hillshade)?,
    };

    tracing::debug!(valid = layers.slope.valid_count(), "Derived terrain layers");
    Ok(layers)
}
