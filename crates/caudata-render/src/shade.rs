//! Surface shading for the 3D renders: a five-color orientation texture,
//! a directional ray-traced shadow and an ambient-occlusion shadow.
//!
//! All layers share the cell layout of the [`HeightMap`] they were built from.

use caudata_core::models::Raster;
use caudata_geo::transform::meters_per_degree;

use crate::palette::{hex, lerp, Rgb};

/// Vertical exaggeration used when tracing shadows
pub const SHADOW_EXAGGERATION: f64 = 5.0;

/// Darkening applied to fully shadowed cells
pub const MAX_DARKEN: f64 = 0.5;

/// Elevation as a height matrix with metric cell spacing
#[derive(Debug, Clone, PartialEq)]
pub struct HeightMap {
    pub rows: usize,
    pub cols: usize,
    /// East-west cell spacing in meters
    pub dx: f64,
    /// North-south cell spacing in meters
    pub dy: f64,
    /// Heights in meters, row-major from the north-west; `None` is no-data
    pub heights: Vec<Option<f64>>,
}

impl HeightMap {
    /// Height matrix of a lon/lat raster, spacing taken at its center latitude
    pub fn from_raster(raster: &Raster) -> Self {
        let (_, center_lat) = raster.extent().center();
        let (m_lon, m_lat) = meters_per_degree(center_lat);
        Self {
            rows: raster.rows(),
            cols: raster.cols(),
            dx: raster.cell_width() * m_lon,
            dy: raster.cell_height() * m_lat,
            heights: raster.values().iter().map(|v| v.map(f64::from)).collect(),
        }
    }

    pub fn get(&self, row: usize, col: usize) -> Option<f64> {
        if row >= self.rows || col >= self.cols {
            return None;
        }
        self.heights[row * self.cols + col]
    }

    /// Height with no-data cells falling back to the nearest valid neighbor
    /// in the 3x3 window
    fn get_or_neighbor(&self, row: usize, col: usize) -> Option<f64> {
        self.get(row, col).or_else(|| {
            (-1isize..=1)
                .flat_map(|dr| (-1isize..=1).map(move |dc| (dr, dc)))
                .filter_map(|(dr, dc)| {
                    let r = row.checked_add_signed(dr)?;
                    let c = col.checked_add_signed(dc)?;
                    self.get(r, c)
                })
                .next()
        })
    }

    /// Unit surface normal (east, north, up) by central differences
    pub fn normal(&self, row: usize, col: usize, exaggeration: f64) -> Option<[f64; 3]> {
        let center = self.get(row, col)?;
        let at = |r: Option<usize>, c: Option<usize>| {
            r.zip(c).and_then(|(r, c)| self.get_or_neighbor(r, c)).unwrap_or(center)
        };
        let west = at(Some(row), col.checked_sub(1));
        let east = at(Some(row), Some(col + 1));
        let north = at(row.checked_sub(1), Some(col));
        let south = at(Some(row + 1), Some(col));

        let dzdx = (east - west) * exaggeration / (2.0 * self.dx);
        let dzdy = (north - south) * exaggeration / (2.0 * self.dy);
        let n = [-dzdx, -dzdy, 1.0];
        let len = (n[0] * n[0] + n[1] * n[1] + n[2] * n[2]).sqrt();
        Some([n[0] / len, n[1] / len, n[2] / len])
    }

    /// Bilinear height at fractional (row, col)
    pub fn sample(&self, row: f64, col: f64) -> Option<f64> {
        if row < 0.0 || col < 0.0 || row > (self.rows - 1) as f64 || col > (self.cols - 1) as f64 {
            return None;
        }
        let (r0, c0) = (row.floor() as usize, col.floor() as usize);
        let (r1, c1) = ((r0 + 1).min(self.rows - 1), (c0 + 1).min(self.cols - 1));
        let (tr, tc) = (row - r0 as f64, col - c0 as f64);
        let h = |r, c| self.get(r, c);
        let top = h(r0, c0)? + (h(r0, c1)? - h(r0, c0)?) * tc;
        let bottom = h(r1, c0)? + (h(r1, c1)? - h(r1, c0)?) * tc;
        Some(top + (bottom - top) * tr)
    }
}

/// Sun position for shading
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sun {
    /// Degrees clockwise from north
    pub azimuth_deg: f64,
    /// Degrees above the horizon
    pub altitude_deg: f64,
}

impl Default for Sun {
    fn default() -> Self {
        Self { azimuth_deg: 315.0, altitude_deg: 45.0 }
    }
}

impl Sun {
    /// Unit (east, north) step toward the sun
    fn horizontal(&self) -> (f64, f64) {
        let a = self.azimuth_deg.to_radians();
        (a.sin(), a.cos())
    }
}

/// The five colors of the orientation texture
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Texture {
    /// Slopes facing the sun
    pub highlight: Rgb,
    /// Slopes facing away
    pub shadow: Rgb,
    /// Slopes facing left of the sun direction
    pub left: Rgb,
    /// Slopes facing right of the sun direction
    pub right: Rgb,
    /// Flat ground
    pub center: Rgb,
}

impl Default for Texture {
    fn default() -> Self {
        Self {
            highlight: hex(0xF5F0DC),
            shadow: hex(0x2B3A2E),
            left: hex(0x6B8E5A),
            right: hex(0xA3945C),
            center: hex(0xC8C39B),
        }
    }
}

/// Color per cell from surface orientation relative to the sun
pub fn sphere_shade(heights: &HeightMap, texture: &Texture, sun: &Sun) -> Vec<Option<Rgb>> {
    let (sx, sy) = sun.horizontal();
    let mut colors = Vec::with_capacity(heights.rows * heights.cols);

    for row in 0..heights.rows {
        for col in 0..heights.cols {
            colors.push(heights.normal(row, col, 1.0).map(|[nx, ny, _]| {
                // Horizontal component of the normal in sun-aligned axes
                let toward = nx * sx + ny * sy;
                let across = nx * sy - ny * sx;
                let tilt = (toward * toward + across * across).sqrt().min(1.0);
                if tilt == 0.0 {
                    return texture.center;
                }

                let weights = [
                    (texture.highlight, toward.max(0.0)),
                    (texture.shadow, (-toward).max(0.0)),
                    (texture.right, across.max(0.0)),
                    (texture.left, (-across).max(0.0)),
                ];
                let total: f64 = weights.iter().map(|(_, w)| w).sum();
                let mut rim = [0.0f64; 3];
                for (color, w) in weights {
                    for (channel, value) in rim.iter_mut().zip(color) {
                        *channel += value as f64 * w / total;
                    }
                }
                let rim = [rim[0].round() as u8, rim[1].round() as u8, rim[2].round() as u8];
                lerp(texture.center, rim, tilt.sqrt())
            }));
        }
    }
    colors
}

/// Fraction of sun rays reaching each cell, 0 (shadowed) to 1 (lit)
///
/// Three rays spread over the sun's disc give soft shadow edges.
pub fn ray_shade(heights: &HeightMap, sun: &Sun, exaggeration: f64) -> Vec<Option<f64>> {
    let altitudes = [sun.altitude_deg - 0.5, sun.altitude_deg, sun.altitude_deg + 0.5];
    let (sx, sy) = sun.horizontal();
    let max_height = heights.heights.iter().flatten().fold(f64::MIN, |a, b| a.max(*b));

    let mut light = Vec::with_capacity(heights.rows * heights.cols);
    for row in 0..heights.rows {
        for col in 0..heights.cols {
            let Some(start) = heights.get(row, col) else {
                light.push(None);
                continue;
            };

            let mut lit = 0;
            for altitude in altitudes {
                let rise_per_m = altitude.to_radians().tan();
                // One-cell steps along the sun direction
                let step_m = heights.dx.min(heights.dy);
                let (step_c, step_r) = (sx * step_m / heights.dx, -sy * step_m / heights.dy);
                let (mut r, mut c, mut travelled) = (row as f64, col as f64, 0.0);
                let mut blocked = false;
                loop {
                    r += step_r;
                    c += step_c;
                    travelled += step_m;
                    let ray = start * exaggeration + rise_per_m * travelled;
                    if ray > max_height * exaggeration {
                        break;
                    }
                    match heights.sample(r, c) {
                        Some(h) if h * exaggeration > ray => {
                            blocked = true;
                            break;
                        }
                        Some(_) => {}
                        None if r < 0.0 || c < 0.0 || r > heights.rows as f64 || c > heights.cols as f64 => {
                            break
                        }
                        None => {}
                    }
                }
                if !blocked {
                    lit += 1;
                }
            }
            light.push(Some(lit as f64 / altitudes.len() as f64));
        }
    }
    light
}

/// Sky-view factor per cell, 0 (enclosed) to 1 (open sky)
///
/// The horizon is searched in eight directions up to `radius_cells` away.
pub fn ambient_shade(heights: &HeightMap, exaggeration: f64, radius_cells: usize) -> Vec<Option<f64>> {
    const DIRECTIONS: [(isize, isize); 8] = [(-1, 0), (-1, 1), (0, 1), (1, 1), (1, 0), (1, -1), (0, -1), (-1, -1)];

    let mut ambient = Vec::with_capacity(heights.rows * heights.cols);
    for row in 0..heights.rows {
        for col in 0..heights.cols {
            let Some(start) = heights.get(row, col) else {
                ambient.push(None);
                continue;
            };

            let mut open = 0.0;
            for (dr, dc) in DIRECTIONS {
                let mut horizon = 0.0f64;
                for step in 1..=radius_cells as isize {
                    let (Some(r), Some(c)) =
                        (row.checked_add_signed(dr * step), col.checked_add_signed(dc * step))
                    else {
                        break;
                    };
                    if r >= heights.rows || c >= heights.cols {
                        break;
                    }
                    if let Some(h) = heights.get(r, c) {
                        let dist = (((dr * step) as f64 * heights.dy).powi(2)
                            + ((dc * step) as f64 * heights.dx).powi(2))
                        .sqrt();
                        horizon = horizon.max(((h - start) * exaggeration / dist).atan());
                    }
                }
                open += 1.0 - horizon.sin();
            }
            ambient.push(Some(open / DIRECTIONS.len() as f64));
        }
    }
    ambient
}

/// Darken a texture by a shadow layer
///
/// A shadow value of 1 leaves the color unchanged, 0 darkens it by
/// `max_darken`.
pub fn add_shadow(texture: &[Option<Rgb>], shadow: &[Option<f64>], max_darken: f64) -> Vec<Option<Rgb>> {
    texture
        .iter()
        .zip(shadow)
        .map(|(color, shade)| {
            let color = (*color)?;
            let factor = 1.0 - max_darken * (1.0 - shade.unwrap_or(1.0).clamp(0.0, 1.0));
            Some(color.map(|c| (c as f64 * factor).round() as u8))
        })
        .collect()
}

/// Texture with both shadow layers applied
pub fn shaded_surface(heights: &HeightMap, texture: &Texture, sun: &Sun) -> Vec<Option<Rgb>> {
    let base = sphere_shade(heights, texture, sun);
    let rays = ray_shade(heights, sun, SHADOW_EXAGGERATION);
    let ambient = ambient_shade(heights, SHADOW_EXAGGERATION, 8);
    let shaded = add_shadow(&base, &rays, MAX_DARKEN);
    add_shadow(&shaded, &ambient, MAX_DARKEN)
}
