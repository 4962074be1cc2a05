//! Terrain panel: slope, aspect and hillshade side by side.

use std::path::Path;

use caudata_core::models::Raster;
use caudata_geo::terrain::TerrainLayers;
use image::{Rgb as Pixel, RgbImage};

use crate::error::{RenderError, Result};
use crate::palette::{blend, hex, Rgb, ASPECT, GREY, SLOPE, TERRAIN};

/// Opacity of the elevation colors over the hillshade
pub const ELEVATION_OVERLAY_ALPHA: f64 = 0.35;

/// Target panel width in pixels
const PANEL_WIDTH: usize = 420;
const GAP: usize = 12;
const BACKGROUND: Rgb = hex(0xFFFFFF);

/// Per-cell colors of the three panels
pub fn panel_colors(elevation: &Raster, layers: &TerrainLayers) -> [Vec<Option<Rgb>>; 3] {
    let max_slope = layers.slope.stats().map(|s| s.max as f64).unwrap_or(90.0);
    let (min_elev, max_elev) = elevation.stats().map(|s| (s.min as f64, s.max as f64)).unwrap_or((0.0, 1.0));

    let slope = layers.slope.values().iter().map(|v| v.map(|s| SLOPE.scaled(s as f64, 0.0, max_slope))).collect();
    let aspect = layers.aspect.values().iter().map(|v| v.map(|a| ASPECT.scaled(a as f64, 0.0, 360.0))).collect();
    let hillshade = layers
        .hillshade
        .values()
        .iter()
        .zip(elevation.values())
        .map(|(shade, elev)| {
            let grey = GREY.at((*shade)? as f64);
            Some(match elev {
                Some(e) => blend(grey, TERRAIN.scaled(*e as f64, min_elev, max_elev), ELEVATION_OVERLAY_ALPHA),
                None => grey,
            })
        })
        .collect();

    [slope, aspect, hillshade]
}

/// Render `terrain_panel.png`
pub fn terrain_panel(elevation: &Raster, layers: &TerrainLayers, path: &Path) -> Result<()> {
    let (rows, cols) = (elevation.rows(), elevation.cols());
    if layers.slope.valid_count() == 0 {
        return Err(RenderError::empty(path, "no cell has a terrain derivative"));
    }

    let scale = (PANEL_WIDTH / cols.max(1)).max(1);
    let (panel_w, panel_h) = (cols * scale, rows * scale);
    let width = 3 * panel_w + 4 * GAP;
    let height = panel_h + 2 * GAP;
    let panels = panel_colors(elevation, layers);

    let image = RgbImage::from_fn(width as u32, height as u32, |x, y| {
        let (x, y) = (x as usize, y as usize);
        if y < GAP || y >= GAP + panel_h {
            return Pixel(BACKGROUND);
        }
        for (i, colors) in panels.iter().enumerate() {
            let left = GAP + i * (panel_w + GAP);
            if (left..left + panel_w).contains(&x) {
                let (row, col) = ((y - GAP) / scale, (x - left) / scale);
                return Pixel(colors[row * cols + col].unwrap_or(BACKGROUND));
            }
        }
        Pixel(BACKGROUND)
    });

    image.save(path)?;
    tracing::info!(path = %path.display(), width, height, "Wrote terrain panel");
    Ok(())
}
