//! Raster layers as pixel images.

use caudata_core::models::Raster;
use image::{Rgba, RgbaImage};
use std::path::Path;

use crate::error::{RenderError, Result};
use crate::palette::{Gradient, Rgb};

/// One pixel per cell, colored by `gradient` over the layer's value range;
/// no-data cells are transparent
pub fn raster_image(raster: &Raster, gradient: &Gradient) -> RgbaImage {
    let (min, max) = raster
        .stats()
        .map(|s| (s.min as f64, s.max as f64))
        .unwrap_or((0.0, 1.0));
    raster_image_with(raster, |v| gradient.scaled(v as f64, min, max))
}

/// One pixel per cell with a caller-supplied color
pub fn raster_image_with(raster: &Raster, color: impl Fn(f32) -> Rgb) -> RgbaImage {
    RgbaImage::from_fn(raster.cols() as u32, raster.rows() as u32, |x, y| {
        match raster.get(y as usize, x as usize) {
            Some(v) => {
                let [r, g, b] = color(v);
                Rgba([r, g, b, 255])
            }
            None => Rgba([0, 0, 0, 0]),
        }
    })
}

/// Write a raster image as PNG, failing on an all no-data layer
pub fn save_raster_png(raster: &Raster, gradient: &Gradient, path: &Path) -> Result<()> {
    if raster.valid_count() == 0 {
        return Err(RenderError::empty(path, "raster has no valid cell"));
    }
    raster_image(raster, gradient).save(path)?;
    tracing::debug!(path = %path.display(), "Wrote raster PNG");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::palette::{hex, TERRAIN};
    use caudata_core::models::BoundingBox;

    #[test]
    fn test_nodata_is_transparent() {
        let raster = Raster::new(
            BoundingBox::new(0.0, 0.0, 2.0, 1.0),
            1,
            2,
            vec![Some(10.0), None],
        )
        .unwrap();
        let image = raster_image(&raster, &TERRAIN);

        assert_eq!(image.dimensions(), (2, 1));
        // A single value sits mid-ramp
        let [r, g, b] = hex(0xE6E600);
        assert_eq!(image.get_pixel(0, 0), &Rgba([r, g, b, 255]));
        assert_eq!(image.get_pixel(1, 0)[3], 0);
    }
}
