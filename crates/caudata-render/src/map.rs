//! Static occurrence map: boundary polygon plus points sized by coordinate
//! uncertainty and colored by year.

use std::path::Path;

use caudata_core::models::{BoundingBox, Geometry, RegionBoundary, MAP_VIEWPORT};
use caudata_core::processing::{uncertainty_bin, UncertaintyBin};
use caudata_geo::layer::PointLayer;
use plotters::drawing::DrawingAreaErrorKind;
use plotters::prelude::*;

use crate::error::{RenderError, Result};
use crate::palette::{hex, to_plotters, YearScale};

/// Map width in pixels; the height follows the viewport's aspect
const MAP_WIDTH: u32 = 700;

/// Marker radius per uncertainty bin, in pixels
const BIN_RADII: [i32; UncertaintyBin::COUNT] = [2, 3, 4, 6, 8];

/// Radius for a coordinate uncertainty
///
/// Values past the top break and unknown (NaN) values get the largest marker.
pub fn marker_radius(uncertainty_m: f64) -> i32 {
    match uncertainty_bin(uncertainty_m) {
        Some(bin) => BIN_RADII[bin.index()],
        None if uncertainty_m < 0.0 => BIN_RADII[0],
        None => BIN_RADII[UncertaintyBin::COUNT - 1],
    }
}

/// Pixel size keeping one degree of latitude and of longitude at the
/// viewport's center latitude the same length on screen
fn map_size(viewport: &BoundingBox) -> (u32, u32) {
    let (_, center_lat) = viewport.center();
    let ground_width = viewport.width() * center_lat.to_radians().cos();
    let height = (MAP_WIDTH as f64 * viewport.height() / ground_width).round() as u32;
    (MAP_WIDTH, height.max(1))
}

fn exterior_rings(geometry: &Geometry) -> Vec<Vec<(f64, f64)>> {
    let ring = |r: &Vec<[f64; 2]>| r.iter().map(|c| (c[0], c[1])).collect::<Vec<_>>();
    match geometry {
        Geometry::Point { .. } => Vec::new(),
        Geometry::Polygon { coordinates } => coordinates.first().map(ring).into_iter().collect(),
        Geometry::MultiPolygon { coordinates } => {
            coordinates.iter().filter_map(|polygon| polygon.first().map(ring)).collect()
        }
    }
}

/// Render `map.svg`
pub fn occurrence_map(
    boundary: &RegionBoundary,
    layer: &PointLayer,
    scale: &YearScale,
    path: &Path,
) -> Result<()> {
    if layer.is_empty() {
        return Err(RenderError::empty(path, "no occurrence points"));
    }

    let draw = || -> std::result::Result<(), DrawingAreaErrorKind<std::io::Error>> {
        let viewport = MAP_VIEWPORT;
        let root = SVGBackend::new(path, map_size(&viewport)).into_drawing_area();
        root.fill(&WHITE)?;

        let mut chart = ChartBuilder::on(&root)
            .margin(10)
            .x_label_area_size(30)
            .y_label_area_size(40)
            .build_cartesian_2d(
                viewport.min_lon..viewport.max_lon,
                viewport.min_lat..viewport.max_lat,
            )?;
        chart
            .configure_mesh()
            .disable_mesh()
            .x_label_formatter(&|lon| format!("{:.1}°W", -lon))
            .y_label_formatter(&|lat| format!("{:.1}°N", lat))
            .draw()?;

        let land = to_plotters(hex(0xF0EFE7));
        let outline = to_plotters(hex(0x4D4D4D));
        for ring in exterior_rings(&boundary.geometry) {
            chart.draw_series(std::iter::once(Polygon::new(ring.clone(), land.filled())))?;
            chart.draw_series(std::iter::once(PathElement::new(ring, outline.stroke_width(1))))?;
        }

        // Large markers first so small precise points stay visible
        let mut features: Vec<_> = layer.features.iter().collect();
        features.sort_by(|a, b| b.coordinate_uncertainty_m.total_cmp(&a.coordinate_uncertainty_m));
        chart.draw_series(features.into_iter().map(|f| {
            let color = to_plotters(scale.color(f.year as f64));
            EmptyElement::at(f.coordinates())
                + Circle::new((0, 0), marker_radius(f.coordinate_uncertainty_m), color.filled())
                + Circle::new((0, 0), marker_radius(f.coordinate_uncertainty_m), BLACK.mix(0.4))
        }))?;

        // Year legend in the lower left
        let (legend_x, legend_y) = (viewport.min_lon + 0.15, viewport.min_lat + 0.2);
        for (i, year) in YearScale::BREAKS.iter().enumerate() {
            let y = legend_y + i as f64 * 0.18;
            let color = to_plotters(scale.color(*year as f64));
            chart.draw_series(std::iter::once(
                EmptyElement::at((legend_x, y))
                    + Circle::new((0, 0), 5, color.filled())
                    + Circle::new((0, 0), 5, BLACK.mix(0.4))
                    + Text::new(year.to_string(), (10, -6), ("sans-serif", 12)),
            ))?;
        }
        chart.draw_series(std::iter::once(Text::new(
            "Year",
            (legend_x - 0.05, legend_y + YearScale::BREAKS.len() as f64 * 0.18),
            ("sans-serif", 13),
        )))?;

        root.present()?;
        Ok(())
    };

    draw().map_err(|e| RenderError::plot(path, e))?;
    tracing::info!(points = layer.len(), path = %path.display(), "Wrote occurrence map");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_marker_radius_grows_with_uncertainty() {
        let radii: Vec<i32> = [1.0, 10.0, 50.0, 500.0, 5000.0, 50000.0].iter().map(|u| marker_radius(*u)).collect();
        assert_eq!(radii, vec![2, 3, 3, 4, 6, 8]);
    }

    #[test]
    fn test_marker_radius_clamps_above_top_break() {
        assert_eq!(marker_radius(1e7), 8);
        assert_eq!(marker_radius(5e7), 8);
        assert_eq!(marker_radius(f64::INFINITY), 8);
        assert_eq!(marker_radius(f64::NAN), 8);
        assert_eq!(marker_radius(-1.0), 2);
    }

    #[test]
    fn test_map_size_preserves_ground_aspect() {
        let (w, h) = map_size(&MAP_VIEWPORT);
        assert_eq!(w, MAP_WIDTH);
        // 5.25 deg of latitude over 4 deg of longitude at about 38.6 N
        assert!(h > w);
    }

    #[test]
    fn test_exterior_rings() {
        let geometry = Geometry::polygon(vec![vec![[0.0, 0.0], [1.0, 0.0], [1.0, 1.0], [0.0, 0.0]]]);
        assert_eq!(exterior_rings(&geometry).len(), 1);
        assert!(exterior_rings(&Geometry::point(0.0, 0.0)).is_empty());
    }
}
