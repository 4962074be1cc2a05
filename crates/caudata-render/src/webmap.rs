//! Interactive Leaflet map over an OpenStreetMap basemap with the elevation
//! overlay and the occurrence points.

use std::path::Path;

use caudata_core::models::{BoundingBox, Raster};
use caudata_geo::layer::PointLayer;

use crate::error::{RenderError, Result};
use crate::imagery::save_raster_png;
use crate::palette::TERRAIN;

const LEAFLET_VERSION: &str = "1.9.4";

/// Self-contained HTML page; `overlay` is the elevation image file name
/// relative to the page
pub fn web_map_html(layer: &PointLayer, overlay: &str, overlay_bounds: &BoundingBox) -> Result<String> {
    let points = serde_json::to_string(&layer.to_feature_collection())?;
    // Keep the inline JSON from closing the script element
    let points = points.replace("</", "<\\/");
    let b = overlay_bounds;

    Ok(format!(
        r#"<!DOCTYPE html>
<html>
<head>
<meta charset="utf-8">
<title>Occurrences</title>
<link rel="stylesheet" href="https://unpkg.com/leaflet@{version}/dist/leaflet.css">
<script src="https://unpkg.com/leaflet@{version}/dist/leaflet.js"></script>
<style>html, body, #map {{ height: 100%; margin: 0; }}</style>
</head>
<body>
<div id="map"></div>
<script>
const map = L.map("map");
L.tileLayer("https://{{s}}.tile.openstreetmap.org/{{z}}/{{x}}/{{y}}.png", {{
  attribution: "&copy; OpenStreetMap contributors"
}}).addTo(map);
const bounds = [[{min_lat}, {min_lon}], [{max_lat}, {max_lon}]];
L.imageOverlay("{overlay}", bounds).addTo(map);
const points = L.geoJSON({points}, {{
  pointToLayer: (feature, latlng) => L.circleMarker(latlng),
  onEachFeature: (feature, layer) => layer.bindPopup(
    feature.properties.name + " (" + feature.properties.year + ")")
}}).addTo(map);
map.fitBounds(points.getLayers().length ? points.getBounds() : bounds);
</script>
</body>
</html>
"#,
        version = LEAFLET_VERSION,
        min_lat = b.min_lat,
        min_lon = b.min_lon,
        max_lat = b.max_lat,
        max_lon = b.max_lon,
        overlay = overlay,
        points = points,
    ))
}

/// Write the elevation overlay PNG and the HTML page next to it
pub fn write_web_map(layer: &PointLayer, elevation: &Raster, html_path: &Path, overlay_path: &Path) -> Result<()> {
    let overlay = overlay_path
        .file_name()
        .and_then(|n| n.to_str())
        .ok_or_else(|| RenderError::empty(overlay_path, "overlay path has no file name"))?;

    save_raster_png(elevation, &TERRAIN, overlay_path)?;
    std::fs::write(html_path, web_map_html(layer, overlay, &elevation.extent())?)?;
    tracing::info!(path = %html_path.display(), points = layer.len(), "Wrote web map");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use caudata_core::models::{BasisOfRecord, CleanRecord, CleanedTable};

    #[test]
    fn test_html_references_overlay_and_points() {
        let table = CleanedTable::new(vec![CleanRecord {
            name: "Taricha sierrae </script>".to_string(),
            year: 2001,
            longitude: -120.2,
            latitude: 38.8,
            coordinate_uncertainty_m: 20.0,
            basis_of_record: BasisOfRecord::HumanObservation,
        }]);
        let layer = PointLayer::from_cleaned(&table);
        let html = web_map_html(&layer, "elevation.png", &BoundingBox::new(-125.0, 32.25, -113.0, 42.5)).unwrap();

        assert!(html.contains(r#"L.imageOverlay("elevation.png", bounds)"#));
        assert!(html.contains("[[32.25, -125], [42.5, -113]]"));
        assert!(html.contains("tile.openstreetmap.org/{z}/{x}/{y}.png"));
        assert!(html.contains("-120.2"));
        assert_eq!(html.matches("</script>").count(), 2);
    }
}
