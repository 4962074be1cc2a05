//! Region boundary resolution and point-in-region tests.

use crate::models::{to_multi_polygon, BoundingBox, Crs, Geometry, RegionBoundary};
use caudata_core::error::{CaudataError, Result};
use geo::{Intersects, MultiPolygon, Point};
use std::fs;
use std::path::Path;

/// Simplified outline of the State of California (EPSG:4326)
const CALIFORNIA_RING: &[[f64; 2]] = &[
    [-124.21, 42.00],
    [-120.00, 42.00],
    [-120.00, 39.00],
    [-114.63, 35.00],
    [-114.43, 34.10],
    [-114.72, 33.40],
    [-114.52, 33.03],
    [-114.72, 32.72],
    [-117.12, 32.53],
    [-117.25, 32.67],
    [-117.28, 32.85],
    [-117.32, 33.10],
    [-117.60, 33.39],
    [-117.88, 33.60],
    [-118.10, 33.74],
    [-118.30, 33.71],
    [-118.41, 33.78],
    [-118.52, 34.03],
    [-118.80, 34.00],
    [-119.22, 34.15],
    [-119.70, 34.40],
    [-120.47, 34.45],
    [-120.64, 34.57],
    [-120.62, 34.90],
    [-120.87, 35.37],
    [-121.28, 35.66],
    [-121.90, 36.31],
    [-121.97, 36.58],
    [-121.79, 36.80],
    [-121.83, 36.89],
    [-121.91, 36.97],
    [-121.95, 36.97],
    [-122.02, 36.96],
    [-122.06, 36.95],
    [-122.19, 37.01],
    [-122.33, 37.11],
    [-122.39, 37.18],
    [-122.52, 37.52],
    [-122.51, 37.78],
    [-122.98, 38.00],
    [-123.07, 38.30],
    [-123.73, 38.95],
    [-123.82, 39.50],
    [-123.85, 39.80],
    [-124.37, 40.26],
    [-124.41, 40.44],
    [-124.10, 41.00],
    [-124.21, 41.75],
    [-124.21, 42.00],
];

/// The built-in boundary: the State of California
pub fn california() -> RegionBoundary {
    RegionBoundary {
        name: "California".to_string(),
        geometry: Geometry::polygon(vec![CALIFORNIA_RING.to_vec()]),
        crs: Crs::wgs84(),
    }
}

/// Load a boundary from a GeoJSON file
///
/// Every polygon in the file is merged into one multipolygon; the name comes
/// from the first feature's `name` property, falling back to the file stem.
pub fn from_geojson_file(path: &Path) -> Result<RegionBoundary> {
    let content = fs::read_to_string(path)?;
    let fallback = path.file_stem().and_then(|s| s.to_str()).unwrap_or("boundary");
    from_geojson_str(&content, fallback)
}

/// Parse a boundary from GeoJSON text
pub fn from_geojson_str(content: &str, fallback_name: &str) -> Result<RegionBoundary> {
    let geojson: geojson::GeoJson = content.parse().map_err(|e| CaudataError::InvalidGeometry {
        feature_id: fallback_name.to_string(),
        reason: format!("Failed to parse GeoJSON: {}", e),
    })?;

    let mut name = None;
    let geometries: Vec<&geojson::Geometry> = match &geojson {
        geojson::GeoJson::FeatureCollection(fc) => {
            name = fc.features.iter().find_map(feature_name);
            fc.features.iter().filter_map(|f| f.geometry.as_ref()).collect()
        }
        geojson::GeoJson::Feature(feature) => {
            name = feature_name(feature);
            feature.geometry.iter().collect()
        }
        geojson::GeoJson::Geometry(geometry) => vec![geometry],
    };

    let mut polygons: Vec<Vec<Vec<[f64; 2]>>> = Vec::new();
    for (idx, geometry) in geometries.iter().enumerate() {
        match &geometry.value {
            geojson::Value::Polygon(rings) => polygons.push(convert_rings(rings, idx)?),
            geojson::Value::MultiPolygon(parts) => {
                for rings in parts {
                    polygons.push(convert_rings(rings, idx)?);
                }
            }
            _ => tracing::warn!(feature = idx, "Skipping non-areal boundary geometry"),
        }
    }

    if polygons.is_empty() {
        return Err(CaudataError::InvalidGeometry {
            feature_id: fallback_name.to_string(),
            reason: "GeoJSON contains no Polygon or MultiPolygon geometry".to_string(),
        });
    }

    let geometry = if polygons.len() == 1 {
        Geometry::polygon(polygons.remove(0))
    } else {
        Geometry::MultiPolygon { coordinates: polygons }
    };

    Ok(RegionBoundary {
        name: name.unwrap_or_else(|| fallback_name.to_string()),
        geometry,
        crs: Crs::wgs84(),
    })
}

fn feature_name(feature: &geojson::Feature) -> Option<String> {
    feature
        .property("name")
        .or_else(|| feature.property("NAME"))
        .and_then(|v| v.as_str())
        .map(str::to_string)
}

fn convert_rings(rings: &[Vec<geojson::Position>], idx: usize) -> Result<Vec<Vec<[f64; 2]>>> {
    rings
        .iter()
        .map(|ring| {
            if ring.len() < 4 {
                return Err(CaudataError::InvalidGeometry {
                    feature_id: idx.to_string(),
                    reason: format!("polygon ring has {} positions, at least 4 required", ring.len()),
                });
            }
            ring.iter()
                .map(|position| match position.as_slice() {
                    [x, y, ..] if x.is_finite() && y.is_finite() => Ok([*x, *y]),
                    _ => Err(CaudataError::InvalidGeometry {
                        feature_id: idx.to_string(),
                        reason: format!("invalid position {:?}", position),
                    }),
                })
                .collect()
        })
        .collect()
}

/// A boundary prepared for repeated point-in-region tests
#[derive(Debug, Clone)]
pub struct BoundaryMask {
    name: String,
    polygons: MultiPolygon,
    bbox: BoundingBox,
}

impl BoundaryMask {
    pub fn new(boundary: &RegionBoundary) -> Result<Self> {
        let invalid = |reason: &str| CaudataError::InvalidGeometry {
            feature_id: boundary.name.clone(),
            reason: reason.to_string(),
        };
        let polygons =
            to_multi_polygon(&boundary.geometry).ok_or_else(|| invalid("boundary is not areal"))?;
        let bbox = boundary
            .geometry
            .bounding_box()
            .filter(|b| !b.is_empty())
            .ok_or_else(|| invalid("boundary has an empty extent"))?;

        Ok(Self { name: boundary.name.clone(), polygons, bbox })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn bounding_box(&self) -> BoundingBox {
        self.bbox
    }

    /// Whether the coordinate lies inside the boundary, edges included
    pub fn contains(&self, lon: f64, lat: f64) -> bool {
        self.bbox.contains(lon, lat) && self.polygons.intersects(&Point::new(lon, lat))
    }
}
