//! Geometry models for caudata-geo.
//!
//! Re-exports the canonical types from `caudata-core` and converts them to and
//! from the `geo` crate, where the predicates live.

use geo::{Coord, Geometry as GeoGeometry, LineString, MultiPolygon, Polygon};

pub use caudata_core::models::{BoundingBox, Crs, Geometry, RegionBoundary};

fn ring_to_line_string(ring: &[[f64; 2]]) -> LineString {
    LineString::new(ring.iter().map(|c| Coord { x: c[0], y: c[1] }).collect())
}

fn rings_to_polygon(rings: &[Vec<[f64; 2]>]) -> Polygon {
    match rings.split_first() {
        Some((exterior, interiors)) => Polygon::new(
            ring_to_line_string(exterior),
            interiors.iter().map(|r| ring_to_line_string(r)).collect(),
        ),
        None => Polygon::new(LineString::new(vec![]), vec![]),
    }
}

fn polygon_to_rings(polygon: &Polygon) -> Vec<Vec<[f64; 2]>> {
    std::iter::once(polygon.exterior())
        .chain(polygon.interiors())
        .map(|ring| ring.coords().map(|c| [c.x, c.y]).collect())
        .collect()
}

/// Convert a canonical Geometry to a geo::Geometry
pub fn to_geo_geometry(geom: &Geometry) -> GeoGeometry {
    match geom {
        Geometry::Point { coordinates } => {
            GeoGeometry::Point(geo::Point::new(coordinates[0], coordinates[1]))
        }
        Geometry::Polygon { coordinates } => GeoGeometry::Polygon(rings_to_polygon(coordinates)),
        Geometry::MultiPolygon { coordinates } => GeoGeometry::MultiPolygon(MultiPolygon::new(
            coordinates.iter().map(|p| rings_to_polygon(p)).collect(),
        )),
    }
}

/// Convert a geo::Geometry to a canonical Geometry
///
/// Only points and areal geometries have a canonical form.
pub fn from_geo_geometry(geom: &GeoGeometry) -> Option<Geometry> {
    match geom {
        GeoGeometry::Point(p) => Some(Geometry::point(p.x(), p.y())),
        GeoGeometry::Polygon(p) => Some(Geometry::polygon(polygon_to_rings(p))),
        GeoGeometry::MultiPolygon(mp) => Some(Geometry::MultiPolygon {
            coordinates: mp.iter().map(polygon_to_rings).collect(),
        }),
        GeoGeometry::Rect(r) => from_geo_geometry(&GeoGeometry::Polygon(r.to_polygon())),
        GeoGeometry::Triangle(t) => from_geo_geometry(&GeoGeometry::Polygon(t.to_polygon())),
        _ => None,
    }
}

/// Areal part of a geometry as a MultiPolygon, `None` for points
pub fn to_multi_polygon(geom: &Geometry) -> Option<MultiPolygon> {
    match to_geo_geometry(geom) {
        GeoGeometry::Polygon(p) => Some(MultiPolygon::new(vec![p])),
        GeoGeometry::MultiPolygon(mp) => Some(mp),
        _ => None,
    }
}

/// Extension trait for Geometry with geo-crate operations
pub trait GeometryExt {
    /// Convert to geo::Geometry
    fn to_geo(&self) -> GeoGeometry;

    /// Get the centroid as coordinates
    fn centroid_coords(&self) -> Option<[f64; 2]>;
}

impl GeometryExt for Geometry {
    fn to_geo(&self) -> GeoGeometry {
        to_geo_geometry(self)
    }

    fn centroid_coords(&self) -> Option<[f64; 2]> {
        use geo::algorithm::centroid::Centroid;
        self.to_geo().centroid().map(|p| [p.x(), p.y()])
    }
}
