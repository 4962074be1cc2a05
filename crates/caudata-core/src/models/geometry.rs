//! Canonical geometry types used across all caudata crates.
//!
//! These types provide a bridge between GeoJSON serialization and the
//! computational geo crate types.

use serde::{Deserialize, Serialize};

/// Coordinate Reference System identified by EPSG code
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Crs {
    pub epsg: u32,
    pub name: String,
}

impl Default for Crs {
    fn default() -> Self {
        Self::wgs84()
    }
}

impl Crs {
    pub fn new(epsg: u32, name: impl Into<String>) -> Self {
        Self { epsg, name: name.into() }
    }

    /// WGS 84 (EPSG:4326)
    pub fn wgs84() -> Self {
        Self::new(4326, "WGS 84")
    }

    /// Web Mercator (EPSG:3857)
    pub fn web_mercator() -> Self {
        Self::new(3857, "Web Mercator")
    }
}

/// Axis-aligned extent in degrees
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub min_lon: f64,
    pub min_lat: f64,
    pub max_lon: f64,
    pub max_lat: f64,
}

impl BoundingBox {
    pub const fn new(min_lon: f64, min_lat: f64, max_lon: f64, max_lat: f64) -> Self {
        Self { min_lon, min_lat, max_lon, max_lat }
    }

    pub fn width(&self) -> f64 {
        self.max_lon - self.min_lon
    }

    pub fn height(&self) -> f64 {
        self.max_lat - self.min_lat
    }

    /// A box with no area (or inverted bounds) is empty
    pub fn is_empty(&self) -> bool {
        !(self.width() > 0.0 && self.height() > 0.0)
    }

    /// Check if a coordinate is within the box, edges included
    pub fn contains(&self, lon: f64, lat: f64) -> bool {
        lon >= self.min_lon && lon <= self.max_lon && lat >= self.min_lat && lat <= self.max_lat
    }

    /// Whether `self` lies entirely inside `other`
    pub fn is_within(&self, other: &BoundingBox) -> bool {
        self.min_lon >= other.min_lon
            && self.max_lon <= other.max_lon
            && self.min_lat >= other.min_lat
            && self.max_lat <= other.max_lat
    }

    /// Overlap of two boxes, `None` when they share no area
    pub fn intersection(&self, other: &BoundingBox) -> Option<BoundingBox> {
        let bbox = BoundingBox {
            min_lon: self.min_lon.max(other.min_lon),
            min_lat: self.min_lat.max(other.min_lat),
            max_lon: self.max_lon.min(other.max_lon),
            max_lat: self.max_lat.min(other.max_lat),
        };
        if bbox.is_empty() {
            None
        } else {
            Some(bbox)
        }
    }

    pub fn center(&self) -> (f64, f64) {
        ((self.min_lon + self.max_lon) / 2.0, (self.min_lat + self.max_lat) / 2.0)
    }
}

/// Extent the elevation raster is cropped to
pub const CROP_EXTENT: BoundingBox = BoundingBox::new(-125.0, 32.25, -113.0, 42.5);

/// Viewport of the static occurrence map
pub const MAP_VIEWPORT: BoundingBox = BoundingBox::new(-122.5, 36.0, -118.5, 41.25);

/// GeoJSON-compatible geometry representation
///
/// Only the geometry kinds the workflow produces or consumes are modeled:
/// occurrence points and boundary polygons.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Geometry {
    Point { coordinates: [f64; 2] },
    Polygon { coordinates: Vec<Vec<[f64; 2]>> },
    MultiPolygon { coordinates: Vec<Vec<Vec<[f64; 2]>>> },
}

impl Geometry {
    /// Create a Point geometry
    pub fn point(x: f64, y: f64) -> Self {
        Geometry::Point { coordinates: [x, y] }
    }

    /// Create a Polygon geometry
    pub fn polygon(rings: Vec<Vec<[f64; 2]>>) -> Self {
        Geometry::Polygon { coordinates: rings }
    }

    /// Bounding box over all coordinates, `None` for an empty geometry
    pub fn bounding_box(&self) -> Option<BoundingBox> {
        let coords: Vec<[f64; 2]> = match self {
            Geometry::Point { coordinates } => vec![*coordinates],
            Geometry::Polygon { coordinates } => coordinates.iter().flatten().copied().collect(),
            Geometry::MultiPolygon { coordinates } => {
                coordinates.iter().flatten().flatten().copied().collect()
            }
        };
        let first = coords.first()?;
        let mut bbox = BoundingBox::new(first[0], first[1], first[0], first[1]);
        for c in &coords[1..] {
            bbox.min_lon = bbox.min_lon.min(c[0]);
            bbox.max_lon = bbox.max_lon.max(c[0]);
            bbox.min_lat = bbox.min_lat.min(c[1]);
            bbox.max_lat = bbox.max_lat.max(c[1]);
        }
        Some(bbox)
    }
}

/// A named administrative boundary
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegionBoundary {
    pub name: String,
    pub geometry: Geometry,
    pub crs: Crs,
}
