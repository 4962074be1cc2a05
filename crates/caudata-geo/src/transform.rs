//! Web Mercator projection and slippy-map tile arithmetic
//!
//! Terrain tiles are served in EPSG:3857 on the standard XYZ tiling scheme.
//! Both directions of the spherical Mercator projection are closed-form.

use crate::models::BoundingBox;

/// Radius of the Web Mercator sphere in meters
pub const EARTH_RADIUS_M: f64 = 6_378_137.0;

/// Latitude limit of the Web Mercator square
pub const MAX_MERCATOR_LAT: f64 = 85.051_128_779_806_59;

/// Half the side of the Web Mercator square in meters
pub const ORIGIN_SHIFT: f64 = std::f64::consts::PI * EARTH_RADIUS_M;

/// Project WGS84 degrees to Web Mercator meters
pub fn lonlat_to_mercator(lon: f64, lat: f64) -> (f64, f64) {
    let lat = lat.clamp(-MAX_MERCATOR_LAT, MAX_MERCATOR_LAT);
    let x = EARTH_RADIUS_M * lon.to_radians();
    let y = EARTH_RADIUS_M * (std::f64::consts::FRAC_PI_4 + lat.to_radians() / 2.0).tan().ln();
    (x, y)
}

/// Unproject Web Mercator meters to WGS84 degrees
pub fn mercator_to_lonlat(x: f64, y: f64) -> (f64, f64) {
    let lon = (x / EARTH_RADIUS_M).to_degrees();
    let lat = (2.0 * (y / EARTH_RADIUS_M).exp().atan() - std::f64::consts::FRAC_PI_2).to_degrees();
    (lon, lat)
}

/// XYZ tile address
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TileId {
    pub z: u8,
    pub x: u32,
    pub y: u32,
}

impl TileId {
    pub fn new(z: u8, x: u32, y: u32) -> Self {
        Self { z, x, y }
    }

    /// Number of tiles along one axis at this zoom
    pub fn tiles_per_axis(z: u8) -> u32 {
        1u32 << z
    }

    /// Tile containing a coordinate
    pub fn containing(lon: f64, lat: f64, z: u8) -> Self {
        let (fx, fy) = lonlat_to_tile_fraction(lon, lat, z);
        let max = Self::tiles_per_axis(z) - 1;
        Self {
            z,
            x: (fx.floor().max(0.0) as u32).min(max),
            y: (fy.floor().max(0.0) as u32).min(max),
        }
    }

    /// Extent of the tile in Web Mercator meters as (min_x, min_y, max_x, max_y)
    pub fn mercator_bounds(&self) -> (f64, f64, f64, f64) {
        let size = 2.0 * ORIGIN_SHIFT / Self::tiles_per_axis(self.z) as f64;
        let min_x = -ORIGIN_SHIFT + self.x as f64 * size;
        let max_y = ORIGIN_SHIFT - self.y as f64 * size;
        (min_x, max_y - size, min_x + size, max_y)
    }

    /// Extent of the tile in degrees
    pub fn lonlat_bounds(&self) -> BoundingBox {
        let (min_x, min_y, max_x, max_y) = self.mercator_bounds();
        let (min_lon, min_lat) = mercator_to_lonlat(min_x, min_y);
        let (max_lon, max_lat) = mercator_to_lonlat(max_x, max_y);
        BoundingBox::new(min_lon, min_lat, max_lon, max_lat)
    }
}

/// Fractional tile coordinates of a point; the integer part is the tile index
pub fn lonlat_to_tile_fraction(lon: f64, lat: f64, z: u8) -> (f64, f64) {
    let n = TileId::tiles_per_axis(z) as f64;
    let lat = lat.clamp(-MAX_MERCATOR_LAT, MAX_MERCATOR_LAT).to_radians();
    let x = (lon + 180.0) / 360.0 * n;
    let y = (1.0 - (lat.tan() + 1.0 / lat.cos()).ln() / std::f64::consts::PI) / 2.0 * n;
    (x, y)
}

/// Every tile at zoom `z` intersecting the extent, row-major from the north-west
pub fn tiles_covering(extent: &BoundingBox, z: u8) -> Vec<TileId> {
    let north_west = TileId::containing(extent.min_lon, extent.max_lat, z);
    let south_east = TileId::containing(extent.max_lon, extent.min_lat, z);

    let mut tiles = Vec::new();
    for y in north_west.y..=south_east.y {
        for x in north_west.x..=south_east.x {
            tiles.push(TileId::new(z, x, y));
        }
    }
    tiles
}

/// Meters per degree of latitude (and of longitude at the equator)
pub const METERS_PER_DEGREE: f64 = 111_320.0;

/// Ground size of one degree of longitude and latitude at `lat`, in meters
pub fn meters_per_degree(lat: f64) -> (f64, f64) {
    (METERS_PER_DEGREE * lat.to_radians().cos(), METERS_PER_DEGREE)
}
