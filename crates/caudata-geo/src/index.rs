use crate::spatial::haversine_m;
use crate::transform::METERS_PER_DEGREE;
use rstar::{RTree, RTreeObject, AABB};

/// A named reference coordinate
#[derive(Debug, Clone, PartialEq)]
pub struct IndexedPoint {
    pub name: &'static str,
    pub lon: f64,
    pub lat: f64,
}

impl RTreeObject for IndexedPoint {
    type Envelope = AABB<[f64; 2]>;

    fn envelope(&self) -> Self::Envelope {
        AABB::from_point([self.lon, self.lat])
    }
}

/// Spatial index over reference points for radius queries in meters
pub struct PointIndex {
    tree: RTree<IndexedPoint>,
}

impl PointIndex {
    /// Create an index from (name, lon, lat) triples
    pub fn from_points(points: &[(&'static str, f64, f64)]) -> Self {
        let indexed: Vec<IndexedPoint> = points
            .iter()
            .map(|(name, lon, lat)| IndexedPoint { name: *name, lon: *lon, lat: *lat })
            .collect();
        Self { tree: RTree::bulk_load(indexed) }
    }

    pub fn len(&self) -> usize {
        self.tree.size()
    }

    pub fn is_empty(&self) -> bool {
        self.tree.size() == 0
    }

    /// Reference points within `radius_m` meters of a coordinate
    ///
    /// The tree is queried with a degree envelope widened by the latitude's
    /// longitude compression, then filtered by exact great-circle distance.
    pub fn within(&self, lon: f64, lat: f64, radius_m: f64) -> Vec<&IndexedPoint> {
        let dlat = radius_m / METERS_PER_DEGREE;
        let dlon = dlat / lat.to_radians().cos().abs().max(0.01);
        let envelope = AABB::from_corners([lon - dlon, lat - dlat], [lon + dlon, lat + dlat]);

        self.tree
            .locate_in_envelope(&envelope)
            .filter(|p| haversine_m((lon, lat), (p.lon, p.lat)) <= radius_m)
            .collect()
    }

    /// Whether any reference point lies within `radius_m` meters
    pub fn any_within(&self, lon: f64, lat: f64, radius_m: f64) -> bool {
        !self.within(lon, lat, radius_m).is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_radius_query() {
        let index = PointIndex::from_points(&[
            ("Sacramento", -121.4944, 38.5816),
            ("Reno", -119.8138, 39.5296),
        ]);
        assert_eq!(index.len(), 2);

        // About 5 km east of Sacramento
        let hits = index.within(-121.4372, 38.5816, 10_000.0);
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].name, "Sacramento");

        assert!(!index.any_within(-121.4372, 38.5816, 1_000.0));
    }

    #[test]
    fn test_envelope_widens_at_high_latitude() {
        let index = PointIndex::from_points(&[("North", 10.0, 70.0)]);
        // 0.2 degrees of longitude at 70N is under 8 km
        assert!(index.any_within(10.2, 70.0, 8_000.0));
    }
}
