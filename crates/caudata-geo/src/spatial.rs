use caudata_core::processing::profile::quantile_sorted;
use geo::{Distance, Haversine, Point};

/// Great-circle distance in meters between two (lon, lat) coordinates
pub fn haversine_m(a: (f64, f64), b: (f64, f64)) -> f64 {
    Haversine.distance(Point::new(a.0, a.1), Point::new(b.0, b.1))
}

/// Euclidean distance in degrees
pub fn planar_distance_deg(a: (f64, f64), b: (f64, f64)) -> f64 {
    ((a.0 - b.0).powi(2) + (a.1 - b.1).powi(2)).sqrt()
}

/// Mean great-circle distance from each coordinate to every other one
///
/// Returns an empty vector for fewer than two coordinates.
pub fn mean_distances(coords: &[(f64, f64)]) -> Vec<f64> {
    let n = coords.len();
    if n < 2 {
        return Vec::new();
    }

    let mut sums = vec![0.0f64; n];
    for i in 0..n {
        for j in (i + 1)..n {
            let d = haversine_m(coords[i], coords[j]);
            sums[i] += d;
            sums[j] += d;
        }
    }
    sums.into_iter().map(|s| s / (n - 1) as f64).collect()
}

/// Upper fence `Q3 + multiplier * IQR` of a sample
pub fn upper_fence(values: &[f64], multiplier: f64) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.total_cmp(b));
    let q1 = quantile_sorted(&sorted, 0.25);
    let q3 = quantile_sorted(&sorted, 0.75);
    Some(q3 + multiplier * (q3 - q1))
}
