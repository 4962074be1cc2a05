//! Coordinate-uncertainty size classes for the point map.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Bin edges in meters; bins are `[lower, upper)`
pub const UNCERTAINTY_BREAKS: [f64; 6] = [0.0, 10.0, 100.0, 1_000.0, 10_000.0, 10_000_000.0];

/// One half-open uncertainty bin
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct UncertaintyBin(pub usize);

impl UncertaintyBin {
    /// Number of bins defined by [`UNCERTAINTY_BREAKS`]
    pub const COUNT: usize = UNCERTAINTY_BREAKS.len() - 1;

    pub fn index(&self) -> usize {
        self.0
    }

    pub fn lower(&self) -> f64 {
        UNCERTAINTY_BREAKS[self.0]
    }

    pub fn upper(&self) -> f64 {
        UNCERTAINTY_BREAKS[self.0 + 1]
    }

    /// Every bin, smallest first
    pub fn all() -> impl Iterator<Item = UncertaintyBin> {
        (0..Self::COUNT).map(UncertaintyBin)
    }
}

impl fmt::Display for UncertaintyBin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {})", format_meters(self.lower()), format_meters(self.upper()))
    }
}

fn format_meters(value: f64) -> String {
    if value >= 1_000_000.0 {
        format!("{:e}", value)
    } else {
        format!("{}", value)
    }
}

/// The bin holding `value`, `None` outside `[0, 1e7)` or for NaN
pub fn uncertainty_bin(value: f64) -> Option<UncertaintyBin> {
    if !value.is_finite() {
        return None;
    }
    UNCERTAINTY_BREAKS
        .windows(2)
        .position(|edges| value >= edges[0] && value < edges[1])
        .map(UncertaintyBin)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reference_values_fall_in_expected_bins() {
        let values = [1.0, 10.0, 50.0, 500.0, 5000.0, 50000.0];
        let bins: Vec<usize> =
            values.iter().map(|v| uncertainty_bin(*v).map(|b| b.index()).unwrap()).collect();
        assert_eq!(bins, vec![0, 1, 1, 2, 3, 4]);
    }

    #[test]
    fn test_edges_are_half_open() {
        assert_eq!(uncertainty_bin(0.0), Some(UncertaintyBin(0)));
        assert_eq!(uncertainty_bin(9.999), Some(UncertaintyBin(0)));
        assert_eq!(uncertainty_bin(100.0), Some(UncertaintyBin(2)));
        assert_eq!(uncertainty_bin(10_000_000.0), None);
        assert_eq!(uncertainty_bin(-1.0), None);
        assert_eq!(uncertainty_bin(f64::NAN), None);
    }

    #[test]
    fn test_display() {
        assert_eq!(UncertaintyBin(1).to_string(), "[10, 100)");
        assert_eq!(UncertaintyBin::all().count(), 5);
    }
}
