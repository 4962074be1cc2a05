//! Coordinate-validation battery.
//!
//! Each record is tested against fixed gazetteers (capitals, centroids,
//! institutions, the GBIF headquarters, a land mask) and against the other
//! records of its species (duplicates, distance outliers). Cleaning repeats
//! the battery on the survivors until nothing more is removed.

use crate::reference::{ReferenceData, GBIF_HEADQUARTERS};
use crate::spatial::{haversine_m, mean_distances, planar_distance_deg, upper_fence};
use caudata_core::models::{CleanRecord, CleanedTable, CoordinateFlags, FlaggedRecord};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::{BTreeMap, HashMap};

/// Thresholds of the battery
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ValidationConfig {
    pub capital_radius_m: f64,
    pub centroid_radius_m: f64,
    pub institution_radius_m: f64,
    pub gbif_radius_m: f64,
    /// Points this close to the coastline count as land
    pub sea_buffer_m: f64,
    /// Radius around (0, 0) in degrees
    pub zero_radius_deg: f64,
    /// IQR multiplier of the outlier fence
    pub outlier_multiplier: f64,
    /// Species with fewer records skip the outlier test
    pub outlier_min_records: usize,
    /// Upper bound on battery passes
    pub max_passes: usize,
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self {
            capital_radius_m: 10_000.0,
            centroid_radius_m: 1_000.0,
            institution_radius_m: 100.0,
            gbif_radius_m: 1_000.0,
            sea_buffer_m: 5_000.0,
            zero_radius_deg: 0.5,
            outlier_multiplier: 5.0,
            outlier_min_records: 7,
            max_passes: 100,
        }
    }
}

pub struct CoordinateValidator {
    reference: ReferenceData,
    config: ValidationConfig,
}

impl Default for CoordinateValidator {
    fn default() -> Self {
        Self::new(ReferenceData::builtin(), ValidationConfig::default())
    }
}

impl CoordinateValidator {
    pub fn new(reference: ReferenceData, config: ValidationConfig) -> Self {
        Self { reference, config }
    }

    pub fn config(&self) -> &ValidationConfig {
        &self.config
    }

    /// Tests that depend on a single record only
    pub fn check_record(&self, record: &CleanRecord) -> CoordinateFlags {
        let (lon, lat) = (record.longitude, record.latitude);
        let mut flags = CoordinateFlags::default();

        flags.valid_range = lat.abs() <= 90.0 && lon.abs() <= 180.0;
        if !flags.valid_range {
            // The remaining gazetteer tests are meaningless off the globe
            return flags;
        }

        flags.equal = lat.abs() != lon.abs();
        flags.zero = lat != 0.0
            && lon != 0.0
            && planar_distance_deg((lon, lat), (0.0, 0.0)) > self.config.zero_radius_deg;
        flags.capital = !self.reference.capitals.any_within(lon, lat, self.config.capital_radius_m);
        flags.centroid =
            !self.reference.centroids.any_within(lon, lat, self.config.centroid_radius_m);
        flags.institution =
            !self.reference.institutions.any_within(lon, lat, self.config.institution_radius_m);
        flags.gbif_headquarters =
            haversine_m((lon, lat), GBIF_HEADQUARTERS) > self.config.gbif_radius_m;
        flags.sea = self
            .reference
            .land
            .is_land_within(lon, lat, self.config.sea_buffer_m)
            .unwrap_or(true);

        flags
    }

    /// Run the full battery over a set of records
    pub fn flag(&self, records: &[CleanRecord]) -> Vec<CoordinateFlags> {
        let mut flags: Vec<CoordinateFlags> = records.iter().map(|r| self.check_record(r)).collect();

        for index in duplicate_losers(records) {
            flags[index].duplicate = false;
        }

        for index in self.distance_outliers(records, &flags) {
            flags[index].outlier = false;
        }

        flags
    }

    /// Records whose mean distance to the rest of their species exceeds the fence
    fn distance_outliers(&self, records: &[CleanRecord], flags: &[CoordinateFlags]) -> Vec<usize> {
        let mut by_species: BTreeMap<&str, Vec<usize>> = BTreeMap::new();
        for (index, record) in records.iter().enumerate() {
            if flags[index].valid_range {
                by_species.entry(record.name.as_str()).or_default().push(index);
            }
        }

        let mut outliers = Vec::new();
        for (species, members) in by_species {
            if members.len() < self.config.outlier_min_records {
                continue;
            }
            let coords: Vec<(f64, f64)> =
                members.iter().map(|i| (records[*i].longitude, records[*i].latitude)).collect();
            let means = mean_distances(&coords);
            let Some(fence) = upper_fence(&means, self.config.outlier_multiplier) else {
                continue;
            };
            let before = outliers.len();
            outliers.extend(
                members.iter().zip(&means).filter(|(_, mean)| **mean > fence).map(|(i, _)| *i),
            );
            tracing::debug!(species, fence_m = fence, flagged = outliers.len() - before, "Outlier test");
        }
        outliers
    }
}

/// Content order used to pick the retained record among duplicates
///
/// Lowest uncertainty first, then the most recent year, then basis of record.
fn representative_order(a: &CleanRecord, b: &CleanRecord) -> Ordering {
    a.coordinate_uncertainty_m
        .total_cmp(&b.coordinate_uncertainty_m)
        .then_with(|| b.year.cmp(&a.year))
        .then_with(|| a.basis_of_record.cmp(&b.basis_of_record))
}

/// Indices of records that duplicate another record's species and coordinates
/// and are not that group's representative
fn duplicate_losers(records: &[CleanRecord]) -> Vec<usize> {
    let mut groups: HashMap<(&str, u64, u64), Vec<usize>> = HashMap::new();
    for (index, record) in records.iter().enumerate() {
        let key = (
            record.name.as_str(),
            normalize_zero(record.longitude).to_bits(),
            normalize_zero(record.latitude).to_bits(),
        );
        groups.entry(key).or_default().push(index);
    }

    let mut losers = Vec::new();
    for members in groups.values().filter(|m| m.len() > 1) {
        let keep = members
            .iter()
            .copied()
            .min_by(|a, b| representative_order(&records[*a], &records[*b]).then(a.cmp(b)));
        losers.extend(members.iter().copied().filter(|i| Some(*i) != keep));
    }
    losers.sort_unstable();
    losers
}

fn normalize_zero(value: f64) -> f64 {
    if value == 0.0 {
        0.0
    } else {
        value
    }
}

/// Result of cleaning the projected records
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CleaningOutcome {
    pub retained: CleanedTable,
    /// Removed records with the flags of the pass that removed them
    pub removed: Vec<FlaggedRecord>,
    /// Failure count per test over all passes
    pub failures: BTreeMap<String, usize>,
    /// Battery evaluations, including the final one that removed nothing
    pub passes: usize,
}

/// Apply the battery repeatedly until every remaining record passes
pub fn clean_occurrences(records: Vec<CleanRecord>, validator: &CoordinateValidator) -> CleaningOutcome {
    let mut failures: BTreeMap<String, usize> =
        CoordinateFlags::TESTS.iter().map(|t| (t.to_string(), 0)).collect();
    let mut removed = Vec::new();
    let mut current = records;
    let mut passes = 0;

    loop {
        passes += 1;
        let flags = validator.flag(&current);
        if flags.iter().all(CoordinateFlags::summary) {
            break;
        }

        let mut survivors = Vec::with_capacity(current.len());
        for (record, flags) in current.into_iter().zip(flags) {
            if flags.summary() {
                survivors.push(record);
            } else {
                for test in flags.failed_tests() {
                    *failures.entry(test.to_string()).or_default() += 1;
                }
                removed.push(FlaggedRecord { record, flags });
            }
        }
        current = survivors;

        if passes >= validator.config().max_passes {
            tracing::warn!(passes, "Validation battery did not settle; stopping");
            break;
        }
    }

    tracing::info!(
        retained = current.len(),
        removed = removed.len(),
        passes,
        "Coordinate cleaning finished"
    );

    CleaningOutcome { retained: CleanedTable::new(current), removed, failures, passes }
}

#[cfg(test)]
mod tests {
    use super::*;
    use caudata_core::models::BasisOfRecord;

    fn record(lon: f64, lat: f64) -> CleanRecord {
        CleanRecord {
            name: "Taricha sierrae".to_string(),
            year: 2010,
            longitude: lon,
            latitude: lat,
            coordinate_uncertainty_m: 50.0,
            basis_of_record: BasisOfRecord::HumanObservation,
        }
    }

    #[test]
    fn test_clean_record_passes() {
        let validator = CoordinateValidator::default();
        let flags = validator.check_record(&record(-120.7, 38.9));
        assert!(flags.summary(), "failed: {:?}", flags.failed_tests());
    }

    #[test]
    fn test_individual_tests() {
        let validator = CoordinateValidator::default();

        assert!(!validator.check_record(&record(-200.0, 38.0)).valid_range);
        assert!(!validator.check_record(&record(-45.0, 45.0)).equal);
        assert!(!validator.check_record(&record(0.0, 38.0)).zero);
        assert!(!validator.check_record(&record(0.3, 0.3)).zero);
        // Sacramento is not a country capital, Mexico City is
        assert!(validator.check_record(&record(-121.49, 38.58)).capital);
        assert!(!validator.check_record(&record(-99.10, 19.40)).capital);
        // Geographic center of California
        assert!(!validator.check_record(&record(-119.4494, 37.1661)).centroid);
        // Museum of Vertebrate Zoology
        assert!(!validator.check_record(&record(-122.2595, 37.8719)).institution);
        assert!(!validator.check_record(&record(12.58, 55.68)).gbif_headquarters);
        // Offshore from Monterey
        assert!(!validator.check_record(&record(-123.0, 36.5)).sea);
    }

    #[test]
    fn test_coastal_land_passes_sea() {
        let validator = CoordinateValidator::default();
        // Downtown Santa Cruz, UC Santa Cruz, Capitola, Lighthouse Point
        for (lon, lat) in [(-122.03, 36.974), (-122.06, 36.995), (-121.953, 36.975), (-122.025, 36.951)] {
            assert!(validator.check_record(&record(lon, lat)).sea, "({lon}, {lat}) flagged as sea");
        }
        assert!(!validator.check_record(&record(-123.0, 36.5)).sea);
    }

    #[test]
    fn test_sea_buffer_is_configurable() {
        let config = ValidationConfig { sea_buffer_m: 0.0, ..ValidationConfig::default() };
        let validator = CoordinateValidator::new(ReferenceData::builtin(), config);
        // Lighthouse Point sits just past the coarse coastline
        assert!(!validator.check_record(&record(-122.025, 36.951)).sea);
        assert!(validator.check_record(&record(-122.03, 36.974)).sea);
    }

    #[test]
    fn test_duplicate_representative_by_content() {
        let mut precise = record(-120.5, 38.5);
        precise.coordinate_uncertainty_m = 5.0;
        let coarse = record(-120.5, 38.5);

        let forward = duplicate_losers(&[coarse.clone(), precise.clone()]);
        let backward = duplicate_losers(&[precise, coarse]);
        assert_eq!(forward, vec![0]);
        assert_eq!(backward, vec![1]);
    }

    #[test]
    fn test_duplicates_need_same_species() {
        let mut other = record(-120.5, 38.5);
        other.name = "Taricha torosa".to_string();
        assert!(duplicate_losers(&[record(-120.5, 38.5), other]).is_empty());
    }

    #[test]
    fn test_outlier_needs_seven_records() {
        let validator = CoordinateValidator::default();
        let mut records: Vec<CleanRecord> =
            (0..6).map(|i| record(-120.5 + i as f64 * 0.01, 38.5)).collect();
        records.push(record(-114.9, 34.9));

        let flags = validator.flag(&records);
        assert!(!flags[6].outlier, "far record among seven should be an outlier");

        let flags = validator.flag(&records[1..]);
        assert!(flags.iter().all(|f| f.outlier), "six records skip the outlier test");
    }

    #[test]
    fn test_cleaning_reaches_fixed_point() {
        let validator = CoordinateValidator::default();
        let mut records: Vec<CleanRecord> =
            (0..8).map(|i| record(-120.9 + i as f64 * 0.05, 38.7 + i as f64 * 0.01)).collect();
        records.push(record(-120.9, 38.7));
        records.push(record(-123.0, 36.5));

        let outcome = clean_occurrences(records, &validator);
        assert_eq!(outcome.retained.len(), 8);
        assert_eq!(outcome.failures["duplicate"], 1);
        assert!(outcome.failures["sea"] >= 1);

        let again = clean_occurrences(outcome.retained.records.clone(), &validator);
        assert_eq!(again.retained, outcome.retained);
        assert_eq!(again.passes, 1);
        assert!(again.removed.is_empty());
    }
}
