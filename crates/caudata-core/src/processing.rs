pub mod bins;
pub mod profile;

use crate::models::{BasisOfRecord, CleanRecord, OccurrenceRecord, OccurrenceTable};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

pub use bins::{uncertainty_bin, UncertaintyBin, UNCERTAINTY_BREAKS};
pub use profile::{profile, Profile, ProfileOptions};

/// Rows dropped by the projection, counted per missing column.
///
/// A row missing several columns is counted once under each of them.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MissingFieldCounts {
    pub name: usize,
    pub year: usize,
    pub longitude: usize,
    pub latitude: usize,
    pub coordinate_uncertainty: usize,
    pub basis_of_record: usize,
}

/// Result of projecting the raw table onto the cleaning columns
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProjectionOutcome {
    pub records: Vec<CleanRecord>,
    /// Rows removed for carrying at least one null
    pub dropped: usize,
    pub missing: MissingFieldCounts,
    /// Basis-of-record levels still present after filtering
    pub levels: BTreeSet<BasisOfRecord>,
}

/// Project to name, year, longitude, latitude, uncertainty and basis of
/// record, dropping any row with a null in one of them
pub fn project_complete(table: &OccurrenceTable) -> ProjectionOutcome {
    let mut outcome = ProjectionOutcome::default();

    for record in table.iter() {
        count_missing(record, &mut outcome.missing);
        match project_record(record) {
            Some(clean) => {
                outcome.levels.insert(clean.basis_of_record.clone());
                outcome.records.push(clean);
            }
            None => outcome.dropped += 1,
        }
    }

    tracing::debug!(
        kept = outcome.records.len(),
        dropped = outcome.dropped,
        "Projected occurrence table"
    );

    outcome
}

/// Project a single record, `None` if any required column is null
pub fn project_record(record: &OccurrenceRecord) -> Option<CleanRecord> {
    let name = record.scientific_name.as_deref().map(str::trim).filter(|n| !n.is_empty())?;
    let uncertainty = record.coordinate_uncertainty_m.filter(|u| u.is_finite())?;

    Some(CleanRecord {
        name: name.to_string(),
        year: record.year?,
        longitude: record.longitude.filter(|v| v.is_finite())?,
        latitude: record.latitude.filter(|v| v.is_finite())?,
        coordinate_uncertainty_m: uncertainty,
        basis_of_record: record.basis_of_record.clone()?,
    })
}

fn count_missing(record: &OccurrenceRecord, missing: &mut MissingFieldCounts) {
    if record.scientific_name.as_deref().map_or(true, |n| n.trim().is_empty()) {
        missing.name += 1;
    }
    if record.year.is_none() {
        missing.year += 1;
    }
    if !record.longitude.is_some_and(f64::is_finite) {
        missing.longitude += 1;
    }
    if !record.latitude.is_some_and(f64::is_finite) {
        missing.latitude += 1;
    }
    if !record.coordinate_uncertainty_m.is_some_and(f64::is_finite) {
        missing.coordinate_uncertainty += 1;
    }
    if record.basis_of_record.is_none() {
        missing.basis_of_record += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn complete(basis: BasisOfRecord) -> OccurrenceRecord {
        OccurrenceRecord {
            key: Some(1),
            scientific_name: Some("Taricha sierrae".to_string()),
            year: Some(1998),
            month: Some(4),
            latitude: Some(38.9),
            longitude: Some(-120.7),
            coordinate_uncertainty_m: Some(30.0),
            basis_of_record: Some(basis),
            ..Default::default()
        }
    }

    #[test]
    fn test_project_keeps_complete_rows() {
        let table = OccurrenceTable::new(vec![complete(BasisOfRecord::HumanObservation)]);
        let outcome = project_complete(&table);

        assert_eq!(outcome.records.len(), 1);
        assert_eq!(outcome.dropped, 0);
        assert_eq!(outcome.records[0].name, "Taricha sierrae");
        assert_eq!(outcome.records[0].year, 1998);
    }

    #[test]
    fn test_project_drops_rows_with_nulls() {
        let mut no_year = complete(BasisOfRecord::PreservedSpecimen);
        no_year.year = None;
        let mut no_uncertainty = complete(BasisOfRecord::PreservedSpecimen);
        no_uncertainty.coordinate_uncertainty_m = None;
        let mut no_basis = complete(BasisOfRecord::LivingSpecimen);
        no_basis.basis_of_record = None;

        let table = OccurrenceTable::new(vec![
            no_year,
            no_uncertainty,
            no_basis,
            complete(BasisOfRecord::HumanObservation),
        ]);
        let outcome = project_complete(&table);

        assert_eq!(outcome.records.len(), 1);
        assert_eq!(outcome.dropped, 3);
        assert_eq!(outcome.missing.year, 1);
        assert_eq!(outcome.missing.coordinate_uncertainty, 1);
        assert_eq!(outcome.missing.basis_of_record, 1);
    }

    #[test]
    fn test_unused_levels_are_dropped() {
        let mut specimen = complete(BasisOfRecord::PreservedSpecimen);
        specimen.latitude = None;

        let table = OccurrenceTable::new(vec![specimen, complete(BasisOfRecord::HumanObservation)]);
        let outcome = project_complete(&table);

        assert_eq!(outcome.levels.len(), 1);
        assert!(outcome.levels.contains(&BasisOfRecord::HumanObservation));
        assert!(!outcome.levels.contains(&BasisOfRecord::PreservedSpecimen));
    }

    #[test]
    fn test_blank_name_counts_as_missing() {
        let mut blank = complete(BasisOfRecord::HumanObservation);
        blank.scientific_name = Some("   ".to_string());

        let outcome = project_complete(&OccurrenceTable::new(vec![blank]));
        assert!(outcome.records.is_empty());
        assert_eq!(outcome.missing.name, 1);
    }
}
