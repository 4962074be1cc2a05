//! Read-only summaries of the raw occurrence table.
//!
//! Counts, percentages, quantiles and the raw uncertainty scatter. No model is
//! fitted.

use crate::models::{BasisOfRecord, OccurrenceTable};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// Default number of bins for the year and uncertainty histograms
pub const DEFAULT_HISTOGRAM_BINS: usize = 30;

/// Round to two decimal places
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// `count / total * 100`, rounded to two decimals; 0 for an empty group
pub fn percent(count: usize, total: usize) -> f64 {
    if total == 0 {
        return 0.0;
    }
    round2(count as f64 / total as f64 * 100.0)
}

/// One row of a frequency table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FrequencyRow {
    pub label: String,
    pub count: usize,
    pub percent: f64,
}

/// Count occurrences of each label, most frequent first (ties by label)
pub fn frequency_table<I>(labels: I) -> Vec<FrequencyRow>
where
    I: IntoIterator<Item = String>,
{
    let mut counts: BTreeMap<String, usize> = BTreeMap::new();
    for label in labels {
        *counts.entry(label).or_default() += 1;
    }
    let total: usize = counts.values().sum();

    let mut rows: Vec<FrequencyRow> = counts
        .into_iter()
        .map(|(label, count)| FrequencyRow { label, count, percent: percent(count, total) })
        .collect();
    rows.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.label.cmp(&b.label)));
    rows
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HistogramBin {
    pub lower: f64,
    pub upper: f64,
    pub count: usize,
}

/// Equal-width histogram; bins are half-open except the last, which is closed
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Histogram {
    pub bins: Vec<HistogramBin>,
}

impl Histogram {
    /// Histogram with `bin_count` equal-width bins spanning the data range
    pub fn fixed_bins(values: &[f64], bin_count: usize) -> Self {
        let finite: Vec<f64> = values.iter().copied().filter(|v| v.is_finite()).collect();
        if finite.is_empty() || bin_count == 0 {
            return Self::default();
        }

        let min = finite.iter().copied().fold(f64::INFINITY, f64::min);
        let max = finite.iter().copied().fold(f64::NEG_INFINITY, f64::max);

        if min == max {
            return Self {
                bins: vec![HistogramBin { lower: min - 0.5, upper: max + 0.5, count: finite.len() }],
            };
        }

        let width = (max - min) / bin_count as f64;
        let mut bins: Vec<HistogramBin> = (0..bin_count)
            .map(|i| HistogramBin {
                lower: min + i as f64 * width,
                upper: min + (i + 1) as f64 * width,
                count: 0,
            })
            .collect();

        for value in finite {
            let index = (((value - min) / width).floor() as usize).min(bin_count - 1);
            bins[index].count += 1;
        }

        Self { bins }
    }

    pub fn total(&self) -> usize {
        self.bins.iter().map(|b| b.count).sum()
    }

    /// Largest single-bin count
    pub fn max_count(&self) -> usize {
        self.bins.iter().map(|b| b.count).max().unwrap_or(0)
    }
}

/// Count for one calendar month
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonthCount {
    pub month: u8,
    pub count: usize,
}

/// Minimum, quartiles and maximum (R type-7 quantiles)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FiveNumberSummary {
    pub min: f64,
    pub q1: f64,
    pub median: f64,
    pub q3: f64,
    pub max: f64,
    pub count: usize,
}

impl FiveNumberSummary {
    pub fn from_values(values: &[f64]) -> Option<Self> {
        let mut sorted: Vec<f64> = values.iter().copied().filter(|v| v.is_finite()).collect();
        if sorted.is_empty() {
            return None;
        }
        sorted.sort_by(|a, b| a.total_cmp(b));

        Some(Self {
            min: sorted[0],
            q1: quantile_sorted(&sorted, 0.25),
            median: quantile_sorted(&sorted, 0.5),
            q3: quantile_sorted(&sorted, 0.75),
            max: sorted[sorted.len() - 1],
            count: sorted.len(),
        })
    }

    pub fn iqr(&self) -> f64 {
        self.q3 - self.q1
    }
}

/// Linear-interpolation quantile of an ascending slice
pub fn quantile_sorted(sorted: &[f64], p: f64) -> f64 {
    if sorted.is_empty() {
        return f64::NAN;
    }
    let h = (sorted.len() - 1) as f64 * p.clamp(0.0, 1.0);
    let lo = h.floor() as usize;
    let hi = (lo + 1).min(sorted.len() - 1);
    sorted[lo] + (h - lo as f64) * (sorted[hi] - sorted[lo])
}

/// Elevation completeness for one basis-of-record group
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompletenessRow {
    pub basis: BasisOfRecord,
    pub total: usize,
    pub with_elevation: usize,
    pub without_elevation: usize,
    pub percent_with: f64,
    pub percent_without: f64,
    /// Records whose interpreted elevation field is set
    pub with_elevation_field: usize,
    /// Records whose verbatim elevation field is set
    pub with_verbatim_field: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct UncertaintyPoint {
    pub year: i32,
    pub log10_uncertainty: f64,
}

/// Null counts per profiled field
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MissingCounts {
    pub name: usize,
    pub month: usize,
    pub year: usize,
    pub uncertainty: usize,
    pub basis_of_record: usize,
    /// Rows left out of the log scatter (missing year, missing or non-positive uncertainty)
    pub scatter: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfileOptions {
    pub year_bins: usize,
    pub uncertainty_bins: usize,
}

impl Default for ProfileOptions {
    fn default() -> Self {
        Self { year_bins: DEFAULT_HISTOGRAM_BINS, uncertainty_bins: DEFAULT_HISTOGRAM_BINS }
    }
}

/// Everything the profiling stage reports
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Profile {
    pub total_records: usize,
    pub name_counts: Vec<FrequencyRow>,
    pub month_counts: Vec<MonthCount>,
    pub year_histogram: Histogram,
    pub year_range: Option<(i32, i32)>,
    pub elevation_completeness: Vec<CompletenessRow>,
    pub uncertainty: Option<FiveNumberSummary>,
    pub uncertainty_histogram: Histogram,
    pub uncertainty_by_year: Vec<UncertaintyPoint>,
    pub basis_counts: Vec<FrequencyRow>,
    /// Distinct institutions contributing preserved specimens
    pub specimen_institutions: usize,
    pub missing: MissingCounts,
}

impl Profile {
    /// Completeness row for a basis of record, looked up by key
    pub fn completeness_for(&self, basis: &BasisOfRecord) -> Option<&CompletenessRow> {
        self.elevation_completeness.iter().find(|row| &row.basis == basis)
    }

    /// Percentage of records of the given basis that carry elevation data
    pub fn percent_with_elevation(&self, basis: &BasisOfRecord) -> Option<f64> {
        self.completeness_for(basis).map(|row| row.percent_with)
    }

    /// Percentage share of a basis of record in the whole table
    pub fn basis_percent(&self, basis: &BasisOfRecord) -> Option<f64> {
        let label = basis.label();
        self.basis_counts.iter().find(|row| row.label == label).map(|row| row.percent)
    }
}

/// Compute the profile of a raw occurrence table
pub fn profile(table: &OccurrenceTable, options: &ProfileOptions) -> Profile {
    let mut missing = MissingCounts::default();

    let names = table.iter().filter_map(|r| r.scientific_name.clone()).collect::<Vec<_>>();
    missing.name = table.len() - names.len();
    let name_counts = frequency_table(names);

    let mut months = [0usize; 12];
    for record in table.iter() {
        match record.month {
            Some(m @ 1..=12) => months[(m - 1) as usize] += 1,
            _ => missing.month += 1,
        }
    }
    let month_counts = months
        .iter()
        .enumerate()
        .map(|(i, count)| MonthCount { month: i as u8 + 1, count: *count })
        .collect();

    let years: Vec<i32> = table.iter().filter_map(|r| r.year).collect();
    missing.year = table.len() - years.len();
    let year_values: Vec<f64> = years.iter().map(|y| *y as f64).collect();
    let year_histogram = Histogram::fixed_bins(&year_values, options.year_bins);
    let year_range = match (years.iter().min(), years.iter().max()) {
        (Some(min), Some(max)) => Some((*min, *max)),
        _ => None,
    };

    let uncertainties: Vec<f64> = table
        .iter()
        .filter_map(|r| r.coordinate_uncertainty_m)
        .filter(|v| v.is_finite())
        .collect();
    missing.uncertainty = table.len() - uncertainties.len();
    let uncertainty = FiveNumberSummary::from_values(&uncertainties);
    let uncertainty_histogram = Histogram::fixed_bins(&uncertainties, options.uncertainty_bins);

    let uncertainty_by_year: Vec<UncertaintyPoint> = table
        .iter()
        .filter_map(|r| match (r.year, r.coordinate_uncertainty_m) {
            (Some(year), Some(u)) if u > 0.0 && u.is_finite() => {
                Some(UncertaintyPoint { year, log10_uncertainty: u.log10() })
            }
            _ => None,
        })
        .collect();
    missing.scatter = table.len() - uncertainty_by_year.len();

    let bases: Vec<&BasisOfRecord> = table.iter().filter_map(|r| r.basis_of_record.as_ref()).collect();
    missing.basis_of_record = table.len() - bases.len();
    let basis_counts = frequency_table(bases.iter().map(|b| b.label()));

    let elevation_completeness = completeness_by_basis(table);

    let specimen_institutions = table
        .iter()
        .filter(|r| r.basis_of_record == Some(BasisOfRecord::PreservedSpecimen))
        .filter_map(|r| r.institution_code.as_deref())
        .map(str::trim)
        .filter(|code| !code.is_empty())
        .collect::<BTreeSet<_>>()
        .len();

    Profile {
        total_records: table.len(),
        name_counts,
        month_counts,
        year_histogram,
        year_range,
        elevation_completeness,
        uncertainty,
        uncertainty_histogram,
        uncertainty_by_year,
        basis_counts,
        specimen_institutions,
        missing,
    }
}

/// Cross-tabulate elevation presence against basis of record
fn completeness_by_basis(table: &OccurrenceTable) -> Vec<CompletenessRow> {
    #[derive(Default)]
    struct Tally {
        total: usize,
        with: usize,
        field: usize,
        verbatim: usize,
    }

    let mut groups: BTreeMap<BasisOfRecord, Tally> = BTreeMap::new();
    for record in table.iter() {
        let Some(basis) = &record.basis_of_record else {
            continue;
        };
        let tally = groups.entry(basis.clone()).or_default();
        tally.total += 1;
        if record.has_elevation() {
            tally.with += 1;
        }
        if record.elevation_m.is_some() {
            tally.field += 1;
        }
        if record.verbatim_elevation_m.is_some() {
            tally.verbatim += 1;
        }
    }

    groups
        .into_iter()
        .map(|(basis, t)| CompletenessRow {
            basis,
            total: t.total,
            with_elevation: t.with,
            without_elevation: t.total - t.with,
            percent_with: percent(t.with, t.total),
            percent_without: percent(t.total - t.with, t.total),
            with_elevation_field: t.field,
            with_verbatim_field: t.verbatim,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::OccurrenceRecord;

    fn record(basis: BasisOfRecord, elevation: Option<f64>) -> OccurrenceRecord {
        OccurrenceRecord {
            scientific_name: Some("Taricha sierrae".to_string()),
            year: Some(2000),
            month: Some(3),
            coordinate_uncertainty_m: Some(100.0),
            elevation_m: elevation,
            basis_of_record: Some(basis),
            ..Default::default()
        }
    }

    #[test]
    fn test_percent_rounding() {
        assert_eq!(percent(1, 3), 33.33);
        assert_eq!(percent(2, 3), 66.67);
        assert_eq!(percent(0, 0), 0.0);
    }

    #[test]
    fn test_frequency_table_order() {
        let rows = frequency_table(
            ["b", "a", "b", "c", "a", "b"].iter().map(|s| s.to_string()),
        );
        assert_eq!(rows[0].label, "b");
        assert_eq!(rows[0].count, 3);
        assert_eq!(rows[0].percent, 50.0);
        assert_eq!(rows[1].label, "a");
        assert_eq!(rows[2].label, "c");
    }

    #[test]
    fn test_histogram_fixed_bins() {
        let values = [0.0, 1.0, 2.0, 3.0, 4.0, 10.0];
        let hist = Histogram::fixed_bins(&values, 5);
        assert_eq!(hist.bins.len(), 5);
        assert_eq!(hist.total(), 6);
        // The maximum lands in the last (closed) bin
        assert_eq!(hist.bins[4].count, 1);
        assert_eq!(hist.bins[0].count, 2);
    }

    #[test]
    fn test_histogram_single_value() {
        let hist = Histogram::fixed_bins(&[5.0, 5.0], 30);
        assert_eq!(hist.bins.len(), 1);
        assert_eq!(hist.total(), 2);
    }

    #[test]
    fn test_five_number_summary() {
        let summary = FiveNumberSummary::from_values(&[1.0, 2.0, 3.0, 4.0, 5.0]).unwrap();
        assert_eq!(summary.min, 1.0);
        assert_eq!(summary.q1, 2.0);
        assert_eq!(summary.median, 3.0);
        assert_eq!(summary.q3, 4.0);
        assert_eq!(summary.max, 5.0);

        let even = FiveNumberSummary::from_values(&[1.0, 2.0, 3.0, 4.0]).unwrap();
        assert_eq!(even.median, 2.5);
        assert_eq!(even.q1, 1.75);
        assert!(FiveNumberSummary::from_values(&[]).is_none());
    }

    #[test]
    fn test_specimen_elevation_lookup_is_by_key() {
        let table = OccurrenceTable::new(vec![
            record(BasisOfRecord::HumanObservation, None),
            record(BasisOfRecord::HumanObservation, None),
            record(BasisOfRecord::PreservedSpecimen, Some(900.0)),
            record(BasisOfRecord::PreservedSpecimen, None),
            record(BasisOfRecord::PreservedSpecimen, Some(1200.0)),
            record(BasisOfRecord::PreservedSpecimen, Some(300.0)),
        ]);

        let profile = profile(&table, &ProfileOptions::default());
        assert_eq!(profile.percent_with_elevation(&BasisOfRecord::PreservedSpecimen), Some(75.0));
        assert_eq!(profile.percent_with_elevation(&BasisOfRecord::HumanObservation), Some(0.0));
        assert_eq!(profile.percent_with_elevation(&BasisOfRecord::LivingSpecimen), None);
    }

    #[test]
    fn test_verbatim_elevation_counts_as_present() {
        let mut rec = record(BasisOfRecord::PreservedSpecimen, None);
        rec.verbatim_elevation_m = Some(500.0);
        let profile = profile(&OccurrenceTable::new(vec![rec]), &ProfileOptions::default());

        let row = profile.completeness_for(&BasisOfRecord::PreservedSpecimen).unwrap();
        assert_eq!(row.with_elevation, 1);
        assert_eq!(row.with_elevation_field, 0);
        assert_eq!(row.with_verbatim_field, 1);
    }

    #[test]
    fn test_missing_values_are_excluded_and_counted() {
        let mut incomplete = record(BasisOfRecord::HumanObservation, None);
        incomplete.year = None;
        incomplete.month = None;
        incomplete.coordinate_uncertainty_m = Some(0.0);

        let table = OccurrenceTable::new(vec![incomplete, record(BasisOfRecord::HumanObservation, None)]);
        let profile = profile(&table, &ProfileOptions::default());

        assert_eq!(profile.missing.year, 1);
        assert_eq!(profile.missing.month, 1);
        assert_eq!(profile.missing.scatter, 1);
        assert_eq!(profile.uncertainty_by_year.len(), 1);
        assert_eq!(profile.year_histogram.total(), 1);
        assert_eq!(profile.month_counts[2].count, 1);
    }

    #[test]
    fn test_specimen_institutions_distinct() {
        let mut a = record(BasisOfRecord::PreservedSpecimen, None);
        a.institution_code = Some("MVZ".to_string());
        let mut b = a.clone();
        b.institution_code = Some("CAS".to_string());
        let c = a.clone();
        let mut d = record(BasisOfRecord::HumanObservation, None);
        d.institution_code = Some("iNaturalist".to_string());

        let profile = profile(&OccurrenceTable::new(vec![a, b, c, d]), &ProfileOptions::default());
        assert_eq!(profile.specimen_institutions, 2);
    }
}
