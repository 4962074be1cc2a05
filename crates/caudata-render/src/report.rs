//! Markdown report and machine-readable summary, both read from the
//! [`ReportContext`] only.

use std::fmt::Write as _;
use std::path::{Path, PathBuf};

use caudata_core::models::{ArtifactKind, BasisOfRecord, ReportContext};
use caudata_core::processing::profile::FrequencyRow;
use tabled::{settings::Style, Table, Tabled};

use crate::error::Result;

pub const REPORT_FILE: &str = "report.md";
pub const SUMMARY_FILE: &str = "summary.json";

#[derive(Tabled)]
struct FrequencyLine {
    #[tabled(rename = "Value")]
    label: String,
    #[tabled(rename = "Records")]
    count: usize,
    #[tabled(rename = "Percent")]
    percent: String,
}

impl From<&FrequencyRow> for FrequencyLine {
    fn from(row: &FrequencyRow) -> Self {
        Self { label: row.label.clone(), count: row.count, percent: format!("{:.2}", row.percent) }
    }
}

#[derive(Tabled)]
struct CompletenessLine {
    #[tabled(rename = "Basis of record")]
    basis: String,
    #[tabled(rename = "Records")]
    total: usize,
    #[tabled(rename = "With elevation")]
    with: String,
    #[tabled(rename = "Without elevation")]
    without: String,
}

#[derive(Tabled)]
struct StatLine {
    #[tabled(rename = "Statistic")]
    statistic: &'static str,
    #[tabled(rename = "Value")]
    value: String,
}

#[derive(Tabled)]
struct TestLine {
    #[tabled(rename = "Test")]
    test: String,
    #[tabled(rename = "Records failing")]
    failures: usize,
}

fn markdown_table<T: Tabled>(rows: Vec<T>) -> String {
    let mut table = Table::new(rows);
    table.with(Style::markdown());
    table.to_string()
}

fn acquisition_section(ctx: &ReportContext, out: &mut String) {
    let Some(acq) = ctx.acquisition() else {
        return;
    };
    let _ = writeln!(out, "## Data acquisition\n");
    let _ = writeln!(
        out,
        "We retrieved {} georeferenced occurrence records of *{}* from GBIF on {}, querying {} ({}). \
         The table holds {} distinct scientific names: {}.\n",
        acq.record_count,
        acq.taxon.binomial(),
        acq.fetched_at.format("%Y-%m-%d"),
        if acq.queried_names.len() == 1 { "one name".to_string() } else { format!("{} names", acq.queried_names.len()) },
        acq.queried_names.join(", "),
        acq.distinct_names.len(),
        acq.distinct_names.iter().map(|n| format!("*{}*", n)).collect::<Vec<_>>().join(", "),
    );
}

fn profile_section(ctx: &ReportContext, out: &mut String) {
    let Some(profile) = ctx.profile() else {
        return;
    };
    let _ = writeln!(out, "## Exploratory analysis\n");

    let _ = writeln!(out, "### Scientific names\n");
    let _ = writeln!(out, "{}\n", markdown_table(profile.name_counts.iter().map(FrequencyLine::from).collect()));

    let _ = writeln!(out, "### Time\n");
    if let Some((first, last)) = profile.year_range {
        let _ = write!(out, "Observations span {} to {}. ", first, last);
    }
    let _ = writeln!(
        out,
        "{} records lack a year and {} lack a month; they are left out of the corresponding histograms.\n",
        profile.missing.year, profile.missing.month
    );

    let _ = writeln!(out, "### Basis of record\n");
    let _ = writeln!(out, "{}\n", markdown_table(profile.basis_counts.iter().map(FrequencyLine::from).collect()));
    let specimen_share = profile.basis_percent(&BasisOfRecord::PreservedSpecimen).unwrap_or(0.0);
    let _ = writeln!(
        out,
        "Preserved specimens make up {:.2}% of the records and come from {} institutions.\n",
        specimen_share, profile.specimen_institutions
    );

    let _ = writeln!(out, "### Elevation data\n");
    let lines = profile
        .elevation_completeness
        .iter()
        .map(|row| CompletenessLine {
            basis: row.basis.label(),
            total: row.total,
            with: format!("{} ({:.2}%)", row.with_elevation, row.percent_with),
            without: format!("{} ({:.2}%)", row.without_elevation, row.percent_without),
        })
        .collect();
    let _ = writeln!(out, "{}\n", markdown_table(lines));
    match profile.percent_with_elevation(&BasisOfRecord::PreservedSpecimen) {
        Some(pct) => {
            let _ = writeln!(out, "{:.2}% of preserved-specimen records carry elevation data.\n", pct);
        }
        None => {
            let _ = writeln!(out, "No preserved-specimen records were returned.\n");
        }
    }

    let _ = writeln!(out, "### Coordinate uncertainty\n");
    if let Some(summary) = &profile.uncertainty {
        let lines = vec![
            StatLine { statistic: "Minimum", value: format!("{:.1} m", summary.min) },
            StatLine { statistic: "First quartile", value: format!("{:.1} m", summary.q1) },
            StatLine { statistic: "Median", value: format!("{:.1} m", summary.median) },
            StatLine { statistic: "Third quartile", value: format!("{:.1} m", summary.q3) },
            StatLine { statistic: "Maximum", value: format!("{:.1} m", summary.max) },
            StatLine { statistic: "Records", value: summary.count.to_string() },
        ];
        let _ = writeln!(out, "{}\n", markdown_table(lines));
    }
    let _ = writeln!(
        out,
        "{} records have no coordinate uncertainty and are excluded from these statistics.\n",
        profile.missing.uncertainty
    );
}

fn cleaning_section(ctx: &ReportContext, out: &mut String) {
    let Some(cleaning) = ctx.cleaning() else {
        return;
    };
    let _ = writeln!(out, "## Coordinate cleaning\n");
    let _ = writeln!(
        out,
        "Keeping only name, year, coordinates, coordinate uncertainty and basis of record, \
         {} of {} records had a missing value and were dropped. The coordinate-validation \
         battery then removed {} records over {} passes, leaving {} records.\n",
        cleaning.dropped_incomplete,
        cleaning.input_records,
        cleaning.flagged_records,
        cleaning.passes,
        cleaning.retained_records,
    );

    let lines = cleaning
        .test_failures
        .iter()
        .map(|(test, failures)| TestLine { test: test.clone(), failures: *failures })
        .collect();
    let _ = writeln!(out, "{}\n", markdown_table(lines));

    if let Some(mean) = cleaning.mean_year {
        let _ = writeln!(out, "The mean observation year of the retained records is {:.1}.\n", mean);
    }
}

fn terrain_section(ctx: &ReportContext, out: &mut String) {
    let Some(terrain) = ctx.terrain() else {
        return;
    };
    let e = &terrain.extent;
    let _ = writeln!(out, "## Terrain\n");
    let _ = writeln!(
        out,
        "Elevation comes from {} terrain tiles at zoom {}, resampled to a {}° grid over \
         longitude {} to {} and latitude {} to {} ({} rows by {} columns) and masked to {}, \
         which set {} cells outside the boundary to no-data.\n",
        terrain.tile_count,
        terrain.zoom,
        terrain.resolution,
        e.min_lon,
        e.max_lon,
        e.min_lat,
        e.max_lat,
        terrain.rows,
        terrain.cols,
        terrain.boundary_name,
        terrain.masked_cells,
    );
    if let Some(stats) = &terrain.elevation {
        let _ = writeln!(
            out,
            "Elevation ranges from {:.0} m to {:.0} m with a mean of {:.0} m.",
            stats.min, stats.max, stats.mean
        );
    }
    if let Some(stats) = &terrain.slope {
        let _ = writeln!(out, "Mean slope is {:.1}° with a maximum of {:.1}°.", stats.mean, stats.max);
    }
    let _ = writeln!(out);
}

fn figures_section(ctx: &ReportContext, out: &mut String) {
    if ctx.artifacts().is_empty() {
        return;
    }
    let _ = writeln!(out, "## Figures and outputs\n");
    for artifact in ctx.artifacts() {
        let path = artifact.path.display();
        match artifact.kind {
            ArtifactKind::Chart | ArtifactKind::Map | ArtifactKind::Raster | ArtifactKind::Render => {
                let _ = writeln!(out, "![{}]({})\n", artifact.description, path);
            }
            ArtifactKind::WebMap | ArtifactKind::GeoJson | ArtifactKind::Data | ArtifactKind::Report => {
                let _ = writeln!(out, "- [{}]({})", artifact.description, path);
            }
        }
    }
    let _ = writeln!(out);
}

/// The report as Markdown
pub fn render_markdown(ctx: &ReportContext) -> String {
    let mut out = String::new();
    let title = ctx.acquisition().map(|a| a.taxon.binomial()).unwrap_or_else(|| "Occurrence".to_string());
    let _ = writeln!(out, "# *{}* occurrence report\n", title);

    acquisition_section(ctx, &mut out);
    profile_section(ctx, &mut out);
    cleaning_section(ctx, &mut out);
    terrain_section(ctx, &mut out);
    figures_section(ctx, &mut out);
    out
}

/// Write `report.md` and `summary.json` into `dir`
pub fn write_report(ctx: &ReportContext, dir: &Path) -> Result<(PathBuf, PathBuf)> {
    let report = dir.join(REPORT_FILE);
    let summary = dir.join(SUMMARY_FILE);
    std::fs::write(&report, render_markdown(ctx))?;
    std::fs::write(&summary, serde_json::to_string_pretty(ctx)?)?;
    tracing::info!(report = %report.display(), complete = ctx.is_complete(), "Wrote report");
    Ok((report, summary))
}

#[cfg(test)]
mod tests {
    use super::*;
    use caudata_core::models::{AcquisitionSummary, OccurrenceRecord, OccurrenceTable, TaxonQuery};
    use caudata_core::processing::profile::{profile, ProfileOptions};
    use chrono::{TimeZone, Utc};

    fn context() -> ReportContext {
        let table = OccurrenceTable::new(vec![
            OccurrenceRecord {
                scientific_name: Some("Taricha sierrae".to_string()),
                year: Some(1960),
                basis_of_record: Some(BasisOfRecord::PreservedSpecimen),
                elevation_m: Some(900.0),
                institution_code: Some("MVZ".to_string()),
                ..Default::default()
            },
            OccurrenceRecord {
                scientific_name: Some("Taricha sierrae".to_string()),
                year: Some(2015),
                basis_of_record: Some(BasisOfRecord::HumanObservation),
                coordinate_uncertainty_m: Some(12.0),
                ..Default::default()
            },
        ]);

        let mut ctx = ReportContext::new();
        ctx.record_acquisition(AcquisitionSummary {
            taxon: TaxonQuery::default(),
            queried_names: TaxonQuery::default().names(),
            record_count: table.len(),
            distinct_names: table.distinct_names(),
            fetched_at: Utc.with_ymd_and_hms(2026, 3, 1, 12, 0, 0).unwrap(),
        })
        .unwrap();
        ctx.record_profile(profile(&table, &ProfileOptions::default())).unwrap();
        ctx.add_artifact(ArtifactKind::Chart, "month_histogram.svg", "Records per month");
        ctx.add_artifact(ArtifactKind::WebMap, "webmap.html", "Interactive map");
        ctx
    }

    #[test]
    fn test_markdown_reads_context_values() {
        let md = render_markdown(&context());

        assert!(md.starts_with("# *Taricha sierrae* occurrence report"));
        assert!(md.contains("We retrieved 2 georeferenced occurrence records"));
        assert!(md.contains("on 2026-03-01"));
        assert!(md.contains("100.00% of preserved-specimen records carry elevation data."));
        assert!(md.contains("![Records per month](month_histogram.svg)"));
        assert!(md.contains("- [Interactive map](webmap.html)"));
        // Sections without data are omitted
        assert!(!md.contains("## Coordinate cleaning"));
    }

    #[test]
    fn test_write_report_files() {
        let dir = tempfile::tempdir().unwrap();
        let ctx = context();
        let (report, summary) = write_report(&ctx, dir.path()).unwrap();

        assert!(std::fs::read_to_string(report).unwrap().contains("## Exploratory analysis"));
        let summary = std::fs::read_to_string(summary).unwrap();
        assert_eq!(summary, serde_json::to_string_pretty(&ctx).unwrap());
        let parsed: serde_json::Value = serde_json::from_str(&summary).unwrap();
        assert_eq!(parsed["acquisition"]["record_count"], 2);
    }
}
