//! The record every narrative value in the report is read from.
//!
//! Each stage writes its section exactly once; the report renderer only reads.

use crate::error::{CaudataError, Result};
use crate::models::geometry::BoundingBox;
use crate::models::occurrence::BasisOfRecord;
use crate::models::raster::RasterStats;
use crate::models::taxon::TaxonQuery;
use crate::processing::profile::Profile;
use crate::processing::MissingFieldCounts;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::path::PathBuf;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AcquisitionSummary {
    pub taxon: TaxonQuery,
    pub queried_names: Vec<String>,
    pub record_count: usize,
    pub distinct_names: BTreeSet<String>,
    pub fetched_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CleaningSummary {
    /// Rows in the raw table
    pub input_records: usize,
    /// Rows dropped for a null in a projected column
    pub dropped_incomplete: usize,
    pub missing: MissingFieldCounts,
    /// Basis-of-record levels present after the null filter
    pub levels: Vec<BasisOfRecord>,
    /// Failure count per validation test, keyed by test name
    pub test_failures: BTreeMap<String, usize>,
    /// Rows removed by the validation battery
    pub flagged_records: usize,
    pub retained_records: usize,
    /// Passes of the battery until nothing more was removed
    pub passes: usize,
    pub mean_year: Option<f64>,
}

impl CleaningSummary {
    pub fn failures_for(&self, test: &str) -> usize {
        self.test_failures.get(test).copied().unwrap_or(0)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TerrainSummary {
    pub boundary_name: String,
    pub zoom: u8,
    pub tile_count: usize,
    /// Grid resolution in degrees
    pub resolution: f64,
    pub extent: BoundingBox,
    pub rows: usize,
    pub cols: usize,
    /// Cells set to no-data by the boundary mask
    pub masked_cells: usize,
    pub elevation: Option<RasterStats>,
    pub slope: Option<RasterStats>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ArtifactKind {
    Chart,
    Map,
    WebMap,
    GeoJson,
    Raster,
    Render,
    Report,
    Data,
}

/// A file written to the output directory
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Artifact {
    pub kind: ArtifactKind,
    pub path: PathBuf,
    pub description: String,
}

/// Values gathered by the pipeline for the report
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ReportContext {
    acquisition: Option<AcquisitionSummary>,
    profile: Option<Profile>,
    cleaning: Option<CleaningSummary>,
    terrain: Option<TerrainSummary>,
    #[serde(default)]
    artifacts: Vec<Artifact>,
}

impl ReportContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_acquisition(&mut self, summary: AcquisitionSummary) -> Result<()> {
        set_once(&mut self.acquisition, summary, "acquisition")
    }

    pub fn record_profile(&mut self, profile: Profile) -> Result<()> {
        set_once(&mut self.profile, profile, "profile")
    }

    pub fn record_cleaning(&mut self, summary: CleaningSummary) -> Result<()> {
        set_once(&mut self.cleaning, summary, "cleaning")
    }

    pub fn record_terrain(&mut self, summary: TerrainSummary) -> Result<()> {
        set_once(&mut self.terrain, summary, "terrain")
    }

    pub fn add_artifact(
        &mut self,
        kind: ArtifactKind,
        path: impl Into<PathBuf>,
        description: impl Into<String>,
    ) {
        self.artifacts.push(Artifact {
            kind,
            path: path.into(),
            description: description.into(),
        });
    }

    pub fn acquisition(&self) -> Option<&AcquisitionSummary> {
        self.acquisition.as_ref()
    }

    pub fn profile(&self) -> Option<&Profile> {
        self.profile.as_ref()
    }

    pub fn cleaning(&self) -> Option<&CleaningSummary> {
        self.cleaning.as_ref()
    }

    pub fn terrain(&self) -> Option<&TerrainSummary> {
        self.terrain.as_ref()
    }

    pub fn artifacts(&self) -> &[Artifact] {
        &self.artifacts
    }

    /// Whether every stage section has been recorded
    pub fn is_complete(&self) -> bool {
        self.acquisition.is_some()
            && self.profile.is_some()
            && self.cleaning.is_some()
            && self.terrain.is_some()
    }
}

fn set_once<T>(slot: &mut Option<T>, value: T, section: &str) -> Result<()> {
    if slot.is_some() {
        return Err(CaudataError::ReportSectionRecorded { section: section.to_string() });
    }
    *slot = Some(value);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn acquisition() -> AcquisitionSummary {
        AcquisitionSummary {
            taxon: TaxonQuery::default(),
            queried_names: TaxonQuery::default().names(),
            record_count: 12,
            distinct_names: ["Taricha sierrae".to_string()].into_iter().collect(),
            fetched_at: Utc::now(),
        }
    }

    #[test]
    fn test_sections_are_set_once() {
        let mut context = ReportContext::new();
        context.record_acquisition(acquisition()).unwrap();

        let second = context.record_acquisition(acquisition());
        assert!(matches!(
            second,
            Err(CaudataError::ReportSectionRecorded { ref section }) if section == "acquisition"
        ));
        assert_eq!(context.acquisition().unwrap().record_count, 12);
    }

    #[test]
    fn test_completeness() {
        let mut context = ReportContext::new();
        assert!(!context.is_complete());
        context.record_acquisition(acquisition()).unwrap();
        assert!(!context.is_complete());
        assert!(context.profile().is_none());
    }

    #[test]
    fn test_context_serializes() {
        let mut context = ReportContext::new();
        context.record_acquisition(acquisition()).unwrap();
        context.add_artifact(ArtifactKind::Map, "map.svg", "Occurrence map");

        let json = serde_json::to_string(&context).unwrap();
        assert!(json.contains("\"record_count\":12"));
        assert!(json.contains("\"kind\":\"map\""));

        let parsed: ReportContext = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, context);
    }
}
