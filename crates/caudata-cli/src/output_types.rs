use caudata_core::config::ConfigSource;
use caudata_core::models::{Artifact, ArtifactKind};
use caudata_core::processing::profile::{CompletenessRow, FrequencyRow};
use serde::Serialize;
use std::path::PathBuf;
use tabled::Tabled;

/// One row of a frequency table
#[derive(Debug, Serialize, Tabled)]
pub struct FrequencyLine {
    #[tabled(rename = "Value")]
    pub value: String,
    #[tabled(rename = "Records")]
    pub records: usize,
    #[tabled(rename = "Percent")]
    pub percent: f64,
}

impl From<&FrequencyRow> for FrequencyLine {
    fn from(row: &FrequencyRow) -> Self {
        Self { value: row.label.clone(), records: row.count, percent: row.percent }
    }
}

/// Elevation completeness of one basis of record
#[derive(Debug, Serialize, Tabled)]
pub struct CompletenessLine {
    #[tabled(rename = "Basis of record")]
    pub basis: String,
    #[tabled(rename = "Records")]
    pub records: usize,
    #[tabled(rename = "With elevation")]
    pub with_elevation: usize,
    #[tabled(rename = "%")]
    pub percent_with: f64,
}

impl From<&CompletenessRow> for CompletenessLine {
    fn from(row: &CompletenessRow) -> Self {
        Self {
            basis: row.basis.label(),
            records: row.total,
            with_elevation: row.with_elevation,
            percent_with: row.percent_with,
        }
    }
}

/// Failures of one validation test
#[derive(Debug, Serialize, Tabled)]
pub struct TestFailureLine {
    #[tabled(rename = "Test")]
    pub test: String,
    #[tabled(rename = "Records failing")]
    pub failures: usize,
}

/// One effective configuration value
#[derive(Debug, Serialize, Tabled)]
pub struct ConfigLine {
    #[tabled(rename = "Key")]
    pub key: String,
    #[tabled(rename = "Value")]
    pub value: String,
    #[tabled(rename = "Source")]
    pub source: String,
}

impl ConfigLine {
    pub fn new(key: String, value: String, source: ConfigSource) -> Self {
        Self { key, value, source: format!("{:?}", source) }
    }
}

/// A written file
#[derive(Debug, Serialize, Tabled)]
pub struct ArtifactLine {
    #[tabled(rename = "Kind")]
    pub kind: String,
    #[tabled(rename = "File")]
    pub file: String,
    #[tabled(rename = "Description")]
    pub description: String,
}

impl From<&Artifact> for ArtifactLine {
    fn from(artifact: &Artifact) -> Self {
        let kind = match artifact.kind {
            ArtifactKind::Chart => "chart",
            ArtifactKind::Map => "map",
            ArtifactKind::WebMap => "web map",
            ArtifactKind::GeoJson => "geojson",
            ArtifactKind::Raster => "raster",
            ArtifactKind::Render => "render",
            ArtifactKind::Report => "report",
            ArtifactKind::Data => "data",
        };
        Self {
            kind: kind.to_string(),
            file: artifact.path.display().to_string(),
            description: artifact.description.clone(),
        }
    }
}

/// Output for the run command
#[derive(Debug, Serialize)]
pub struct RunOutput {
    pub output_dir: PathBuf,
    pub report: PathBuf,
    pub summary: PathBuf,
    pub retained_records: Option<usize>,
    pub artifacts: Vec<ArtifactLine>,
}

/// Output for cache status
#[derive(Debug, Serialize)]
pub struct CacheStatusOutput {
    pub root: PathBuf,
    pub entries: usize,
    pub bytes: u64,
}

/// Output for cache clear
#[derive(Debug, Serialize)]
pub struct CacheClearOutput {
    pub root: PathBuf,
    pub removed: usize,
}
