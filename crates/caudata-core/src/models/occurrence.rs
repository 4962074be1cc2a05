//! Occurrence records as delivered by the acquisition stage and as retained
//! by the cleaning stage.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

/// How an occurrence was recorded.
///
/// Known GBIF vocabulary values map to dedicated variants; anything else is
/// kept verbatim in [`BasisOfRecord::Other`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum BasisOfRecord {
    HumanObservation,
    PreservedSpecimen,
    MachineObservation,
    MaterialSample,
    LivingSpecimen,
    FossilSpecimen,
    MaterialCitation,
    Observation,
    Occurrence,
    Other(String),
}

impl BasisOfRecord {
    /// Parse a GBIF `basisOfRecord` value
    pub fn from_gbif(value: &str) -> Self {
        match value.trim().to_ascii_uppercase().as_str() {
            "HUMAN_OBSERVATION" => BasisOfRecord::HumanObservation,
            "PRESERVED_SPECIMEN" => BasisOfRecord::PreservedSpecimen,
            "MACHINE_OBSERVATION" => BasisOfRecord::MachineObservation,
            "MATERIAL_SAMPLE" => BasisOfRecord::MaterialSample,
            "LIVING_SPECIMEN" => BasisOfRecord::LivingSpecimen,
            "FOSSIL_SPECIMEN" => BasisOfRecord::FossilSpecimen,
            "MATERIAL_CITATION" => BasisOfRecord::MaterialCitation,
            "OBSERVATION" => BasisOfRecord::Observation,
            "OCCURRENCE" => BasisOfRecord::Occurrence,
            _ => BasisOfRecord::Other(value.trim().to_string()),
        }
    }

    /// The GBIF vocabulary value
    pub fn as_gbif(&self) -> &str {
        match self {
            BasisOfRecord::HumanObservation => "HUMAN_OBSERVATION",
            BasisOfRecord::PreservedSpecimen => "PRESERVED_SPECIMEN",
            BasisOfRecord::MachineObservation => "MACHINE_OBSERVATION",
            BasisOfRecord::MaterialSample => "MATERIAL_SAMPLE",
            BasisOfRecord::LivingSpecimen => "LIVING_SPECIMEN",
            BasisOfRecord::FossilSpecimen => "FOSSIL_SPECIMEN",
            BasisOfRecord::MaterialCitation => "MATERIAL_CITATION",
            BasisOfRecord::Observation => "OBSERVATION",
            BasisOfRecord::Occurrence => "OCCURRENCE",
            BasisOfRecord::Other(value) => value,
        }
    }

    /// Human-readable label used in tables and charts
    pub fn label(&self) -> String {
        match self {
            BasisOfRecord::Other(value) => value.clone(),
            known => {
                let lower = known.as_gbif().to_ascii_lowercase().replace('_', " ");
                let mut chars = lower.chars();
                match chars.next() {
                    Some(first) => first.to_uppercase().chain(chars).collect(),
                    None => String::new(),
                }
            }
        }
    }
}

impl From<String> for BasisOfRecord {
    fn from(value: String) -> Self {
        BasisOfRecord::from_gbif(&value)
    }
}

impl From<BasisOfRecord> for String {
    fn from(value: BasisOfRecord) -> Self {
        value.as_gbif().to_string()
    }
}

impl fmt::Display for BasisOfRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_gbif())
    }
}

/// One observed specimen or sighting, every attribute nullable.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OccurrenceRecord {
    /// GBIF occurrence key
    pub key: Option<u64>,
    pub scientific_name: Option<String>,
    pub year: Option<i32>,
    /// Month of observation, 1-12
    pub month: Option<u8>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub coordinate_uncertainty_m: Option<f64>,
    /// Elevation as interpreted by the publisher
    pub elevation_m: Option<f64>,
    /// Elevation parsed from the free-text verbatim field
    pub verbatim_elevation_m: Option<f64>,
    pub basis_of_record: Option<BasisOfRecord>,
    pub institution_code: Option<String>,

    /// Payload fields outside the schema, kept as delivered
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub extra: BTreeMap<String, serde_json::Value>,
}

impl OccurrenceRecord {
    /// Whether either elevation field carries a value
    pub fn has_elevation(&self) -> bool {
        self.elevation_m.is_some() || self.verbatim_elevation_m.is_some()
    }
}

/// The raw occurrence table produced by acquisition
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OccurrenceTable {
    pub records: Vec<OccurrenceRecord>,
}

impl OccurrenceTable {
    pub fn new(records: Vec<OccurrenceRecord>) -> Self {
        Self { records }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &OccurrenceRecord> {
        self.records.iter()
    }

    /// Distinct non-null scientific names, sorted
    pub fn distinct_names(&self) -> BTreeSet<String> {
        self.records.iter().filter_map(|r| r.scientific_name.clone()).collect()
    }

    /// Append the records of another table
    pub fn extend(&mut self, other: OccurrenceTable) {
        self.records.extend(other.records);
    }
}

/// A record that survived projection: every field is present.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CleanRecord {
    pub name: String,
    pub year: i32,
    pub longitude: f64,
    pub latitude: f64,
    pub coordinate_uncertainty_m: f64,
    pub basis_of_record: BasisOfRecord,
}

/// Outcome flags of the coordinate-validation battery.
///
/// Every flag is `true` when the record passed that test.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CoordinateFlags {
    pub valid_range: bool,
    pub equal: bool,
    pub zero: bool,
    pub capital: bool,
    pub centroid: bool,
    pub institution: bool,
    pub gbif_headquarters: bool,
    pub sea: bool,
    pub duplicate: bool,
    pub outlier: bool,
}

impl Default for CoordinateFlags {
    fn default() -> Self {
        Self {
            valid_range: true,
            equal: true,
            zero: true,
            capital: true,
            centroid: true,
            institution: true,
            gbif_headquarters: true,
            sea: true,
            duplicate: true,
            outlier: true,
        }
    }
}

impl CoordinateFlags {
    /// Names of the individual tests, in evaluation order
    pub const TESTS: [&'static str; 10] = [
        "valid_range",
        "equal",
        "zero",
        "capital",
        "centroid",
        "institution",
        "gbif_headquarters",
        "sea",
        "duplicate",
        "outlier",
    ];

    /// The combined validity flag
    pub fn summary(&self) -> bool {
        self.as_array().iter().all(|(_, passed)| *passed)
    }

    /// Test names paired with their outcome
    pub fn as_array(&self) -> [(&'static str, bool); 10] {
        [
            ("valid_range", self.valid_range),
            ("equal", self.equal),
            ("zero", self.zero),
            ("capital", self.capital),
            ("centroid", self.centroid),
            ("institution", self.institution),
            ("gbif_headquarters", self.gbif_headquarters),
            ("sea", self.sea),
            ("duplicate", self.duplicate),
            ("outlier", self.outlier),
        ]
    }

    /// Names of the tests this record failed
    pub fn failed_tests(&self) -> Vec<&'static str> {
        self.as_array().into_iter().filter(|(_, passed)| !passed).map(|(name, _)| name).collect()
    }
}

/// A projected record annotated with its validation flags
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlaggedRecord {
    pub record: CleanRecord,
    pub flags: CoordinateFlags,
}

/// Rows retained after cleaning
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CleanedTable {
    pub records: Vec<CleanRecord>,
}

impl CleanedTable {
    pub fn new(records: Vec<CleanRecord>) -> Self {
        Self { records }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &CleanRecord> {
        self.records.iter()
    }

    /// Mean observation year, `None` for an empty table
    pub fn mean_year(&self) -> Option<f64> {
        if self.records.is_empty() {
            return None;
        }
        let sum: f64 = self.records.iter().map(|r| r.year as f64).sum();
        Some(sum / self.records.len() as f64)
    }
}
