//! Error types for Caudata

use thiserror::Error;

#[derive(Debug, Error)]
pub enum CaudataError {
    // Source errors
    #[error("Failed to fetch from {source_name} ({query}): {reason}")]
    SourceFetch {
        source_name: String,
        query: String,
        reason: String,
    },

    #[error("Unexpected {source_name} payload: {reason}")]
    Schema { source_name: String, reason: String },

    // Stage errors
    #[error("No records left after {stage}")]
    EmptyTable { stage: String },

    #[error("Empty extent during {operation}: {reason}")]
    EmptyExtent { operation: String, reason: String },

    #[error("Invalid geometry at feature {feature_id}: {reason}")]
    InvalidGeometry { feature_id: String, reason: String },

    #[error("Raster shape mismatch: expected {expected} cells, found {found}")]
    RasterShape { expected: usize, found: usize },

    #[error("Report section '{section}' was already recorded")]
    ReportSectionRecorded { section: String },

    #[error("Render failed for {artifact}: {reason}")]
    Render { artifact: String, reason: String },

    // Cache errors
    #[error("Cache error: {0}")]
    Cache(String),

    // Configuration errors
    #[error("Missing required configuration: {key}")]
    ConfigMissing { key: String },

    #[error("Invalid configuration value for {key}: {reason}")]
    ConfigInvalid { key: String, reason: String },

    // IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // Serialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl From<serde_json::Error> for CaudataError {
    fn from(err: serde_json::Error) -> Self {
        CaudataError::Serialization(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, CaudataError>;
