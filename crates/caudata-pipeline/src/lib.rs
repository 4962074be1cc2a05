//! Caudata Pipeline - The five analysis stages
//!
//! Acquisition, profiling, cleaning, geospatial enrichment and visualization
//! run in order over the occurrence and elevation ports. Each stage records
//! its section of the [`ReportContext`](caudata_core::models::ReportContext)
//! exactly once; the report is rendered from that context alone.

pub mod artifacts;
pub mod config;
pub mod pipeline;
pub mod stage;

pub use config::PipelineConfig;
pub use pipeline::{CleanedStage, Pipeline, RunOutput, TerrainStage};
pub use stage::{Stage, StageObserver};
