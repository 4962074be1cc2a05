//! Port trait definitions
//!
//! These traits define the remote data sources the pipeline consumes.

pub mod sources;

pub use sources::{ElevationGrid, ElevationSource, OccurrenceSource};
