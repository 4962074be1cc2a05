//! Caudata Geo - Spatial predicates, coordinate validation, and terrain
//!
//! This crate turns cleaned occurrence records into a point layer, validates
//! coordinates against reference gazetteers, and derives terrain layers from
//! an elevation raster clipped to a region boundary.

pub mod boundary;
pub mod index;
pub mod layer;
pub mod models;
pub mod raster;
pub mod reference;
pub mod spatial;
pub mod terrain;
pub mod transform;
pub mod validation;

pub use boundary::{california, BoundaryMask};
pub use layer::{PointFeature, PointLayer};
pub use validation::{clean_occurrences, CleaningOutcome, CoordinateValidator};
