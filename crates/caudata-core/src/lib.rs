//! Caudata Core - Domain models, configuration, and stage-independent processing
//!
//! This crate contains the occurrence schema, the report context, the port
//! definitions for remote data sources, and the profiling and projection steps
//! that need no geometry.

pub mod config;
pub mod error;
pub mod models;
pub mod ports;
pub mod processing;

pub use error::{CaudataError, Result};
