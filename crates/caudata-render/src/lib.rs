//! Rendering of every caudata artifact: profiling charts, the occurrence
//! map, the web map, the terrain panel, 3D terrain snapshots and the
//! Markdown report.

pub mod charts;
pub mod error;
pub mod imagery;
pub mod map;
pub mod palette;
pub mod panel;
pub mod report;
pub mod scene;
pub mod shade;
pub mod webmap;

pub use error::{RenderError, Result};
