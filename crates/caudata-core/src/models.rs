pub mod geometry;
pub mod occurrence;
pub mod raster;
pub mod report;
pub mod taxon;

pub use geometry::{BoundingBox, Crs, Geometry, RegionBoundary, CROP_EXTENT, MAP_VIEWPORT};
pub use occurrence::{
    BasisOfRecord, CleanRecord, CleanedTable, CoordinateFlags, FlaggedRecord, OccurrenceRecord,
    OccurrenceTable,
};
pub use raster::{Raster, RasterStats};
pub use report::{
    AcquisitionSummary, Artifact, ArtifactKind, CleaningSummary, ReportContext, TerrainSummary,
};
pub use taxon::TaxonQuery;
