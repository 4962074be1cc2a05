use std::path::PathBuf;

use caudata_core::config::LayeredConfig;
use caudata_core::error::Result;
use caudata_core::models::{BoundingBox, RegionBoundary, TaxonQuery, CROP_EXTENT};
use caudata_core::processing::ProfileOptions;
use caudata_geo::boundary::{california, from_geojson_file};
use caudata_geo::terrain::Illumination;
use caudata_geo::validation::ValidationConfig;

/// Resolved settings of one pipeline run
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    pub taxon: TaxonQuery,
    /// Elevation grid resolution in degrees
    pub grid_resolution: f64,
    pub output_dir: PathBuf,
    pub boundary: RegionBoundary,
    /// Fixed crop box applied to the elevation grid before masking
    pub crop_extent: BoundingBox,
    pub illumination: Illumination,
    pub validation: ValidationConfig,
    pub profile: ProfileOptions,
}

impl PipelineConfig {
    /// Defaults with the built-in California boundary
    pub fn new(taxon: TaxonQuery, output_dir: impl Into<PathBuf>) -> Self {
        Self {
            taxon,
            grid_resolution: 0.02,
            output_dir: output_dir.into(),
            boundary: california(),
            crop_extent: CROP_EXTENT,
            illumination: Illumination::default(),
            validation: ValidationConfig::default(),
            profile: ProfileOptions::default(),
        }
    }

    /// Resolve a layered configuration, loading the boundary file if one is set
    pub fn from_layered(config: &LayeredConfig) -> Result<Self> {
        let boundary = match &config.boundary_file.value {
            Some(path) => from_geojson_file(path)?,
            None => california(),
        };

        Ok(Self {
            grid_resolution: config.grid_resolution.value,
            boundary,
            ..Self::new(config.taxon(), config.output_dir.value.clone())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_follow_layered_config() {
        let layered = LayeredConfig::with_defaults();
        let config = PipelineConfig::from_layered(&layered).unwrap();

        assert_eq!(config.taxon, TaxonQuery::default());
        assert_eq!(config.grid_resolution, 0.02);
        assert_eq!(config.output_dir, PathBuf::from("output"));
        assert_eq!(config.boundary.name, california().name);
        assert_eq!(config.crop_extent, CROP_EXTENT);
    }

    #[test]
    fn test_missing_boundary_file_fails() {
        let mut layered = LayeredConfig::with_defaults();
        layered.boundary_file.value = Some(PathBuf::from("/nonexistent/boundary.geojson"));
        assert!(PipelineConfig::from_layered(&layered).is_err());
    }
}
