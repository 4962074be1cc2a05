//! Files written into the output directory.
//!
//! Every writer records what it wrote in the report context under a path
//! relative to the output directory.

use std::path::{Path, PathBuf};

use caudata_core::error::Result;
use caudata_core::models::{
    ArtifactKind, CleanedTable, OccurrenceTable, Raster, RegionBoundary, ReportContext,
};
use caudata_core::processing::Profile;
use caudata_geo::terrain::TerrainLayers;
use caudata_geo::PointLayer;
use caudata_render::palette::YearScale;
use caudata_render::imagery::save_raster_png;
use caudata_render::palette::TERRAIN;
use caudata_render::scene::{Camera, DrapedPoint, Scene};
use caudata_render::shade::{shaded_surface, HeightMap, Sun, Texture};
use caudata_render::{charts, map, panel, report, webmap};

pub const RAW_OCCURRENCES: &str = "occurrences_raw.json";
pub const OCCURRENCES_GEOJSON: &str = "occurrences.geojson";
pub const MAP: &str = "map.svg";
pub const WEB_MAP: &str = "webmap.html";
pub const ELEVATION_OVERLAY: &str = "elevation.png";
pub const TERRAIN_PANEL: &str = "terrain_panel.png";
pub const RENDER_OVERHEAD: &str = "render_overhead.png";
pub const RENDER_OBLIQUE: &str = "render_oblique.png";

/// Every file a full run writes, in writing order
pub fn run_files() -> Vec<&'static str> {
    let mut files = charts::PROFILE_CHART_FILES.to_vec();
    files.extend([
        OCCURRENCES_GEOJSON,
        MAP,
        WEB_MAP,
        ELEVATION_OVERLAY,
        TERRAIN_PANEL,
        RENDER_OVERHEAD,
        RENDER_OBLIQUE,
        report::REPORT_FILE,
        report::SUMMARY_FILE,
    ]);
    files
}

/// Output directory of a run
#[derive(Debug, Clone)]
pub struct OutputDir {
    root: PathBuf,
}

impl OutputDir {
    /// Create the directory if needed
    pub fn create(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        std::fs::create_dir_all(&root)?;
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn path(&self, file: &str) -> PathBuf {
        self.root.join(file)
    }

    /// The raw table as JSON
    pub fn write_raw_table(&self, table: &OccurrenceTable, ctx: &mut ReportContext) -> Result<PathBuf> {
        let path = self.path(RAW_OCCURRENCES);
        std::fs::write(&path, serde_json::to_string_pretty(table)?)?;
        ctx.add_artifact(ArtifactKind::Data, RAW_OCCURRENCES, "Raw occurrence records");
        Ok(path)
    }

    pub fn write_geojson(&self, layer: &PointLayer, ctx: &mut ReportContext) -> Result<PathBuf> {
        let path = self.path(OCCURRENCES_GEOJSON);
        std::fs::write(&path, layer.to_geojson_string()?)?;
        ctx.add_artifact(ArtifactKind::GeoJson, OCCURRENCES_GEOJSON, "Cleaned occurrences as GeoJSON");
        Ok(path)
    }

    pub fn write_profile_charts(&self, profile: &Profile, ctx: &mut ReportContext) -> Result<()> {
        for (file, description) in charts::write_profile_charts(profile, &self.root)? {
            ctx.add_artifact(ArtifactKind::Chart, file, description);
        }
        Ok(())
    }

    /// `map.svg`, colored by year around the cleaned table's mean year
    pub fn write_map(
        &self,
        boundary: &RegionBoundary,
        table: &CleanedTable,
        layer: &PointLayer,
        ctx: &mut ReportContext,
    ) -> Result<()> {
        map::occurrence_map(boundary, layer, &YearScale::for_table(table), &self.path(MAP))?;
        ctx.add_artifact(ArtifactKind::Map, MAP, "Occurrences by observation year and coordinate uncertainty");
        Ok(())
    }

    /// `webmap.html` with its `elevation.png` overlay
    pub fn write_web_map(&self, layer: &PointLayer, elevation: &Raster, ctx: &mut ReportContext) -> Result<()> {
        webmap::write_web_map(layer, elevation, &self.path(WEB_MAP), &self.path(ELEVATION_OVERLAY))?;
        ctx.add_artifact(ArtifactKind::Raster, ELEVATION_OVERLAY, "Masked elevation");
        ctx.add_artifact(ArtifactKind::WebMap, WEB_MAP, "Interactive occurrence map");
        Ok(())
    }

    /// `elevation.png` on its own, one pixel per cell
    pub fn write_elevation(&self, elevation: &Raster, ctx: &mut ReportContext) -> Result<PathBuf> {
        let path = self.path(ELEVATION_OVERLAY);
        save_raster_png(elevation, &TERRAIN, &path)?;
        ctx.add_artifact(ArtifactKind::Raster, ELEVATION_OVERLAY, "Masked elevation");
        Ok(path)
    }

    pub fn write_terrain_panel(
        &self,
        elevation: &Raster,
        layers: &TerrainLayers,
        ctx: &mut ReportContext,
    ) -> Result<()> {
        panel::terrain_panel(elevation, layers, &self.path(TERRAIN_PANEL))?;
        ctx.add_artifact(ArtifactKind::Raster, TERRAIN_PANEL, "Slope, aspect and hillshade");
        Ok(())
    }

    /// Overhead and oblique snapshots of the shaded terrain with draped points
    pub fn write_renders(&self, elevation: &Raster, layer: &PointLayer, ctx: &mut ReportContext) -> Result<()> {
        let colors = shaded_surface(&HeightMap::from_raster(elevation), &Texture::default(), &Sun::default());
        let points = layer.features.iter().map(|f| {
            let (lon, lat) = f.coordinates();
            DrapedPoint { lon, lat }
        });
        let scene = Scene::new(elevation, colors)?.with_points(points);

        for (file, camera, description) in [
            (RENDER_OVERHEAD, Camera::overhead(), "3D terrain, overhead view"),
            (RENDER_OBLIQUE, Camera::oblique(), "3D terrain, oblique view"),
        ] {
            scene.snapshot(&camera, &self.path(file))?;
            ctx.add_artifact(ArtifactKind::Render, file, description);
        }
        Ok(())
    }

    /// `report.md` and `summary.json`
    pub fn write_report(&self, ctx: &ReportContext) -> Result<(PathBuf, PathBuf)> {
        Ok(report::write_report(ctx, &self.root)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use caudata_core::models::{BasisOfRecord, CleanRecord};

    #[test]
    fn test_geojson_artifact_is_relative() {
        let dir = tempfile::tempdir().unwrap();
        let out = OutputDir::create(dir.path().join("nested/output")).unwrap();
        let table = CleanedTable::new(vec![CleanRecord {
            name: "Taricha sierrae".to_string(),
            year: 1999,
            longitude: -120.5,
            latitude: 38.9,
            coordinate_uncertainty_m: 30.0,
            basis_of_record: BasisOfRecord::HumanObservation,
        }]);
        let mut ctx = ReportContext::new();

        let path = out.write_geojson(&PointLayer::from_cleaned(&table), &mut ctx).unwrap();

        assert!(path.exists());
        assert_eq!(ctx.artifacts()[0].path, PathBuf::from(OCCURRENCES_GEOJSON));
        assert_eq!(ctx.artifacts()[0].kind, ArtifactKind::GeoJson);
    }

    #[test]
    fn test_run_files_include_profiling_charts() {
        let files = run_files();
        for chart in charts::PROFILE_CHART_FILES {
            assert!(files.contains(&chart), "{} missing", chart);
        }
        assert_eq!(files.last(), Some(&report::SUMMARY_FILE));
    }
}
