use std::path::PathBuf;

use caudata_core::error::{CaudataError, Result};
use caudata_core::models::{
    AcquisitionSummary, CleanedTable, CleaningSummary, FlaggedRecord, OccurrenceTable, Raster,
    ReportContext, TerrainSummary,
};
use caudata_core::ports::{ElevationSource, OccurrenceSource};
use caudata_core::processing::{profile, project_complete, Profile};
use caudata_geo::boundary::BoundaryMask;
use caudata_geo::raster::{crop, mask};
use caudata_geo::reference::ReferenceData;
use caudata_geo::terrain::{derive_terrain, TerrainLayers};
use caudata_geo::validation::{clean_occurrences, CoordinateValidator};
use caudata_geo::PointLayer;

use crate::artifacts::OutputDir;
use crate::config::PipelineConfig;
use crate::stage::{finish, Stage, StageObserver};

/// Output of the cleaning stage
#[derive(Debug, Clone)]
pub struct CleanedStage {
    pub table: CleanedTable,
    pub layer: PointLayer,
    /// Records removed by the validation battery
    pub removed: Vec<FlaggedRecord>,
}

/// Output of the geospatial enrichment stage
#[derive(Debug, Clone)]
pub struct TerrainStage {
    /// Cropped and masked elevation
    pub elevation: Raster,
    pub layers: TerrainLayers,
}

/// Result of a full run
#[derive(Debug, Clone)]
pub struct RunOutput {
    pub context: ReportContext,
    pub report_path: PathBuf,
    pub summary_path: PathBuf,
}

/// The five-stage occurrence pipeline
pub struct Pipeline<O, E>
where
    O: OccurrenceSource,
    E: ElevationSource,
{
    occurrences: O,
    elevation: E,
    config: PipelineConfig,
}

impl<O, E> Pipeline<O, E>
where
    O: OccurrenceSource,
    E: ElevationSource,
{
    pub fn new(occurrences: O, elevation: E, config: PipelineConfig) -> Self {
        Self { occurrences, elevation, config }
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    pub fn occurrence_source(&self) -> &O {
        &self.occurrences
    }

    pub fn elevation_source(&self) -> &E {
        &self.elevation
    }

    /// Stage 1: fetch the raw table
    pub async fn acquire(&self, ctx: &mut ReportContext) -> Result<OccurrenceTable> {
        let taxon = &self.config.taxon;
        tracing::info!(
            taxon = %taxon.binomial(),
            source = self.occurrences.source_name(),
            "Acquiring occurrence records"
        );

        let table = self.occurrences.fetch(taxon).await?;
        if table.is_empty() {
            return Err(CaudataError::EmptyTable { stage: "acquisition".to_string() });
        }

        ctx.record_acquisition(AcquisitionSummary {
            taxon: taxon.clone(),
            queried_names: taxon.names(),
            record_count: table.len(),
            distinct_names: table.distinct_names(),
            fetched_at: chrono::Utc::now(),
        })?;

        tracing::info!(records = table.len(), "Acquisition finished");
        Ok(table)
    }

    /// Stage 2: summarize the raw table without changing it
    pub fn profile(&self, table: &OccurrenceTable, ctx: &mut ReportContext) -> Result<Profile> {
        let profile = profile(table, &self.config.profile);
        ctx.record_profile(profile.clone())?;
        tracing::info!(records = profile.total_records, "Profiling finished");
        Ok(profile)
    }

    /// Stage 3: project, drop incomplete rows and run the validation battery
    pub fn clean(&self, table: &OccurrenceTable, ctx: &mut ReportContext) -> Result<CleanedStage> {
        let projection = project_complete(table);
        let complete = projection.records.len();

        let validator = CoordinateValidator::new(ReferenceData::builtin(), self.config.validation);
        let outcome = clean_occurrences(projection.records, &validator);
        if outcome.retained.is_empty() {
            return Err(CaudataError::EmptyTable { stage: "cleaning".to_string() });
        }

        ctx.record_cleaning(CleaningSummary {
            input_records: table.len(),
            dropped_incomplete: projection.dropped,
            missing: projection.missing,
            levels: projection.levels.into_iter().collect(),
            test_failures: outcome.failures,
            flagged_records: complete - outcome.retained.len(),
            retained_records: outcome.retained.len(),
            passes: outcome.passes,
            mean_year: outcome.retained.mean_year(),
        })?;

        let layer = PointLayer::from_cleaned(&outcome.retained);
        Ok(CleanedStage { table: outcome.retained, layer, removed: outcome.removed })
    }

    /// Stage 4: fetch, crop and mask the elevation grid and derive terrain
    pub async fn enrich(&self, ctx: &mut ReportContext) -> Result<TerrainStage> {
        let boundary = BoundaryMask::new(&self.config.boundary)?;
        tracing::info!(
            boundary = boundary.name(),
            source = self.elevation.source_name(),
            "Fetching elevation"
        );

        let grid = self
            .elevation
            .fetch_elevation(&boundary.bounding_box(), self.config.grid_resolution)
            .await?;
        let cropped = crop(&grid.raster, &self.config.crop_extent)?;
        let (elevation, masked_cells) = mask(&cropped, &boundary)?;
        let layers = derive_terrain(&elevation, &self.config.illumination)?;

        ctx.record_terrain(TerrainSummary {
            boundary_name: boundary.name().to_string(),
            zoom: grid.zoom,
            tile_count: grid.tile_count,
            resolution: self.config.grid_resolution,
            extent: elevation.extent(),
            rows: elevation.rows(),
            cols: elevation.cols(),
            masked_cells,
            elevation: elevation.stats(),
            slope: layers.slope.stats(),
        })?;

        tracing::info!(
            rows = elevation.rows(),
            cols = elevation.cols(),
            valid = elevation.valid_count(),
            "Terrain enrichment finished"
        );
        Ok(TerrainStage { elevation, layers })
    }

    /// Stage 5: write every map, chart and render
    pub fn visualize(
        &self,
        out: &OutputDir,
        profile: &Profile,
        cleaned: &CleanedStage,
        terrain: &TerrainStage,
        ctx: &mut ReportContext,
    ) -> Result<()> {
        out.write_profile_charts(profile, ctx)?;
        out.write_geojson(&cleaned.layer, ctx)?;
        out.write_map(&self.config.boundary, &cleaned.table, &cleaned.layer, ctx)?;
        out.write_web_map(&cleaned.layer, &terrain.elevation, ctx)?;
        out.write_terrain_panel(&terrain.elevation, &terrain.layers, ctx)?;
        out.write_renders(&terrain.elevation, &cleaned.layer, ctx)?;
        tracing::info!(artifacts = ctx.artifacts().len(), "Visualization finished");
        Ok(())
    }

    /// All five stages, then the report
    pub async fn run(&self) -> Result<RunOutput> {
        self.run_with(&mut ()).await
    }

    /// Like [`Pipeline::run`], notifying `observer` around every stage
    pub async fn run_with(&self, observer: &mut impl StageObserver) -> Result<RunOutput> {
        let out = OutputDir::create(&self.config.output_dir)?;
        let mut ctx = ReportContext::new();

        observer.stage_started(Stage::Acquire);
        let result = self.acquire(&mut ctx).await;
        let table = finish(observer, Stage::Acquire, result, |t| {
            format!("Fetched {} occurrence records", t.len())
        })?;

        observer.stage_started(Stage::Profile);
        let result = self.profile(&table, &mut ctx);
        let profile = finish(observer, Stage::Profile, result, |p| {
            format!("Profiled {} records", p.total_records)
        })?;

        observer.stage_started(Stage::Clean);
        let result = self.clean(&table, &mut ctx);
        let cleaned = finish(observer, Stage::Clean, result, |c| format!("Retained {} records", c.table.len()))?;

        observer.stage_started(Stage::Enrich);
        let result = self.enrich(&mut ctx).await;
        let terrain = finish(observer, Stage::Enrich, result, |t| {
            format!("Derived terrain on a {}x{} grid", t.elevation.rows(), t.elevation.cols())
        })?;

        observer.stage_started(Stage::Visualize);
        let result = self.visualize(&out, &profile, &cleaned, &terrain, &mut ctx);
        finish(observer, Stage::Visualize, result, |_| "Rendered maps and charts".to_string())?;

        observer.stage_started(Stage::Report);
        let result = out.write_report(&ctx);
        let (report_path, summary_path) = finish(observer, Stage::Report, result, |(report, _)| {
            format!("Wrote {}", report.display())
        })?;

        tracing::info!(report = %report_path.display(), "Pipeline finished");
        Ok(RunOutput { context: ctx, report_path, summary_path })
    }
}
