//! End-to-end runs over in-memory occurrence and elevation sources

use std::sync::Mutex;

use async_trait::async_trait;
use caudata_core::error::{CaudataError, Result};
use caudata_core::models::{
    BasisOfRecord, BoundingBox, OccurrenceRecord, OccurrenceTable, Raster, ReportContext,
    TaxonQuery,
};
use caudata_core::ports::{ElevationGrid, ElevationSource, OccurrenceSource};
use caudata_pipeline::artifacts::run_files;
use caudata_pipeline::{Pipeline, PipelineConfig, Stage, StageObserver};

struct FakeOccurrences {
    table: OccurrenceTable,
    fail: bool,
}

#[async_trait]
impl OccurrenceSource for FakeOccurrences {
    async fn fetch(&self, query: &TaxonQuery) -> Result<OccurrenceTable> {
        if self.fail {
            return Err(CaudataError::SourceFetch {
                source_name: "fake".to_string(),
                query: format!("scientificName={} offset=0", query.binomial()),
                reason: "connection refused".to_string(),
            });
        }
        Ok(self.table.clone())
    }

    fn source_name(&self) -> &str {
        "fake"
    }
}

/// Elevation rising to the north-east over whatever extent is requested
#[derive(Default)]
struct FakeElevation {
    requests: Mutex<Vec<BoundingBox>>,
}

#[async_trait]
impl ElevationSource for FakeElevation {
    async fn fetch_elevation(&self, extent: &BoundingBox, resolution: f64) -> Result<ElevationGrid> {
        self.requests.lock().unwrap().push(*extent);

        let cols = (extent.width() / resolution).ceil() as usize;
        let rows = (extent.height() / resolution).ceil() as usize;
        let grid_extent = BoundingBox::new(
            extent.min_lon,
            extent.max_lat - rows as f64 * resolution,
            extent.min_lon + cols as f64 * resolution,
            extent.max_lat,
        );
        let mut raster = Raster::filled(grid_extent, rows, cols, None)?;
        for row in 0..rows {
            for col in 0..cols {
                let (lon, lat) = raster.cell_center(row, col);
                raster.set(row, col, Some(((lat - 32.0) * 250.0 + (lon + 125.0) * 40.0) as f32));
            }
        }
        Ok(ElevationGrid { raster, zoom: 6, tile_count: 4 })
    }

    fn source_name(&self) -> &str {
        "fake terrain"
    }
}

struct UnreachableElevation;

#[async_trait]
impl ElevationSource for UnreachableElevation {
    async fn fetch_elevation(&self, _extent: &BoundingBox, _resolution: f64) -> Result<ElevationGrid> {
        Err(CaudataError::SourceFetch {
            source_name: "terrain".to_string(),
            query: "z=6".to_string(),
            reason: "timed out".to_string(),
        })
    }

    fn source_name(&self) -> &str {
        "unreachable terrain"
    }
}

/// Stage events as `started` / `finished` / `failed` entries
#[derive(Default)]
struct StageLog(Vec<(Stage, &'static str)>);

impl StageObserver for StageLog {
    fn stage_started(&mut self, stage: Stage) {
        self.0.push((stage, "started"));
    }

    fn stage_finished(&mut self, stage: Stage, outcome: std::result::Result<&str, &CaudataError>) {
        self.0.push((stage, if outcome.is_ok() { "finished" } else { "failed" }));
    }
}

fn record(key: u64, year: Option<i32>, lon: f64, lat: f64, uncertainty: f64) -> OccurrenceRecord {
    OccurrenceRecord {
        key: Some(key),
        scientific_name: Some("Taricha sierrae".to_string()),
        year,
        month: Some((key % 12) as u8 + 1),
        latitude: Some(lat),
        longitude: Some(lon),
        coordinate_uncertainty_m: Some(uncertainty),
        elevation_m: (key % 2 == 0).then_some(600.0),
        basis_of_record: Some(if key % 2 == 0 {
            BasisOfRecord::PreservedSpecimen
        } else {
            BasisOfRecord::HumanObservation
        }),
        institution_code: Some("CAS".to_string()),
        ..Default::default()
    }
}

/// Eight valid Sierra records, one without a year, one duplicate
fn occurrences() -> OccurrenceTable {
    let mut records: Vec<OccurrenceRecord> = (0..8)
        .map(|i| record(i, Some(1960 + 7 * i as i32), -120.9 + 0.1 * i as f64, 38.6 + 0.1 * i as f64, 20.0 + 10.0 * i as f64))
        .collect();
    records.push(record(8, None, -120.55, 38.75, 15.0));
    records.push(record(9, Some(2020), -120.9, 38.6, 500.0));
    OccurrenceTable::new(records)
}

fn config(dir: &std::path::Path) -> PipelineConfig {
    PipelineConfig { grid_resolution: 0.25, ..PipelineConfig::new(TaxonQuery::default(), dir) }
}

#[tokio::test]
async fn test_full_run_writes_every_artifact() {
    let dir = tempfile::tempdir().unwrap();
    let pipeline = Pipeline::new(
        FakeOccurrences { table: occurrences(), fail: false },
        FakeElevation::default(),
        config(dir.path()),
    );

    let output = pipeline.run().await.unwrap();
    let ctx = &output.context;
    assert!(ctx.is_complete());

    let acquisition = ctx.acquisition().unwrap();
    assert_eq!(acquisition.record_count, 10);
    assert_eq!(acquisition.queried_names, vec!["Taricha sierrae", "Taricha torosa sierrae"]);

    let cleaning = ctx.cleaning().unwrap();
    assert_eq!(cleaning.input_records, 10);
    assert_eq!(cleaning.dropped_incomplete, 1);
    assert_eq!(cleaning.failures_for("duplicate"), 1);
    assert_eq!(cleaning.retained_records, 8);

    let terrain = ctx.terrain().unwrap();
    assert_eq!(terrain.boundary_name, "California");
    assert!(terrain.masked_cells > 0);
    assert!(terrain.extent.is_within(&caudata_core::models::CROP_EXTENT));

    for file in [
        "report.md",
        "summary.json",
        "occurrences.geojson",
        "map.svg",
        "webmap.html",
        "elevation.png",
        "terrain_panel.png",
        "render_overhead.png",
        "render_oblique.png",
        "month_histogram.svg",
        "year_histogram.svg",
        "elevation_completeness.svg",
        "uncertainty_histogram.svg",
        "uncertainty_by_year.svg",
    ] {
        assert!(dir.path().join(file).exists(), "{} was not written", file);
    }

    for file in run_files() {
        assert!(dir.path().join(file).exists(), "{} was not written", file);
    }

    let summary = std::fs::read_to_string(&output.summary_path).unwrap();
    assert_eq!(summary, serde_json::to_string_pretty(ctx).unwrap());

    let report = std::fs::read_to_string(&output.report_path).unwrap();
    assert!(report.contains("leaving 8 records"));
}

#[tokio::test]
async fn test_elevation_requested_over_boundary_extent() {
    let dir = tempfile::tempdir().unwrap();
    let pipeline = Pipeline::new(
        FakeOccurrences { table: occurrences(), fail: false },
        FakeElevation::default(),
        config(dir.path()),
    );

    let mut ctx = ReportContext::new();
    pipeline.enrich(&mut ctx).await.unwrap();

    let requests = pipeline_requests(&pipeline);
    assert_eq!(requests.len(), 1);
    assert!((requests[0].min_lon + 124.41).abs() < 0.5);
    assert!((requests[0].max_lat - 42.0).abs() < 0.1);
}

fn pipeline_requests(pipeline: &Pipeline<FakeOccurrences, FakeElevation>) -> Vec<BoundingBox> {
    pipeline.elevation_source().requests.lock().unwrap().clone()
}

#[tokio::test]
async fn test_fetch_failure_halts_run() {
    let dir = tempfile::tempdir().unwrap();
    let pipeline = Pipeline::new(
        FakeOccurrences { table: OccurrenceTable::default(), fail: true },
        FakeElevation::default(),
        config(dir.path()),
    );

    match pipeline.run().await {
        Err(CaudataError::SourceFetch { query, .. }) => assert!(query.contains("Taricha sierrae")),
        other => panic!("Expected SourceFetch, got {:?}", other.map(|o| o.report_path)),
    }
    assert!(!dir.path().join("report.md").exists());
}

#[tokio::test]
async fn test_empty_acquisition_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    let pipeline = Pipeline::new(
        FakeOccurrences { table: OccurrenceTable::default(), fail: false },
        FakeElevation::default(),
        config(dir.path()),
    );

    let mut ctx = ReportContext::new();
    let result = pipeline.acquire(&mut ctx).await;
    assert!(matches!(result, Err(CaudataError::EmptyTable { ref stage }) if stage == "acquisition"));
    assert!(ctx.acquisition().is_none());
}

#[tokio::test]
async fn test_stage_sections_are_recorded_once() {
    let dir = tempfile::tempdir().unwrap();
    let pipeline = Pipeline::new(
        FakeOccurrences { table: occurrences(), fail: false },
        FakeElevation::default(),
        config(dir.path()),
    );

    let mut ctx = ReportContext::new();
    let table = pipeline.acquire(&mut ctx).await.unwrap();
    pipeline.profile(&table, &mut ctx).unwrap();
    assert!(matches!(
        pipeline.profile(&table, &mut ctx),
        Err(CaudataError::ReportSectionRecorded { .. })
    ));
}

#[tokio::test]
async fn test_observer_sees_every_stage_in_order() {
    let dir = tempfile::tempdir().unwrap();
    let pipeline = Pipeline::new(
        FakeOccurrences { table: occurrences(), fail: false },
        FakeElevation::default(),
        config(dir.path()),
    );

    let mut log = StageLog::default();
    pipeline.run_with(&mut log).await.unwrap();

    let expected: Vec<(Stage, &str)> =
        Stage::ALL.iter().flat_map(|s| [(*s, "started"), (*s, "finished")]).collect();
    assert_eq!(log.0, expected);
}

#[tokio::test]
async fn test_observer_stops_at_failed_stage() {
    let dir = tempfile::tempdir().unwrap();
    let pipeline = Pipeline::new(
        FakeOccurrences { table: occurrences(), fail: false },
        UnreachableElevation,
        config(dir.path()),
    );

    let mut log = StageLog::default();
    let result = pipeline.run_with(&mut log).await;
    assert!(matches!(result, Err(CaudataError::SourceFetch { .. })));

    assert_eq!(log.0.last(), Some(&(Stage::Enrich, "failed")));
    assert!(!log.0.iter().any(|(stage, _)| matches!(stage, Stage::Visualize | Stage::Report)));
    assert!(!dir.path().join("report.md").exists());
}
