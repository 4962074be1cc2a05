//! Writes every render artifact into a scratch directory

use caudata_core::models::{
    ArtifactKind, BasisOfRecord, BoundingBox, CleanRecord, CleanedTable, OccurrenceRecord,
    OccurrenceTable, Raster, ReportContext,
};
use caudata_core::processing::{profile, ProfileOptions};
use caudata_geo::terrain::{derive_terrain, Illumination};
use caudata_geo::{california, PointLayer};
use caudata_render::palette::YearScale;
use caudata_render::scene::{Camera, DrapedPoint, Scene};
use caudata_render::shade::{shaded_surface, HeightMap, Sun, Texture};
use caudata_render::{charts, map, panel, report, webmap};

fn occurrence_table() -> OccurrenceTable {
    let bases = [BasisOfRecord::HumanObservation, BasisOfRecord::PreservedSpecimen];
    OccurrenceTable::new(
        (0..24)
            .map(|i| OccurrenceRecord {
                key: Some(i),
                scientific_name: Some("Taricha sierrae".to_string()),
                year: Some(1950 + i as i32 * 3),
                month: Some((i % 12) as u8 + 1),
                latitude: Some(38.0 + i as f64 * 0.05),
                longitude: Some(-120.9 + i as f64 * 0.03),
                coordinate_uncertainty_m: Some(10.0 * (i + 1) as f64),
                elevation_m: (i % 3 == 0).then_some(500.0),
                basis_of_record: Some(bases[i as usize % 2].clone()),
                institution_code: Some("MVZ".to_string()),
                ..Default::default()
            })
            .collect(),
    )
}

fn cleaned() -> CleanedTable {
    CleanedTable::new(
        occurrence_table()
            .iter()
            .filter_map(caudata_core::processing::project_record)
            .collect::<Vec<CleanRecord>>(),
    )
}

/// Dome over the northern Sierra
fn elevation() -> Raster {
    let extent = BoundingBox::new(-121.5, 38.0, -119.5, 40.0);
    let (rows, cols) = (20, 20);
    let values = (0..rows * cols)
        .map(|i| {
            let (r, c) = ((i / cols) as f32 - 9.5, (i % cols) as f32 - 9.5);
            Some(2500.0 - 20.0 * (r * r + c * c))
        })
        .collect();
    Raster::new(extent, rows, cols, values).unwrap()
}

#[test]
fn test_profile_charts_are_svg() {
    let dir = tempfile::tempdir().unwrap();
    let profile = profile(&occurrence_table(), &ProfileOptions::default());
    let written = charts::write_profile_charts(&profile, dir.path()).unwrap();

    let files: Vec<&str> = written.iter().map(|(file, _)| *file).collect();
    assert_eq!(files, charts::PROFILE_CHART_FILES);
    for (file, _) in written {
        let content = std::fs::read_to_string(dir.path().join(file)).unwrap();
        assert!(content.contains("<svg"), "{} is not an SVG", file);
    }
}

#[test]
fn test_map_and_web_map() {
    let dir = tempfile::tempdir().unwrap();
    let table = cleaned();
    let layer = PointLayer::from_cleaned(&table);

    let map_path = dir.path().join("map.svg");
    map::occurrence_map(&california(), &layer, &YearScale::for_table(&table), &map_path).unwrap();
    assert!(std::fs::read_to_string(&map_path).unwrap().contains("<svg"));

    let html = dir.path().join("webmap.html");
    let overlay = dir.path().join("elevation.png");
    webmap::write_web_map(&layer, &elevation(), &html, &overlay).unwrap();
    assert!(std::fs::read_to_string(&html).unwrap().contains("elevation.png"));
    assert_eq!(image::open(&overlay).unwrap().width(), 20);
}

#[test]
fn test_terrain_panel_and_snapshots() {
    let dir = tempfile::tempdir().unwrap();
    let elevation = elevation();
    let layers = derive_terrain(&elevation, &Illumination::default()).unwrap();

    let panel_path = dir.path().join("terrain_panel.png");
    panel::terrain_panel(&elevation, &layers, &panel_path).unwrap();
    assert!(image::open(&panel_path).is_ok());

    let colors = shaded_surface(&HeightMap::from_raster(&elevation), &Texture::default(), &Sun::default());
    let scene = Scene::new(&elevation, colors)
        .unwrap()
        .with_points([DrapedPoint { lon: -120.5, lat: 39.0 }]);

    for (file, camera) in [("overhead.png", Camera::overhead()), ("oblique.png", Camera::oblique())] {
        let path = dir.path().join(file);
        scene.snapshot(&camera, &path).unwrap();
        let image = image::open(&path).unwrap();
        assert_eq!((image.width(), image.height()), (camera.width, camera.height));
    }
}

#[test]
fn test_report_lists_artifacts() {
    let dir = tempfile::tempdir().unwrap();
    let mut ctx = ReportContext::new();
    ctx.record_profile(profile(&occurrence_table(), &ProfileOptions::default())).unwrap();
    ctx.add_artifact(ArtifactKind::Map, "map.svg", "Occurrences by year");

    let (report_path, _) = report::write_report(&ctx, dir.path()).unwrap();
    let markdown = std::fs::read_to_string(report_path).unwrap();
    assert!(markdown.contains("![Occurrences by year](map.svg)"));
    assert!(markdown.contains("## Exploratory analysis"));
    assert!(!markdown.contains("## Terrain"));
}
