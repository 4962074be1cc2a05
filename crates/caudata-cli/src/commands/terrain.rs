//! Terrain command implementation

use super::{tiles_action, write_actions, CommandContext};
use crate::dry_run::display_planned_actions;
use crate::progress::StageProgress;
use crate::storage::Storage;
use anyhow::{Context, Result};
use caudata_core::models::ReportContext;
use caudata_pipeline::artifacts::{OutputDir, ELEVATION_OVERLAY, TERRAIN_PANEL};

pub async fn execute(ctx: &CommandContext) -> Result<()> {
    let config = &ctx.config;

    if ctx.dry_run {
        let mut actions = vec![tiles_action(ctx)];
        actions.extend(write_actions(ctx, &[ELEVATION_OVERLAY, TERRAIN_PANEL]));
        display_planned_actions(&ctx.output, &actions);
        return Ok(());
    }

    let pipeline = Storage::new(config, ctx.no_cache)?.into_pipeline(config)?;
    let mut report = ReportContext::new();
    let mut progress = StageProgress::new(ctx.output.is_json());

    progress.start("Fetching elevation and deriving terrain");
    let terrain = progress.complete(pipeline.enrich(&mut report).await, |t| {
        format!("Derived terrain on a {}x{} grid", t.elevation.rows(), t.elevation.cols())
    })?;

    let out = OutputDir::create(&config.output_dir.value).context("Failed to create output directory")?;
    out.write_elevation(&terrain.elevation, &mut report)?;
    out.write_terrain_panel(&terrain.elevation, &terrain.layers, &mut report)?;

    let summary = report.terrain().context("Terrain summary missing")?;
    if ctx.output.is_json() {
        ctx.output.result(summary)?;
        return Ok(());
    }

    ctx.output.success(format!("Wrote terrain layers to {}", out.root().display()));
    ctx.output.kv("Boundary", &summary.boundary_name);
    ctx.output.kv("Tiles", format!("{} at zoom {}", summary.tile_count, summary.zoom));
    ctx.output.kv("Grid", format!("{} x {} cells at {} deg", summary.rows, summary.cols, summary.resolution));
    ctx.output.kv("Cells outside boundary", summary.masked_cells);
    if let Some(stats) = &summary.elevation {
        ctx.output.kv("Elevation", format!("{:.0} to {:.0} m (mean {:.0} m)", stats.min, stats.max, stats.mean));
    }
    if let Some(stats) = &summary.slope {
        ctx.output.kv("Slope", format!("mean {:.1} deg, max {:.1} deg", stats.mean, stats.max));
    }

    Ok(())
}
