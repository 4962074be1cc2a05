//! Clean command implementation

use super::{fetch_action, write_actions, CommandContext};
use crate::dry_run::display_planned_actions;
use crate::output_types::TestFailureLine;
use crate::progress::StageProgress;
use crate::storage::Storage;
use anyhow::{Context, Result};
use caudata_core::models::ReportContext;
use caudata_pipeline::artifacts::{OutputDir, OCCURRENCES_GEOJSON};

pub async fn execute(ctx: &CommandContext) -> Result<()> {
    let config = &ctx.config;

    if ctx.dry_run {
        let mut actions = vec![fetch_action(ctx)];
        actions.extend(write_actions(ctx, &[OCCURRENCES_GEOJSON]));
        display_planned_actions(&ctx.output, &actions);
        return Ok(());
    }

    let pipeline = Storage::new(config, ctx.no_cache)?.into_pipeline(config)?;
    let mut report = ReportContext::new();
    let mut progress = StageProgress::new(ctx.output.is_json());

    progress.start("Fetching occurrence records");
    let table = progress.complete(pipeline.acquire(&mut report).await, |t| {
        format!("Fetched {} occurrence records", t.len())
    })?;

    progress.start("Cleaning coordinates");
    let cleaned = progress.complete(pipeline.clean(&table, &mut report), |c| {
        format!("Retained {} records", c.table.len())
    })?;

    let out = OutputDir::create(&config.output_dir.value).context("Failed to create output directory")?;
    let path = out.write_geojson(&cleaned.layer, &mut report)?;

    let summary = report.cleaning().context("Cleaning summary missing")?;
    if ctx.output.is_json() {
        ctx.output.result(summary)?;
        return Ok(());
    }

    ctx.output.success(format!("Wrote {}", path.display()));
    ctx.output.kv("Input records", summary.input_records);
    ctx.output.kv("Dropped for missing values", summary.dropped_incomplete);
    ctx.output.kv("Flagged by validation", summary.flagged_records);
    ctx.output.kv("Retained", summary.retained_records);
    ctx.output.kv("Validation passes", summary.passes);
    if let Some(mean) = summary.mean_year {
        ctx.output.kv("Mean year", format!("{:.1}", mean));
    }

    ctx.output.section("Validation tests");
    ctx.output.table(
        summary
            .test_failures
            .iter()
            .map(|(test, failures)| TestFailureLine { test: test.clone(), failures: *failures })
            .collect(),
    );

    Ok(())
}
