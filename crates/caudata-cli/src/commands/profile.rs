//! Profile command implementation

use super::{fetch_action, write_actions, CommandContext};
use crate::dry_run::display_planned_actions;
use crate::output_types::{CompletenessLine, FrequencyLine};
use crate::progress::StageProgress;
use crate::storage::Storage;
use anyhow::{Context, Result};
use caudata_core::models::{BasisOfRecord, ReportContext};
use caudata_pipeline::artifacts::OutputDir;
use caudata_render::charts::PROFILE_CHART_FILES;

pub async fn execute(ctx: &CommandContext) -> Result<()> {
    let config = &ctx.config;

    if ctx.dry_run {
        let mut actions = vec![fetch_action(ctx)];
        actions.extend(write_actions(ctx, &PROFILE_CHART_FILES));
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
    let profile = pipeline.profile(&table, &mut report)?;

    let out = OutputDir::create(&config.output_dir.value).context("Failed to create output directory")?;
    out.write_profile_charts(&profile, &mut report)?;

    if ctx.output.is_json() {
        ctx.output.result(&profile)?;
        return Ok(());
    }

    ctx.output.success(format!("Wrote {} charts to {}", PROFILE_CHART_FILES.len(), out.root().display()));
    ctx.output.kv("Records", profile.total_records);
    if let Some((first, last)) = profile.year_range {
        ctx.output.kv("Years", format!("{} to {}", first, last));
    }

    ctx.output.section("Scientific names");
    ctx.output.table(profile.name_counts.iter().map(FrequencyLine::from).collect());

    ctx.output.section("Basis of record");
    ctx.output.table(profile.basis_counts.iter().map(FrequencyLine::from).collect());
    ctx.output.kv("Institutions with preserved specimens", profile.specimen_institutions);

    ctx.output.section("Elevation data");
    ctx.output.table(profile.elevation_completeness.iter().map(CompletenessLine::from).collect());
    if let Some(pct) = profile.percent_with_elevation(&BasisOfRecord::PreservedSpecimen) {
        ctx.output.kv("Preserved specimens with elevation", format!("{:.2}%", pct));
    }

    ctx.output.section("Coordinate uncertainty");
    if let Some(summary) = &profile.uncertainty {
        ctx.output.kv("Median", format!("{:.1} m", summary.median));
        ctx.output.kv("Interquartile range", format!("{:.1} to {:.1} m", summary.q1, summary.q3));
        ctx.output.kv("Maximum", format!("{:.1} m", summary.max));
    }
    ctx.output.kv("Records without uncertainty", profile.missing.uncertainty);

    Ok(())
}
