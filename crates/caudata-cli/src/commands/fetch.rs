//! Fetch command implementation

use super::{fetch_action, write_actions, CommandContext};
use crate::dry_run::display_planned_actions;
use crate::output_types::FrequencyLine;
use crate::progress::StageProgress;
use crate::storage::Storage;
use anyhow::{Context, Result};
use caudata_core::models::ReportContext;
use caudata_core::processing::profile::frequency_table;
use caudata_pipeline::artifacts::{OutputDir, RAW_OCCURRENCES};

pub async fn execute(ctx: &CommandContext) -> Result<()> {
    let config = &ctx.config;

    if ctx.dry_run {
        let mut actions = vec![fetch_action(ctx)];
        actions.extend(write_actions(ctx, &[RAW_OCCURRENCES]));
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

    let out = OutputDir::create(&config.output_dir.value).context("Failed to create output directory")?;
    let path = out.write_raw_table(&table, &mut report)?;

    let acquisition = report.acquisition().context("Acquisition summary missing")?;
    if ctx.output.is_json() {
        ctx.output.result(acquisition)?;
    } else {
        ctx.output.success(format!("Wrote {}", path.display()));
        ctx.output.kv("Taxon", acquisition.taxon.binomial());
        ctx.output.kv("Records", acquisition.record_count);
        ctx.output.section("Scientific names");
        let names = frequency_table(table.iter().filter_map(|r| r.scientific_name.clone()));
        ctx.output.table(names.iter().map(FrequencyLine::from).collect());
    }

    Ok(())
}
