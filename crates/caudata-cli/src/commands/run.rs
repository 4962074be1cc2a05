//! Run command implementation

use super::{fetch_action, tiles_action, write_actions, CommandContext};
use crate::dry_run::display_planned_actions;
use crate::output_types::{ArtifactLine, RunOutput};
use crate::progress::StageProgress;
use crate::storage::Storage;
use anyhow::{Context, Result};
use caudata_pipeline::artifacts;

pub async fn execute(ctx: &CommandContext) -> Result<()> {
    let config = &ctx.config;

    if ctx.dry_run {
        let mut actions = vec![fetch_action(ctx), tiles_action(ctx)];
        actions.extend(write_actions(ctx, &artifacts::run_files()));
        display_planned_actions(&ctx.output, &actions);
        return Ok(());
    }

    let pipeline = Storage::new(config, ctx.no_cache)?.into_pipeline(config)?;
    let mut progress = StageProgress::new(ctx.output.is_json());
    let output = pipeline.run_with(&mut progress).await.with_context(|| {
        format!("Pipeline run into {} failed", config.output_dir.value.display())
    })?;

    let report = &output.context;
    let result = RunOutput {
        output_dir: config.output_dir.value.clone(),
        report: output.report_path.clone(),
        summary: output.summary_path.clone(),
        retained_records: report.cleaning().map(|c| c.retained_records),
        artifacts: report.artifacts().iter().map(ArtifactLine::from).collect(),
    };

    if ctx.output.is_json() {
        ctx.output.result(result)?;
    } else {
        ctx.output.success(format!("Report written to {}", result.report.display()));
        ctx.output.section("Artifacts");
        ctx.output.table(result.artifacts);
    }

    Ok(())
}
