//! Cache command implementation

use super::CommandContext;
use crate::cli::CacheAction;
use crate::dry_run::{display_planned_actions, ActionType, PlannedAction};
use crate::output_types::{CacheClearOutput, CacheStatusOutput};
use anyhow::{Context, Result};
use caudata_store::{FileCache, ResponseCache};

pub async fn execute(action: CacheAction, ctx: &CommandContext) -> Result<()> {
    let cache = FileCache::new(ctx.config.cache_dir.value.clone());

    match action {
        CacheAction::Status => {
            let stats = cache.stats().await.context("Failed to read the cache")?;
            let status = CacheStatusOutput {
                root: cache.root().to_path_buf(),
                entries: stats.entries,
                bytes: stats.bytes,
            };
            if ctx.output.is_json() {
                ctx.output.result(status)?;
            } else {
                ctx.output.kv("Location", status.root.display());
                ctx.output.kv("Entries", status.entries);
                ctx.output.kv("Size", format!("{:.1} KiB", status.bytes as f64 / 1024.0));
            }
        }
        CacheAction::Clear => {
            if ctx.dry_run {
                let action = PlannedAction::new(
                    ActionType::ClearCache,
                    format!("Remove every entry under {}", cache.root().display()),
                );
                display_planned_actions(&ctx.output, &[action]);
                return Ok(());
            }

            let removed = cache.clear().await.context("Failed to clear the cache")?;
            let cleared = CacheClearOutput { root: cache.root().to_path_buf(), removed };
            if ctx.output.is_json() {
                ctx.output.result(cleared)?;
            } else {
                ctx.output.success(format!("Removed {} cached responses from {}", removed, cleared.root.display()));
            }
        }
    }
    Ok(())
}
