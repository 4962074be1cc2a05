//! Command implementations

mod cache;
mod clean;
mod config;
mod fetch;
mod profile;
mod run;
mod terrain;

use crate::cli::{Cli, Commands};
use crate::config_loader::load_config;
use crate::dry_run::{ActionType, PlannedAction};
use crate::output::OutputWriter;
use anyhow::Result;
use caudata_core::config::LayeredConfig;

/// Everything a command needs besides its own arguments
pub struct CommandContext {
    pub output: OutputWriter,
    pub config: LayeredConfig,
    pub dry_run: bool,
    pub no_cache: bool,
}

/// Execute a CLI command
pub async fn execute(cli: Cli) -> Result<()> {
    let config = load_config(cli.config.as_deref(), cli.command.overrides())?;
    tracing::debug!(
        taxon = %config.taxon().binomial(),
        output_dir = %config.output_dir.value.display(),
        "Loaded configuration"
    );
    let ctx = CommandContext {
        output: OutputWriter::new(cli.json),
        config,
        dry_run: cli.dry_run,
        no_cache: cli.no_cache,
    };

    if ctx.no_cache && matches!(cli.command, Commands::Cache(_)) {
        ctx.output.warning("--no-cache has no effect on cache commands");
    }

    match cli.command {
        Commands::Run(_) => run::execute(&ctx).await,
        Commands::Fetch(_) => fetch::execute(&ctx).await,
        Commands::Profile(_) => profile::execute(&ctx).await,
        Commands::Clean(_) => clean::execute(&ctx).await,
        Commands::Terrain(_) => terrain::execute(&ctx).await,
        Commands::Config => config::execute(&ctx),
        Commands::Cache(args) => cache::execute(args.action, &ctx).await,
    }
}

/// Planned GBIF download
fn fetch_action(ctx: &CommandContext) -> PlannedAction {
    let taxon = ctx.config.taxon();
    PlannedAction::new(
        ActionType::FetchRecords,
        format!("Fetch GBIF occurrences of {}", taxon.binomial()),
    )
    .with_detail(format!("Names: {}", taxon.names().join(", ")))
    .with_detail(format!("Record limit per name: {}", ctx.config.record_limit.value))
    .with_detail(cache_detail(ctx))
}

/// Planned terrain-tile download
fn tiles_action(ctx: &CommandContext) -> PlannedAction {
    let boundary = ctx
        .config
        .boundary_file
        .value
        .as_ref()
        .map(|p| p.display().to_string())
        .unwrap_or_else(|| "built-in California boundary".to_string());
    PlannedAction::new(
        ActionType::FetchTiles,
        format!("Fetch terrain tiles at zoom {}", ctx.config.zoom.value),
    )
    .with_detail(format!("Extent: {}", boundary))
    .with_detail(format!("Grid resolution: {} deg", ctx.config.grid_resolution.value))
    .with_detail(cache_detail(ctx))
}

/// Planned output directory and files
fn write_actions(ctx: &CommandContext, files: &[&str]) -> Vec<PlannedAction> {
    let dir = &ctx.config.output_dir.value;
    let mut actions = vec![PlannedAction::new(
        ActionType::CreateDirectory,
        format!("Create output directory {}", dir.display()),
    )];
    actions.extend(
        files
            .iter()
            .map(|file| PlannedAction::new(ActionType::WriteFile, format!("Write {}", dir.join(file).display()))),
    );
    actions
}

fn cache_detail(ctx: &CommandContext) -> String {
    if ctx.no_cache {
        "Cache: disabled".to_string()
    } else {
        format!("Cache: {}", ctx.config.cache_dir.value.display())
    }
}
