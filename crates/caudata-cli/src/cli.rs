use caudata_core::config::CliConfigOverrides;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// Caudata - Newt occurrence analysis
#[derive(Parser, Debug)]
#[command(name = "caudata")]
#[command(about = "Occurrence records, cleaning, terrain and maps for a newt species", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Output results in JSON format
    #[arg(long, global = true)]
    pub json: bool,

    /// Show planned actions without executing them
    #[arg(long, global = true)]
    pub dry_run: bool,

    /// Configuration file (defaults to ./caudata.toml when present)
    #[arg(long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Bypass the response cache
    #[arg(long, global = true)]
    pub no_cache: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run every stage and write the report
    Run(RunArgs),

    /// Download occurrence records only
    Fetch(FetchArgs),

    /// Download and profile occurrence records
    Profile(FetchArgs),

    /// Download and clean occurrence records
    Clean(FetchArgs),

    /// Fetch elevation and derive terrain layers
    Terrain(TerrainArgs),

    /// Show the effective configuration and where each value comes from
    Config,

    /// Manage the response cache
    Cache(CacheArgs),
}

/// Taxon selection shared by the record commands
#[derive(Args, Debug, Default)]
pub struct TaxonArgs {
    /// Genus to query
    #[arg(long)]
    pub genus: Option<String>,

    /// Species epithet to query
    #[arg(long)]
    pub species: Option<String>,

    /// Maximum records fetched per queried name
    #[arg(long)]
    pub record_limit: Option<usize>,
}

/// Terrain settings shared by `run` and `terrain`
#[derive(Args, Debug, Default)]
pub struct TerrainOptions {
    /// Terrain tile zoom level
    #[arg(long, value_parser = parse_zoom_arg)]
    pub zoom: Option<u8>,

    /// Elevation grid resolution in degrees
    #[arg(long, value_parser = parse_resolution_arg)]
    pub resolution: Option<f64>,

    /// GeoJSON boundary replacing the built-in California polygon
    #[arg(long, value_name = "FILE")]
    pub boundary: Option<PathBuf>,
}

#[derive(Parser, Debug)]
pub struct RunArgs {
    #[command(flatten)]
    pub taxon: TaxonArgs,

    #[command(flatten)]
    pub terrain: TerrainOptions,

    /// Output directory
    #[arg(long, short = 'o')]
    pub output: Option<PathBuf>,
}

#[derive(Parser, Debug)]
pub struct FetchArgs {
    #[command(flatten)]
    pub taxon: TaxonArgs,

    /// Output directory
    #[arg(long, short = 'o')]
    pub output: Option<PathBuf>,
}

#[derive(Parser, Debug)]
pub struct TerrainArgs {
    #[command(flatten)]
    pub terrain: TerrainOptions,

    /// Output directory
    #[arg(long, short = 'o')]
    pub output: Option<PathBuf>,
}

#[derive(Parser, Debug)]
pub struct CacheArgs {
    #[command(subcommand)]
    pub action: CacheAction,
}

#[derive(Subcommand, Debug)]
pub enum CacheAction {
    /// Remove every cached response
    Clear,

    /// Show the cache location and size
    Status,
}

fn parse_zoom_arg(s: &str) -> Result<u8, String> {
    caudata_core::config::parse_zoom(s).map_err(|e| e.to_string())
}

fn parse_resolution_arg(s: &str) -> Result<f64, String> {
    caudata_core::config::parse_grid_resolution(s).map_err(|e| e.to_string())
}

impl TaxonArgs {
    fn apply(&self, overrides: &mut CliConfigOverrides) {
        overrides.genus = self.genus.clone();
        overrides.species = self.species.clone();
        overrides.record_limit = self.record_limit;
    }
}

impl TerrainOptions {
    fn apply(&self, overrides: &mut CliConfigOverrides) {
        overrides.zoom = self.zoom;
        overrides.grid_resolution = self.resolution;
        overrides.boundary_file = self.boundary.clone();
    }
}

impl Commands {
    /// Configuration overrides given on the command line
    pub fn overrides(&self) -> CliConfigOverrides {
        let mut overrides = CliConfigOverrides::default();
        match self {
            Commands::Run(args) => {
                args.taxon.apply(&mut overrides);
                args.terrain.apply(&mut overrides);
                overrides.output_dir = args.output.clone();
            }
            Commands::Fetch(args) | Commands::Profile(args) | Commands::Clean(args) => {
                args.taxon.apply(&mut overrides);
                overrides.output_dir = args.output.clone();
            }
            Commands::Terrain(args) => {
                args.terrain.apply(&mut overrides);
                overrides.output_dir = args.output.clone();
            }
            Commands::Config | Commands::Cache(_) => {}
        }
        overrides
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_run_overrides() {
        let cli = Cli::parse_from([
            "caudata", "run", "--genus", "Taricha", "--species", "torosa", "--zoom", "7", "-o", "out",
        ]);
        let overrides = cli.command.overrides();
        assert_eq!(overrides.species.as_deref(), Some("torosa"));
        assert_eq!(overrides.zoom, Some(7));
        assert_eq!(overrides.output_dir, Some(PathBuf::from("out")));
        assert!(overrides.record_limit.is_none());
    }

    #[test]
    fn test_zoom_is_bounded() {
        assert!(Cli::try_parse_from(["caudata", "terrain", "--zoom", "16"]).is_err());
        assert!(Cli::try_parse_from(["caudata", "terrain", "--resolution", "0"]).is_err());
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let cli = Cli::parse_from(["caudata", "cache", "status", "--json", "--no-cache"]);
        assert!(cli.json);
        assert!(cli.no_cache);
        assert!(matches!(cli.command, Commands::Cache(CacheArgs { action: CacheAction::Status })));
    }
}
