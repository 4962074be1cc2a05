use crate::error::{CaudataError, Result};
use crate::models::TaxonQuery;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

/// Default config file name, looked up in the working directory
pub const CONFIG_FILE_NAME: &str = "caudata.toml";

/// Highest terrain-tile zoom level served by the tile service
pub const MAX_ZOOM: u8 = 15;

/// Configuration source for tracking where values come from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConfigSource {
    /// Default value
    Default,
    /// Loaded from config file
    File,
    /// Loaded from environment variable
    Environment,
    /// Provided via CLI argument
    Cli,
}

impl ConfigSource {
    /// Returns the precedence level (higher = higher priority)
    pub fn precedence(&self) -> u8 {
        match self {
            ConfigSource::Default => 0,
            ConfigSource::File => 1,
            ConfigSource::Environment => 2,
            ConfigSource::Cli => 3,
        }
    }
}

/// A configuration value with its source
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfigValue<T> {
    pub value: T,
    pub source: ConfigSource,
}

impl<T> ConfigValue<T> {
    pub fn new(value: T, source: ConfigSource) -> Self {
        Self { value, source }
    }

    /// Update the value if the new source has higher precedence
    pub fn update(&mut self, value: T, source: ConfigSource) {
        if source.precedence() > self.source.precedence() {
            self.value = value;
            self.source = source;
        }
    }
}

/// Layered configuration for a caudata run
#[derive(Debug, Clone)]
pub struct LayeredConfig {
    pub genus: ConfigValue<String>,
    pub species: ConfigValue<String>,
    pub synonyms: ConfigValue<Vec<String>>,
    pub record_limit: ConfigValue<usize>,
    pub zoom: ConfigValue<u8>,
    pub grid_resolution: ConfigValue<f64>,
    pub cache_dir: ConfigValue<PathBuf>,
    pub output_dir: ConfigValue<PathBuf>,
    pub boundary_file: ConfigValue<Option<PathBuf>>,
}

impl LayeredConfig {
    /// Create a new configuration with default values
    pub fn with_defaults() -> Self {
        let taxon = TaxonQuery::default();
        Self {
            genus: ConfigValue::new(taxon.genus, ConfigSource::Default),
            species: ConfigValue::new(taxon.species, ConfigSource::Default),
            synonyms: ConfigValue::new(taxon.synonyms, ConfigSource::Default),
            record_limit: ConfigValue::new(5000, ConfigSource::Default),
            zoom: ConfigValue::new(6, ConfigSource::Default),
            grid_resolution: ConfigValue::new(0.02, ConfigSource::Default),
            cache_dir: ConfigValue::new(PathBuf::from(".caudata/cache"), ConfigSource::Default),
            output_dir: ConfigValue::new(PathBuf::from("output"), ConfigSource::Default),
            boundary_file: ConfigValue::new(None, ConfigSource::Default),
        }
    }

    /// Load configuration from a TOML file
    pub fn load_from_file<P: AsRef<Path>>(mut self, path: P) -> Result<Self> {
        let content =
            fs::read_to_string(path.as_ref()).map_err(|e| CaudataError::ConfigInvalid {
                key: "file".to_string(),
                reason: format!("Failed to read config file: {}", e),
            })?;

        let file_config: FileConfig =
            toml::from_str(&content).map_err(|e| CaudataError::ConfigInvalid {
                key: "file".to_string(),
                reason: format!("Failed to parse TOML: {}", e),
            })?;

        if let Some(taxon) = file_config.taxon {
            if let Some(genus) = taxon.genus {
                self.genus.update(genus, ConfigSource::File);
            }
            if let Some(species) = taxon.species {
                self.species.update(species, ConfigSource::File);
            }
            if let Some(synonyms) = taxon.synonyms {
                self.synonyms.update(synonyms, ConfigSource::File);
            }
        }

        if let Some(record_limit) = file_config.record_limit {
            self.record_limit.update(record_limit, ConfigSource::File);
        }

        if let Some(zoom) = file_config.zoom {
            self.zoom.update(parse_zoom(&zoom.to_string())?, ConfigSource::File);
        }

        if let Some(resolution) = file_config.grid_resolution {
            self.grid_resolution
                .update(parse_grid_resolution(&resolution.to_string())?, ConfigSource::File);
        }

        if let Some(cache_dir) = file_config.cache_dir {
            self.cache_dir.update(cache_dir, ConfigSource::File);
        }

        if let Some(output_dir) = file_config.output_dir {
            self.output_dir.update(output_dir, ConfigSource::File);
        }

        if let Some(boundary_file) = file_config.boundary_file {
            self.boundary_file.update(Some(boundary_file), ConfigSource::File);
        }

        Ok(self)
    }

    /// Load configuration from environment variables
    pub fn load_from_env(mut self) -> Self {
        // CAUDATA_GENUS
        if let Ok(genus) = env::var("CAUDATA_GENUS") {
            if genus.trim().is_empty() {
                tracing::warn!("Ignoring empty CAUDATA_GENUS");
            } else {
                self.genus.update(genus.trim().to_string(), ConfigSource::Environment);
            }
        }

        // CAUDATA_SPECIES
        if let Ok(species) = env::var("CAUDATA_SPECIES") {
            if species.trim().is_empty() {
                tracing::warn!("Ignoring empty CAUDATA_SPECIES");
            } else {
                self.species.update(species.trim().to_string(), ConfigSource::Environment);
            }
        }

        // CAUDATA_SYNONYMS
        if let Ok(synonyms) = env::var("CAUDATA_SYNONYMS") {
            self.synonyms.update(parse_synonyms(&synonyms), ConfigSource::Environment);
        }

        // CAUDATA_RECORD_LIMIT
        if let Ok(limit_str) = env::var("CAUDATA_RECORD_LIMIT") {
            match limit_str.trim().parse::<usize>() {
                Ok(limit) if limit > 0 => {
                    self.record_limit.update(limit, ConfigSource::Environment)
                }
                _ => tracing::warn!(
                    "Invalid CAUDATA_RECORD_LIMIT value '{}': expected a positive integer",
                    limit_str
                ),
            }
        }

        // CAUDATA_ZOOM
        if let Ok(zoom_str) = env::var("CAUDATA_ZOOM") {
            match parse_zoom(&zoom_str) {
                Ok(zoom) => self.zoom.update(zoom, ConfigSource::Environment),
                Err(_) => tracing::warn!(
                    "Invalid CAUDATA_ZOOM value '{}': expected an integer between 0 and {}",
                    zoom_str,
                    MAX_ZOOM
                ),
            }
        }

        // CAUDATA_GRID_RESOLUTION
        if let Ok(resolution_str) = env::var("CAUDATA_GRID_RESOLUTION") {
            match parse_grid_resolution(&resolution_str) {
                Ok(resolution) => self.grid_resolution.update(resolution, ConfigSource::Environment),
                Err(_) => tracing::warn!(
                    "Invalid CAUDATA_GRID_RESOLUTION value '{}': expected degrees in (0, 1]",
                    resolution_str
                ),
            }
        }

        // CAUDATA_CACHE_DIR
        if let Ok(cache_dir) = env::var("CAUDATA_CACHE_DIR") {
            self.cache_dir.update(PathBuf::from(cache_dir), ConfigSource::Environment);
        }

        // CAUDATA_OUTPUT_DIR
        if let Ok(output_dir) = env::var("CAUDATA_OUTPUT_DIR") {
            self.output_dir.update(PathBuf::from(output_dir), ConfigSource::Environment);
        }

        self
    }

    /// Update configuration from CLI arguments
    pub fn update_from_cli(&mut self, overrides: CliConfigOverrides) {
        if let Some(genus) = overrides.genus {
            self.genus.update(genus, ConfigSource::Cli);
        }

        if let Some(species) = overrides.species {
            self.species.update(species, ConfigSource::Cli);
        }

        if let Some(record_limit) = overrides.record_limit {
            self.record_limit.update(record_limit, ConfigSource::Cli);
        }

        if let Some(zoom) = overrides.zoom {
            self.zoom.update(zoom, ConfigSource::Cli);
        }

        if let Some(resolution) = overrides.grid_resolution {
            self.grid_resolution.update(resolution, ConfigSource::Cli);
        }

        if let Some(output_dir) = overrides.output_dir {
            self.output_dir.update(output_dir, ConfigSource::Cli);
        }

        if let Some(boundary_file) = overrides.boundary_file {
            self.boundary_file.update(Some(boundary_file), ConfigSource::Cli);
        }
    }

    /// The taxon query described by the genus, species and synonym values
    pub fn taxon(&self) -> TaxonQuery {
        let mut query = TaxonQuery::new(self.genus.value.clone(), self.species.value.clone());
        for synonym in &self.synonyms.value {
            query = query.with_synonym(synonym.clone());
        }
        query
    }

    /// Get all configuration values as a map for inspection
    pub fn to_inspection_map(&self) -> HashMap<String, (String, ConfigSource)> {
        let mut map = HashMap::new();

        map.insert("genus".to_string(), (self.genus.value.clone(), self.genus.source));
        map.insert("species".to_string(), (self.species.value.clone(), self.species.source));
        map.insert(
            "synonyms".to_string(),
            (self.synonyms.value.join(", "), self.synonyms.source),
        );
        map.insert(
            "record_limit".to_string(),
            (self.record_limit.value.to_string(), self.record_limit.source),
        );
        map.insert("zoom".to_string(), (self.zoom.value.to_string(), self.zoom.source));
        map.insert(
            "grid_resolution".to_string(),
            (format!("{} deg", self.grid_resolution.value), self.grid_resolution.source),
        );
        map.insert(
            "cache_dir".to_string(),
            (self.cache_dir.value.display().to_string(), self.cache_dir.source),
        );
        map.insert(
            "output_dir".to_string(),
            (self.output_dir.value.display().to_string(), self.output_dir.source),
        );
        map.insert(
            "boundary_file".to_string(),
            (
                self.boundary_file
                    .value
                    .as_ref()
                    .map(|p| p.display().to_string())
                    .unwrap_or_else(|| "built-in (California)".to_string()),
                self.boundary_file.source,
            ),
        );

        map
    }
}

/// Configuration loaded from TOML file
#[derive(Debug, Deserialize, Serialize)]
struct FileConfig {
    taxon: Option<FileTaxon>,
    record_limit: Option<usize>,
    zoom: Option<u32>,
    grid_resolution: Option<f64>,
    cache_dir: Option<PathBuf>,
    output_dir: Option<PathBuf>,
    boundary_file: Option<PathBuf>,
}

#[derive(Debug, Deserialize, Serialize)]
struct FileTaxon {
    genus: Option<String>,
    species: Option<String>,
    synonyms: Option<Vec<String>>,
}

/// CLI configuration overrides
#[derive(Debug, Default)]
pub struct CliConfigOverrides {
    pub genus: Option<String>,
    pub species: Option<String>,
    pub record_limit: Option<usize>,
    pub zoom: Option<u8>,
    pub grid_resolution: Option<f64>,
    pub output_dir: Option<PathBuf>,
    pub boundary_file: Option<PathBuf>,
}

/// Parse a comma-separated synonym list, skipping blanks
pub fn parse_synonyms(s: &str) -> Vec<String> {
    s.split(',').map(str::trim).filter(|n| !n.is_empty()).map(str::to_string).collect()
}

/// Parse a terrain-tile zoom level
pub fn parse_zoom(s: &str) -> Result<u8> {
    match s.trim().parse::<u8>() {
        Ok(zoom) if zoom <= MAX_ZOOM => Ok(zoom),
        _ => Err(CaudataError::ConfigInvalid {
            key: "zoom".to_string(),
            reason: format!("Invalid zoom: {}. Use an integer between 0 and {}", s, MAX_ZOOM),
        }),
    }
}

/// Parse a grid resolution in degrees
pub fn parse_grid_resolution(s: &str) -> Result<f64> {
    match s.trim().parse::<f64>() {
        Ok(resolution) if resolution > 0.0 && resolution <= 1.0 => Ok(resolution),
        _ => Err(CaudataError::ConfigInvalid {
            key: "grid_resolution".to_string(),
            reason: format!("Invalid grid resolution: {}. Use degrees in (0, 1]", s),
        }),
    }
}
