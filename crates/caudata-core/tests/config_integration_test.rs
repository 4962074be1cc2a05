//! Integration tests for layered configuration
//!
//! Loading follows the precedence CLI arguments > environment variables >
//! config file > defaults.

use caudata_core::config::{CliConfigOverrides, ConfigSource, LayeredConfig};
use serial_test::serial;
use std::env;
use std::io::Write;
use std::path::PathBuf;
use tempfile::NamedTempFile;

const ENV_VARS: [&str; 8] = [
    "CAUDATA_GENUS",
    "CAUDATA_SPECIES",
    "CAUDATA_SYNONYMS",
    "CAUDATA_RECORD_LIMIT",
    "CAUDATA_ZOOM",
    "CAUDATA_CACHE_DIR",
    "CAUDATA_OUTPUT_DIR",
    "CAUDATA_GRID_RESOLUTION",
];

fn clear_env() {
    for var in ENV_VARS {
        env::remove_var(var);
    }
}

fn config_file(contents: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    writeln!(file, "{}", contents).unwrap();
    file
}

#[test]
fn test_partial_file_configuration() {
    let file = config_file("zoom = 8\n# Everything else stays default\n");

    let config = LayeredConfig::with_defaults().load_from_file(file.path()).unwrap();

    assert_eq!(config.zoom.value, 8);
    assert_eq!(config.zoom.source, ConfigSource::File);
    assert_eq!(config.species.value, "sierrae");
    assert_eq!(config.species.source, ConfigSource::Default);
    assert_eq!(config.record_limit.source, ConfigSource::Default);
}

#[test]
fn test_missing_file_is_an_error() {
    let result = LayeredConfig::with_defaults().load_from_file("/nonexistent/caudata.toml");
    assert!(result.is_err(), "Loading a missing file should fail");
}

#[test]
fn test_malformed_file_is_an_error() {
    let file = config_file("zoom = [not toml");
    let result = LayeredConfig::with_defaults().load_from_file(file.path());
    assert!(result.is_err(), "Malformed TOML should be rejected");
}

#[test]
#[serial]
fn test_environment_overrides_file() {
    clear_env();
    env::set_var("CAUDATA_SPECIES", "torosa");
    env::set_var("CAUDATA_SYNONYMS", "Triturus torosus, Taricha torosa torosa");
    env::set_var("CAUDATA_RECORD_LIMIT", "1200");
    env::set_var("CAUDATA_OUTPUT_DIR", "/tmp/caudata-env");

    let file = config_file(
        r#"
record_limit = 300
output_dir = "from-file"

[taxon]
species = "sierrae"
"#,
    );

    let config = LayeredConfig::with_defaults()
        .load_from_file(file.path())
        .unwrap()
        .load_from_env();

    assert_eq!(config.species.value, "torosa");
    assert_eq!(config.species.source, ConfigSource::Environment);
    assert_eq!(config.synonyms.value, vec!["Triturus torosus", "Taricha torosa torosa"]);
    assert_eq!(config.record_limit.value, 1200);
    assert_eq!(config.output_dir.value, PathBuf::from("/tmp/caudata-env"));
    assert_eq!(config.genus.source, ConfigSource::Default);

    clear_env();
}

#[test]
#[serial]
fn test_invalid_environment_values_are_ignored() {
    clear_env();
    env::set_var("CAUDATA_ZOOM", "twelve");
    env::set_var("CAUDATA_RECORD_LIMIT", "0");
    env::set_var("CAUDATA_GRID_RESOLUTION", "-1");

    let config = LayeredConfig::with_defaults().load_from_env();

    assert_eq!(config.zoom.value, 6);
    assert_eq!(config.zoom.source, ConfigSource::Default);
    assert_eq!(config.record_limit.value, 5000);
    assert_eq!(config.grid_resolution.value, 0.02);

    clear_env();
}

#[test]
#[serial]
fn test_cli_overrides_environment() {
    clear_env();
    env::set_var("CAUDATA_ZOOM", "7");
    env::set_var("CAUDATA_GENUS", "Notophthalmus");

    let mut config = LayeredConfig::with_defaults().load_from_env();
    config.update_from_cli(CliConfigOverrides {
        zoom: Some(5),
        boundary_file: Some(PathBuf::from("boundary.geojson")),
        ..Default::default()
    });

    assert_eq!(config.zoom.value, 5);
    assert_eq!(config.zoom.source, ConfigSource::Cli);
    assert_eq!(config.genus.value, "Notophthalmus");
    assert_eq!(config.genus.source, ConfigSource::Environment);
    assert_eq!(config.boundary_file.value, Some(PathBuf::from("boundary.geojson")));

    clear_env();
}

#[test]
#[serial]
fn test_taxon_from_layers() {
    clear_env();
    env::set_var("CAUDATA_SYNONYMS", "");

    let config = LayeredConfig::with_defaults().load_from_env();
    let taxon = config.taxon();

    assert_eq!(taxon.binomial(), "Taricha sierrae");
    assert_eq!(taxon.names(), vec!["Taricha sierrae"]);

    clear_env();
}
