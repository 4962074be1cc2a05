//! Configuration loading utilities for CLI commands

use anyhow::{bail, Context, Result};
use caudata_core::config::{CliConfigOverrides, LayeredConfig, CONFIG_FILE_NAME};
use std::path::{Path, PathBuf};

/// Config file to read: the explicit path, or `caudata.toml` in the working
/// directory when it exists
pub fn config_file(explicit: Option<&Path>) -> Result<Option<PathBuf>> {
    match explicit {
        Some(path) if path.is_file() => Ok(Some(path.to_path_buf())),
        Some(path) => bail!("Config file not found: {}", path.display()),
        None => {
            let default = std::env::current_dir()?.join(CONFIG_FILE_NAME);
            Ok(default.is_file().then_some(default))
        }
    }
}

/// Load layered configuration: defaults, file, environment, CLI
pub fn load_config(explicit: Option<&Path>, overrides: CliConfigOverrides) -> Result<LayeredConfig> {
    let mut config = LayeredConfig::with_defaults();
    if let Some(path) = config_file(explicit)? {
        config = config
            .load_from_file(&path)
            .with_context(|| format!("Failed to load configuration file {}", path.display()))?;
    }
    let mut config = config.load_from_env();
    config.update_from_cli(overrides);
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use caudata_core::config::ConfigSource;
    use std::io::Write;

    #[test]
    fn test_explicit_file_and_cli_override() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "record_limit = 42\nzoom = 8").unwrap();

        let overrides = CliConfigOverrides { zoom: Some(9), ..Default::default() };
        let config = load_config(Some(file.path()), overrides).unwrap();

        assert_eq!(config.record_limit.value, 42);
        assert_eq!(config.record_limit.source, ConfigSource::File);
        assert_eq!(config.zoom.value, 9);
        assert_eq!(config.zoom.source, ConfigSource::Cli);
    }

    #[test]
    fn test_missing_explicit_file_fails() {
        let result = config_file(Some(Path::new("/nonexistent/caudata.toml")));
        assert!(result.is_err());
    }
}
