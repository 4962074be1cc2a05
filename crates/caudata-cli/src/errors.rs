use caudata_core::error::CaudataError;
use console::style;
use std::fmt;

/// Enhanced error type with suggestions
pub struct CliError {
    pub message: String,
    pub context: Option<String>,
    pub suggestions: Vec<String>,
    pub help_command: Option<String>,
}

impl CliError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            context: None,
            suggestions: Vec::new(),
            help_command: None,
        }
    }

    pub fn with_context(mut self, context: impl Into<String>) -> Self {
        self.context = Some(context.into());
        self
    }

    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestions.push(suggestion.into());
        self
    }

    pub fn with_help(mut self, command: impl Into<String>) -> Self {
        self.help_command = Some(command.into());
        self
    }

    pub fn display(&self) {
        eprintln!("{} {}\n", style("✗").red().bold(), style(&self.message).red().bold());

        if let Some(ref context) = self.context {
            eprintln!("{}", context);
            eprintln!();
        }

        if !self.suggestions.is_empty() {
            eprintln!("{}", style("To fix this:").yellow().bold());
            for (i, suggestion) in self.suggestions.iter().enumerate() {
                eprintln!("  {}. {}", i + 1, suggestion);
            }
            eprintln!();
        }

        if let Some(ref help_cmd) = self.help_command {
            eprintln!("{} {}", style("Need help?").cyan(), style(help_cmd).cyan().bold());
        }
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl fmt::Debug for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for CliError {}

/// A remote request failed
pub fn source_unreachable(source_name: &str, query: &str, reason: &str) -> CliError {
    CliError::new(format!("Could not fetch from {}", source_name))
        .with_context(format!("Request: {}\n\nError: {}", query, reason))
        .with_suggestion("Check your network connection and try again")
        .with_suggestion("Cached responses are reused, so completed pages are not fetched twice")
        .with_help("Run: caudata cache status")
}

/// A remote payload did not match the expected schema
pub fn unexpected_payload(source_name: &str, reason: &str) -> CliError {
    CliError::new(format!("Unexpected response from {}", source_name))
        .with_context(format!("Error: {}", reason))
        .with_suggestion("A corrupted cached response can cause this: caudata cache clear")
        .with_suggestion("Or bypass the cache: --no-cache")
}

/// A stage produced no rows
pub fn empty_table(stage: &str) -> CliError {
    CliError::new(format!("No records left after {}", stage))
        .with_context("Nothing remains to analyze.")
        .with_suggestion("Check the genus and species: caudata config")
        .with_suggestion("Raise the record limit: --record-limit")
}

/// Crop or mask left no cell
pub fn empty_extent(operation: &str, reason: &str) -> CliError {
    CliError::new(format!("Empty extent during {}", operation))
        .with_context(format!("Error: {}", reason))
        .with_suggestion("Check that the boundary file overlaps lon -125..-113, lat 32.25..42.5")
        .with_help("Run: caudata terrain --help")
}

/// Create error for invalid configuration
pub fn invalid_config(key: &str, reason: &str) -> CliError {
    CliError::new(format!("Invalid configuration: {}", key))
        .with_context(format!("Configuration value is invalid.\n\nReason: {}", reason))
        .with_suggestion("Check caudata.toml for syntax errors")
        .with_suggestion("Check CAUDATA_* environment variables")
        .with_help("Run: caudata config")
}

fn from_caudata(error: &CaudataError) -> CliError {
    match error {
        CaudataError::SourceFetch { source_name, query, reason } => {
            source_unreachable(source_name, query, reason)
        }
        CaudataError::Schema { source_name, reason } => unexpected_payload(source_name, reason),
        CaudataError::EmptyTable { stage } => empty_table(stage),
        CaudataError::EmptyExtent { operation, reason } => empty_extent(operation, reason),
        CaudataError::ConfigInvalid { key, reason } => invalid_config(key, reason),
        CaudataError::ConfigMissing { key } => invalid_config(key, "value is required"),
        other => CliError::new(other.to_string()),
    }
}

/// Convert anyhow::Error to CliError with context
pub fn from_anyhow(error: anyhow::Error) -> CliError {
    if let Some(caudata) = error.chain().find_map(|e| e.downcast_ref::<CaudataError>()) {
        let cli = from_caudata(caudata);
        return if cli.context.is_none() {
            cli.with_context(format!("Error: {:#}", error))
        } else {
            cli
        };
    }

    let message = error.to_string();
    if message.contains("No such file or directory") || message.contains("not found") {
        CliError::new("File not found")
            .with_context(format!("Error: {:#}", error))
            .with_suggestion("Check the file path and try again")
    } else if message.contains("permission denied") {
        CliError::new("Permission denied")
            .with_context(format!("Error: {:#}", error))
            .with_suggestion("Check file permissions")
            .with_suggestion("Or run with appropriate privileges")
    } else {
        CliError::new(format!("{:#}", error))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fetch_error_keeps_query() {
        let error = anyhow::Error::new(CaudataError::SourceFetch {
            source_name: "GBIF".to_string(),
            query: "scientificName=Taricha sierrae offset=300".to_string(),
            reason: "status 503".to_string(),
        })
        .context("Acquisition failed");

        let cli = from_anyhow(error);
        assert_eq!(cli.message, "Could not fetch from GBIF");
        assert!(cli.context.unwrap().contains("offset=300"));
    }

    #[test]
    fn test_empty_table_suggestions() {
        let cli = from_anyhow(anyhow::Error::new(CaudataError::EmptyTable {
            stage: "cleaning".to_string(),
        }));
        assert_eq!(cli.message, "No records left after cleaning");
        assert_eq!(cli.suggestions.len(), 2);
    }
}
