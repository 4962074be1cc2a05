use console::{style, StyledObject};
use serde::Serialize;
use std::fmt::Display;
use tabled::{settings::Style, Table, Tabled};

/// Human-readable or machine-readable output
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Human,
    Json,
}

#[derive(Debug, Clone, Copy)]
enum Level {
    Success,
    Info,
    Warning,
}

impl Level {
    fn name(self) -> &'static str {
        match self {
            Level::Success => "success",
            Level::Info => "info",
            Level::Warning => "warning",
        }
    }

    fn symbol(self) -> StyledObject<&'static str> {
        match self {
            Level::Success => style("✓").green().bold(),
            Level::Info => style("ℹ").blue().bold(),
            Level::Warning => style("⚠").yellow().bold(),
        }
    }
}

/// Writes command results to stdout, warnings to stderr
pub struct OutputWriter {
    format: OutputFormat,
}

impl OutputWriter {
    pub fn new(json: bool) -> Self {
        let format = if json { OutputFormat::Json } else { OutputFormat::Human };
        Self { format }
    }

    pub fn is_json(&self) -> bool {
        self.format == OutputFormat::Json
    }

    /// Pretty-printed JSON on stdout
    pub fn json<T: Serialize>(&self, value: &T) {
        match serde_json::to_string_pretty(value) {
            Ok(json) => println!("{}", json),
            Err(e) => eprintln!("Failed to serialize output: {}", e),
        }
    }

    fn message(&self, level: Level, message: impl Display) {
        let to_stderr = matches!(level, Level::Warning);
        let line = match self.format {
            OutputFormat::Human => format!("{} {}", level.symbol(), message),
            OutputFormat::Json => {
                let value = serde_json::json!({ "status": level.name(), "message": message.to_string() });
                match serde_json::to_string_pretty(&value) {
                    Ok(json) => json,
                    Err(_) => return,
                }
            }
        };
        if to_stderr {
            eprintln!("{}", line);
        } else {
            println!("{}", line);
        }
    }

    pub fn success(&self, message: impl Display) {
        self.message(Level::Success, message);
    }

    pub fn info(&self, message: impl Display) {
        self.message(Level::Info, message);
    }

    pub fn warning(&self, message: impl Display) {
        self.message(Level::Warning, message);
    }

    /// Rows as a rounded table, or as `{"data": [...]}`
    pub fn table<T: Tabled + Serialize>(&self, rows: Vec<T>) {
        match self.format {
            OutputFormat::Json => self.json(&serde_json::json!({ "data": rows })),
            OutputFormat::Human if rows.is_empty() => println!("{}", style("(no rows)").dim()),
            OutputFormat::Human => {
                let mut table = Table::new(rows);
                table.with(Style::rounded());
                println!("{}", table);
            }
        }
    }

    /// A command's final result, wrapped in a success envelope for JSON
    pub fn result<T: Serialize>(&self, data: T) -> anyhow::Result<()> {
        let rendered = match self.format {
            OutputFormat::Human => serde_json::to_string_pretty(&data)?,
            OutputFormat::Json => {
                serde_json::to_string_pretty(&serde_json::json!({ "status": "success", "data": data }))?
            }
        };
        println!("{}", rendered);
        Ok(())
    }

    pub fn kv(&self, key: impl Display, value: impl Display) {
        match self.format {
            OutputFormat::Human => println!("  {:<38} {}", style(format!("{}:", key)).bold(), value),
            OutputFormat::Json => self.json(&serde_json::json!({ key.to_string(): value.to_string() })),
        }
    }

    /// Section heading, human output only
    pub fn section(&self, title: impl Display) {
        if self.format == OutputFormat::Human {
            println!("\n{}", style(title).bold().underlined());
        }
    }
}
