//! Output formatting for the recon CLI
//!
//! Every command result implements [`Outputter`] and can be rendered as a
//! human-readable table, as JSON, or (for graphs) as Graphviz DOT.

use clap::ValueEnum;
use serde::Serialize;
use std::fs;
use std::io::IsTerminal;
use std::path::Path;
use std::str::FromStr;

use anyhow::{Context, Result};

mod json;
mod table;

pub use self::json::JsonOutput;
pub use self::table::TableOutput;

/// Output format for CLI results
#[derive(Debug, Clone, Copy, Default, ValueEnum, PartialEq, Eq)]
pub enum OutputFormat {
    /// Human-readable table format (default)
    #[default]
    Table,
    /// JSON format for machine consumption
    Json,
    /// Graphviz DOT source
    Dot,
}

impl FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "table" => Ok(OutputFormat::Table),
            "json" => Ok(OutputFormat::Json),
            "dot" => Ok(OutputFormat::Dot),
            _ => Err(format!("Unknown output format: '{}'", s)),
        }
    }
}

/// Configuration for output rendering
#[derive(Debug, Clone)]
pub struct OutputConfig {
    /// The output format to use
    pub format: OutputFormat,
    /// Disable colored output
    pub no_color: bool,
    /// Compact mode (less whitespace)
    pub compact: bool,
}

impl OutputConfig {
    /// Create a new OutputConfig with the specified format
    pub fn new(format: OutputFormat) -> Self {
        Self {
            format,
            no_color: false,
            compact: false,
        }
    }

    /// Create an OutputConfig with automatic TTY detection
    ///
    /// Colors are disabled when stdout is piped or redirected.
    pub fn auto_detect(format: OutputFormat) -> Self {
        Self {
            no_color: !std::io::stdout().is_terminal(),
            ..Self::new(format)
        }
    }

    /// Builder: enable compact mode
    pub fn compact(mut self) -> Self {
        self.compact = true;
        self
    }
}

/// Column definition for table output
#[derive(Debug, Clone)]
pub struct Column {
    /// Display name for the column header
    pub name: String,
    /// Key used to extract data from the serialized row
    pub key: String,
    /// Alignment for the column content
    pub align: Alignment,
}

impl Column {
    /// Create a new left-aligned column
    pub fn new(name: impl Into<String>, key: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            key: key.into(),
            align: Alignment::Left,
        }
    }

    /// Builder: set alignment
    pub fn with_alignment(mut self, align: Alignment) -> Self {
        self.align = align;
        self
    }
}

/// Text alignment for columns
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Alignment {
    #[default]
    Left,
    Right,
}

/// Trait for types that can be formatted as output
pub trait Outputter: Serialize + Sized {
    /// Render as table format
    fn to_table(&self, config: &OutputConfig) -> String;

    /// Render as JSON format
    fn to_json(&self, config: &OutputConfig) -> String {
        JsonOutput::format(self, config)
    }

    /// Render as DOT; results that are not graphs fall back to the table
    fn to_dot(&self, config: &OutputConfig) -> String {
        self.to_table(config)
    }

    /// Render using the format specified in config
    fn render(&self, config: &OutputConfig) -> String {
        match config.format {
            OutputFormat::Table => self.to_table(config),
            OutputFormat::Json => self.to_json(config),
            OutputFormat::Dot => self.to_dot(config),
        }
    }
}

/// Result wrapper for formatted output with automatic format selection
pub struct Output<T> {
    data: T,
    config: OutputConfig,
}

impl<T: Outputter> Output<T> {
    /// Create a new output wrapper with specified format
    pub fn new(data: T, format: OutputFormat) -> Self {
        Self {
            data,
            config: OutputConfig::auto_detect(format),
        }
    }

    /// Builder: switch to compact rendering when `compact` is set
    pub fn with_compact(mut self, compact: bool) -> Self {
        if compact {
            self.config = self.config.compact();
        }
        self
    }

    /// Get the rendered string without printing
    pub fn render_to_string(&self) -> String {
        self.data.render(&self.config)
    }

    /// Render to `path`, or to stdout when no path is given
    pub fn write(&self, path: Option<&Path>) -> Result<()> {
        // Files never get escape codes
        if self.config.no_color || path.is_some() {
            colored::control::set_override(false);
        }
        let rendered = self.render_to_string();
        match path {
            Some(path) => {
                let mut content = rendered;
                if !content.ends_with('\n') {
                    content.push('\n');
                }
                fs::write(path, content)
                    .with_context(|| format!("Failed to write {}", path.display()))?;
                tracing::info!("Wrote {}", path.display());
            }
            None => println!("{}", rendered.trim_end_matches('\n')),
        }
        Ok(())
    }
}
