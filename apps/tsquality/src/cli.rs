//! Command-line arguments

use std::path::PathBuf;

use clap::{Parser, ValueEnum};
use tsquality_bridge::AppConfig;

/// Output rendering
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Format {
    /// Human-readable quality table per file and column
    Summary,
    /// Chart data (bar and line series) as JSON
    Json,
}

/// Data-quality scores and series comparison for CSV time series
#[derive(Debug, Parser)]
#[command(name = "tsquality", version, about)]
pub struct Cli {
    /// Files to analyse; only names ending in `.csv` are used
    #[arg(required = true)]
    pub files: Vec<PathBuf>,

    /// Configuration file (defaults to ./tsquality.toml, then the user config dir)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Shared library implementing the analysis module
    #[arg(short, long)]
    pub module: Option<PathBuf>,

    /// Field separator
    #[arg(short, long)]
    pub separator: Option<char>,

    /// Treat the first line as data instead of a header
    #[arg(long)]
    pub no_header: bool,

    /// Output format
    #[arg(long, value_enum, default_value_t = Format::Summary)]
    pub format: Format,

    /// Use the built-in echo stub instead of a shared library
    #[arg(long, conflicts_with = "module")]
    pub stub: bool,
}

impl Cli {
    /// Apply command-line overrides on top of file configuration
    pub fn apply(&self, config: &mut AppConfig) {
        if let Some(module) = &self.module {
            config.module.path = Some(module.clone());
        }
        if let Some(separator) = self.separator {
            config.bridge.separator = separator;
        }
        if self.no_header {
            config.bridge.header = false;
        }
    }
}
