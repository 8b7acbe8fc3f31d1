//! CLI commands and argument parsing

use crate::catalog::SortOrder;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::str::FromStr;

/// Paged product feed browser
#[derive(Parser, Debug)]
#[command(name = "subtrack")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Feed configuration file (YAML or JSON)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Override the configured sort order (e.g. price-asc, created_desc)
    #[arg(short, long, global = true, value_parser = SortOrder::from_str)]
    pub sort: Option<SortOrder>,

    /// Output format
    #[arg(short, long, global = true, default_value = "text")]
    pub format: OutputFormat,

    /// Verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Command to run
    #[command(subcommand)]
    pub command: Commands,
}

/// CLI subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Load pages until the end of the feed
    Browse {
        /// Stop after this many pages
        #[arg(long)]
        max_pages: Option<u32>,
    },

    /// Fetch one page from the catalog
    Page {
        /// Page number, starting at 1
        page: u32,
    },

    /// Validate the feed configuration
    Validate,
}

/// Output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// Human-readable lines
    Text,
    /// JSON output (one message per line)
    Json,
}
