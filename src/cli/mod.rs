//! CLI module
//!
//! Command-line interface for browsing a product feed.
//!
//! # Commands
//!
//! - `browse` - Page through the feed until the end, printing each state
//! - `page` - Fetch a single page straight from the catalog
//! - `validate` - Check a feed config file

mod commands;
mod runner;

pub use commands::{Cli, Commands, OutputFormat};
pub use runner::Runner;
