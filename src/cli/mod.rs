//! CLI interface and argument parsing
//!
//! The `cell-import` binary hosts the import workflow: download the
//! template, preview a file, run the import and collect the credentials.

pub mod commands;

use clap::{Parser, Subcommand};

/// Cell Import - bulk generation, cell and leader import
#[derive(Parser, Debug)]
#[command(name = "cell-import")]
#[command(version, about, long_about = None)]
#[command(author = "Cell Import Contributors")]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = "cell-import.toml", env = "CELL_IMPORT_CONFIG")]
    pub config: String,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, env = "CELL_IMPORT_LOG_LEVEL")]
    pub log_level: Option<String>,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Write the import template
    Template(commands::template::TemplateArgs),

    /// Validate a file and show what an import would create
    Preview(commands::preview::PreviewArgs),

    /// Import a file and export the leader credentials
    Import(commands::import::ImportArgs),

    /// Validate configuration file
    ValidateConfig(commands::validate::ValidateArgs),

    /// Initialize a new configuration file
    Init(commands::init::InitArgs),
}
