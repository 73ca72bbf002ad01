//! CLI interface and argument parsing
//!
//! This module provides the `medrecord` admin command-line interface using
//! clap.

pub mod commands;

use clap::{Parser, Subcommand};

/// Exit code for success
pub const EXIT_OK: i32 = 0;
/// Exit code for invalid configuration or arguments
pub const EXIT_INVALID: i32 = 1;
/// Exit code for unrecoverable failures
pub const EXIT_FATAL: i32 = 5;

/// medrecord - medical record service administration
#[derive(Parser, Debug)]
#[command(name = "medrecord")]
#[command(version, about, long_about = None)]
#[command(author = "Medrecord Contributors")]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = "medrecord.toml", env = "MEDRECORD_CONFIG")]
    pub config: String,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, env = "MEDRECORD_LOG_LEVEL")]
    pub log_level: Option<String>,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Validate configuration file
    ValidateConfig(commands::validate::ValidateArgs),

    /// Initialize a new configuration file
    Init(commands::init::InitArgs),

    /// Run the aggregator once for a medical record
    ProcessRecord(commands::process::ProcessArgs),
}
