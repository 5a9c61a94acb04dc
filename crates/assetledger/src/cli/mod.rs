//! Command-line interface for assetledger.
//!
//! This module provides the CLI structure for the `assetledger` binary.

mod commands;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

pub use commands::{ConfigCommand, ListCommand, MovementArgs, StatusCommand};

/// assetledger - Track warehouse asset movements
///
/// Records inbound and outbound movements in a local SQLite ledger and moves
/// them in and out of spreadsheets.
#[derive(Debug, Parser)]
#[command(name = "assetledger")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Path to custom configuration file
    #[arg(short, long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Use this database file instead of the configured one
    #[arg(long, global = true, value_name = "FILE")]
    pub database: Option<PathBuf>,

    /// Increase verbosity (-v for info, -vv for debug, -vvv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// The command to execute
    #[command(subcommand)]
    pub command: Command,
}

/// Available commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Record an inbound movement
    In(MovementArgs),

    /// Record an outbound movement
    Out(MovementArgs),

    /// Import movements from an .xlsx or .csv file
    Import {
        /// Spreadsheet to read
        file: PathBuf,
    },

    /// Export every movement to an .xlsx or .csv file
    Export {
        /// Destination file (.xlsx is added when no extension is given)
        file: PathBuf,
    },

    /// Write an empty import template
    Template {
        /// Destination file (.xlsx is added when no extension is given)
        file: PathBuf,
    },

    /// Show every movement
    List(ListCommand),

    /// Show ledger statistics
    Status(StatusCommand),

    /// Start the interactive shell
    Shell,

    /// View or validate configuration
    #[command(subcommand)]
    Config(ConfigCommand),
}

impl Cli {
    /// Get the verbosity level based on flags.
    #[must_use]
    pub fn verbosity(&self) -> crate::logging::Verbosity {
        if self.quiet {
            crate::logging::Verbosity::Quiet
        } else {
            match self.verbose {
                0 => crate::logging::Verbosity::Normal,
                1 => crate::logging::Verbosity::Info,
                2 => crate::logging::Verbosity::Verbose,
                _ => crate::logging::Verbosity::Trace,
            }
        }
    }
}
