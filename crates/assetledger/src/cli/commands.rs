//! CLI command definitions.
//!
//! This module defines the arguments of the CLI subcommands.

use std::path::PathBuf;

use clap::{Args, Subcommand};

use crate::form::MovementForm;
use crate::view::OutputFormat;

/// Fields of a movement. Any field left out is prompted for.
#[derive(Debug, Default, Args)]
pub struct MovementArgs {
    /// Asset name
    #[arg(short, long)]
    pub name: Option<String>,

    /// Asset type (e.g. Equipment, Tool, Consumable)
    #[arg(short = 't', long = "type")]
    pub asset_type: Option<String>,

    /// Quantity moved; the sign is set by the direction
    #[arg(long, allow_hyphen_values = true)]
    pub quantity: Option<String>,

    /// Storage location
    #[arg(short, long)]
    pub location: Option<String>,
}

impl MovementArgs {
    /// Build a form from the given fields, leaving the rest empty.
    #[must_use]
    pub fn into_form(self) -> MovementForm {
        MovementForm::new(
            self.name.unwrap_or_default(),
            self.asset_type.unwrap_or_default(),
            self.quantity.unwrap_or_default(),
            self.location.unwrap_or_default(),
        )
    }
}

/// List command arguments.
#[derive(Debug, Args)]
pub struct ListCommand {
    /// Output format (defaults to the configured one)
    #[arg(short, long, value_enum)]
    pub format: Option<OutputFormat>,
}

/// Status command arguments.
#[derive(Debug, Args)]
pub struct StatusCommand {
    /// Output as JSON
    #[arg(short, long)]
    pub json: bool,
}

/// Configuration commands.
#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Show current configuration
    Show {
        /// Output as JSON
        #[arg(short, long)]
        json: bool,
    },

    /// Show the configuration file path
    Path,

    /// Validate configuration
    Validate {
        /// Path to configuration file to validate
        #[arg(short, long)]
        file: Option<PathBuf>,
    },
}
