//! CLI structure and command definitions.
//!
//! This module defines the main CLI structure using clap's derive macros,
//! including global options and subcommands.

use crate::commands::{CompletionsCommand, CopyCommand, ListLabelsCommand};
use clap::{Parser, Subcommand};

/// Command-line tool for staging files from declarative configuration.
#[derive(Parser)]
#[command(name = "filestage")]
#[command(
    version,
    about = "Stage files into a destination tree from declarative configuration",
    long_about = None
)]
pub struct Cli {
    /// Enable verbose output
    #[arg(long, global = true)]
    pub verbose: bool,

    /// Suppress non-essential output
    #[arg(long, global = true)]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Command,
}

/// Available CLI commands.
#[derive(Subcommand)]
pub enum Command {
    /// Resolve the configuration and copy the mapped files
    Copy(CopyCommand),

    /// List labels declared across the configuration documents
    ListLabels(ListLabelsCommand),

    /// Generate shell completion scripts
    Completions(CompletionsCommand),
}
