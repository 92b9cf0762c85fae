//! List-labels command implementation.
//!
//! This module implements the `list-labels` command, which displays the
//! sorted, deduplicated label set discoverable across the given
//! configuration documents and everything they transitively reference.
//! No filesystem mutation is performed.

use crate::error::CliError;
use crate::utils::{resolve_path, GlobalOptions};
use clap::{Args, ValueEnum};
use filestage::{ConfigDocument, Logger};
use std::path::PathBuf;

/// List labels declared across the configuration documents.
#[derive(Args)]
pub struct ListLabelsCommand {
    /// Configuration document to inspect (repeatable)
    #[arg(long = "config", short = 'c', value_name = "FILE", required = true)]
    pub configs: Vec<PathBuf>,

    /// Output format
    #[arg(long, value_enum, default_value = "plain", ignore_case = true)]
    pub format: LabelFormat,
}

/// Output format for the list-labels command.
#[derive(Clone, Copy, ValueEnum)]
#[value(rename_all = "lowercase")]
pub enum LabelFormat {
    /// One label per line
    Plain,
    /// JSON array
    Json,
}

impl ListLabelsCommand {
    /// Execute the list-labels command.
    pub fn execute(self, _global: &GlobalOptions, logger: &Logger) -> Result<(), CliError> {
        let configs: Vec<PathBuf> = self.configs.iter().map(|p| resolve_path(p)).collect();
        let labels = ConfigDocument::all_labels(&configs);

        match self.format {
            LabelFormat::Plain => {
                if labels.is_empty() {
                    logger.warn("no labels found in the given configuration documents");
                    return Ok(());
                }
                println!("Available labels:");
                for label in &labels {
                    println!("  {label}");
                }
            }
            LabelFormat::Json => {
                let json = serde_json::to_string_pretty(&labels)
                    .map_err(|e| CliError::Config(e.to_string()))?;
                println!("{json}");
            }
        }

        Ok(())
    }
}
