//! Main entry point for the filestage CLI.
//!
//! This is the command-line interface for the filestage file-mapping tool.
//! It provides commands for resolving and materializing configurations:
//! - `copy`: resolve the configuration and copy the mapped files
//! - `list-labels`: list labels declared across configuration documents
//! - `completions`: generate shell completion scripts

mod cli;
mod commands;
mod error;
mod utils;

use clap::Parser;
use cli::Cli;
use utils::GlobalOptions;

fn main() {
    // Parse CLI arguments
    let cli = Cli::parse();

    // Initialize logging based on verbosity
    let logger = filestage::init_logger(cli.verbose, cli.quiet);

    // Convert CLI args to GlobalOptions
    let global = GlobalOptions {
        verbose: cli.verbose,
        quiet: cli.quiet,
    };

    // Execute the command
    let result = match cli.command {
        cli::Command::Copy(cmd) => cmd.execute(&global, &logger),
        cli::Command::ListLabels(cmd) => cmd.execute(&global, &logger),
        cli::Command::Completions(cmd) => cmd.execute(&global),
    };

    // Handle errors and set exit code
    match result {
        Ok(()) => std::process::exit(0),
        Err(e) => {
            eprintln!("Error: {e}");
            std::process::exit(e.exit_code());
        }
    }
}
