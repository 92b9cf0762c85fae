//! Utility functions for CLI operations.
//!
//! This module provides common helpers used across CLI commands: global
//! option plumbing, path resolution, and the interactive overwrite prompt.

use filestage::copy::ConfirmPrompt;
use filestage::path::normalize;
use std::io::{BufRead, Write};
use std::path::{Path, PathBuf};

/// Global CLI options shared across all commands.
#[derive(Debug, Clone, Copy)]
#[allow(dead_code)] // quiet is consumed by logger initialization in main.rs
pub struct GlobalOptions {
    /// Enable verbose output.
    pub verbose: bool,

    /// Suppress non-essential output.
    pub quiet: bool,
}

/// Normalize a user-supplied path: make it absolute, expand `~` and
/// environment references, without requiring it to exist.
pub fn resolve_path(path: &Path) -> PathBuf {
    normalize(path, None)
}

/// Interactive overwrite prompt reading confirmations from stdin.
///
/// When stdin is closed (automated runs, pipelines), reads yield EOF and
/// the prompt declines — the run degrades to a safe skip instead of
/// blocking.
#[derive(Debug, Clone, Copy, Default)]
pub struct StdinPrompt;

impl ConfirmPrompt for StdinPrompt {
    fn confirm_overwrite(&mut self, destination: &Path) -> bool {
        eprint!("File exists: {}\nOverwrite? [y/N]: ", destination.display());
        let _ = std::io::stderr().flush();

        let mut answer = String::new();
        match std::io::stdin().lock().read_line(&mut answer) {
            Ok(0) | Err(_) => false, // EOF or unreadable stdin: safe skip
            Ok(_) => {
                let answer = answer.trim().to_lowercase();
                answer == "y" || answer == "yes"
            }
        }
    }
}
