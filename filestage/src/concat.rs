//! Concatenated text output of a staged tree.
//!
//! When a run configures a concatenation output, every UTF-8-readable file
//! under the destination is appended to one output file, each preceded by
//! a banner naming its path relative to the destination root. Binary files
//! are skipped per-file; the walk honors the run's ignore patterns.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::error::Result;
use crate::filter::matches_ignore_pattern;

/// Width of the `=` banner lines surrounding each file header.
const BANNER_WIDTH: usize = 80;

/// Concatenates every text file under `source_dir` into `output`.
///
/// Files and directories matching an ignore pattern are skipped, as is the
/// output file itself when it lives inside the tree. Returns the number of
/// files included.
///
/// # Errors
///
/// Fails when the output file cannot be created or written; unreadable or
/// non-UTF-8 input files are skipped, not errors.
pub fn concatenate_directory(
    source_dir: &Path,
    output: &Path,
    ignore_patterns: &[String],
) -> Result<usize> {
    if let Some(parent) = output.parent() {
        fs::create_dir_all(parent)?;
    }
    let mut out = fs::File::create(output)?;

    let mut files = Vec::new();
    collect_text_candidates(source_dir, ignore_patterns, output, &mut files);
    files.sort();

    let mut included = 0usize;
    for file in &files {
        let contents = match fs::read_to_string(file) {
            Ok(contents) => contents,
            Err(e) => {
                log::debug!("skipping non-text file {}: {e}", file.display());
                continue;
            }
        };
        let relative = file.strip_prefix(source_dir).unwrap_or(file);

        writeln!(out, "\n\n{}", "=".repeat(BANNER_WIDTH))?;
        writeln!(out, "=== FILE: {} ===", relative.display())?;
        writeln!(out, "{}\n", "=".repeat(BANNER_WIDTH))?;
        out.write_all(contents.as_bytes())?;
        included += 1;
    }

    log::info!(
        "concatenated {included} files from {} into {}",
        source_dir.display(),
        output.display()
    );
    Ok(included)
}

/// Creates the concatenated output for a completed run.
///
/// In dry-run mode nothing is written and zero is returned.
///
/// # Errors
///
/// Fails when the output cannot be written.
pub fn create_concatenated_output(
    destination: &Path,
    output: &Path,
    ignore_patterns: &[String],
    dry_run: bool,
) -> Result<usize> {
    if dry_run {
        log::info!("would create concatenated output at {}", output.display());
        return Ok(0);
    }
    concatenate_directory(destination, output, ignore_patterns)
}

fn collect_text_candidates(
    dir: &Path,
    ignore_patterns: &[String],
    output: &Path,
    files: &mut Vec<PathBuf>,
) {
    let entries = match fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) => {
            log::warn!("cannot read {}: {e}", dir.display());
            return;
        }
    };
    for entry in entries.flatten() {
        let path = entry.path();
        if path == output {
            continue;
        }
        if ignore_patterns
            .iter()
            .any(|pattern| matches_ignore_pattern(&path, pattern))
        {
            continue;
        }
        if path.is_dir() {
            collect_text_candidates(&path, ignore_patterns, output, files);
        } else {
            files.push(path);
        }
    }
}
