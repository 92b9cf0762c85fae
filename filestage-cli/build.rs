//! Build script for filestage-cli.
//!
//! This script generates man pages at build time using clap_mangen.
//! The generated man page is placed in OUT_DIR for inclusion in release builds.
//!
//! Note: We build a minimal command structure here rather than importing from
//! the main crate, since build scripts cannot depend on the crate being built.

use clap::{Arg, Command};
use clap_mangen::Man;
use std::fs;
use std::path::PathBuf;

/// Build the CLI command structure for man page generation.
///
/// IMPORTANT: Keep this structure synchronized with src/cli.rs
/// When adding/removing/modifying commands, update both files.
fn build_cli() -> Command {
    Command::new("filestage")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Stage files into a destination tree from declarative configuration")
        .long_about(
            "Command-line tool that resolves declarative file-mapping configurations \
             and copies the matched files into a destination tree",
        )
        .arg(
            Arg::new("verbose")
                .long("verbose")
                .help("Enable verbose output")
                .global(true)
                .action(clap::ArgAction::SetTrue),
        )
        .arg(
            Arg::new("quiet")
                .long("quiet")
                .help("Suppress non-essential output")
                .global(true)
                .action(clap::ArgAction::SetTrue),
        )
        .subcommands(vec![
            Command::new("copy")
                .about("Resolve the configuration and copy the mapped files")
                .long_about(
                    "Resolve the requested labels across the configuration documents, \
                     build the file mapping, and materialize it on disk",
                ),
            Command::new("list-labels")
                .about("List labels declared across the configuration documents")
                .long_about(
                    "Display the sorted, deduplicated label set of the given documents \
                     and everything they transitively reference",
                ),
            Command::new("completions")
                .about("Generate shell completion scripts")
                .long_about("Generate completion scripts for bash, zsh, fish, and PowerShell"),
        ])
}

fn main() -> std::io::Result<()> {
    let out_dir =
        PathBuf::from(std::env::var_os("OUT_DIR").ok_or(std::io::ErrorKind::NotFound)?);

    let cmd = build_cli();
    let man = Man::new(cmd);
    let mut buffer: Vec<u8> = Vec::new();
    man.render(&mut buffer)?;

    fs::write(out_dir.join("filestage.1"), buffer)?;

    println!("cargo:rerun-if-changed=build.rs");
    Ok(())
}
