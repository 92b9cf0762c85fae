//! Copy command implementation.
//!
//! This module implements the `copy` command: resolve the requested labels
//! across the configuration documents, build the file mapping, and
//! materialize it on disk.

use crate::error::CliError;
use crate::utils::{resolve_path, GlobalOptions, StdinPrompt};
use clap::{Args, ValueEnum};
use filestage::concat::create_concatenated_output;
use filestage::resolve::{resolve_documents, ResolveContext};
use filestage::{
    ConfigDocument, ConflictPolicy, Copier, Logger, MappingBuilder, Options, OptionsFile,
};
use std::path::PathBuf;

/// Resolve the configuration and copy the mapped files.
#[derive(Args)]
pub struct CopyCommand {
    /// Configuration document to resolve (repeatable)
    #[arg(long = "config", short = 'c', value_name = "FILE")]
    pub configs: Vec<PathBuf>,

    /// Options document supplying config paths and run defaults
    #[arg(long = "options", value_name = "FILE")]
    pub options_file: Option<PathBuf>,

    /// Destination root directory
    #[arg(long, short = 'd', value_name = "DIR")]
    pub destination: Option<PathBuf>,

    /// Label to resolve (repeatable)
    #[arg(long = "label", short = 'l', value_name = "LABEL")]
    pub labels: Vec<String>,

    /// Strategy for existing destination files
    #[arg(long, value_enum, ignore_case = true)]
    pub conflict: Option<ConflictArg>,

    /// Delete destination entries absent from the mapping
    #[arg(long)]
    pub purge: bool,

    /// Compute and report everything without touching the filesystem
    #[arg(long)]
    pub dry_run: bool,

    /// Disable the built-in ignore pattern set
    #[arg(long)]
    pub no_default_ignore: bool,

    /// Extra ignore pattern (repeatable)
    #[arg(long = "ignore", value_name = "PATTERN")]
    pub extra_ignore: Vec<String>,

    /// Write a textual concatenation of the staged tree to this file
    #[arg(long, value_name = "FILE")]
    pub concat_output: Option<PathBuf>,

    /// Dump the resolved target nodes as JSON before copying
    #[arg(long)]
    pub print_nodes: bool,
}

/// Conflict policy CLI argument.
#[derive(Clone, Copy, ValueEnum)]
#[value(rename_all = "lowercase")]
pub enum ConflictArg {
    /// Replace existing destination files
    Overwrite,
    /// Leave existing destination files in place
    Skip,
    /// Ask before overwriting each existing file
    Prompt,
}

impl From<ConflictArg> for ConflictPolicy {
    fn from(arg: ConflictArg) -> Self {
        match arg {
            ConflictArg::Overwrite => Self::Overwrite,
            ConflictArg::Skip => Self::Skip,
            ConflictArg::Prompt => Self::Prompt,
        }
    }
}

impl CopyCommand {
    /// Execute the copy command.
    pub fn execute(self, global: &GlobalOptions, logger: &Logger) -> Result<(), CliError> {
        // 1. Gather config paths and base options from the options file
        let (mut configs, file_options) = match &self.options_file {
            Some(path) => OptionsFile::load(path)?,
            None => (Vec::new(), Options::default()),
        };
        configs.extend(self.configs.iter().map(|p| resolve_path(p)));

        if configs.is_empty() {
            return Err(CliError::InvalidArguments(
                "no configuration documents given (use --config or --options)".to_string(),
            ));
        }

        // 2. Layer options: document defaults, then options file, then flags
        let first_document = ConfigDocument::load(&configs[0])?;
        let mut options = match &first_document.options {
            Some(document_options) => document_options.clone().overlaid_with(&file_options),
            None => file_options,
        };
        self.apply_flags(&mut options, global);

        let destination = options
            .resolved_destination(Some(&first_document.source_dir))
            .map_err(|e| CliError::Config(e.to_string()))?;
        let labels = options.selected_labels();
        let ignore_patterns = options.ignore_patterns();

        // 3. Resolve and flatten
        let mut ctx = ResolveContext::new(ignore_patterns.clone());
        let nodes = resolve_documents(&configs, &labels, &mut ctx)?;

        if self.print_nodes {
            let rendered = serde_json::to_string_pretty(&nodes)
                .map_err(|e| CliError::Config(e.to_string()))?;
            println!("{rendered}");
        }

        let mapping = MappingBuilder::new(&destination).build(&nodes);

        if mapping.is_empty() {
            logger.warn("no files matched the selected labels");
            return Ok(());
        }

        if options.verbose || options.dry_run {
            println!("files to copy ({}):", mapping.len());
            for (source, dest) in mapping.iter() {
                println!("  {} -> {}", source.display(), dest.display());
            }
        }

        // 4. Materialize
        let mut copier = Copier::new(&destination).with_policy(options.conflict);
        if options.conflict == ConflictPolicy::Prompt {
            copier = copier.with_prompt(Box::new(StdinPrompt));
        }
        if options.purge {
            copier = copier.purge();
        }
        if options.dry_run {
            copier = copier.dry_run();
        }
        let result = copier.apply(&mapping)?;

        // 5. Optional concatenated output of the staged tree
        if let Some(output) = options.resolved_concat_output(Some(&first_document.source_dir)) {
            create_concatenated_output(&destination, &output, &ignore_patterns, options.dry_run)?;
        }

        // 6. Summary: always one line; verbose enumerates every error
        if options.verbose {
            for (path, message) in &result.errors {
                logger.error(&format!("{}: {message}", path.display()));
            }
        }
        println!("{}", result.summary());

        Ok(())
    }

    /// Applies CLI flags on top of the layered options.
    fn apply_flags(&self, options: &mut Options, global: &GlobalOptions) {
        if let Some(destination) = &self.destination {
            options.destination = destination.to_string_lossy().into_owned();
        }
        if !self.labels.is_empty() {
            options.labels = self.labels.clone();
        }
        if let Some(conflict) = self.conflict {
            options.conflict = conflict.into();
        }
        options.purge |= self.purge;
        options.dry_run |= self.dry_run;
        options.verbose |= global.verbose;
        if self.no_default_ignore {
            options.default_ignore = false;
        }
        options.extra_ignore.extend(self.extra_ignore.iter().cloned());
        if let Some(concat_output) = &self.concat_output {
            options.concat_output = Some(concat_output.to_string_lossy().into_owned());
        }
    }
}
