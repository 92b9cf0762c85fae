#![deny(missing_docs, unsafe_code)]
#![warn(clippy::all, clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

//! # filestage
//!
//! A library for resolving declarative file-mapping configurations and
//! staging the result on disk.
//!
//! A configuration document describes *what files go where* as a nested,
//! label-filtered tree of glob patterns, with cross-document includes and
//! placeholder directory matching. filestage resolves that tree into a
//! deterministic, cycle-safe flat mapping from source files to destination
//! files, then materializes it: copy with a configurable conflict policy,
//! and optionally purge destination entries absent from the mapping.
//!
//! ## Pipeline
//!
//! - [`ConfigDocument`]: load and decode a document
//! - [`resolve::TreeParser`] and [`resolve::resolve_includes`]: expand one
//!   label into a tree of [`resolve::TargetNode`]s
//! - [`MappingBuilder`]: flatten the trees into a [`FileMapping`]
//! - [`Copier`]: execute the mapping (copy, conflict policy, purge)
//!
//! ## Examples
//!
//! ```no_run
//! use filestage::{Copier, ConflictPolicy, MappingBuilder, Options};
//! use filestage::resolve::{resolve_documents, ResolveContext};
//! use std::path::{Path, PathBuf};
//!
//! let options = Options::default();
//! let mut ctx = ResolveContext::new(options.ignore_patterns());
//! let nodes = resolve_documents(
//!     &[PathBuf::from("/project/.filestage.yaml")],
//!     &options.selected_labels(),
//!     &mut ctx,
//! ).unwrap();
//!
//! let mapping = MappingBuilder::new("/stage").build(&nodes);
//! let result = Copier::new("/stage")
//!     .with_policy(ConflictPolicy::Overwrite)
//!     .apply(&mapping)
//!     .unwrap();
//! println!("{}", result.summary());
//! ```

pub mod concat;
pub mod config;
pub mod copy;
pub mod error;
pub mod filter;
pub mod logging;
pub mod mapping;
pub mod path;
pub mod resolve;

// Re-export key types at crate root for convenience
pub use config::{ConfigDocument, ConflictPolicy, IncludeRef, Options, OptionsFile, TargetSpec};
pub use copy::{ConfirmPrompt, Copier, CopyResult, NonInteractivePrompt};
pub use error::{Error, Result};
pub use logging::{init_logger, LogLevel, Logger};
pub use mapping::{FileMapping, MappingBuilder};
pub use resolve::{ResolveContext, TargetNode, TreeParser, VisitedSet};
