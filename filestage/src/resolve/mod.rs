//! The resolution pipeline: configuration documents to resolved trees.
//!
//! Resolution proceeds in stages:
//!
//! 1. [`ConfigDocument`](crate::config::ConfigDocument) loading decodes
//!    raw YAML into typed target specs,
//! 2. [`TreeParser`] expands one label section into a tree of
//!    [`TargetNode`]s with concrete files,
//! 3. [`resolve_includes`] splices subtrees from other documents, guarded
//!    by the [`VisitedSet`],
//! 4. [`MappingBuilder`](crate::mapping::MappingBuilder) flattens the
//!    trees into a source-to-destination mapping.
//!
//! # Examples
//!
//! ```no_run
//! use filestage::resolve::{resolve_documents, ResolveContext};
//! use std::path::PathBuf;
//!
//! let mut ctx = ResolveContext::new(vec![".git".to_string()]);
//! let nodes = resolve_documents(
//!     &[PathBuf::from("/project/.filestage.yaml")],
//!     &["default".to_string()],
//!     &mut ctx,
//! ).unwrap();
//! println!("resolved {} root nodes", nodes.len());
//! ```

pub mod context;
pub mod includes;
pub mod node;
pub mod parser;
pub mod placeholder;

pub use context::{ResolveContext, VisitedSet};
pub use includes::resolve_includes;
pub use node::{StagedFile, TargetNode};
pub use parser::TreeParser;
pub use placeholder::PlaceholderPattern;

use std::path::PathBuf;

use crate::config::ConfigDocument;
use crate::error::Result;

/// Resolves the requested labels across the given configuration documents
/// into root target nodes.
///
/// Labels resolve in the order given, per document in the order given;
/// the visited set in `ctx` keeps every `(document, label)` pair resolved
/// at most once. A requested label that no document declares is logged as
/// a warning.
///
/// # Errors
///
/// Fails when any named document cannot be read or parsed — the top-level
/// configuration is the one input a run cannot proceed without.
pub fn resolve_documents(
    config_paths: &[PathBuf],
    labels: &[String],
    ctx: &mut ResolveContext,
) -> Result<Vec<TargetNode>> {
    let mut documents = Vec::with_capacity(config_paths.len());
    for path in config_paths {
        documents.push(ConfigDocument::load(path)?);
    }

    let mut nodes = Vec::new();
    for label in labels {
        let mut found = false;
        for document in &documents {
            if document.target(label).is_some() {
                found = true;
            }
            let parser = TreeParser::new(document, labels);
            nodes.extend(parser.parse_label(label, ctx));
        }
        if !found {
            log::warn!("label '{label}' not found in any configuration document");
        }
    }

    Ok(nodes)
}
