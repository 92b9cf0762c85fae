//! Config tree parsing: from decoded target specs to resolved nodes.
//!
//! The parser turns one label section of a [`ConfigDocument`] into a tree
//! of [`TargetNode`]s with concrete files. Per node it:
//!
//! 1. expands every include pattern with recursive glob semantics rooted
//!    at the node's source directory,
//! 2. filters the matches through the node's exclude patterns and the
//!    run-wide ignore patterns,
//! 3. turns matched *directories* into synthetic child nodes carrying a
//!    single `*` pattern (which is how "include this whole directory"
//!    works without special-cased directory copy logic),
//! 4. expands parenthesized placeholder keys into one child node per
//!    matching directory, named by the extracted variable value, and
//! 5. splices include directives through the include resolver.
//!
//! Destination layout: each match keeps its path relative to the static
//! base of the pattern that produced it. `src/*.txt` stages basenames
//! (the base is `src`); `src/**/*.rs` keeps subpaths below `src` rather
//! than flattening them.
//!
//! Errors inside one node abort only that subtree; siblings continue.

use std::path::{Path, PathBuf};

use crate::config::{ConfigDocument, TargetSpec};
use crate::error::Result;
use crate::filter::filter_files;
use crate::path::normalize;
use crate::resolve::context::ResolveContext;
use crate::resolve::includes::resolve_includes;
use crate::resolve::node::TargetNode;
use crate::resolve::placeholder::{strip_parentheses, PlaceholderPattern};

/// Parses the label sections of one configuration document.
pub struct TreeParser<'a> {
    document: &'a ConfigDocument,
    requested: Vec<String>,
}

impl<'a> TreeParser<'a> {
    /// Creates a parser for `document`, gating `__labels__` directives
    /// against `requested`.
    #[must_use]
    pub fn new(document: &'a ConfigDocument, requested: &[String]) -> Self {
        Self {
            document,
            requested: requested.to_vec(),
        }
    }

    /// Resolves one label section into its root nodes.
    ///
    /// Marks `(document, label)` in the visited set; if the pair was
    /// already resolved this run, the label contributes nothing. A label
    /// the document does not declare also contributes nothing (other
    /// documents in the run may declare it).
    pub fn parse_label(&self, label: &str, ctx: &mut ResolveContext) -> Vec<TargetNode> {
        if !ctx.mark_visited(&self.document.path, label) {
            log::debug!(
                "skipping {}:{label}: already resolved",
                self.document.path.display()
            );
            return Vec::new();
        }

        let Some(spec) = self.document.target(label) else {
            return Vec::new();
        };

        match self.parse_regular(".", &self.document.source_dir, spec, ctx) {
            Ok(mut nodes) => {
                for node in &mut nodes {
                    if node.labels.is_empty() {
                        node.labels = vec![label.to_string()];
                    }
                }
                nodes
            }
            Err(e) => {
                log::warn!(
                    "{}: dropping label '{label}': {e}",
                    self.document.path.display()
                );
                Vec::new()
            }
        }
    }

    /// Parses one spec, dispatching placeholder keys to their expansion.
    fn parse_spec(
        &self,
        basename: &str,
        source_dir: &Path,
        spec: &TargetSpec,
        ctx: &mut ResolveContext,
    ) -> Result<Vec<TargetNode>> {
        match strip_parentheses(basename) {
            Some(inner) => self.parse_placeholder(inner, source_dir, spec, ctx),
            None => self.parse_regular(basename, source_dir, spec, ctx),
        }
    }

    /// Expands a placeholder key into one node per matching directory.
    fn parse_placeholder(
        &self,
        pattern: &str,
        source_dir: &Path,
        spec: &TargetSpec,
        ctx: &mut ResolveContext,
    ) -> Result<Vec<TargetNode>> {
        let placeholder = PlaceholderPattern::parse(pattern)?;
        let full_glob = normalize(Path::new(&placeholder.glob), Some(source_dir));

        let mut nodes = Vec::new();
        for matched in expand_glob(&full_glob) {
            if !matched.is_dir() {
                continue;
            }
            let Ok(relative) = matched.strip_prefix(source_dir) else {
                continue;
            };
            let relative = relative.to_string_lossy().replace('\\', "/");
            let Some(value) = placeholder.extract(&relative) else {
                continue;
            };
            nodes.extend(self.parse_regular(&value, &matched, spec, ctx)?);
        }
        // Zero matches is not an error; the node is simply dropped
        Ok(nodes)
    }

    /// Parses a regular (non-placeholder) node.
    fn parse_regular(
        &self,
        basename: &str,
        parent_source_dir: &Path,
        spec: &TargetSpec,
        ctx: &mut ResolveContext,
    ) -> Result<Vec<TargetNode>> {
        // Label gating: empty list means visible under all requested labels
        if !spec.labels.is_empty()
            && !spec.labels.iter().any(|l| self.requested.contains(l))
        {
            log::debug!(
                "skipping target '{basename}': labels {:?} not requested",
                spec.labels
            );
            return Ok(Vec::new());
        }

        let source_dir = self.effective_source_dir(parent_source_dir, spec);

        let mut node = TargetNode::new(source_dir.clone(), basename);
        node.labels = spec.labels.clone();

        // Expand include patterns, tracking each pattern's static base so
        // matches keep their layout below it
        let mut directories: Vec<(PathBuf, PathBuf)> = Vec::new();
        for pattern in &spec.include_patterns {
            let base = pattern_base(pattern, &source_dir);
            let full = normalize(Path::new(pattern), Some(&source_dir));
            let matches = expand_glob(&full);
            let surviving = filter_files(
                &matches,
                &spec.exclude_patterns,
                &ctx.ignore_patterns,
                &source_dir,
            );
            for path in surviving {
                let relative = match path.strip_prefix(&base) {
                    Ok(relative) if !relative.as_os_str().is_empty() => relative.to_path_buf(),
                    _ => match path.file_name() {
                        Some(name) => PathBuf::from(name),
                        None => continue,
                    },
                };
                if path.is_dir() {
                    directories.push((path, relative));
                } else {
                    node.push_file(path, relative);
                }
            }
        }

        // Nested children first, then directory synthetics, then
        // placeholder expansions; mappings are keyed by source path so
        // this order only matters for display
        let mut placeholder_children = Vec::new();
        for (name, child_spec) in &spec.children {
            if strip_parentheses(name).is_some() {
                placeholder_children.push((name, child_spec));
                continue;
            }
            match self.parse_spec(name, &source_dir, child_spec, ctx) {
                Ok(children) => node.children.extend(children),
                Err(e) => log::warn!("dropping target '{name}': {e}"),
            }
        }

        for (directory, relative) in directories {
            let name = relative.to_string_lossy().replace('\\', "/");
            let synthetic = TargetSpec {
                include_patterns: vec!["*".to_string()],
                ..TargetSpec::default()
            };
            match self.parse_regular(&name, &directory, &synthetic, ctx) {
                Ok(children) => node.children.extend(children),
                Err(e) => log::warn!("dropping directory '{}': {e}", directory.display()),
            }
        }

        for (name, child_spec) in placeholder_children {
            match self.parse_spec(name, &source_dir, child_spec, ctx) {
                Ok(children) => node.children.extend(children),
                Err(e) => log::warn!("dropping target '{name}': {e}"),
            }
        }

        node.children
            .extend(resolve_includes(&spec.includes, self.document, ctx));

        log::debug!(
            "resolved target '{basename}' with {} files, {} children",
            node.files.len(),
            node.children.len()
        );
        Ok(vec![node])
    }

    /// Applies the `__source_dir__` and `__cd__` directives.
    fn effective_source_dir(&self, parent: &Path, spec: &TargetSpec) -> PathBuf {
        let base = spec.source_dir.as_ref().map_or_else(
            || parent.to_path_buf(),
            |dir| normalize(Path::new(dir), Some(&self.document.source_dir)),
        );
        match &spec.cd {
            Some(cd) => normalize(Path::new(cd), Some(&base)),
            None => base,
        }
    }
}

/// The static base of a pattern: its leading glob-free directory
/// components (never including the final component), resolved against the
/// node's source directory. Matches are staged relative to this base.
fn pattern_base(pattern: &str, source_dir: &Path) -> PathBuf {
    let segments: Vec<&str> = pattern.split('/').collect();
    let head = &segments[..segments.len().saturating_sub(1)];

    let mut literal = Vec::new();
    for segment in head {
        if segment.contains(['*', '?', '[', '<']) {
            break;
        }
        literal.push(*segment);
    }

    if literal.is_empty() {
        source_dir.to_path_buf()
    } else {
        normalize(Path::new(&literal.join("/")), Some(source_dir))
    }
}

/// Expands one absolute glob pattern; unreadable entries and unparsable
/// patterns degrade to an empty contribution.
fn expand_glob(pattern: &Path) -> Vec<PathBuf> {
    let Some(pattern) = pattern.to_str() else {
        log::warn!("skipping non-UTF-8 glob pattern {}", pattern.display());
        return Vec::new();
    };
    match glob::glob(pattern) {
        Ok(paths) => paths
            .filter_map(|entry| match entry {
                Ok(path) => Some(path),
                Err(e) => {
                    log::debug!("skipping unreadable glob match: {e}");
                    None
                }
            })
            .collect(),
        Err(e) => {
            log::warn!("skipping unparsable pattern '{pattern}': {e}");
            Vec::new()
        }
    }
}
