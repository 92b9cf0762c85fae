//! Flattening resolved trees into a concrete file mapping.
//!
//! The mapping builder walks the resolved [`TargetNode`] trees depth-first
//! and produces a [`FileMapping`]: an insertion-ordered map from absolute
//! source file to absolute destination file. Source keys are unique per
//! run; later entries for an already-mapped source are ignored
//! (first-wins), which makes the *set* of copied files independent of
//! pattern overlap while keeping the chosen destination deterministic.

use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};

use crate::resolve::TargetNode;

/// Directory names that never enter a mapping, regardless of patterns.
const ARTIFACT_DIRS: &[&str] = &[".git", ".hg", ".svn", "__pycache__", "node_modules"];

/// Filename suffixes that never enter a mapping, regardless of patterns.
const ARTIFACT_SUFFIXES: &[&str] = &[".pyc", ".pyo", ".o", ".obj", ".class"];

/// An insertion-ordered mapping from source file to destination file.
///
/// # Examples
///
/// ```
/// use filestage::mapping::FileMapping;
/// use std::path::PathBuf;
///
/// let mut mapping = FileMapping::new();
/// assert!(mapping.insert(PathBuf::from("/src/a"), PathBuf::from("/dst/a")));
/// // First mapping for a source wins; later attempts are ignored
/// assert!(!mapping.insert(PathBuf::from("/src/a"), PathBuf::from("/other/a")));
/// assert_eq!(mapping.get(&PathBuf::from("/src/a")).unwrap(), &PathBuf::from("/dst/a"));
/// ```
#[derive(Debug, Clone, Default)]
pub struct FileMapping {
    entries: Vec<(PathBuf, PathBuf)>,
    by_source: HashMap<PathBuf, usize>,
}

impl FileMapping {
    /// Creates an empty mapping.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a source-to-destination pair.
    ///
    /// Returns `false` (and changes nothing) when the source is already
    /// mapped.
    pub fn insert(&mut self, source: PathBuf, destination: PathBuf) -> bool {
        if self.by_source.contains_key(&source) {
            return false;
        }
        self.by_source.insert(source.clone(), self.entries.len());
        self.entries.push((source, destination));
        true
    }

    /// Destination recorded for a source, if any.
    #[must_use]
    pub fn get(&self, source: &Path) -> Option<&PathBuf> {
        self.by_source.get(source).map(|&i| &self.entries[i].1)
    }

    /// True when the source is already mapped.
    #[must_use]
    pub fn contains_source(&self, source: &Path) -> bool {
        self.by_source.contains_key(source)
    }

    /// Number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True when the mapping holds no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterates entries in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&PathBuf, &PathBuf)> {
        self.entries.iter().map(|(s, d)| (s, d))
    }

    /// The set of destination paths.
    #[must_use]
    pub fn destination_set(&self) -> HashSet<PathBuf> {
        self.entries.iter().map(|(_, d)| d.clone()).collect()
    }
}

impl<'a> IntoIterator for &'a FileMapping {
    type Item = &'a (PathBuf, PathBuf);
    type IntoIter = std::slice::Iter<'a, (PathBuf, PathBuf)>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

/// Flattens resolved target trees into a [`FileMapping`].
///
/// # Examples
///
/// ```
/// use filestage::mapping::MappingBuilder;
/// use filestage::resolve::TargetNode;
/// use std::path::{Path, PathBuf};
///
/// let mut node = TargetNode::new(PathBuf::from("/project/src"), ".");
/// node.push_file(PathBuf::from("/project/src/main.rs"), PathBuf::from("main.rs"));
///
/// let mapping = MappingBuilder::new(Path::new("/stage")).build(&[node]);
/// assert_eq!(
///     mapping.get(&PathBuf::from("/project/src/main.rs")).unwrap(),
///     &PathBuf::from("/stage/main.rs")
/// );
/// ```
#[derive(Debug)]
pub struct MappingBuilder {
    destination_root: PathBuf,
}

impl MappingBuilder {
    /// Creates a builder targeting the given destination root.
    #[must_use]
    pub fn new(destination_root: impl Into<PathBuf>) -> Self {
        Self {
            destination_root: destination_root.into(),
        }
    }

    /// Walks the trees depth-first and accumulates the mapping.
    #[must_use]
    pub fn build(&self, nodes: &[TargetNode]) -> FileMapping {
        let mut mapping = FileMapping::new();
        for node in nodes {
            self.walk(node, &self.destination_root, &mut mapping);
        }
        mapping
    }

    fn walk(&self, node: &TargetNode, parent_destination: &Path, mapping: &mut FileMapping) {
        // "." maps into the parent's own destination directory
        let destination_dir = if node.target_basename == "." {
            parent_destination.to_path_buf()
        } else {
            parent_destination.join(&node.target_basename)
        };

        for file in &node.files {
            if is_artifact(&file.source) {
                log::debug!("excluding build artifact {}", file.source.display());
                continue;
            }
            // The relative path was fixed at resolution time, below the
            // static base of the pattern that matched the file
            mapping.insert(file.source.clone(), destination_dir.join(&file.relative));
        }

        for child in &node.children {
            self.walk(child, &destination_dir, mapping);
        }
    }
}

/// Final safety net: compiled and cache artifacts never enter a mapping,
/// regardless of what the patterns matched.
fn is_artifact(path: &Path) -> bool {
    let in_artifact_dir = path.components().any(|c| {
        c.as_os_str()
            .to_str()
            .is_some_and(|name| ARTIFACT_DIRS.contains(&name))
    });
    if in_artifact_dir {
        return true;
    }
    path.file_name()
        .and_then(|n| n.to_str())
        .is_some_and(|name| ARTIFACT_SUFFIXES.iter().any(|s| name.ends_with(s)))
}
