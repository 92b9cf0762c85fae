//! Resolved target nodes.

use std::path::PathBuf;

use serde::Serialize;

/// One concrete file resolved at a node.
///
/// `relative` is the file's path relative to the static base of the
/// pattern that matched it, and becomes the path under the node's
/// destination directory. A file matched by `src/*.txt` keeps only its
/// basename (the base is `src`), while a deep match from `src/**/*.rs`
/// keeps its subpath below `src` rather than being flattened.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StagedFile {
    /// Absolute source path.
    pub source: PathBuf,
    /// Destination path relative to the node's destination directory.
    pub relative: PathBuf,
}

/// One resolved node in the output tree.
///
/// A node carries the directory its files are read from, the name of the
/// subdirectory it maps to under its parent's destination, the concrete
/// files matched at this level, and its child nodes. Children are
/// exclusively owned; there are no back-references.
///
/// # Examples
///
/// ```
/// use filestage::resolve::TargetNode;
/// use std::path::PathBuf;
///
/// let node = TargetNode::new(PathBuf::from("/project/src"), "src");
/// assert_eq!(node.target_basename, "src");
/// assert!(node.files.is_empty());
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TargetNode {
    /// Absolute path files are read from at this node.
    pub source_dir: PathBuf,
    /// Name of the subdirectory under the parent's destination; `"."`
    /// means the parent's own destination directory.
    pub target_basename: String,
    /// Concrete files matched at this node.
    pub files: Vec<StagedFile>,
    /// Child nodes.
    pub children: Vec<TargetNode>,
    /// Labels this node is visible under; empty means all requested labels.
    pub labels: Vec<String>,
}

impl TargetNode {
    /// Creates an empty node.
    #[must_use]
    pub fn new(source_dir: PathBuf, target_basename: impl Into<String>) -> Self {
        Self {
            source_dir,
            target_basename: target_basename.into(),
            ..Self::default()
        }
    }

    /// Adds a staged file.
    pub fn push_file(&mut self, source: PathBuf, relative: PathBuf) {
        self.files.push(StagedFile { source, relative });
    }

    /// Total number of files in this node and all descendants.
    #[must_use]
    pub fn file_count(&self) -> usize {
        self.files.len() + self.children.iter().map(Self::file_count).sum::<usize>()
    }

    /// True when neither this node nor any descendant carries a file.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.file_count() == 0
    }
}
