//! Pattern filtering for candidate files.
//!
//! This module applies two independent pattern sets to a list of candidate
//! paths:
//!
//! - **Exclude patterns** come from a target node's own configuration and
//!   are glob-matched against the path relative to the node's source
//!   directory.
//! - **Ignore patterns** are ambient, run-wide exclusions (VCS metadata,
//!   build caches, compiled artifacts). A pattern matches a path's basename
//!   exactly or as a glob; a pattern ending in a path separator matches
//!   directories by name.
//!
//! A path survives only if it matches no exclude pattern and no ignore
//! pattern. Both filters are pure "any match removes" checks, so the order
//! of application does not affect the result.

use std::path::{Path, PathBuf};

use glob::Pattern;

/// The built-in ignore set: VCS metadata, editor droppings, build caches
/// and compiled artifacts.
const DEFAULT_IGNORE: &[&str] = &[
    ".git",
    ".gitignore",
    ".svn",
    ".hg",
    ".DS_Store",
    ".idea",
    "__pycache__",
    "node_modules",
    "*.pyc",
    "*.o",
    "*.obj",
    "*.class",
    "*.swp",
    "*.bak",
    "*.tmp",
    "*.log",
];

/// Returns the built-in default ignore patterns.
///
/// # Examples
///
/// ```
/// let patterns = filestage::filter::default_ignore_patterns();
/// assert!(patterns.iter().any(|p| p == ".git"));
/// ```
#[must_use]
pub fn default_ignore_patterns() -> Vec<String> {
    DEFAULT_IGNORE.iter().map(|s| (*s).to_string()).collect()
}

/// Assembles the run-wide ignore pattern list.
///
/// Extra patterns always apply; the built-in defaults are appended when
/// `default_ignore` is enabled.
///
/// # Examples
///
/// ```
/// use filestage::filter::ignore_patterns;
///
/// let patterns = ignore_patterns(true, &["*.orig".to_string()]);
/// assert!(patterns.iter().any(|p| p == "*.orig"));
/// assert!(patterns.iter().any(|p| p == ".git"));
///
/// let only_extra = ignore_patterns(false, &["*.orig".to_string()]);
/// assert_eq!(only_extra, vec!["*.orig".to_string()]);
/// ```
#[must_use]
pub fn ignore_patterns(default_ignore: bool, extra: &[String]) -> Vec<String> {
    let mut patterns: Vec<String> = extra.to_vec();
    if default_ignore {
        patterns.extend(DEFAULT_IGNORE.iter().map(|s| (*s).to_string()));
    }
    patterns
}

/// Filters candidate paths through exclude and ignore patterns.
///
/// Exclude patterns are glob-matched against each path relative to
/// `base_dir`; ignore patterns follow the ambient matching rules described
/// in the module documentation. Patterns that fail to compile are skipped
/// with a warning rather than failing the filter.
///
/// # Examples
///
/// ```
/// use filestage::filter::filter_files;
/// use std::path::{Path, PathBuf};
///
/// let files = vec![
///     PathBuf::from("/src/a.txt"),
///     PathBuf::from("/src/b.bak"),
/// ];
/// let surviving = filter_files(&files, &[], &["*.bak".to_string()], Path::new("/src"));
/// assert_eq!(surviving, vec![PathBuf::from("/src/a.txt")]);
/// ```
#[must_use]
pub fn filter_files(
    files: &[PathBuf],
    exclude_patterns: &[String],
    ignore_patterns: &[String],
    base_dir: &Path,
) -> Vec<PathBuf> {
    let excludes = compile_patterns(exclude_patterns);

    files
        .iter()
        .filter(|path| !is_excluded(path, &excludes, base_dir))
        .filter(|path| !is_ignored(path, ignore_patterns))
        .cloned()
        .collect()
}

/// Checks a single path against the ignore pattern rules.
///
/// A pattern matches when:
/// - it equals the path's basename exactly,
/// - it glob-matches the basename, or
/// - it ends in a path separator and the path is a directory whose name
///   matches the remainder.
#[must_use]
pub fn matches_ignore_pattern(path: &Path, pattern: &str) -> bool {
    let Some(basename) = path.file_name().and_then(|n| n.to_str()) else {
        return false;
    };

    // Directory-only patterns end in a separator
    if let Some(dir_pattern) = pattern.strip_suffix('/') {
        return path.is_dir() && name_matches(basename, dir_pattern);
    }

    name_matches(basename, pattern)
}

fn name_matches(basename: &str, pattern: &str) -> bool {
    if pattern.contains(['*', '?', '[']) {
        match Pattern::new(pattern) {
            Ok(p) => p.matches(basename),
            Err(e) => {
                log::warn!("skipping unparsable ignore pattern '{pattern}': {e}");
                false
            }
        }
    } else {
        basename == pattern
    }
}

fn is_excluded(path: &Path, excludes: &[Pattern], base_dir: &Path) -> bool {
    if excludes.is_empty() {
        return false;
    }
    let relative = path.strip_prefix(base_dir).unwrap_or(path);
    excludes.iter().any(|p| p.matches_path(relative))
}

fn is_ignored(path: &Path, ignore_patterns: &[String]) -> bool {
    ignore_patterns
        .iter()
        .any(|pattern| matches_ignore_pattern(path, pattern))
}

fn compile_patterns(patterns: &[String]) -> Vec<Pattern> {
    patterns
        .iter()
        .filter_map(|raw| match Pattern::new(raw) {
            Ok(p) => Some(p),
            Err(e) => {
                log::warn!("skipping unparsable exclude pattern '{raw}': {e}");
                None
            }
        })
        .collect()
}
