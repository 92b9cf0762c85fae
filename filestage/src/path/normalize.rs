//! Path normalization functions.
//!
//! This module provides functionality to normalize paths by:
//! - Expanding tilde (~) to the home directory
//! - Expanding `$VAR` and `${VAR}` environment-variable references
//! - Joining relative paths onto an optional base path
//! - Resolving `.` and `..` components
//!
//! All functions are lexical and infallible: paths are never required to
//! exist, and malformed input yields a best-effort cleaned path.

use std::env;
use std::path::{Component, Path, PathBuf};

/// Expand tilde (~) to the home directory.
///
/// This function handles `~` and `~/path`. The `~user` syntax is not
/// supported and is left unchanged, as is any path whose home directory
/// cannot be determined.
///
/// # Examples
///
/// ```
/// use filestage::path::expand_tilde;
/// use std::path::Path;
///
/// // Expands ~ to home directory
/// let expanded = expand_tilde(Path::new("~"));
/// assert!(expanded.is_absolute());
///
/// // Expands ~/path to home/path
/// let expanded = expand_tilde(Path::new("~/project"));
/// assert!(expanded.is_absolute());
/// assert!(expanded.ends_with("project"));
///
/// // Leaves absolute paths unchanged
/// let expanded = expand_tilde(Path::new("/absolute"));
/// assert_eq!(expanded, Path::new("/absolute"));
/// ```
#[must_use]
pub fn expand_tilde(path: &Path) -> PathBuf {
    let Some(path_str) = path.to_str() else {
        return path.to_path_buf();
    };

    if !path_str.starts_with('~') {
        return path.to_path_buf();
    }

    let Some(home) = home::home_dir() else {
        return path.to_path_buf();
    };

    if path_str == "~" {
        home
    } else if let Some(rest) = path_str.strip_prefix("~/").or_else(|| path_str.strip_prefix("~\\"))
    {
        home.join(rest)
    } else {
        // ~user syntax is not supported; leave as-is
        path.to_path_buf()
    }
}

/// Expand `$VAR` and `${VAR}` environment references in a path string.
///
/// Variable names consist of ASCII alphanumerics and underscores and must
/// not start with a digit. References to unset variables are left
/// unchanged, mirroring shell-style expansion of unknown names.
///
/// # Examples
///
/// ```
/// use filestage::path::expand_env;
///
/// std::env::set_var("FILESTAGE_DOCTEST_DIR", "/opt/stage");
/// assert_eq!(expand_env("$FILESTAGE_DOCTEST_DIR/out"), "/opt/stage/out");
/// assert_eq!(expand_env("${FILESTAGE_DOCTEST_DIR}/out"), "/opt/stage/out");
/// assert_eq!(expand_env("$FILESTAGE_UNSET_VAR/out"), "$FILESTAGE_UNSET_VAR/out");
/// ```
#[must_use]
pub fn expand_env(input: &str) -> String {
    let mut result = String::with_capacity(input.len());
    let mut chars = input.char_indices().peekable();

    while let Some((_, c)) = chars.next() {
        if c != '$' {
            result.push(c);
            continue;
        }

        match chars.peek() {
            Some(&(start, '{')) => {
                // ${VAR} form: scan to the closing brace
                let rest = &input[start + 1..];
                if let Some(end) = rest.find('}') {
                    let name = &rest[..end];
                    if is_valid_var_name(name) {
                        match env::var(name) {
                            Ok(value) => result.push_str(&value),
                            Err(_) => {
                                result.push('$');
                                result.push('{');
                                result.push_str(name);
                                result.push('}');
                            }
                        }
                        // Skip past "{name}"
                        for _ in 0..=name.len() + 1 {
                            chars.next();
                        }
                        continue;
                    }
                }
                result.push('$');
            }
            Some(&(start, c2)) if c2.is_ascii_alphabetic() || c2 == '_' => {
                // $VAR form: scan the identifier
                let rest = &input[start..];
                let end = rest
                    .find(|ch: char| !ch.is_ascii_alphanumeric() && ch != '_')
                    .unwrap_or(rest.len());
                let name = &rest[..end];
                match env::var(name) {
                    Ok(value) => result.push_str(&value),
                    Err(_) => {
                        result.push('$');
                        result.push_str(name);
                    }
                }
                for _ in 0..name.len() {
                    chars.next();
                }
            }
            _ => result.push('$'),
        }
    }

    result
}

fn is_valid_var_name(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

/// Resolve `.` and `..` components in a path.
///
/// This function processes path components to remove current directory (`.`)
/// references and resolve parent directory (`..`) references. A `..` that
/// would escape the root is clamped at the root rather than treated as an
/// error.
///
/// # Examples
///
/// ```
/// use filestage::path::resolve_components;
/// use std::path::{Path, PathBuf};
///
/// // Resolves . and ..
/// assert_eq!(
///     resolve_components(Path::new("/a/./b/../c")),
///     PathBuf::from("/a/c")
/// );
///
/// // Clamps .. at the root
/// assert_eq!(resolve_components(Path::new("/a/../..")), PathBuf::from("/"));
/// ```
#[must_use]
pub fn resolve_components(path: &Path) -> PathBuf {
    let mut result = PathBuf::new();
    let mut has_root = false;
    let mut depth = 0usize;

    for component in path.components() {
        match component {
            Component::RootDir => {
                result.push(component);
                has_root = true;
            }
            Component::Prefix(prefix) => {
                // Windows prefix
                result.push(prefix.as_os_str());
                has_root = true;
            }
            Component::Normal(c) => {
                result.push(c);
                depth += 1;
            }
            Component::CurDir => {
                // Skip "." - it doesn't change the path
            }
            Component::ParentDir => {
                if depth > 0 {
                    result.pop();
                    depth -= 1;
                } else if !has_root {
                    // Relative path climbing above its start; keep the ".."
                    result.push(component);
                }
                // At the root ".." is clamped
            }
        }
    }

    // Ensure we at least have a root if we started with one
    if has_root && result.as_os_str().is_empty() {
        result.push(Component::RootDir);
    }

    result
}

/// Normalize a path to absolute form.
///
/// This is the main normalization function that:
/// 1. Expands `$VAR`/`${VAR}` references and tilde (~) in `path` (and in
///    `base`, when given)
/// 2. Joins a relative `path` onto `base`, or onto the current directory
///    when no base is given
/// 3. Resolves `.` and `..` components lexically
///
/// The result is a best-effort absolute path; it is not required to exist
/// and symlinks are not followed. If the current directory cannot be
/// determined for a relative path with no base, the cleaned relative path
/// is returned as-is.
///
/// # Examples
///
/// ```
/// use filestage::path::normalize;
/// use std::path::{Path, PathBuf};
///
/// // Join onto an explicit base
/// let n = normalize(Path::new("src/main.rs"), Some(Path::new("/project")));
/// assert_eq!(n, PathBuf::from("/project/src/main.rs"));
///
/// // Resolve . and ..
/// let n = normalize(Path::new("/a/./b/../c"), None);
/// assert_eq!(n, PathBuf::from("/a/c"));
///
/// // Absolute paths ignore the base
/// let n = normalize(Path::new("/etc/hosts"), Some(Path::new("/project")));
/// assert_eq!(n, PathBuf::from("/etc/hosts"));
/// ```
#[must_use]
pub fn normalize(path: &Path, base: Option<&Path>) -> PathBuf {
    let expanded = expand_path(path);

    let absolute = if expanded.is_absolute() {
        expanded
    } else if let Some(base) = base {
        let base = expand_path(base);
        let base = if base.is_absolute() {
            base
        } else {
            match env::current_dir() {
                Ok(cwd) => cwd.join(base),
                Err(_) => base,
            }
        };
        base.join(expanded)
    } else {
        match env::current_dir() {
            Ok(cwd) => cwd.join(expanded),
            Err(_) => expanded,
        }
    };

    resolve_components(&absolute)
}

/// Apply environment and tilde expansion to a path.
fn expand_path(path: &Path) -> PathBuf {
    match path.to_str() {
        Some(s) => expand_tilde(Path::new(&expand_env(s))),
        None => expand_tilde(path),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    fn test_expand_tilde_home() {
        let home = home::home_dir().unwrap();
        assert_eq!(expand_tilde(Path::new("~")), home);
    }

    #[test]
    fn test_expand_tilde_with_path() {
        let home = home::home_dir().unwrap();
        assert_eq!(expand_tilde(Path::new("~/test")), home.join("test"));
    }

    #[test]
    fn test_expand_tilde_absolute_unchanged() {
        let path = Path::new("/absolute/path");
        assert_eq!(expand_tilde(path), path);
    }

    #[test]
    fn test_expand_tilde_user_syntax_unchanged() {
        // ~user is not supported and passes through untouched
        assert_eq!(
            expand_tilde(Path::new("~user/path")),
            PathBuf::from("~user/path")
        );
    }

    #[test]
    #[serial]
    fn test_expand_env_simple() {
        env::set_var("FILESTAGE_TEST_A", "alpha");
        assert_eq!(expand_env("$FILESTAGE_TEST_A/x"), "alpha/x");
        assert_eq!(expand_env("pre/$FILESTAGE_TEST_A"), "pre/alpha");
        env::remove_var("FILESTAGE_TEST_A");
    }

    #[test]
    #[serial]
    fn test_expand_env_braced() {
        env::set_var("FILESTAGE_TEST_B", "beta");
        assert_eq!(expand_env("${FILESTAGE_TEST_B}x"), "betax");
        env::remove_var("FILESTAGE_TEST_B");
    }

    #[test]
    fn test_expand_env_unset_left_alone() {
        assert_eq!(
            expand_env("$FILESTAGE_TEST_UNSET/x"),
            "$FILESTAGE_TEST_UNSET/x"
        );
        assert_eq!(
            expand_env("${FILESTAGE_TEST_UNSET}/x"),
            "${FILESTAGE_TEST_UNSET}/x"
        );
    }

    #[test]
    fn test_expand_env_no_variables() {
        assert_eq!(expand_env("/plain/path"), "/plain/path");
        assert_eq!(expand_env("trailing$"), "trailing$");
        assert_eq!(expand_env("a$1b"), "a$1b");
    }

    #[test]
    fn test_resolve_components_simple() {
        assert_eq!(
            resolve_components(Path::new("/a/./b/../c")),
            PathBuf::from("/a/c")
        );
    }

    #[test]
    fn test_resolve_components_multiple_parent() {
        assert_eq!(
            resolve_components(Path::new("/a/b/../../c")),
            PathBuf::from("/c")
        );
    }

    #[test]
    fn test_resolve_components_root_only() {
        assert_eq!(resolve_components(Path::new("/")), PathBuf::from("/"));
    }

    #[test]
    fn test_resolve_components_clamps_at_root() {
        assert_eq!(resolve_components(Path::new("/a/../..")), PathBuf::from("/"));
        assert_eq!(resolve_components(Path::new("/../a")), PathBuf::from("/a"));
    }

    #[test]
    fn test_resolve_components_relative_keeps_leading_parent() {
        assert_eq!(
            resolve_components(Path::new("../a/b/..")),
            PathBuf::from("../a")
        );
    }

    #[test]
    #[cfg(unix)]
    fn test_normalize_absolute() {
        let normalized = normalize(Path::new("/a/./b/../c"), None);
        assert_eq!(normalized, PathBuf::from("/a/c"));
        assert!(normalized.is_absolute());
    }

    #[test]
    fn test_normalize_with_base() {
        let normalized = normalize(Path::new("sub/file.txt"), Some(Path::new("/base/dir")));
        assert_eq!(normalized, PathBuf::from("/base/dir/sub/file.txt"));
    }

    #[test]
    fn test_normalize_base_ignored_for_absolute() {
        let normalized = normalize(Path::new("/etc/hosts"), Some(Path::new("/base")));
        assert_eq!(normalized, PathBuf::from("/etc/hosts"));
    }

    #[test]
    fn test_normalize_relative_no_base_uses_cwd() {
        let cwd = env::current_dir().unwrap();
        let normalized = normalize(Path::new("relative/path"), None);
        assert!(normalized.is_absolute());
        assert!(normalized.starts_with(&cwd));
        assert!(normalized.ends_with("relative/path"));
    }

    #[test]
    fn test_normalize_parent_escape_from_base() {
        let normalized = normalize(Path::new("../sibling"), Some(Path::new("/base/dir")));
        assert_eq!(normalized, PathBuf::from("/base/sibling"));
    }

    #[test]
    fn test_normalize_tilde() {
        let home = home::home_dir().unwrap();
        let normalized = normalize(Path::new("~/test"), None);
        assert_eq!(normalized, home.join("test"));
        assert!(normalized.is_absolute());
    }

    #[test]
    #[serial]
    fn test_normalize_env_in_base() {
        env::set_var("FILESTAGE_TEST_BASE", "/srv/data");
        let normalized = normalize(Path::new("x.txt"), Some(Path::new("$FILESTAGE_TEST_BASE")));
        assert_eq!(normalized, PathBuf::from("/srv/data/x.txt"));
        env::remove_var("FILESTAGE_TEST_BASE");
    }

    // Property-based tests
    #[cfg(all(unix, feature = "property-tests"))]
    mod property_tests {
        use super::*;
        use proptest::prelude::*;

        // Strategy to generate valid path strings (Unix-like paths)
        fn path_strategy() -> impl Strategy<Value = String> {
            prop::collection::vec("[a-zA-Z0-9_-]{1,10}", 1..=5)
                .prop_map(|parts| format!("/{}", parts.join("/")))
        }

        // Strategy for paths with . and .. components
        fn path_with_dots_strategy() -> impl Strategy<Value = String> {
            prop::collection::vec(
                prop_oneof![
                    Just(".".to_string()),
                    Just("..".to_string()),
                    "[a-zA-Z0-9_-]{1,10}".prop_map(|s| s),
                ],
                1..=8,
            )
            .prop_map(|parts| format!("/{}", parts.join("/")))
        }

        proptest! {
            /// Normalization always produces absolute paths
            #[test]
            fn normalize_always_absolute(s in path_strategy()) {
                let normalized = normalize(Path::new(&s), None);
                prop_assert!(normalized.is_absolute());
            }

            /// Normalization is idempotent (normalizing twice gives same result)
            #[test]
            fn normalize_idempotent(s in path_with_dots_strategy()) {
                let norm1 = normalize(Path::new(&s), None);
                let norm2 = normalize(&norm1, None);
                prop_assert_eq!(norm1, norm2);
            }

            /// Normalized paths don't contain . components
            #[test]
            fn normalize_no_current_dir(s in path_with_dots_strategy()) {
                let normalized = normalize(Path::new(&s), None);
                for component in normalized.components() {
                    prop_assert_ne!(component, std::path::Component::CurDir);
                }
            }

            /// Normalized paths don't contain .. components
            #[test]
            fn normalize_no_parent_dir(s in path_with_dots_strategy()) {
                let normalized = normalize(Path::new(&s), None);
                for component in normalized.components() {
                    prop_assert_ne!(component, std::path::Component::ParentDir);
                }
            }

            /// resolve_components preserves absolute paths
            #[test]
            fn resolve_components_preserves_absolute(s in path_with_dots_strategy()) {
                let resolved = resolve_components(Path::new(&s));
                prop_assert!(resolved.is_absolute());
            }
        }
    }
}
