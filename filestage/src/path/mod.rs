//! Path normalization for configuration and destination paths.
//!
//! This module canonicalizes the path strings that appear in configuration
//! documents, options files, and CLI arguments:
//!
//! - Expanding tilde (~) to the home directory
//! - Expanding `$VAR` / `${VAR}` environment references
//! - Joining relative paths onto a base directory (or the current directory)
//! - Resolving `.` and `..` components lexically
//!
//! Normalization is purely lexical: the resulting path is not required to
//! exist and symlinks are not followed. Malformed input degrades to a
//! best-effort cleaned path rather than an error, so every configuration
//! value can be normalized up front without failure plumbing.
//!
//! # Examples
//!
//! ```
//! use filestage::path::normalize;
//! use std::path::{Path, PathBuf};
//!
//! let n = normalize(Path::new("sub/../file.txt"), Some(Path::new("/base")));
//! assert_eq!(n, PathBuf::from("/base/file.txt"));
//! ```

pub mod normalize;

pub use normalize::{expand_env, expand_tilde, normalize, resolve_components};
