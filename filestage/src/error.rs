//! Error types for the filestage library.
//!
//! This module provides the error hierarchy for all operations in the
//! filestage library, using `thiserror` for ergonomic error handling.

use std::path::PathBuf;

use thiserror::Error;

/// Result type alias for operations that may fail with a filestage error.
///
/// # Examples
///
/// ```
/// use filestage::{Error, Result};
///
/// fn example_operation() -> Result<usize> {
///     Ok(0)
/// }
/// ```
pub type Result<T> = std::result::Result<T, Error>;

/// The main error type for the filestage library.
///
/// This enum encompasses all possible error conditions that can occur
/// while resolving configurations and materializing file mappings.
#[derive(Debug, Error)]
pub enum Error {
    /// An invalid filesystem path was provided.
    #[error("invalid path {}: {reason}", path.display())]
    InvalidPath {
        /// The invalid path.
        path: PathBuf,
        /// The reason the path is invalid.
        reason: String,
    },

    /// A configuration document was not found.
    #[error("configuration not found: {}", path.display())]
    ConfigNotFound {
        /// The path that was expected to hold a configuration document.
        path: PathBuf,
    },

    /// A configuration document could not be deserialized.
    #[error("configuration error: {0}")]
    Configuration(#[from] serde_yaml::Error),

    /// An I/O error occurred.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A validation error occurred.
    #[error("validation error for '{field}': {message}")]
    Validation {
        /// The field that failed validation.
        field: String,
        /// A description of the validation failure.
        message: String,
    },

    /// A placeholder directory key carries no `<variable>` part.
    #[error("placeholder pattern '{pattern}' contains no <variable> part")]
    MissingPlaceholder {
        /// The offending pattern, without its surrounding parentheses.
        pattern: String,
    },

    /// An include directive referenced an alias that is not registered.
    #[error("unknown source alias '{alias}'")]
    UnknownAlias {
        /// The alias that could not be resolved.
        alias: String,
    },

    /// The destination root cannot be created or written to.
    #[error("destination not writable {}: {reason}", path.display())]
    DestinationUnwritable {
        /// The destination root.
        path: PathBuf,
        /// The reason it is not writable.
        reason: String,
    },
}

impl Error {
    /// Check if error indicates a configuration document was missing.
    ///
    /// # Examples
    ///
    /// ```
    /// use filestage::Error;
    /// use std::path::PathBuf;
    ///
    /// let err = Error::ConfigNotFound { path: PathBuf::from("/nonexistent") };
    /// assert!(err.is_not_found());
    /// ```
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::ConfigNotFound { .. })
    }

    /// Check whether the error is node-local.
    ///
    /// Node-local errors abort resolution of a single subtree while its
    /// siblings continue; everything else aborts the whole run.
    ///
    /// # Examples
    ///
    /// ```
    /// use filestage::Error;
    ///
    /// let err = Error::MissingPlaceholder { pattern: "scenarios".into() };
    /// assert!(err.is_node_local());
    /// ```
    #[must_use]
    pub fn is_node_local(&self) -> bool {
        matches!(
            self,
            Self::MissingPlaceholder { .. } | Self::UnknownAlias { .. } | Self::Validation { .. }
        )
    }
}
