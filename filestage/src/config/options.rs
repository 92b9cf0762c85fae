//! Run options and the standalone options document.
//!
//! [`Options`] describes one run: where files go, which labels are
//! selected, how conflicts are resolved, and which ambient ignore patterns
//! apply. Options can come from three places, later sources overriding
//! earlier ones: built-in defaults, the `options:` section of a
//! configuration document, and CLI flags.
//!
//! [`OptionsFile`] is the standalone YAML options document that names the
//! configuration documents to resolve alongside the run options.

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::filter;
use crate::path::normalize;

/// Policy applied when a destination file already exists.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConflictPolicy {
    /// Replace the existing file unconditionally.
    Overwrite,
    /// Leave the existing file and record the entry as skipped.
    #[default]
    Skip,
    /// Ask a confirmation collaborator; non-interactive contexts decline.
    Prompt,
}

impl fmt::Display for ConflictPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Overwrite => write!(f, "overwrite"),
            Self::Skip => write!(f, "skip"),
            Self::Prompt => write!(f, "prompt"),
        }
    }
}

impl FromStr for ConflictPolicy {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "overwrite" => Ok(Self::Overwrite),
            "skip" => Ok(Self::Skip),
            "prompt" => Ok(Self::Prompt),
            other => Err(Error::Validation {
                field: "conflict".to_string(),
                message: format!("unknown conflict policy '{other}'"),
            }),
        }
    }
}

/// Configuration for one run.
///
/// All fields have serde defaults so partial documents deserialize
/// cleanly.
///
/// # Examples
///
/// ```
/// use filestage::{ConflictPolicy, Options};
///
/// let options = Options::default();
/// assert_eq!(options.conflict, ConflictPolicy::Skip);
/// assert_eq!(options.labels, vec!["default".to_string()]);
/// assert!(options.default_ignore);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Options {
    /// Destination root; may contain `~`, `$VAR` references and a
    /// `{labels}` placeholder substituted with the dot-joined label list.
    pub destination: String,

    /// Requested labels, in order. Duplicates are dropped on access.
    pub labels: Vec<String>,

    /// Conflict policy for existing destination files.
    pub conflict: ConflictPolicy,

    /// Enumerate every file and error in the summary.
    pub verbose: bool,

    /// Delete destination entries absent from the final mapping.
    pub purge: bool,

    /// Compute everything but mutate nothing.
    pub dry_run: bool,

    /// Apply the built-in ignore pattern set.
    pub default_ignore: bool,

    /// Extra ignore patterns applied alongside the defaults.
    pub extra_ignore: Vec<String>,

    /// Optional file receiving a textual concatenation of the staged tree.
    pub concat_output: Option<String>,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            destination: String::new(),
            labels: vec!["default".to_string()],
            conflict: ConflictPolicy::default(),
            verbose: false,
            purge: false,
            dry_run: false,
            default_ignore: true,
            extra_ignore: Vec::new(),
            concat_output: None,
        }
    }
}

impl Options {
    /// Returns the requested labels, deduplicated while preserving their
    /// first-occurrence order.
    ///
    /// # Examples
    ///
    /// ```
    /// use filestage::Options;
    ///
    /// let options = Options {
    ///     labels: vec!["ci".into(), "default".into(), "ci".into()],
    ///     ..Options::default()
    /// };
    /// assert_eq!(options.selected_labels(), vec!["ci", "default"]);
    /// ```
    #[must_use]
    pub fn selected_labels(&self) -> Vec<String> {
        let mut seen = std::collections::HashSet::new();
        self.labels
            .iter()
            .filter(|label| seen.insert(label.as_str()))
            .cloned()
            .collect()
    }

    /// Resolves the destination root to an absolute path.
    ///
    /// The `{labels}` placeholder is substituted with the dot-joined
    /// selected labels, then the result is normalized against `base`
    /// (typically the directory of the document that supplied the
    /// destination).
    ///
    /// # Errors
    ///
    /// Returns a validation error if no destination was configured.
    pub fn resolved_destination(&self, base: Option<&Path>) -> Result<PathBuf> {
        if self.destination.is_empty() {
            return Err(Error::Validation {
                field: "destination".to_string(),
                message: "no destination directory configured".to_string(),
            });
        }
        let labels = self.selected_labels().join(".");
        let substituted = self.destination.replace("{labels}", &labels);
        Ok(normalize(Path::new(&substituted), base))
    }

    /// Resolves the concatenation output path, if configured.
    #[must_use]
    pub fn resolved_concat_output(&self, base: Option<&Path>) -> Option<PathBuf> {
        self.concat_output.as_ref().map(|raw| {
            let labels = self.selected_labels().join(".");
            let substituted = raw.replace("{labels}", &labels);
            normalize(Path::new(&substituted), base)
        })
    }

    /// Assembles the run-wide ignore pattern list from the default set and
    /// the extra patterns.
    #[must_use]
    pub fn ignore_patterns(&self) -> Vec<String> {
        filter::ignore_patterns(self.default_ignore, &self.extra_ignore)
    }

    /// Overlays non-default fields of `other` onto `self`, returning the
    /// merged options. Used to apply a document's `options:` section under
    /// CLI flags.
    #[must_use]
    pub fn overlaid_with(mut self, other: &Self) -> Self {
        let defaults = Self::default();
        if other.destination != defaults.destination {
            self.destination = other.destination.clone();
        }
        if other.labels != defaults.labels {
            self.labels = other.labels.clone();
        }
        if other.conflict != defaults.conflict {
            self.conflict = other.conflict;
        }
        self.verbose |= other.verbose;
        self.purge |= other.purge;
        self.dry_run |= other.dry_run;
        if other.default_ignore != defaults.default_ignore {
            self.default_ignore = other.default_ignore;
        }
        if !other.extra_ignore.is_empty() {
            self.extra_ignore.extend(other.extra_ignore.iter().cloned());
        }
        if other.concat_output.is_some() {
            self.concat_output = other.concat_output.clone();
        }
        self
    }
}

/// The standalone options document: run options plus the configuration
/// documents to resolve.
///
/// ```yaml
/// configs:
///   - ../project-a/.filestage.yaml
///   - ../project-b/.filestage.yaml
/// destination: ~/stage/{labels}
/// labels: [default, ci]
/// purge: true
/// ```
#[derive(Debug, Clone, Default, Deserialize)]
pub struct OptionsFile {
    /// Paths of configuration documents, relative to the options file.
    #[serde(default)]
    pub configs: Vec<String>,

    /// The run options.
    #[serde(flatten)]
    pub options: Options,
}

impl OptionsFile {
    /// Loads an options document from disk.
    ///
    /// Config paths and the destination are normalized relative to the
    /// options file's directory.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ConfigNotFound`] if the file does not exist and a
    /// configuration error if it cannot be parsed. These are fatal: a run
    /// cannot proceed without its options document.
    pub fn load(path: &Path) -> Result<(Vec<PathBuf>, Options)> {
        let path = normalize(path, None);
        if !path.is_file() {
            return Err(Error::ConfigNotFound { path });
        }
        let contents = std::fs::read_to_string(&path)?;
        let parsed: Self = serde_yaml::from_str(&contents)?;

        let base = path.parent().map(Path::to_path_buf).unwrap_or_default();
        let configs = parsed
            .configs
            .iter()
            .map(|raw| normalize(Path::new(raw), Some(&base)))
            .collect();

        let mut options = parsed.options;
        if !options.destination.is_empty() {
            // Anchor a relative destination at the options file, not the CWD
            options.destination = normalize(Path::new(&options.destination), Some(&base))
                .to_string_lossy()
                .into_owned();
        }

        Ok((configs, options))
    }
}
