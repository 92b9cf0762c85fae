//! Configuration schema definitions.
//!
//! This module defines the raw serde-level shape of a configuration
//! document and the one-time decode of target node mappings into a typed
//! form. A node mapping's entries fall into four kinds, modeled by
//! [`NodeEntry`]:
//!
//! - a key with value `true` is an **include pattern**,
//! - a key with value `false` is an **exclude pattern**,
//! - a key with a mapping value is a **child node**,
//! - a double-underscore key is a **directive** (`__include__`,
//!   `__labels__`, `__cd__`, `__source_dir__`).
//!
//! [`TargetSpec`] is the folded result of decoding all entries; every
//! downstream stage works with it rather than raw YAML.

use std::fmt;
use std::str::FromStr;

use serde::Deserialize;
use serde_yaml::{Mapping, Value};

use crate::config::options::Options;
use crate::error::{Error, Result};

/// Reserved directive keys.
const KEY_INCLUDE: &str = "__include__";
const KEY_LABELS: &str = "__labels__";
const KEY_CD: &str = "__cd__";
const KEY_SOURCE_DIR: &str = "__source_dir__";

/// Raw serde-level shape of a configuration document.
///
/// The `targets` section is kept as a YAML mapping so that label sections
/// can be decoded individually (a malformed section degrades to an empty
/// contribution instead of failing the whole document).
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawDocument {
    /// Source aliases: alias name to another project's root path.
    #[serde(default)]
    pub sources: std::collections::BTreeMap<String, String>,

    /// Document-level run option defaults.
    #[serde(default)]
    pub options: Option<Options>,

    /// Label sections, each holding one raw target node mapping.
    #[serde(default)]
    pub targets: Mapping,
}

/// A reference to another source's targets: `alias` or `alias.label`.
///
/// A bare alias pulls every label of the referenced document.
///
/// # Examples
///
/// ```
/// use filestage::config::IncludeRef;
///
/// let all: IncludeRef = "otherlib".parse().unwrap();
/// assert_eq!(all.alias, "otherlib");
/// assert!(all.label.is_none());
///
/// let one: IncludeRef = "otherlib.ci".parse().unwrap();
/// assert_eq!(one.label.as_deref(), Some("ci"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IncludeRef {
    /// The source alias to pull from.
    pub alias: String,
    /// The label to pull, or `None` for all labels of that source.
    pub label: Option<String>,
}

impl FromStr for IncludeRef {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let (alias, label) = match s.split_once('.') {
            Some((alias, label)) => (alias, Some(label.to_string())),
            None => (s, None),
        };
        if alias.is_empty() || label.as_deref() == Some("") {
            return Err(Error::Validation {
                field: KEY_INCLUDE.to_string(),
                message: format!("invalid include reference '{s}' (expected 'alias' or 'alias.label')"),
            });
        }
        Ok(Self {
            alias: alias.to_string(),
            label,
        })
    }
}

impl fmt::Display for IncludeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.label {
            Some(label) => write!(f, "{}.{label}", self.alias),
            None => write!(f, "{}", self.alias),
        }
    }
}

/// A directive entry inside a target node mapping.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Directive {
    /// `__include__`: splice targets from other sources.
    Include(Vec<IncludeRef>),
    /// `__labels__`: gate this node to the given labels.
    Labels(Vec<String>),
    /// `__cd__`: descend into a subdirectory of the node's source directory.
    Cd(String),
    /// `__source_dir__`: replace the node's source directory outright.
    SourceDir(String),
}

/// One decoded entry of a target node mapping.
#[derive(Debug, Clone, PartialEq)]
pub enum NodeEntry {
    /// A filename pattern to include (`key: true`).
    Include(String),
    /// A filename pattern to exclude (`key: false`).
    Exclude(String),
    /// A nested child node (`key: { ... }`).
    Child(String, TargetSpec),
    /// A reserved `__*__` directive.
    Directive(Directive),
}

/// The decoded form of one target node mapping.
///
/// Entries are folded in document order; children preserve their order of
/// appearance.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TargetSpec {
    /// Filename patterns to include (glob, `**` crosses directories).
    pub include_patterns: Vec<String>,
    /// Filename patterns to exclude.
    pub exclude_patterns: Vec<String>,
    /// Nested child nodes, keyed by their target basename (which may be a
    /// parenthesized placeholder pattern).
    pub children: Vec<(String, TargetSpec)>,
    /// Include directives to resolve against the document's source aliases.
    pub includes: Vec<IncludeRef>,
    /// Labels this node is visible under; empty means all requested labels.
    pub labels: Vec<String>,
    /// Subdirectory to descend into before resolving patterns.
    pub cd: Option<String>,
    /// Source directory override.
    pub source_dir: Option<String>,
}

impl TargetSpec {
    /// Decodes a raw YAML node mapping into a `TargetSpec`.
    ///
    /// # Errors
    ///
    /// Returns a validation error if the value is not a mapping, an entry
    /// has an unsupported value type, or an unknown `__*__` directive
    /// appears. These errors are node-local: callers drop the offending
    /// subtree and continue with its siblings.
    pub fn decode(value: &Value) -> Result<Self> {
        let mapping = value.as_mapping().ok_or_else(|| Error::Validation {
            field: "targets".to_string(),
            message: "target node must be a mapping".to_string(),
        })?;

        let mut spec = Self::default();
        for entry in decode_entries(mapping)? {
            match entry {
                NodeEntry::Include(pattern) => spec.include_patterns.push(pattern),
                NodeEntry::Exclude(pattern) => spec.exclude_patterns.push(pattern),
                NodeEntry::Child(name, child) => spec.children.push((name, child)),
                NodeEntry::Directive(Directive::Include(refs)) => spec.includes.extend(refs),
                NodeEntry::Directive(Directive::Labels(labels)) => spec.labels.extend(labels),
                NodeEntry::Directive(Directive::Cd(cd)) => spec.cd = Some(cd),
                NodeEntry::Directive(Directive::SourceDir(dir)) => spec.source_dir = Some(dir),
            }
        }
        Ok(spec)
    }
}

/// Decodes the entries of a node mapping into their tagged form, in
/// document order.
///
/// # Errors
///
/// Returns a validation error for non-string keys, unsupported value
/// types, or unknown directives.
pub fn decode_entries(mapping: &Mapping) -> Result<Vec<NodeEntry>> {
    let mut entries = Vec::with_capacity(mapping.len());

    for (key, value) in mapping {
        let key = key.as_str().ok_or_else(|| Error::Validation {
            field: "targets".to_string(),
            message: format!("node keys must be strings, got {key:?}"),
        })?;

        if key.starts_with("__") {
            entries.push(NodeEntry::Directive(decode_directive(key, value)?));
            continue;
        }

        match value {
            Value::Bool(true) => entries.push(NodeEntry::Include(key.to_string())),
            Value::Bool(false) => entries.push(NodeEntry::Exclude(key.to_string())),
            Value::Mapping(_) => match TargetSpec::decode(value) {
                Ok(child) => entries.push(NodeEntry::Child(key.to_string(), child)),
                // A bad child aborts only its own subtree
                Err(e) => log::warn!("dropping target '{key}': {e}"),
            },
            other => {
                return Err(Error::Validation {
                    field: key.to_string(),
                    message: format!(
                        "entry must be a boolean pattern or a nested mapping, got {other:?}"
                    ),
                });
            }
        }
    }

    Ok(entries)
}

fn decode_directive(key: &str, value: &Value) -> Result<Directive> {
    match key {
        KEY_INCLUDE => {
            let refs = string_or_list(key, value)?
                .iter()
                .map(|s| s.parse())
                .collect::<Result<Vec<IncludeRef>>>()?;
            Ok(Directive::Include(refs))
        }
        KEY_LABELS => Ok(Directive::Labels(string_or_list(key, value)?)),
        KEY_CD => Ok(Directive::Cd(expect_string(key, value)?)),
        KEY_SOURCE_DIR => Ok(Directive::SourceDir(expect_string(key, value)?)),
        other => Err(Error::Validation {
            field: other.to_string(),
            message: "unknown directive".to_string(),
        }),
    }
}

/// Accepts either a single string or a sequence of strings.
fn string_or_list(key: &str, value: &Value) -> Result<Vec<String>> {
    match value {
        Value::String(s) => Ok(vec![s.clone()]),
        Value::Sequence(seq) => seq
            .iter()
            .map(|item| {
                item.as_str().map(ToString::to_string).ok_or_else(|| Error::Validation {
                    field: key.to_string(),
                    message: format!("expected a string, got {item:?}"),
                })
            })
            .collect(),
        other => Err(Error::Validation {
            field: key.to_string(),
            message: format!("expected a string or list of strings, got {other:?}"),
        }),
    }
}

fn expect_string(key: &str, value: &Value) -> Result<String> {
    value
        .as_str()
        .map(ToString::to_string)
        .ok_or_else(|| Error::Validation {
            field: key.to_string(),
            message: format!("expected a string, got {value:?}"),
        })
}
