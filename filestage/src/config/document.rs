//! Configuration document loading.
//!
//! A [`ConfigDocument`] is one parsed configuration source: its label
//! sections decoded into [`TargetSpec`]s, its source aliases normalized to
//! absolute roots, and its optional document-level options. Documents are
//! immutable after parse.

use std::collections::{BTreeMap, BTreeSet, HashSet};
use std::path::{Path, PathBuf};

use crate::config::options::Options;
use crate::config::schema::{RawDocument, TargetSpec};
use crate::error::{Error, Result};
use crate::path::normalize;

/// Conventional document filename looked up in a source alias's root.
pub const CONFIG_BASENAME: &str = ".filestage.yaml";

/// One parsed configuration document.
#[derive(Debug, Clone)]
pub struct ConfigDocument {
    /// Absolute path of the document itself.
    pub path: PathBuf,
    /// Absolute directory containing the document; base for relative
    /// patterns and aliases.
    pub source_dir: PathBuf,
    /// Source aliases: alias name to absolute project root.
    pub source_aliases: BTreeMap<String, PathBuf>,
    /// Document-level run option defaults, if present.
    pub options: Option<Options>,
    /// Decoded label sections.
    targets_by_label: BTreeMap<String, TargetSpec>,
}

impl ConfigDocument {
    /// Loads and decodes a configuration document.
    ///
    /// Label sections that fail to decode degrade to an empty contribution
    /// (logged), while an unreadable or unparsable document is an error —
    /// the caller decides whether that is fatal (top-level document) or
    /// node-local (an include's document).
    ///
    /// # Errors
    ///
    /// Returns [`Error::ConfigNotFound`] if the file does not exist, or a
    /// configuration error if the YAML cannot be parsed.
    pub fn load(path: &Path) -> Result<Self> {
        let path = normalize(path, None);
        log::debug!("loading configuration document {}", path.display());

        if !path.is_file() {
            return Err(Error::ConfigNotFound { path });
        }
        let contents = std::fs::read_to_string(&path)?;
        let raw: RawDocument = serde_yaml::from_str(&contents)?;

        let source_dir = path
            .parent()
            .map_or_else(|| PathBuf::from("/"), Path::to_path_buf);

        let source_aliases = raw
            .sources
            .iter()
            .map(|(alias, root)| (alias.clone(), normalize(Path::new(root), Some(&source_dir))))
            .collect();

        let mut targets_by_label = BTreeMap::new();
        for (label, value) in &raw.targets {
            let Some(label) = label.as_str() else {
                log::warn!("{}: ignoring non-string label {label:?}", path.display());
                continue;
            };
            match TargetSpec::decode(value) {
                Ok(spec) => {
                    targets_by_label.insert(label.to_string(), spec);
                }
                Err(e) => {
                    log::warn!("{}: dropping label '{label}': {e}", path.display());
                }
            }
        }

        Ok(Self {
            path,
            source_dir,
            source_aliases,
            options: raw.options,
            targets_by_label,
        })
    }

    /// Returns the conventional document path inside a source root.
    #[must_use]
    pub fn locate(dir: &Path) -> PathBuf {
        dir.join(CONFIG_BASENAME)
    }

    /// Returns the decoded target spec for a label, if the document has
    /// that label section.
    #[must_use]
    pub fn target(&self, label: &str) -> Option<&TargetSpec> {
        self.targets_by_label.get(label)
    }

    /// Returns the labels declared by this document, sorted.
    #[must_use]
    pub fn labels(&self) -> Vec<String> {
        self.targets_by_label.keys().cloned().collect()
    }

    /// Collects the sorted, deduplicated label set across the given
    /// documents and everything they transitively reference through source
    /// aliases.
    ///
    /// Documents that cannot be loaded contribute nothing (logged); the
    /// traversal never visits the same document twice.
    #[must_use]
    pub fn all_labels(config_paths: &[PathBuf]) -> Vec<String> {
        let mut labels = BTreeSet::new();
        let mut seen = HashSet::new();
        for path in config_paths {
            collect_labels(path, &mut labels, &mut seen);
        }
        labels.into_iter().collect()
    }
}

fn collect_labels(path: &Path, labels: &mut BTreeSet<String>, seen: &mut HashSet<PathBuf>) {
    let path = normalize(path, None);
    if !seen.insert(path.clone()) {
        return;
    }

    let document = match ConfigDocument::load(&path) {
        Ok(document) => document,
        Err(e) => {
            log::warn!("skipping unreadable document {}: {e}", path.display());
            return;
        }
    };

    labels.extend(document.labels());

    for root in document.source_aliases.values() {
        let referenced = ConfigDocument::locate(root);
        if referenced.is_file() {
            collect_labels(&referenced, labels, seen);
        }
    }
}
