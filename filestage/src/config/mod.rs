//! Configuration documents and run options.
//!
//! A configuration document (conventionally `.filestage.yaml` in a project
//! root) declares *what files go where*: label sections containing nested
//! target nodes, source aliases for cross-project includes, and optional
//! document-level run options. This module owns everything up to the typed,
//! decoded form of a document; actual tree resolution lives in
//! [`crate::resolve`].
//!
//! # Document shape
//!
//! ```yaml
//! sources:
//!   otherlib: ../other-project
//! options:
//!   destination: ~/stage/{labels}
//!   conflict: overwrite
//! targets:
//!   default:
//!     src:
//!       "*.txt": true
//!       "*.bak": false
//!       "(scenarios/<name>)":
//!         "*.yaml": true
//!       __include__: [otherlib.default]
//! ```
//!
//! Raw YAML nodes are decoded exactly once, at load time, into the tagged
//! [`NodeEntry`] form; downstream stages never re-inspect untyped YAML.

pub mod document;
pub mod options;
pub mod schema;

pub use document::{ConfigDocument, CONFIG_BASENAME};
pub use options::{ConflictPolicy, Options, OptionsFile};
pub use schema::{Directive, IncludeRef, NodeEntry, TargetSpec};
