//! CLI command implementations.
//!
//! This module contains the implementations of all CLI commands:
//! - `copy`: resolve the configuration and copy the mapped files
//! - `list_labels`: list labels declared across configuration documents
//! - `completions`: generate shell completion scripts

pub mod completions;
pub mod copy;
pub mod list_labels;

pub use completions::CompletionsCommand;
pub use copy::CopyCommand;
pub use list_labels::ListLabelsCommand;
