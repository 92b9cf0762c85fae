//! Common test utilities for CLI integration tests.

use std::fs;
use std::path::{Path, PathBuf};

/// Writes a file, creating parent directories as needed.
#[allow(dead_code)]
pub fn write_file(path: &Path, contents: &str) {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(path, contents).unwrap();
}

/// Writes a `.filestage.yaml` document under `dir`, returning its path.
#[allow(dead_code)]
pub fn write_config(dir: &Path, contents: &str) -> PathBuf {
    fs::create_dir_all(dir).unwrap();
    let path = dir.join(".filestage.yaml");
    fs::write(&path, contents).unwrap();
    path
}
