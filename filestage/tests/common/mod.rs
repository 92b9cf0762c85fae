//! Common test utilities for integration tests.
//!
//! This module provides fixture helpers for building temporary source
//! trees and configuration documents.

use std::fs;
use std::path::{Path, PathBuf};

use filestage::config::CONFIG_BASENAME;

/// Creates a temporary directory for testing.
///
/// The directory is cleaned up when the returned `TempDir` is dropped.
#[allow(dead_code)]
pub fn create_temp_dir() -> tempfile::TempDir {
    tempfile::tempdir().expect("failed to create temp dir")
}

/// Writes a file, creating parent directories as needed.
#[allow(dead_code)]
pub fn write_file(path: &Path, contents: &str) {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(path, contents).unwrap();
}

/// Writes a configuration document under `dir` using the conventional
/// basename, returning its path.
#[allow(dead_code)]
pub fn write_config(dir: &Path, contents: &str) -> PathBuf {
    fs::create_dir_all(dir).unwrap();
    let path = dir.join(CONFIG_BASENAME);
    fs::write(&path, contents).unwrap();
    path
}

/// Collects the basenames of all files under `root`, sorted.
#[allow(dead_code)]
pub fn tree_file_names(root: &Path) -> Vec<String> {
    let mut names = Vec::new();
    collect(root, &mut names);
    names.sort();
    names
}

fn collect(dir: &Path, names: &mut Vec<String>) {
    let Ok(entries) = fs::read_dir(dir) else {
        return;
    };
    for entry in entries.flatten() {
        let path = entry.path();
        if path.is_dir() {
            collect(&path, names);
        } else if let Some(name) = path.file_name() {
            names.push(name.to_string_lossy().into_owned());
        }
    }
}

/// Collects every file path under `root` relative to it, sorted.
#[allow(dead_code)]
pub fn tree_relative_paths(root: &Path) -> Vec<PathBuf> {
    let mut paths = Vec::new();
    collect_relative(root, root, &mut paths);
    paths.sort();
    paths
}

fn collect_relative(root: &Path, dir: &Path, paths: &mut Vec<PathBuf>) {
    let Ok(entries) = fs::read_dir(dir) else {
        return;
    };
    for entry in entries.flatten() {
        let path = entry.path();
        if path.is_dir() {
            collect_relative(root, &path, paths);
        } else if let Ok(relative) = path.strip_prefix(root) {
            paths.push(relative.to_path_buf());
        }
    }
}
