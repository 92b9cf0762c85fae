//! Mapping materialization: copy, conflict handling, and purge.
//!
//! The [`Copier`] executes a [`FileMapping`] against the filesystem. It
//! can run in dry-run mode, in which every decision — conflict checks,
//! purge candidate computation, empty-directory analysis — is made
//! identically but no filesystem mutation is issued, so dry-run and real
//! runs report the same counts.
//!
//! The `prompt` conflict policy consults a [`ConfirmPrompt`] collaborator.
//! The built-in [`NonInteractivePrompt`] always declines, so automated
//! runs fall back to a safe skip instead of hanging on stdin.

use std::collections::{BTreeSet, HashSet};
use std::fs;
use std::path::{Path, PathBuf};

use crate::config::ConflictPolicy;
use crate::error::{Error, Result};
use crate::mapping::FileMapping;

/// Collaborator deciding whether an existing destination file may be
/// overwritten under the `prompt` conflict policy.
#[cfg_attr(test, mockall::automock)]
pub trait ConfirmPrompt {
    /// Returns `true` when the destination may be overwritten.
    fn confirm_overwrite(&mut self, destination: &Path) -> bool;
}

/// Prompt for non-interactive contexts: always declines, never blocks.
#[derive(Debug, Clone, Copy, Default)]
pub struct NonInteractivePrompt;

impl ConfirmPrompt for NonInteractivePrompt {
    fn confirm_overwrite(&mut self, _destination: &Path) -> bool {
        false
    }
}

/// Counts and failures observed while materializing a mapping.
#[derive(Debug, Clone, Default)]
pub struct CopyResult {
    /// Files copied (or that would be copied in dry-run mode).
    pub copied: usize,
    /// Files left untouched because of the conflict policy.
    pub skipped: usize,
    /// Stale destination files removed by purge.
    pub purged_files: usize,
    /// Destination directories removed because purge emptied them.
    pub purged_dirs: usize,
    /// Per-file failures: the path involved and the error message.
    pub errors: Vec<(PathBuf, String)>,
    /// Whether this result came from a dry run.
    pub dry_run: bool,
}

impl CopyResult {
    /// Human-readable one-line summary.
    ///
    /// # Examples
    ///
    /// ```
    /// use filestage::CopyResult;
    ///
    /// let result = CopyResult { copied: 2, skipped: 1, ..CopyResult::default() };
    /// assert_eq!(
    ///     result.summary(),
    ///     "copied 2, skipped 1, purged 0 files / 0 dirs, 0 errors"
    /// );
    /// ```
    #[must_use]
    pub fn summary(&self) -> String {
        format!(
            "{}copied {}, skipped {}, purged {} files / {} dirs, {} errors",
            if self.dry_run { "(dry run) " } else { "" },
            self.copied,
            self.skipped,
            self.purged_files,
            self.purged_dirs,
            self.errors.len()
        )
    }
}

/// Executes file mappings against the filesystem.
///
/// # Examples
///
/// ```no_run
/// use filestage::{Copier, ConflictPolicy, FileMapping};
///
/// let mapping = FileMapping::new();
/// let mut copier = Copier::new("/stage")
///     .with_policy(ConflictPolicy::Overwrite)
///     .purge()
///     .dry_run();
/// let result = copier.apply(&mapping).unwrap();
/// assert!(result.dry_run);
/// ```
pub struct Copier {
    destination: PathBuf,
    policy: ConflictPolicy,
    purge: bool,
    dry_run: bool,
    prompt: Box<dyn ConfirmPrompt>,
}

impl Copier {
    /// Creates a copier targeting the given destination root, with the
    /// `skip` conflict policy and a non-interactive prompt.
    #[must_use]
    pub fn new(destination: impl Into<PathBuf>) -> Self {
        Self {
            destination: destination.into(),
            policy: ConflictPolicy::default(),
            purge: false,
            dry_run: false,
            prompt: Box::new(NonInteractivePrompt),
        }
    }

    /// Sets the conflict policy.
    #[must_use]
    pub fn with_policy(mut self, policy: ConflictPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Replaces the confirmation collaborator used by the `prompt` policy.
    #[must_use]
    pub fn with_prompt(mut self, prompt: Box<dyn ConfirmPrompt>) -> Self {
        self.prompt = prompt;
        self
    }

    /// Enables purging of destination entries absent from the mapping.
    #[must_use]
    pub fn purge(mut self) -> Self {
        self.purge = true;
        self
    }

    /// Switches the copier to dry-run mode.
    #[must_use]
    pub fn dry_run(mut self) -> Self {
        self.dry_run = true;
        self
    }

    /// Materializes the mapping: copy every entry, then purge stale
    /// destination files when enabled.
    ///
    /// Per-file failures are collected into the result and never abort the
    /// batch.
    ///
    /// # Errors
    ///
    /// Fails only when the destination root cannot be created — the one
    /// condition under which no part of the run can proceed.
    pub fn apply(&mut self, mapping: &FileMapping) -> Result<CopyResult> {
        let mut result = CopyResult {
            dry_run: self.dry_run,
            ..CopyResult::default()
        };

        if !self.dry_run {
            fs::create_dir_all(&self.destination).map_err(|e| Error::DestinationUnwritable {
                path: self.destination.clone(),
                reason: e.to_string(),
            })?;
        }

        // Snapshot the destination before copying so purge candidates
        // reflect the pre-run state
        let snapshot = if self.purge {
            Some(snapshot_tree(&self.destination))
        } else {
            None
        };

        for (source, destination) in mapping.iter() {
            self.copy_entry(source, destination, &mut result);
        }

        if let Some(snapshot) = snapshot {
            self.purge_stale(&snapshot, &mapping.destination_set(), &mut result);
        }

        Ok(result)
    }

    fn copy_entry(&mut self, source: &Path, destination: &Path, result: &mut CopyResult) {
        if !source.is_file() {
            result
                .errors
                .push((source.to_path_buf(), "source file disappeared".to_string()));
            return;
        }

        if destination.exists() {
            match self.policy {
                ConflictPolicy::Overwrite => {}
                ConflictPolicy::Skip => {
                    log::debug!("destination exists, skipping {}", destination.display());
                    result.skipped += 1;
                    return;
                }
                ConflictPolicy::Prompt => {
                    if !self.prompt.confirm_overwrite(destination) {
                        result.skipped += 1;
                        return;
                    }
                }
            }
        }

        if !self.dry_run {
            if let Some(parent) = destination.parent() {
                if let Err(e) = fs::create_dir_all(parent) {
                    result.errors.push((destination.to_path_buf(), e.to_string()));
                    return;
                }
            }
            if let Err(e) = fs::copy(source, destination) {
                result.errors.push((source.to_path_buf(), e.to_string()));
                return;
            }
            preserve_mtime(source, destination);
        }

        log::debug!("copied {} -> {}", source.display(), destination.display());
        result.copied += 1;
    }

    /// Deletes destination files absent from the mapping, then removes
    /// directories the deletions emptied, bottom-up, repeatedly. The
    /// destination root itself is never removed, and mapping targets are
    /// never purge candidates — even when the conflict policy left them
    /// untouched.
    fn purge_stale(
        &self,
        snapshot: &TreeSnapshot,
        mapped: &HashSet<PathBuf>,
        result: &mut CopyResult,
    ) {
        let mut removal_failed = HashSet::new();

        for file in &snapshot.files {
            if mapped.contains(file) {
                continue;
            }
            if self.dry_run {
                result.purged_files += 1;
                continue;
            }
            match fs::remove_file(file) {
                Ok(()) => {
                    log::debug!("purged {}", file.display());
                    result.purged_files += 1;
                }
                Err(e) => {
                    removal_failed.insert(file.clone());
                    result.errors.push((file.clone(), e.to_string()));
                }
            }
        }

        // Files that will exist after the run: every mapping target, plus
        // anything that could not be deleted
        let mut surviving: HashSet<PathBuf> = mapped.clone();
        surviving.extend(removal_failed);

        // Deepest directories first, so a chain of empty parents unwinds
        // in one pass
        for dir in snapshot.dirs.iter().rev() {
            if *dir == self.destination {
                continue;
            }
            let holds_file = surviving.iter().any(|f| f.starts_with(dir));
            if holds_file {
                continue;
            }
            if self.dry_run {
                result.purged_dirs += 1;
                continue;
            }
            match fs::remove_dir(dir) {
                Ok(()) => {
                    log::debug!("removed empty directory {}", dir.display());
                    result.purged_dirs += 1;
                }
                Err(e) => {
                    // Keep the subtree: parents of an undeletable
                    // directory must not be considered empty
                    surviving.insert(dir.clone());
                    result.errors.push((dir.clone(), e.to_string()));
                }
            }
        }
    }
}

impl std::fmt::Debug for Copier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Copier")
            .field("destination", &self.destination)
            .field("policy", &self.policy)
            .field("purge", &self.purge)
            .field("dry_run", &self.dry_run)
            .finish_non_exhaustive()
    }
}

struct TreeSnapshot {
    files: Vec<PathBuf>,
    /// Sorted; iterating in reverse visits children before parents.
    dirs: BTreeSet<PathBuf>,
}

/// Walks the destination tree; unreadable subtrees contribute nothing.
fn snapshot_tree(root: &Path) -> TreeSnapshot {
    let mut snapshot = TreeSnapshot {
        files: Vec::new(),
        dirs: BTreeSet::new(),
    };
    if root.is_dir() {
        snapshot.dirs.insert(root.to_path_buf());
        walk_into(root, &mut snapshot);
    }
    snapshot
}

fn walk_into(dir: &Path, snapshot: &mut TreeSnapshot) {
    let entries = match fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) => {
            log::warn!("cannot read {}: {e}", dir.display());
            return;
        }
    };
    for entry in entries.flatten() {
        let path = entry.path();
        if path.is_dir() {
            snapshot.dirs.insert(path.clone());
            walk_into(&path, snapshot);
        } else {
            snapshot.files.push(path);
        }
    }
}

/// Carries the source's modification time onto the copy where the
/// platform supports it; failure is not an error.
fn preserve_mtime(source: &Path, destination: &Path) {
    let Ok(metadata) = fs::metadata(source) else {
        return;
    };
    let Ok(modified) = metadata.modified() else {
        return;
    };
    if let Ok(file) = fs::File::options().write(true).open(destination) {
        if let Err(e) = file.set_modified(modified) {
            log::debug!("cannot preserve mtime on {}: {e}", destination.display());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mapping::FileMapping;
    use std::fs;
    use tempfile::TempDir;

    fn touch(path: &Path, contents: &str) {
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, contents).unwrap();
    }

    fn mapping_of(pairs: &[(PathBuf, PathBuf)]) -> FileMapping {
        let mut mapping = FileMapping::new();
        for (source, dest) in pairs {
            mapping.insert(source.clone(), dest.clone());
        }
        mapping
    }

    #[test]
    fn test_copy_creates_destination_tree() {
        let temp = TempDir::new().unwrap();
        let source = temp.path().join("src/a.txt");
        touch(&source, "alpha");
        let dest_root = temp.path().join("dest");
        let dest = dest_root.join("sub/a.txt");

        let mut copier = Copier::new(&dest_root);
        let result = copier
            .apply(&mapping_of(&[(source.clone(), dest.clone())]))
            .unwrap();

        assert_eq!(result.copied, 1);
        assert_eq!(result.skipped, 0);
        assert!(result.errors.is_empty());
        assert_eq!(fs::read_to_string(&dest).unwrap(), "alpha");
    }

    #[test]
    fn test_skip_policy_leaves_existing_file() {
        let temp = TempDir::new().unwrap();
        let source = temp.path().join("src/a.txt");
        touch(&source, "new");
        let dest_root = temp.path().join("dest");
        let dest = dest_root.join("a.txt");
        touch(&dest, "old");

        let mut copier = Copier::new(&dest_root).with_policy(ConflictPolicy::Skip);
        let result = copier
            .apply(&mapping_of(&[(source.clone(), dest.clone())]))
            .unwrap();

        assert_eq!(result.copied, 0);
        assert_eq!(result.skipped, 1);
        assert_eq!(fs::read_to_string(&dest).unwrap(), "old");
    }

    #[test]
    fn test_overwrite_policy_replaces_existing_file() {
        let temp = TempDir::new().unwrap();
        let source = temp.path().join("src/a.txt");
        touch(&source, "new");
        let dest_root = temp.path().join("dest");
        let dest = dest_root.join("a.txt");
        touch(&dest, "old");

        let mut copier = Copier::new(&dest_root).with_policy(ConflictPolicy::Overwrite);
        let result = copier
            .apply(&mapping_of(&[(source.clone(), dest.clone())]))
            .unwrap();

        assert_eq!(result.copied, 1);
        assert_eq!(result.skipped, 0);
        assert_eq!(fs::read_to_string(&dest).unwrap(), "new");
    }

    #[test]
    fn test_prompt_policy_consults_collaborator() {
        let temp = TempDir::new().unwrap();
        let source = temp.path().join("src/a.txt");
        touch(&source, "new");
        let dest_root = temp.path().join("dest");
        let dest = dest_root.join("a.txt");
        touch(&dest, "old");

        let mut prompt = MockConfirmPrompt::new();
        prompt.expect_confirm_overwrite().return_const(true);

        let mut copier = Copier::new(&dest_root)
            .with_policy(ConflictPolicy::Prompt)
            .with_prompt(Box::new(prompt));
        let result = copier
            .apply(&mapping_of(&[(source.clone(), dest.clone())]))
            .unwrap();

        assert_eq!(result.copied, 1);
        assert_eq!(fs::read_to_string(&dest).unwrap(), "new");
    }

    #[test]
    fn test_prompt_policy_defaults_to_safe_skip() {
        let temp = TempDir::new().unwrap();
        let source = temp.path().join("src/a.txt");
        touch(&source, "new");
        let dest_root = temp.path().join("dest");
        let dest = dest_root.join("a.txt");
        touch(&dest, "old");

        // The default NonInteractivePrompt declines instead of hanging
        let mut copier = Copier::new(&dest_root).with_policy(ConflictPolicy::Prompt);
        let result = copier
            .apply(&mapping_of(&[(source.clone(), dest.clone())]))
            .unwrap();

        assert_eq!(result.skipped, 1);
        assert_eq!(fs::read_to_string(&dest).unwrap(), "old");
    }

    #[test]
    fn test_missing_source_is_recorded_not_fatal() {
        let temp = TempDir::new().unwrap();
        let present = temp.path().join("src/here.txt");
        touch(&present, "x");
        let missing = temp.path().join("src/gone.txt");
        let dest_root = temp.path().join("dest");

        let mapping = mapping_of(&[
            (missing, dest_root.join("gone.txt")),
            (present.clone(), dest_root.join("here.txt")),
        ]);

        let mut copier = Copier::new(&dest_root);
        let result = copier.apply(&mapping).unwrap();

        assert_eq!(result.copied, 1);
        assert_eq!(result.errors.len(), 1);
        assert!(result.errors[0].0.ends_with("gone.txt"));
    }

    #[test]
    fn test_purge_removes_stale_files_and_empty_dirs() {
        let temp = TempDir::new().unwrap();
        let source = temp.path().join("src/a.txt");
        touch(&source, "x");
        let dest_root = temp.path().join("dest");
        touch(&dest_root.join("stale/old.txt"), "stale");

        let mapping = mapping_of(&[(source.clone(), dest_root.join("a.txt"))]);
        let mut copier = Copier::new(&dest_root).purge();
        let result = copier.apply(&mapping).unwrap();

        assert_eq!(result.copied, 1);
        assert_eq!(result.purged_files, 1);
        assert_eq!(result.purged_dirs, 1);
        assert!(!dest_root.join("stale").exists());
        // The destination root itself survives
        assert!(dest_root.is_dir());
        assert!(dest_root.join("a.txt").is_file());
    }

    #[test]
    fn test_purge_never_deletes_mapping_targets() {
        let temp = TempDir::new().unwrap();
        let source = temp.path().join("src/a.txt");
        touch(&source, "new");
        let dest_root = temp.path().join("dest");
        let dest = dest_root.join("a.txt");
        // The target already exists and skip policy leaves it in place
        touch(&dest, "old");

        let mapping = mapping_of(&[(source.clone(), dest.clone())]);
        let mut copier = Copier::new(&dest_root).with_policy(ConflictPolicy::Skip).purge();
        let result = copier.apply(&mapping).unwrap();

        assert_eq!(result.skipped, 1);
        assert_eq!(result.purged_files, 0);
        assert_eq!(fs::read_to_string(&dest).unwrap(), "old");
    }

    #[test]
    fn test_purge_unwinds_nested_empty_directories() {
        let temp = TempDir::new().unwrap();
        let dest_root = temp.path().join("dest");
        touch(&dest_root.join("a/b/c/deep.txt"), "stale");

        let mut copier = Copier::new(&dest_root).purge();
        let result = copier.apply(&FileMapping::new()).unwrap();

        assert_eq!(result.purged_files, 1);
        assert_eq!(result.purged_dirs, 3);
        assert!(dest_root.is_dir());
        assert!(!dest_root.join("a").exists());
    }

    #[test]
    fn test_dry_run_mutates_nothing() {
        let temp = TempDir::new().unwrap();
        let source = temp.path().join("src/a.txt");
        touch(&source, "x");
        let dest_root = temp.path().join("dest");
        touch(&dest_root.join("stale/old.txt"), "stale");

        let mapping = mapping_of(&[(source.clone(), dest_root.join("a.txt"))]);
        let mut copier = Copier::new(&dest_root).purge().dry_run();
        let result = copier.apply(&mapping).unwrap();

        assert!(result.dry_run);
        assert_eq!(result.copied, 1);
        assert_eq!(result.purged_files, 1);
        assert_eq!(result.purged_dirs, 1);
        // Nothing actually changed
        assert!(!dest_root.join("a.txt").exists());
        assert!(dest_root.join("stale/old.txt").is_file());
    }

    #[test]
    fn test_dry_run_counts_match_real_run() {
        let make_fixture = |temp: &TempDir| {
            let source = temp.path().join("src/a.txt");
            touch(&source, "x");
            let dest_root = temp.path().join("dest");
            touch(&dest_root.join("a.txt"), "old");
            touch(&dest_root.join("stale/old.txt"), "stale");
            let mapping = mapping_of(&[(source.clone(), dest_root.join("a.txt"))]);
            (dest_root, mapping)
        };

        let dry_temp = TempDir::new().unwrap();
        let (dry_root, dry_mapping) = make_fixture(&dry_temp);
        let dry = Copier::new(&dry_root)
            .with_policy(ConflictPolicy::Skip)
            .purge()
            .dry_run()
            .apply(&dry_mapping)
            .unwrap();

        let real_temp = TempDir::new().unwrap();
        let (real_root, real_mapping) = make_fixture(&real_temp);
        let real = Copier::new(&real_root)
            .with_policy(ConflictPolicy::Skip)
            .purge()
            .apply(&real_mapping)
            .unwrap();

        assert_eq!(dry.copied, real.copied);
        assert_eq!(dry.skipped, real.skipped);
        assert_eq!(dry.purged_files, real.purged_files);
        assert_eq!(dry.purged_dirs, real.purged_dirs);
    }

    #[test]
    fn test_idempotent_with_overwrite_no_purge() {
        let temp = TempDir::new().unwrap();
        let source = temp.path().join("src/a.txt");
        touch(&source, "alpha");
        let dest_root = temp.path().join("dest");
        let dest = dest_root.join("a.txt");
        let mapping = mapping_of(&[(source.clone(), dest.clone())]);

        let first = Copier::new(&dest_root)
            .with_policy(ConflictPolicy::Overwrite)
            .apply(&mapping)
            .unwrap();
        let contents_after_first = fs::read_to_string(&dest).unwrap();

        let second = Copier::new(&dest_root)
            .with_policy(ConflictPolicy::Overwrite)
            .apply(&mapping)
            .unwrap();

        assert_eq!(first.copied, second.copied);
        assert_eq!(fs::read_to_string(&dest).unwrap(), contents_after_first);
    }

    #[test]
    fn test_mtime_preserved() {
        let temp = TempDir::new().unwrap();
        let source = temp.path().join("src/a.txt");
        touch(&source, "x");
        let dest_root = temp.path().join("dest");
        let dest = dest_root.join("a.txt");

        let mut copier = Copier::new(&dest_root);
        copier
            .apply(&mapping_of(&[(source.clone(), dest.clone())]))
            .unwrap();

        let source_mtime = fs::metadata(&source).unwrap().modified().unwrap();
        let dest_mtime = fs::metadata(&dest).unwrap().modified().unwrap();
        assert_eq!(source_mtime, dest_mtime);
    }

    #[test]
    fn test_summary_format() {
        let result = CopyResult {
            copied: 3,
            skipped: 1,
            purged_files: 2,
            purged_dirs: 1,
            dry_run: true,
            ..CopyResult::default()
        };
        assert_eq!(
            result.summary(),
            "(dry run) copied 3, skipped 1, purged 2 files / 1 dirs, 0 errors"
        );
    }
}
