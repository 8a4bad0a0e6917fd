//! Ledger versus disk reconciliation
//!
//! [`get_project_status`] partitions every tracked path and every file found
//! under the managed roots into five buckets. [`sync`], [`prune`] and
//! [`validate`] turn that classification into ledger edits. All of them take
//! the ledger as a plain [`State`] value; persisting it is the caller's job
//! (see [`Project`](crate::Project)).

mod sync;
mod validate;

pub use sync::{PruneOptions, PruneReport, SyncOptions, SyncReport, adopt_record, prune, sync};
pub use validate::{ValidateOptions, ValidationIssue, ValidationReport, validate};

use std::collections::BTreeSet;
use std::path::Path;

use serde::{Deserialize, Serialize};
use textor_fs::{compute_file_checksum, is_generated, scan_directory, secure_join};

use crate::config::TextorConfig;
use crate::ledger::{State, ledger_key};
use crate::Result;

/// A tracked file whose content drifted
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModifiedFile {
    pub path: String,
    /// Hash recorded in the ledger
    pub expected_hash: String,
    /// Hash of the content on disk, empty if it could not be read
    pub current_hash: String,
}

/// A signed file the ledger does not know about
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UntrackedFile {
    pub path: String,
    pub hash: String,
}

/// Classification of the project tree against the ledger
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectStatus {
    /// Tracked, present, hash matches
    pub synced: Vec<String>,
    /// Tracked, present, hash differs
    pub modified: Vec<ModifiedFile>,
    /// Tracked, absent from disk
    pub missing: Vec<String>,
    /// Not tracked, carries a signature
    pub untracked: Vec<UntrackedFile>,
    /// Not tracked, no signature
    pub orphaned: Vec<String>,
}

impl ProjectStatus {
    /// Whether the ledger and the disk agree completely.
    pub fn is_clean(&self) -> bool {
        self.modified.is_empty()
            && self.missing.is_empty()
            && self.untracked.is_empty()
            && self.orphaned.is_empty()
    }

    /// Total number of classified paths.
    pub fn total(&self) -> usize {
        self.synced.len()
            + self.modified.len()
            + self.missing.len()
            + self.untracked.len()
            + self.orphaned.len()
    }
}

/// Classify every tracked path and every file under the managed roots.
///
/// The managed roots are scanned once into a working set. Each ledger key is
/// classified as synced, modified or missing and removed from the set; what
/// remains is untracked when it carries a signature and orphaned otherwise.
/// Ledger keys that resolve outside `root` are skipped with a warning.
pub fn get_project_status(root: &Path, config: &TextorConfig, state: &State) -> Result<ProjectStatus> {
    let normalization = config.normalization();
    let mut on_disk = scan_managed_roots(root, config)?;
    let mut status = ProjectStatus::default();

    for (key, record) in &state.files {
        let path = match secure_join(root, [key.as_str()]) {
            Ok(path) => path,
            Err(e) => {
                tracing::warn!(path = %key, error = %e, "ignoring ledger entry outside the project");
                continue;
            }
        };
        on_disk.remove(&ledger_key(key));

        if !path.is_file() {
            status.missing.push(key.clone());
            continue;
        }

        match compute_file_checksum(path.as_path(), normalization) {
            Ok(hash) if hash == record.hash => status.synced.push(key.clone()),
            Ok(hash) => {
                tracing::debug!(path = %key, expected = %record.hash, actual = %hash, "drift detected");
                status.modified.push(ModifiedFile {
                    path: key.clone(),
                    expected_hash: record.hash.clone(),
                    current_hash: hash,
                });
            }
            Err(e) => {
                tracing::warn!(path = %key, error = %e, "cannot hash tracked file");
                status.modified.push(ModifiedFile {
                    path: key.clone(),
                    expected_hash: record.hash.clone(),
                    current_hash: String::new(),
                });
            }
        }
    }

    let signatures = config.all_signatures();
    for key in on_disk {
        let path = root.join(&key);
        if !is_generated(&path, &signatures) {
            status.orphaned.push(key);
            continue;
        }
        match compute_file_checksum(&path, normalization) {
            Ok(hash) => status.untracked.push(UntrackedFile { path: key, hash }),
            Err(e) => tracing::warn!(path = %key, error = %e, "cannot hash untracked file"),
        }
    }

    tracing::debug!(
        synced = status.synced.len(),
        modified = status.modified.len(),
        missing = status.missing.len(),
        untracked = status.untracked.len(),
        orphaned = status.orphaned.len(),
        "status computed"
    );
    Ok(status)
}

/// Every file under the configured managed roots, keyed relative to `root`.
pub fn scan_managed_roots(root: &Path, config: &TextorConfig) -> Result<BTreeSet<String>> {
    let mut files = BTreeSet::new();
    for managed in config.managed_roots() {
        let dir = secure_join(root, [managed.as_str()])?;
        scan_directory(dir.root(), dir.as_path(), &config.ignore, &mut files)?;
    }
    Ok(files)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger::{FileKind, FileRecord};
    use textor_fs::calculate_hash;

    #[test]
    fn status_partitions_all_five_buckets() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        let config = TextorConfig::default();
        let norm = config.normalization();

        std::fs::create_dir_all(root.join("src/pages")).unwrap();
        std::fs::create_dir_all(root.join("src/components/Card")).unwrap();
        std::fs::write(root.join("src/pages/a.astro"), "A").unwrap();
        std::fs::write(root.join("src/pages/b.astro"), "B changed").unwrap();
        std::fs::write(
            root.join("src/components/Card/Card.astro"),
            "<!-- @generated by Textor -->\n<div/>",
        )
        .unwrap();
        std::fs::write(root.join("src/components/Card/notes.txt"), "mine").unwrap();

        let mut state = State::new();
        for (key, content) in [("src/pages/a.astro", "A"), ("src/pages/b.astro", "B"), ("src/pages/c.astro", "C")] {
            state.insert_file(key, FileRecord::new(FileKind::Route, "page", calculate_hash(content, norm)));
        }

        let status = get_project_status(root, &config, &state).unwrap();

        assert_eq!(status.synced, vec!["src/pages/a.astro"]);
        assert_eq!(status.modified.len(), 1);
        assert_eq!(status.modified[0].path, "src/pages/b.astro");
        assert_eq!(status.missing, vec!["src/pages/c.astro"]);
        assert_eq!(status.untracked.len(), 1);
        assert_eq!(status.untracked[0].path, "src/components/Card/Card.astro");
        assert_eq!(status.orphaned, vec!["src/components/Card/notes.txt"]);
        assert_eq!(status.total(), 5);
        assert!(!status.is_clean());
    }

    #[test]
    fn files_outside_managed_roots_are_not_scanned() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("README.md"), "hello").unwrap();

        let status = get_project_status(dir.path(), &TextorConfig::default(), &State::new()).unwrap();

        assert_eq!(status.total(), 0);
        assert!(status.is_clean());
    }
}
