//! Folding disk changes back into the ledger

use std::path::Path;

use chrono::Utc;
use serde::{Deserialize, Serialize};
use textor_fs::{NormalizedPath, compute_file_checksum};

use super::get_project_status;
use crate::config::{ManagedRoot, TextorConfig};
use crate::ledger::{FileKind, FileRecord, State, derive_route, reconstruct_components, reconstruct_sections};
use crate::{Error, Result};

/// Template name recorded for files adopted from disk
pub const ADOPTED_TEMPLATE: &str = "adopted";

/// Options for [`sync`]
#[derive(Debug, Clone, Copy, Default)]
pub struct SyncOptions {
    /// Also adopt orphaned files, recorded without a signature
    pub include_all: bool,
    /// Compute the report without persisting anything
    pub dry_run: bool,
}

/// What [`sync`] changed
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncReport {
    /// Files newly tracked
    pub added: Vec<String>,
    /// Tracked files whose hash was refreshed
    pub updated: Vec<String>,
    /// Entries dropped because the file is gone
    pub removed: Vec<String>,
    /// Drifted files that could not be re-hashed
    pub skipped: Vec<String>,
    pub dry_run: bool,
}

impl SyncReport {
    /// Whether the ledger was (or would be) changed.
    pub fn has_changes(&self) -> bool {
        !(self.added.is_empty() && self.updated.is_empty() && self.removed.is_empty())
    }
}

/// Options for [`prune`]
#[derive(Debug, Clone, Copy, Default)]
pub struct PruneOptions {
    pub dry_run: bool,
}

/// What [`prune`] removed
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PruneReport {
    pub removed: Vec<String>,
    pub dry_run: bool,
}

/// Accept the current disk state into the ledger.
///
/// Untracked signed files are adopted, drifted entries take the new hash and
/// missing entries are dropped. Sections and components are rebuilt from the
/// resulting `files` map afterwards.
pub fn sync(root: &Path, config: &TextorConfig, state: &mut State, options: SyncOptions) -> Result<SyncReport> {
    let status = get_project_status(root, config, state)?;
    let mut report = SyncReport {
        dry_run: options.dry_run,
        ..SyncReport::default()
    };

    for file in status.untracked {
        let record = adopt_record(&file.path, config, file.hash);
        state.insert_file(&file.path, record);
        report.added.push(file.path);
    }

    if options.include_all {
        for key in status.orphaned {
            let path = root.join(&key);
            let hash = compute_file_checksum(&path, config.normalization())
                .map_err(|e| Error::io(&path, e))?;
            state.insert_file(&key, adopt_record(&key, config, hash).without_signature());
            report.added.push(key);
        }
    }

    for file in status.modified {
        if file.current_hash.is_empty() {
            report.skipped.push(file.path);
            continue;
        }
        if let Some(record) = state.files.get_mut(&file.path) {
            record.hash = file.current_hash;
            record.timestamp = Utc::now();
            report.updated.push(file.path);
        }
    }

    for key in status.missing {
        state.files.remove(&key);
        report.removed.push(key);
    }

    heal_metadata(state, config);
    tracing::info!(
        added = report.added.len(),
        updated = report.updated.len(),
        removed = report.removed.len(),
        dry_run = options.dry_run,
        "sync complete"
    );
    Ok(report)
}

/// Drop ledger entries whose file no longer exists, then rebuild metadata.
pub fn prune(root: &Path, config: &TextorConfig, state: &mut State, options: PruneOptions) -> Result<PruneReport> {
    let status = get_project_status(root, config, state)?;
    for key in &status.missing {
        state.files.remove(key);
        tracing::debug!(path = %key, "pruned missing entry");
    }

    heal_metadata(state, config);
    tracing::info!(removed = status.missing.len(), dry_run = options.dry_run, "prune complete");
    Ok(PruneReport {
        removed: status.missing,
        dry_run: options.dry_run,
    })
}

/// Build a ledger record for a file found on disk.
///
/// The kind follows the managed root the file lives in. Feature and
/// component entry files are the ones named after their directory,
/// ignoring case (`blog/Blog.astro`, `Button/Button.tsx`).
pub fn adopt_record(key: &str, config: &TextorConfig, hash: String) -> FileRecord {
    let Some((root, rest)) = config.paths.classify(key) else {
        return FileRecord::new(FileKind::FeatureFile, ADOPTED_TEMPLATE, hash);
    };
    let rest = NormalizedPath::new(rest.as_str());
    let first = rest.as_str().split('/').next().unwrap_or_default().to_string();

    match root {
        ManagedRoot::Pages => {
            let record = FileRecord::new(FileKind::Route, ADOPTED_TEMPLATE, hash);
            match derive_route(rest.as_str()) {
                Some(route) => record.with_owner(route),
                None => record,
            }
        }
        ManagedRoot::Features => {
            let kind = if is_entry_file(&rest) { FileKind::Feature } else { FileKind::FeatureFile };
            let owner = config.paths.root(ManagedRoot::Features).join(&first);
            FileRecord::new(kind, ADOPTED_TEMPLATE, hash).with_owner(owner.as_str())
        }
        ManagedRoot::Components => {
            let kind = if is_entry_file(&rest) { FileKind::Component } else { FileKind::ComponentFile };
            FileRecord::new(kind, ADOPTED_TEMPLATE, hash).with_owner(first)
        }
    }
}

fn is_entry_file(path: &NormalizedPath) -> bool {
    let (Some(parent), Some(name)) = (path.parent(), path.file_name()) else {
        return false;
    };
    let stem = name.split('.').next().unwrap_or(name);
    parent.file_name().is_some_and(|dir| dir.eq_ignore_ascii_case(stem))
}

fn heal_metadata(state: &mut State, config: &TextorConfig) {
    state.sections = reconstruct_sections(state, config);
    state.components = reconstruct_components(&state.files, config);
}
