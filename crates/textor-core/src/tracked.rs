//! Ledger-aware file operations
//!
//! Each operation guards its paths, looks up what the ledger expects, runs the
//! matching [`ops`](crate::ops) primitive and only then records the result. A
//! failure between the physical change and the ledger update leaves the ledger
//! under-reporting, never claiming a change that did not happen.

use chrono::Utc;
use textor_fs::{NormalizedPath, calculate_hash, compute_file_checksum, io};

use crate::ledger::{FileKind, FileRecord, ledger_key};
use crate::ops::{
    self, DeleteOutcome, DirDeleteOptions, DirDeleteOutcome, MoveOutcome, SafetyOptions,
};
use crate::project::Project;
use crate::rewrite::{retarget_imports, rewrite_relative_imports};
use crate::{Error, Result};

/// How a new file is recorded
#[derive(Debug, Clone)]
pub struct TrackedFile {
    pub kind: FileKind,
    pub template: String,
    pub owner: Option<String>,
}

impl TrackedFile {
    pub fn new(kind: FileKind, template: impl Into<String>) -> Self {
        Self {
            kind,
            template: template.into(),
            owner: None,
        }
    }

    pub fn owned_by(mut self, owner: impl Into<String>) -> Self {
        self.owner = Some(owner.into());
        self
    }
}

/// Conflict overrides for delete and move
#[derive(Debug, Clone, Default)]
pub struct MutationOptions {
    pub force: bool,
    pub accept_changes: bool,
    /// Entity requesting the change, compared against the recorded owner
    pub owner: Option<String>,
}

impl Project {
    /// Write a generated file and record it.
    ///
    /// Returns the recorded hash.
    ///
    /// # Errors
    ///
    /// [`Error::DestinationExists`] if the file exists and `overwrite` is false.
    pub fn write_tracked(
        &self,
        relative: &str,
        content: &str,
        file: TrackedFile,
        overwrite: bool,
    ) -> Result<String> {
        let path = self.guard(relative)?;
        if path.exists() && !overwrite {
            return Err(Error::DestinationExists {
                path: path.as_path().to_path_buf(),
            });
        }

        let key = path.relative();
        let signature = self.config().signature_for(&key);
        let hash = ops::write_with_signature(&path, content, signature, self.config().normalization())?;

        let mut record = FileRecord::new(file.kind, file.template, hash.clone());
        record.owner = file.owner;
        record.has_signature = signature.is_some();
        self.store().register_file(&key, record)?;
        Ok(hash)
    }

    /// Delete a file if it still matches the ledger.
    ///
    /// The entry is dropped when the file was deleted or was already gone.
    pub fn delete_tracked(&self, relative: &str, options: &MutationOptions) -> Result<DeleteOutcome> {
        let path = self.guard(relative)?;
        let key = path.relative();
        let record = self.store().load().file(&key).cloned();

        let outcome = ops::safe_delete(&path, &self.safety(record.as_ref(), options))?;
        match &outcome {
            DeleteOutcome::Deleted | DeleteOutcome::NotFound => {
                if record.is_some() {
                    self.store().unregister_file(&key)?;
                }
                if let Some(parent) = path.parent() {
                    ops::cleanup_empty_dirs(&parent, &self.boundary_for(&key))?;
                }
            }
            DeleteOutcome::Skipped(conflict) => {
                tracing::warn!(%conflict, "delete skipped");
            }
        }
        Ok(outcome)
    }

    /// Move a file, keeping its imports and the imports pointing at it valid.
    ///
    /// Relative imports inside the moved file are re-relativized to its new
    /// location. Tracked files importing it are retargeted; their ledger hash
    /// is refreshed only if they had not drifted beforehand.
    pub fn move_tracked(&self, from: &str, to: &str, options: &MutationOptions) -> Result<MoveOutcome> {
        let from_path = self.guard(from)?;
        let to_path = self.guard(to)?;
        let from_key = from_path.relative();
        let to_key = to_path.relative();
        let normalization = self.config().normalization();

        let state = self.store().load();
        let record = state.file(&from_key).cloned();
        let safety = self.safety(record.as_ref(), options);

        let moved_hash = match ops::safe_move(&from_path, &to_path, &safety)? {
            MoveOutcome::Moved { hash } => hash,
            MoveOutcome::Skipped(conflict) => {
                tracing::warn!(%conflict, "move skipped");
                return Ok(MoveOutcome::Skipped(conflict));
            }
        };
        if from_key == to_key {
            return Ok(MoveOutcome::Moved { hash: moved_hash });
        }

        let content = io::read_text(to_path.as_path())?;
        let rewritten = rewrite_relative_imports(&content, &from_key, &to_key);
        let hash = if rewritten != content {
            io::write_text(to_path.as_path(), &rewritten)?;
            calculate_hash(&rewritten, normalization)
        } else {
            moved_hash
        };

        let mut dependents = Vec::new();
        for (key, dependent) in &state.files {
            if key == &from_key || key == &to_key {
                continue;
            }
            let Ok(path) = self.guard(key) else { continue };
            let Ok(before) = io::read_text(path.as_path()) else { continue };
            let after = retarget_imports(&before, key, &from_key, &to_key);
            if after == before {
                continue;
            }
            let in_sync = calculate_hash(&before, normalization) == dependent.hash;
            io::write_text(path.as_path(), &after)?;
            tracing::debug!(path = %key, in_sync, "retargeted imports");
            if in_sync {
                dependents.push((key.clone(), calculate_hash(&after, normalization)));
            }
        }

        self.store().update(|state| {
            let moved = state.remove_file(&from_key).map(|mut moved| {
                moved.hash = hash.clone();
                moved.timestamp = Utc::now();
                moved
            });
            if let Some(moved) = moved {
                state.insert_file(&to_key, moved);
            }
            for (key, new_hash) in dependents {
                if let Some(record) = state.files.get_mut(&key) {
                    record.hash = new_hash;
                    record.timestamp = Utc::now();
                }
            }
        })?;

        if let Some(parent) = from_path.parent() {
            ops::cleanup_empty_dirs(&parent, &self.boundary_for(&from_key))?;
        }
        Ok(MoveOutcome::Moved { hash })
    }

    /// Delete a generated directory and every ledger entry inside it.
    ///
    /// Sections and components rooted at the directory are dropped as well.
    ///
    /// # Errors
    ///
    /// [`Error::ProtectedDirectory`] for the project root, a managed root or
    /// any directory containing one, even when forced.
    pub fn delete_tracked_dir(&self, relative: &str, options: &MutationOptions) -> Result<DirDeleteOutcome> {
        let dir = self.guard(relative)?;
        let key = dir.relative();
        let target = NormalizedPath::new(&key);
        if key.is_empty()
            || self
                .config()
                .managed_roots()
                .iter()
                .any(|managed| managed.starts_with(&target))
        {
            let path = if key.is_empty() { ".".to_string() } else { key };
            return Err(Error::ProtectedDirectory { path });
        }
        let state = self.store().load();

        let dir_options = DirDeleteOptions {
            force: options.force,
            accept_changes: options.accept_changes,
            normalization: self.config().normalization(),
        };
        let outcome = ops::safe_delete_dir(&dir, &state, &dir_options)?;

        match &outcome {
            DirDeleteOutcome::Deleted { .. } | DirDeleteOutcome::NotFound => {
                let prefix = ledger_key(&key);
                self.store().update(|state| {
                    for tracked in state.files_under(&prefix) {
                        state.files.remove(&tracked);
                    }
                    state.sections.retain(|s| ledger_key(&s.feature_path) != prefix);
                    state.components.retain(|c| ledger_key(&c.path) != prefix);
                })?;
                if let Some(parent) = dir.parent() {
                    ops::cleanup_empty_dirs(&parent, &self.boundary_for(&key))?;
                }
            }
            DirDeleteOutcome::Blocked(conflicts) => {
                for conflict in conflicts {
                    tracing::warn!(%conflict, "directory delete blocked");
                }
            }
        }
        Ok(outcome)
    }

    /// Current hash of a file on disk, using the project normalization.
    pub fn hash_on_disk(&self, relative: &str) -> Result<String> {
        let path = self.guard(relative)?;
        compute_file_checksum(path.as_path(), self.config().normalization())
            .map_err(|e| Error::io(path.as_path(), e))
    }

    fn safety(&self, record: Option<&FileRecord>, options: &MutationOptions) -> SafetyOptions {
        SafetyOptions {
            force: options.force,
            expected_hash: record.map(|r| r.hash.clone()),
            accept_changes: options.accept_changes,
            normalization: self.config().normalization(),
            owner: options.owner.clone(),
            actual_owner: record.and_then(|r| r.owner.clone()),
            signatures: self.config().all_signatures(),
        }
    }
}
