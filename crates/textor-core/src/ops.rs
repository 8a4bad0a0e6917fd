//! Conflict-checked file mutations
//!
//! Each primitive compares the file on disk with what the ledger expects
//! before touching it. Unexplained edits are never destroyed silently: a
//! mismatch produces a [`Conflict`] inside a `Skipped` outcome, and only
//! `force` bypasses every check. Path-safety violations and occupied move
//! destinations are the only hard errors.

use std::collections::BTreeSet;
use std::fs;
use std::path::Path;

use textor_fs::checksum::{Normalization, calculate_hash, compute_file_checksum};
use textor_fs::{GuardedPath, io, is_generated, relative_key};

use crate::ledger::State;
use crate::{Error, Result};

/// Why a mutation was refused
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConflictKind {
    /// Content on disk no longer hashes to the recorded value
    Modified { expected: String, actual: String },
    /// The file is attributed to a different entity than the requester
    WrongOwner { expected: String, actual: String },
    /// Neither tracked nor carrying a signature
    NotGenerated,
    /// Found inside a generated directory but unknown to the ledger
    Untracked,
}

/// A refused mutation, with the path it concerns
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Conflict {
    /// Project-relative path
    pub path: String,
    pub kind: ConflictKind,
}

impl Conflict {
    pub fn new(path: impl Into<String>, kind: ConflictKind) -> Self {
        Self {
            path: path.into(),
            kind,
        }
    }

    /// Human-readable reason, without the path.
    pub fn reason(&self) -> String {
        match &self.kind {
            ConflictKind::Modified { expected, actual } => format!(
                "content changed since last generation (expected {expected}, found {actual})"
            ),
            ConflictKind::WrongOwner { expected, actual } => format!(
                "owned by a different entity ({actual}, requested by {expected})"
            ),
            ConflictKind::NotGenerated => "not generated by Textor and not tracked".to_string(),
            ConflictKind::Untracked => "untracked file inside a generated directory".to_string(),
        }
    }
}

impl std::fmt::Display for Conflict {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.path, self.reason())
    }
}

/// Conflict policy shared by delete and move
#[derive(Debug, Clone, Default)]
pub struct SafetyOptions {
    /// Skip every check
    pub force: bool,
    /// Hash recorded in the ledger, if the file is tracked
    pub expected_hash: Option<String>,
    /// Proceed even though the content drifted
    pub accept_changes: bool,
    pub normalization: Normalization,
    /// Entity requesting the operation
    pub owner: Option<String>,
    /// Entity the ledger attributes the file to
    pub actual_owner: Option<String>,
    /// Signatures that mark untracked files as ours
    pub signatures: Vec<String>,
}

impl SafetyOptions {
    pub fn forced() -> Self {
        Self {
            force: true,
            ..Self::default()
        }
    }
}

/// Result of [`safe_delete`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeleteOutcome {
    Deleted,
    /// Nothing to delete
    NotFound,
    Skipped(Conflict),
}

impl DeleteOutcome {
    pub fn is_deleted(&self) -> bool {
        matches!(self, Self::Deleted)
    }
}

/// Result of [`safe_move`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MoveOutcome {
    /// Moved; carries the content hash of the file at its new location
    Moved { hash: String },
    Skipped(Conflict),
}

/// Result of [`safe_delete_dir`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DirDeleteOutcome {
    /// Removed; lists the project-relative files that were inside
    Deleted { files: Vec<String> },
    NotFound,
    /// Every file that blocked the deletion
    Blocked(Vec<Conflict>),
}

/// Options for [`safe_delete_dir`]
#[derive(Debug, Clone, Default)]
pub struct DirDeleteOptions {
    pub force: bool,
    pub accept_changes: bool,
    pub normalization: Normalization,
}

/// Write `content` with its signature stamped on top.
///
/// The signature is prepended unless the content already carries it.
/// Returns the hash of the content actually written. Whether an existing
/// file may be overwritten is for the caller to decide beforehand.
pub fn write_with_signature(
    path: &GuardedPath,
    content: &str,
    signature: Option<&str>,
    normalization: Normalization,
) -> Result<String> {
    let final_content = match signature {
        Some(sig) if !sig.is_empty() && !content.contains(sig) => format!("{sig}\n{content}"),
        _ => content.to_string(),
    };

    io::write_text(path.as_path(), &final_content)?;
    tracing::info!(path = %path.relative(), "wrote file");
    Ok(calculate_hash(&final_content, normalization))
}

/// Delete a file unless that would destroy unexplained changes.
///
/// A missing file is reported as [`DeleteOutcome::NotFound`], so repeating
/// the call is harmless.
pub fn safe_delete(path: &GuardedPath, options: &SafetyOptions) -> Result<DeleteOutcome> {
    if !path.as_path().exists() {
        return Ok(DeleteOutcome::NotFound);
    }
    if !path.is_file() {
        return Err(Error::NotAFile {
            path: path.as_path().to_path_buf(),
        });
    }

    if let Some(conflict) = check_conflict(path, options)? {
        tracing::debug!(%conflict, "delete refused");
        return Ok(DeleteOutcome::Skipped(conflict));
    }

    fs::remove_file(path.as_path()).map_err(|e| Error::io(path.as_path(), e))?;
    tracing::info!(path = %path.relative(), "deleted file");
    Ok(DeleteOutcome::Deleted)
}

/// Move a file after running the same checks as [`safe_delete`] on the source.
///
/// Moving a file onto itself is a no-op that still reports its hash.
///
/// # Errors
///
/// [`Error::NotFound`] if the source is missing, [`Error::DestinationExists`]
/// if the target is occupied and `force` is not set.
pub fn safe_move(from: &GuardedPath, to: &GuardedPath, options: &SafetyOptions) -> Result<MoveOutcome> {
    if !from.is_file() {
        return Err(Error::NotFound(from.relative()));
    }
    let same_file = from.relative() == to.relative();
    if to.as_path().exists() && !options.force && !same_file {
        return Err(Error::DestinationExists {
            path: to.as_path().to_path_buf(),
        });
    }

    if let Some(conflict) = check_conflict(from, options)? {
        tracing::debug!(%conflict, "move refused");
        return Ok(MoveOutcome::Skipped(conflict));
    }

    if same_file {
        let hash = compute_file_checksum(from.as_path(), options.normalization)
            .map_err(|e| Error::io(from.as_path(), e))?;
        tracing::debug!(path = %from.relative(), "move onto itself, nothing to do");
        return Ok(MoveOutcome::Moved { hash });
    }

    if let Some(parent) = to.as_path().parent() {
        fs::create_dir_all(parent).map_err(|e| Error::io(parent, e))?;
    }
    if to.is_file() {
        fs::remove_file(to.as_path()).map_err(|e| Error::io(to.as_path(), e))?;
    } else if to.as_path().exists() {
        return Err(Error::NotAFile {
            path: to.as_path().to_path_buf(),
        });
    }

    rename(from.as_path(), to.as_path())?;
    let hash = compute_file_checksum(to.as_path(), options.normalization)
        .map_err(|e| Error::io(to.as_path(), e))?;
    tracing::info!(from = %from.relative(), to = %to.relative(), "moved file");
    Ok(MoveOutcome::Moved { hash })
}

/// Remove a whole directory if every file in it is accounted for.
///
/// Each contained file must be tracked in `state` with a matching hash. A
/// single foreign or drifted file blocks the entire removal unless forced;
/// `accept_changes` forgives drift but not foreign files. The whole tree is
/// inspected, including build output and dependency folders, and symlinks or
/// other non-regular entries count as foreign.
///
/// # Errors
///
/// [`Error::ProtectedDirectory`] if `dir` is the project root.
pub fn safe_delete_dir(
    dir: &GuardedPath,
    state: &State,
    options: &DirDeleteOptions,
) -> Result<DirDeleteOutcome> {
    if dir.relative().is_empty() {
        return Err(Error::ProtectedDirectory {
            path: dir.as_path().display().to_string(),
        });
    }
    if !dir.is_dir() {
        return Ok(DirDeleteOutcome::NotFound);
    }

    let mut files = BTreeSet::new();
    let mut foreign = BTreeSet::new();
    collect_entries(dir.root(), dir.as_path(), &mut files, &mut foreign)?;

    if !options.force {
        let mut blocked: Vec<Conflict> = foreign
            .iter()
            .map(|key| Conflict::new(key.clone(), ConflictKind::Untracked))
            .collect();
        for key in &files {
            let Some(record) = state.file(key) else {
                blocked.push(Conflict::new(key.clone(), ConflictKind::Untracked));
                continue;
            };
            if options.accept_changes {
                continue;
            }
            let on_disk = dir.root().join(key);
            let actual = compute_file_checksum(&on_disk, options.normalization)
                .map_err(|e| Error::io(&on_disk, e))?;
            if actual != record.hash {
                blocked.push(Conflict::new(
                    key.clone(),
                    ConflictKind::Modified {
                        expected: record.hash.clone(),
                        actual,
                    },
                ));
            }
        }
        if !blocked.is_empty() {
            tracing::debug!(dir = %dir.relative(), blocked = blocked.len(), "directory delete refused");
            return Ok(DirDeleteOutcome::Blocked(blocked));
        }
    }

    fs::remove_dir_all(dir.as_path()).map_err(|e| Error::io(dir.as_path(), e))?;
    tracing::info!(dir = %dir.relative(), files = files.len(), "deleted directory");
    Ok(DirDeleteOutcome::Deleted {
        files: files.into_iter().collect(),
    })
}

/// Walk `dir` without following symlinks. Regular files go to `files`;
/// symlinks and special files go to `foreign`.
fn collect_entries(
    base: &Path,
    dir: &Path,
    files: &mut BTreeSet<String>,
    foreign: &mut BTreeSet<String>,
) -> Result<()> {
    let entries = fs::read_dir(dir).map_err(|e| Error::io(dir, e))?;
    for entry in entries {
        let entry = entry.map_err(|e| Error::io(dir, e))?;
        let path = entry.path();
        let file_type = entry.file_type().map_err(|e| Error::io(&path, e))?;
        let Some(key) = relative_key(base, &path) else {
            continue;
        };

        if file_type.is_dir() {
            collect_entries(base, &path, files, foreign)?;
        } else if file_type.is_file() {
            files.insert(key);
        } else {
            foreign.insert(key);
        }
    }
    Ok(())
}

/// Remove `dir` and its ancestors while they are empty, stopping at `stop_at`.
pub fn cleanup_empty_dirs(dir: &GuardedPath, stop_at: &Path) -> Result<()> {
    let mut current = Some(dir.clone());
    while let Some(candidate) = current {
        let path = candidate.as_path();
        if path == stop_at || !path.starts_with(stop_at) || path == candidate.root() {
            break;
        }
        let is_empty = match fs::read_dir(path) {
            Ok(mut entries) => entries.next().is_none(),
            Err(_) => break,
        };
        if !is_empty {
            break;
        }
        fs::remove_dir(path).map_err(|e| Error::io(path, e))?;
        tracing::debug!(dir = %candidate.relative(), "removed empty directory");
        current = candidate.parent();
    }
    Ok(())
}

fn check_conflict(path: &GuardedPath, options: &SafetyOptions) -> Result<Option<Conflict>> {
    if options.force {
        return Ok(None);
    }
    let key = path.relative();

    if let (Some(requested), Some(actual)) = (&options.owner, &options.actual_owner)
        && requested != actual
    {
        return Ok(Some(Conflict::new(
            key,
            ConflictKind::WrongOwner {
                expected: requested.clone(),
                actual: actual.clone(),
            },
        )));
    }

    match &options.expected_hash {
        Some(expected) => {
            let actual = compute_file_checksum(path.as_path(), options.normalization)
                .map_err(|e| Error::io(path.as_path(), e))?;
            if &actual != expected && !options.accept_changes {
                return Ok(Some(Conflict::new(
                    key,
                    ConflictKind::Modified {
                        expected: expected.clone(),
                        actual,
                    },
                )));
            }
        }
        None => {
            if !options.accept_changes && !is_generated(path.as_path(), &options.signatures) {
                return Ok(Some(Conflict::new(key, ConflictKind::NotGenerated)));
            }
        }
    }
    Ok(None)
}

fn rename(from: &Path, to: &Path) -> Result<()> {
    if fs::rename(from, to).is_ok() {
        return Ok(());
    }
    // Cross-device moves cannot rename; copy then remove
    fs::copy(from, to).map_err(|e| Error::io(to, e))?;
    fs::remove_file(from).map_err(|e| Error::io(from, e))?;
    Ok(())
}
