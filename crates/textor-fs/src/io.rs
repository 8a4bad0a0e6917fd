//! Atomic I/O operations and advisory locking

use std::fs::{self, File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::Duration;

use backoff::ExponentialBackoff;
use fs2::FileExt;

use crate::{Error, Result};

/// Tuning knobs for writes and lock acquisition.
#[derive(Debug, Clone, Copy)]
pub struct RobustnessConfig {
    /// How long [`FileLock::acquire`] keeps retrying before giving up
    pub lock_timeout: Duration,
    /// Whether temp files are fsynced before the rename
    pub enable_fsync: bool,
}

impl Default for RobustnessConfig {
    fn default() -> Self {
        Self {
            lock_timeout: Duration::from_secs(5),
            enable_fsync: true,
        }
    }
}

/// Write content atomically to a file.
///
/// Writes to a uniquely named temp file in the same directory, flushes it,
/// then renames it over `path`. Readers observe either the previous content or
/// the new content, never a partial write. Parent directories are created.
///
/// # Errors
///
/// Fails if the target or its parent directory is a symlink, or on I/O error.
pub fn write_atomic(path: &Path, content: &[u8], config: RobustnessConfig) -> Result<()> {
    reject_symlinks(path)?;

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|e| Error::io(parent, e))?;
    }

    // Same directory keeps the rename on one filesystem
    let temp_name = format!(
        ".{}.{}.tmp",
        path.file_name()
            .map(|n| n.to_string_lossy())
            .unwrap_or_default(),
        uuid::Uuid::new_v4().simple()
    );
    let temp_path = path.with_file_name(&temp_name);

    let result = write_temp(&temp_path, content, config).and_then(|()| {
        fs::rename(&temp_path, path).map_err(|e| Error::io(path, e))
    });

    if result.is_err() {
        let _ = fs::remove_file(&temp_path);
    }
    result
}

fn write_temp(temp_path: &Path, content: &[u8], config: RobustnessConfig) -> Result<()> {
    let mut temp_file = OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(temp_path)
        .map_err(|e| Error::io(temp_path, e))?;

    temp_file
        .write_all(content)
        .map_err(|e| Error::io(temp_path, e))?;

    if config.enable_fsync {
        temp_file.sync_all().map_err(|e| Error::io(temp_path, e))?;
    }
    Ok(())
}

fn reject_symlinks(path: &Path) -> Result<()> {
    let is_link = |p: &Path| {
        p.symlink_metadata()
            .map(|m| m.file_type().is_symlink())
            .unwrap_or(false)
    };
    if is_link(path) {
        return Err(Error::SymlinkInPath {
            path: path.to_path_buf(),
        });
    }
    if let Some(parent) = path.parent()
        && is_link(parent)
    {
        return Err(Error::SymlinkInPath {
            path: parent.to_path_buf(),
        });
    }
    Ok(())
}

/// Read text content from a file.
pub fn read_text(path: &Path) -> Result<String> {
    fs::read_to_string(path).map_err(|e| Error::io(path, e))
}

/// Write text content to a file atomically with default settings.
pub fn write_text(path: &Path, content: &str) -> Result<()> {
    write_atomic(path, content.as_bytes(), RobustnessConfig::default())
}

/// An exclusive advisory lock on a `<path>.lock` sidecar file.
///
/// The lock is released when the guard is dropped.
#[derive(Debug)]
pub struct FileLock {
    file: File,
    path: PathBuf,
}

impl FileLock {
    /// Acquire the lock guarding `target`, retrying until `timeout` elapses.
    ///
    /// # Errors
    ///
    /// Returns [`Error::LockFailed`] if another holder keeps the lock past the timeout.
    pub fn acquire(target: &Path, timeout: Duration) -> Result<Self> {
        let mut lock_name = target.as_os_str().to_owned();
        lock_name.push(".lock");
        let path = PathBuf::from(lock_name);

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| Error::io(parent, e))?;
        }

        let file = OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(false)
            .open(&path)
            .map_err(|e| Error::io(&path, e))?;

        let policy = ExponentialBackoff {
            initial_interval: Duration::from_millis(10),
            max_interval: Duration::from_millis(200),
            max_elapsed_time: Some(timeout),
            ..ExponentialBackoff::default()
        };

        backoff::retry(policy, || {
            file.try_lock_exclusive()
                .map_err(backoff::Error::transient)
        })
        .map_err(|_| Error::LockFailed {
            path: target.to_path_buf(),
        })?;

        tracing::debug!(lock = %path.display(), "acquired file lock");
        Ok(Self { file, path })
    }

    /// Path of the sidecar lock file.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for FileLock {
    fn drop(&mut self) {
        let _ = FileExt::unlock(&self.file);
    }
}
