//! Path normalization and the root-containment gate
//!
//! [`NormalizedPath`] is the forward-slash representation used for ledger keys.
//! [`secure_join`] is the only way to obtain a [`GuardedPath`], and every
//! mutating operation in the workspace takes a `GuardedPath`, so a path cannot
//! reach the filesystem without having been checked against its root first.

use std::path::{Component, Path, PathBuf};

use crate::{Error, Result};

/// A path normalized to use forward slashes internally.
///
/// Dot segments are resolved on construction. For relative paths a leading
/// `..` that would climb above the start is dropped, so a normalized relative
/// path never points outside the directory it is later joined to.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NormalizedPath {
    /// Internal representation always uses forward slashes
    inner: String,
}

impl NormalizedPath {
    /// Create a new NormalizedPath from any path-like input.
    pub fn new(path: impl AsRef<Path>) -> Self {
        let path_str = path.as_ref().to_string_lossy();
        Self {
            inner: clean(&path_str.replace('\\', "/")),
        }
    }

    /// Get the internal normalized string representation.
    pub fn as_str(&self) -> &str {
        &self.inner
    }

    /// Convert to a platform-native PathBuf for I/O operations.
    pub fn to_native(&self) -> PathBuf {
        PathBuf::from(&self.inner)
    }

    /// Join this path with a segment, resolving dot segments.
    pub fn join(&self, segment: &str) -> Self {
        let segment = segment.replace('\\', "/");
        if segment.is_empty() || segment == "." {
            return self.clone();
        }
        let joined = if self.inner.is_empty() {
            segment
        } else if self.inner.ends_with('/') {
            format!("{}{}", self.inner, segment)
        } else {
            format!("{}/{}", self.inner, segment)
        };
        Self {
            inner: clean(&joined),
        }
    }

    /// Get the parent directory.
    pub fn parent(&self) -> Option<Self> {
        match self.inner.rfind('/') {
            Some(0) if self.inner.len() > 1 => Some(Self {
                inner: "/".to_string(),
            }),
            Some(idx) if idx > 0 => Some(Self {
                inner: self.inner[..idx].to_string(),
            }),
            _ => None,
        }
    }

    /// Get the file name component.
    pub fn file_name(&self) -> Option<&str> {
        self.inner.rsplit('/').next().filter(|name| !name.is_empty())
    }

    /// Get the extension if present.
    pub fn extension(&self) -> Option<&str> {
        self.file_name().and_then(|name| {
            let idx = name.rfind('.')?;
            if idx == 0 { None } else { Some(&name[idx + 1..]) }
        })
    }

    /// Whether this path lies at or below `prefix` (segment-wise).
    pub fn starts_with(&self, prefix: &NormalizedPath) -> bool {
        let prefix = prefix.as_str();
        if prefix.is_empty() {
            return true;
        }
        self.inner == prefix
            || (self.inner.starts_with(prefix) && self.inner[prefix.len()..].starts_with('/'))
    }

    /// The remainder of this path below `prefix`, if it lies underneath it.
    pub fn strip_prefix(&self, prefix: &NormalizedPath) -> Option<&str> {
        if !self.starts_with(prefix) || self.inner == prefix.as_str() {
            return None;
        }
        if prefix.as_str().is_empty() {
            return Some(&self.inner);
        }
        Some(&self.inner[prefix.as_str().len() + 1..])
    }
}

/// Resolve `.`, `..` and empty segments in a forward-slash path.
fn clean(path: &str) -> String {
    let absolute = path.starts_with('/');
    let network = path.starts_with("//") && !path.starts_with("///");
    let mut parts: Vec<&str> = Vec::new();

    for part in path.split('/') {
        match part {
            "" | "." => {}
            ".." => {
                parts.pop();
            }
            other => parts.push(other),
        }
    }

    let body = parts.join("/");
    if network {
        format!("//{body}")
    } else if absolute {
        format!("/{body}")
    } else {
        body
    }
}

impl AsRef<Path> for NormalizedPath {
    fn as_ref(&self) -> &Path {
        Path::new(&self.inner)
    }
}

impl std::fmt::Display for NormalizedPath {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.inner)
    }
}

impl From<&str> for NormalizedPath {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for NormalizedPath {
    fn from(s: String) -> Self {
        Self::new(s)
    }
}

impl From<PathBuf> for NormalizedPath {
    fn from(p: PathBuf) -> Self {
        Self::new(p)
    }
}

impl From<&Path> for NormalizedPath {
    fn from(p: &Path) -> Self {
        Self::new(p)
    }
}

/// An absolute path that has been proven to lie inside its root.
///
/// Only [`secure_join`] constructs these.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct GuardedPath {
    root: PathBuf,
    path: PathBuf,
}

impl GuardedPath {
    /// The checked absolute path.
    pub fn as_path(&self) -> &Path {
        &self.path
    }

    /// The root this path was checked against.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Forward-slash path relative to the root (empty for the root itself).
    pub fn relative(&self) -> String {
        self.path
            .strip_prefix(&self.root)
            .map(|rel| {
                rel.components()
                    .map(|c| c.as_os_str().to_string_lossy())
                    .collect::<Vec<_>>()
                    .join("/")
            })
            .unwrap_or_default()
    }

    /// Join further segments, re-running the containment check.
    pub fn join(&self, segment: &str) -> Result<GuardedPath> {
        secure_join(&self.root, [self.relative().as_str(), segment])
    }

    /// The checked parent directory, unless this is the root itself.
    pub fn parent(&self) -> Option<GuardedPath> {
        if self.path == self.root {
            return None;
        }
        self.path.parent().map(|parent| GuardedPath {
            root: self.root.clone(),
            path: parent.to_path_buf(),
        })
    }

    pub fn exists(&self) -> bool {
        self.path.exists()
    }

    pub fn is_file(&self) -> bool {
        self.path.is_file()
    }

    pub fn is_dir(&self) -> bool {
        self.path.is_dir()
    }
}

impl AsRef<Path> for GuardedPath {
    fn as_ref(&self) -> &Path {
        &self.path
    }
}

impl std::fmt::Display for GuardedPath {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.path.display())
    }
}

/// Resolve `segments` against `root`, failing if the result escapes it.
///
/// Segments are applied like a shell `cd`: an absolute segment replaces what
/// came before, `..` climbs. The result must be `root` or a descendant of it,
/// both lexically and after resolving symlinks of its nearest existing
/// ancestor. No I/O other than metadata lookups happens here.
///
/// # Errors
///
/// Returns [`Error::PathTraversal`] when the resolved path leaves the root.
pub fn secure_join<I, S>(root: impl AsRef<Path>, segments: I) -> Result<GuardedPath>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let root = absolute(root.as_ref())?;
    let mut joined = root.clone();
    for segment in segments {
        let segment = segment.as_ref().replace('\\', "/");
        if segment.is_empty() {
            continue;
        }
        // `push` replaces the buffer when the segment is absolute
        joined.push(&segment);
    }

    let resolved = lexical_clean(&joined);
    if !resolved.starts_with(&root) {
        tracing::debug!(root = %root.display(), path = %resolved.display(), "rejected path outside root");
        return Err(Error::PathTraversal {
            root,
            path: resolved,
        });
    }

    check_symlink_escape(&root, &resolved)?;

    Ok(GuardedPath {
        root,
        path: resolved,
    })
}

/// Forward-slash key for `path` relative to `root`, if it lies inside it.
pub fn relative_key(root: &Path, path: &Path) -> Option<String> {
    let root = lexical_clean(root);
    let path = lexical_clean(path);
    let rel = path.strip_prefix(&root).ok()?;
    Some(NormalizedPath::new(rel).as_str().to_string())
}

fn absolute(path: &Path) -> Result<PathBuf> {
    if path.is_absolute() {
        return Ok(lexical_clean(path));
    }
    let cwd = std::env::current_dir().map_err(|e| Error::io(path, e))?;
    Ok(lexical_clean(&cwd.join(path)))
}

/// Resolve `.` and `..` without touching the filesystem.
fn lexical_clean(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::Prefix(_) | Component::RootDir => out.push(component.as_os_str()),
            Component::CurDir => {}
            Component::ParentDir => {
                // Popping at the filesystem root leaves the root in place
                out.pop();
            }
            Component::Normal(part) => out.push(part),
        }
    }
    out
}

fn check_symlink_escape(root: &Path, resolved: &Path) -> Result<()> {
    let Ok(canonical_root) = dunce::canonicalize(root) else {
        // Nothing exists yet, so nothing can be a symlink
        return Ok(());
    };

    let mut probe = Some(resolved);
    while let Some(candidate) = probe {
        if candidate == root {
            break;
        }
        if candidate.symlink_metadata().is_ok() {
            // A dangling link cannot be canonicalized; treat it as an escape
            let canonical = dunce::canonicalize(candidate).map_err(|_| Error::PathTraversal {
                root: root.to_path_buf(),
                path: resolved.to_path_buf(),
            })?;
            if !canonical.starts_with(&canonical_root) {
                tracing::debug!(path = %resolved.display(), target = %canonical.display(), "rejected symlink escape");
                return Err(Error::PathTraversal {
                    root: root.to_path_buf(),
                    path: resolved.to_path_buf(),
                });
            }
            break;
        }
        probe = candidate.parent();
    }
    Ok(())
}
