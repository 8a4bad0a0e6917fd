//! Directory scanning and generated-file detection

use std::collections::BTreeSet;
use std::fs;
use std::path::Path;

use crate::path::relative_key;
use crate::{Error, Result};

/// Recursively collect every file under `dir` into `out`.
///
/// Entries are recorded relative to `base` with forward slashes. Directories
/// whose name appears in `ignore` are skipped, and symlinks are not followed.
/// A missing `dir` contributes nothing.
pub fn scan_directory(
    base: &Path,
    dir: &Path,
    ignore: &[String],
    out: &mut BTreeSet<String>,
) -> Result<()> {
    if !dir.is_dir() {
        return Ok(());
    }

    let entries = fs::read_dir(dir).map_err(|e| Error::io(dir, e))?;
    for entry in entries {
        let entry = entry.map_err(|e| Error::io(dir, e))?;
        let path = entry.path();
        let file_type = entry.file_type().map_err(|e| Error::io(&path, e))?;

        if file_type.is_dir() {
            let name = entry.file_name();
            if ignore.iter().any(|ignored| name.to_string_lossy() == ignored.as_str()) {
                continue;
            }
            scan_directory(base, &path, ignore, out)?;
        } else if file_type.is_file()
            && let Some(key) = relative_key(base, &path)
        {
            out.insert(key);
        }
    }
    Ok(())
}

/// Collect every file under `root`, keyed relative to `root`.
pub fn scan(root: &Path) -> Result<BTreeSet<String>> {
    let mut out = BTreeSet::new();
    scan_directory(root, root, &[], &mut out)?;
    Ok(out)
}

/// Whether the file at `path` carries any of the given signature markers.
///
/// Unreadable or missing files are reported as not generated.
pub fn is_generated(path: &Path, signatures: &[String]) -> bool {
    match fs::read(path) {
        Ok(bytes) => content_has_signature(&String::from_utf8_lossy(&bytes), signatures),
        Err(e) => {
            tracing::debug!(path = %path.display(), error = %e, "cannot read file for signature check");
            false
        }
    }
}

/// Whether `content` contains any non-empty signature.
pub fn content_has_signature(content: &str, signatures: &[String]) -> bool {
    signatures
        .iter()
        .any(|sig| !sig.is_empty() && content.contains(sig.as_str()))
}
