//! SHA-256 content hashing
//!
//! Provides a single canonical checksum format (`sha256:<hex>`) used for every
//! "what we wrote" versus "what is on disk now" comparison. Content can be
//! normalized first so that formatters reflowing whitespace or rewriting line
//! endings do not mark a file as modified.

use std::borrow::Cow;
use std::path::Path;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// Prefix for all checksums produced by this module
const PREFIX: &str = "sha256:";

/// How content is normalized before hashing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Normalization {
    /// Hash the raw text
    #[serde(rename = "none")]
    None,
    /// Unify `\r\n` and lone `\r` to `\n`
    #[default]
    #[serde(rename = "normalizeEOL", alias = "normalize-eol")]
    NormalizeEol,
    /// Collapse every whitespace run to a single space and trim the ends
    #[serde(rename = "ignoreWhitespace", alias = "ignore-whitespace")]
    IgnoreWhitespace,
}

impl std::str::FromStr for Normalization {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "none" => Ok(Self::None),
            "normalizeEOL" | "normalize-eol" | "eol" => Ok(Self::NormalizeEol),
            "ignoreWhitespace" | "ignore-whitespace" | "whitespace" => Ok(Self::IgnoreWhitespace),
            other => Err(format!("unknown normalization mode: {other}")),
        }
    }
}

/// Apply a normalization mode to content.
///
/// Normalization is idempotent: `normalize(normalize(c, m), m) == normalize(c, m)`.
pub fn normalize(content: &str, mode: Normalization) -> Cow<'_, str> {
    match mode {
        Normalization::None => Cow::Borrowed(content),
        Normalization::NormalizeEol => {
            if content.contains('\r') {
                Cow::Owned(content.replace("\r\n", "\n").replace('\r', "\n"))
            } else {
                Cow::Borrowed(content)
            }
        }
        Normalization::IgnoreWhitespace => {
            Cow::Owned(content.split_whitespace().collect::<Vec<_>>().join(" "))
        }
    }
}

/// Compute the SHA-256 checksum of string content without normalization.
///
/// Returns a string in the canonical format `"sha256:<hex>"`.
pub fn compute_content_checksum(content: &str) -> String {
    digest(content.as_bytes())
}

/// Compute the checksum of content after applying `mode`.
pub fn calculate_hash(content: &str, mode: Normalization) -> String {
    digest(normalize(content, mode).as_bytes())
}

/// Compute the checksum of a file's contents after applying `mode`.
///
/// With [`Normalization::None`] the raw bytes are hashed; otherwise the bytes
/// are decoded as UTF-8 (lossily) before normalization.
///
/// # Errors
///
/// Returns an error if the file cannot be read.
pub fn compute_file_checksum(path: &Path, mode: Normalization) -> std::io::Result<String> {
    let bytes = std::fs::read(path)?;
    if mode == Normalization::None {
        return Ok(digest(&bytes));
    }
    Ok(calculate_hash(&String::from_utf8_lossy(&bytes), mode))
}

fn digest(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    format!("{}{:x}", PREFIX, hasher.finalize())
}
