//! Error types for textor-core

use std::path::PathBuf;

/// Result type for textor-core operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that abort an operation.
///
/// Hash and ownership conflicts are not errors; they are reported as
/// [`Conflict`](crate::ops::Conflict) values so batch operations can itemize them.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Move target already present and `force` was not set
    #[error("Destination exists: {path}")]
    DestinationExists { path: PathBuf },

    /// Section, component or file absent from the ledger and from disk
    #[error("Not found: {0}")]
    NotFound(String),

    /// A file operation was pointed at something that is not a regular file
    #[error("Not a file: {path}")]
    NotAFile { path: PathBuf },

    /// A directory delete was pointed at the project root, a managed root or
    /// one of their ancestors
    #[error("Refusing to delete protected directory: {path}")]
    ProtectedDirectory { path: String },

    /// Error in ledger operations
    #[error("Ledger error: {message}")]
    Ledger { message: String },

    /// Filesystem error from textor-fs, including path-safety violations
    #[error(transparent)]
    Fs(#[from] textor_fs::Error),

    /// Standard I/O error
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization error
    #[error(transparent)]
    Json(#[from] serde_json::Error),

    /// An identifier could not be turned into a search pattern
    #[error("Invalid pattern: {0}")]
    Pattern(#[from] regex::Error),
}

impl Error {
    /// Wrap an I/O error with the path it happened at.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Fs(textor_fs::Error::io(path, source))
    }

    /// Whether this error is a path-safety violation.
    pub fn is_path_traversal(&self) -> bool {
        matches!(self, Self::Fs(e) if e.is_path_traversal())
    }
}
