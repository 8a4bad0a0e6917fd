//! Error types for textor-cli

/// Result type for CLI operations
pub type Result<T> = std::result::Result<T, CliError>;

/// Errors that can occur in CLI operations
#[derive(Debug, thiserror::Error)]
pub enum CliError {
    /// Error from textor-core
    #[error(transparent)]
    Core(#[from] textor_core::Error),

    /// Error from textor-fs
    #[error(transparent)]
    Fs(#[from] textor_fs::Error),

    /// Standard I/O error
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// JSON output error
    #[error(transparent)]
    Json(#[from] serde_json::Error),

    /// Interactive prompt error
    #[error("Interactive prompt error: {0}")]
    Dialoguer(#[from] dialoguer::Error),

    /// User-facing error with a message
    #[error("{message}")]
    User { message: String },
}

impl CliError {
    /// Create a new user error with the given message
    pub fn user(message: impl Into<String>) -> Self {
        Self::User {
            message: message.into(),
        }
    }

    /// Error reported when a command skipped some items
    pub fn skipped(count: usize) -> Self {
        let noun = if count == 1 { "item" } else { "items" };
        Self::user(format!("{count} {noun} skipped"))
    }
}
