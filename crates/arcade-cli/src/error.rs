//! Error types for arcade-cli

/// Result type for CLI operations
pub type Result<T> = std::result::Result<T, CliError>;

/// Errors that end a CLI run with a non-zero exit status
#[derive(Debug, thiserror::Error)]
pub enum CliError {
    /// Error from arcade-core
    #[error(transparent)]
    Core(#[from] arcade_core::Error),

    /// Backing store could not be opened
    #[error(transparent)]
    Store(#[from] arcade_core::StoreError),

    /// Error from arcade-fs
    #[error(transparent)]
    Fs(#[from] arcade_fs::Error),

    /// Standard I/O error
    #[error(transparent)]
    Io(#[from] std::io::Error),

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
}
