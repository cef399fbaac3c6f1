//! Error types for arcade-core

use std::path::PathBuf;

use crate::model::RuleId;
use crate::store::StoreError;

/// Result type for arcade-core operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in arcade-core operations
///
/// Everything except [`Error::Store`] raised during a single rule's apply
/// step aborts the run before the backing store is mutated.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Rule type string matches none of the known kinds
    #[error("Invalid type '{kind}' for rule '{rule}'")]
    InvalidKind { rule: String, kind: String },

    /// Diagnostic severity name is not INFO, WARNING or ERROR
    #[error("Invalid severity '{value}'")]
    InvalidSeverity { value: String },

    /// A rule folder does not hold exactly one config document and one script
    #[error("Malformed rule folder {path}: {reason}")]
    MalformedRuleFolder { path: PathBuf, reason: String },

    /// Two rules in one tree share an id
    #[error("Duplicate rule id {id}: '{first}' and '{second}'")]
    DuplicateRuleId {
        id: RuleId,
        first: String,
        second: String,
    },

    /// Two sibling rules share a name
    #[error("Duplicate rule name '{name}' in {container}")]
    DuplicateRuleName { name: String, container: String },

    /// Two siblings sanitize to the same on-disk folder
    #[error("'{first}' and '{second}' in {container} would both be written to folder '{folder}'")]
    FolderNameCollision {
        folder: String,
        first: String,
        second: String,
        container: String,
    },

    /// Child lookup by name failed
    #[error("No '{key}' in '{container}'")]
    NotFound { key: String, container: String },

    /// Backing store collaborator error
    #[error(transparent)]
    Store(#[from] StoreError),

    /// Filesystem error from arcade-fs
    #[error(transparent)]
    Fs(#[from] arcade_fs::Error),
}
