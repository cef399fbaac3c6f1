//! Backing-store collaborator
//!
//! The engine never talks to a concrete store directly. It reads snapshots
//! and issues mutations through [`BackingStore`], addressing containers by
//! their path relative to the store root.

mod json;
mod mutation;
mod schema;

pub use json::JsonStore;
pub use mutation::RuleMutation;
pub use schema::{RuleScript, SchemaNode};

use arcade_fs::NormalizedPath;

/// Result type for collaborator operations
pub type StoreResult<T> = std::result::Result<T, StoreError>;

/// Errors raised by a backing store
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Container not found: {container}")]
    ContainerNotFound { container: String },

    #[error("Rule '{name}' not found in {container}")]
    RuleNotFound { name: String, container: String },

    #[error("Rule id {id} not found")]
    RuleIdNotFound { id: i64 },

    #[error("Rule id {id} is already in use")]
    RuleIdInUse { id: i64 },

    #[error("Rule '{name}' already exists in {container}")]
    DuplicateRule { name: String, container: String },

    /// The store refused the operation
    #[error("{message}")]
    Rejected { message: String },

    #[error(transparent)]
    Fs(#[from] arcade_fs::Error),
}

impl StoreError {
    pub fn container_not_found(container: &NormalizedPath) -> Self {
        Self::ContainerNotFound {
            container: container_label(container),
        }
    }
}

/// Human-readable form of a container address.
pub fn container_label(container: &NormalizedPath) -> String {
    if container.is_root() {
        "<root>".to_string()
    } else {
        container.to_string()
    }
}

/// Operations the reconciliation engine needs from a backing store.
pub trait BackingStore {
    /// Display name used in summary messages.
    fn name(&self) -> String;

    /// Snapshot `target` and all descendants, including attached rules.
    ///
    /// Script bodies in the snapshot may be unreliable, see
    /// [`BackingStore::scrubs_scripts`].
    fn snapshot_schema(&self, target: &NormalizedPath) -> StoreResult<SchemaNode>;

    /// Authoritative name and script body of every rule on a container.
    fn describe_rules(&self, container: &NormalizedPath) -> StoreResult<Vec<RuleScript>>;

    /// Whether the container exists.
    fn exists(&self, container: &NormalizedPath) -> bool;

    fn insert_rule(&mut self, container: &NormalizedPath, rule: &RuleMutation) -> StoreResult<()>;

    fn update_rule(&mut self, container: &NormalizedPath, rule: &RuleMutation) -> StoreResult<()>;

    fn delete_rule(&mut self, container: &NormalizedPath, name: &str) -> StoreResult<()>;

    /// Whether snapshots may replace script text with placeholders.
    ///
    /// When true, tree construction recovers every script through
    /// [`BackingStore::describe_rules`]. Only return false for a store whose
    /// snapshots are known to carry the real script text.
    fn scrubs_scripts(&self) -> bool {
        true
    }
}
