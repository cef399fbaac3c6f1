//! Rule / Dataset tree data model
//!
//! Both entities are rebuilt from scratch on every run. After construction
//! a tree is only mutated once, when recovered script text is patched onto
//! rules read from the backing store.

mod dataset;
mod record;
mod rule;

pub use dataset::{Dataset, Node};
pub use record::RuleConfig;
pub use rule::{NO_RESTRICTION, Rule, RuleId, RuleKind, TriggerEvent};

/// Options for writing a tree to the file layout
#[derive(Debug, Clone)]
pub struct WriteOptions {
    /// Extension of the script artifact, without the dot
    pub script_extension: String,
    /// Report what would be written without touching the filesystem
    pub dry_run: bool,
}

impl Default for WriteOptions {
    fn default() -> Self {
        Self {
            script_extension: "js".to_string(),
            dry_run: false,
        }
    }
}
