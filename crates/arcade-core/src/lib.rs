//! Core reconciliation engine for Arcade Manager
//!
//! This crate keeps attribute rules in a backing store and a rule
//! repository on disk in step, implementing:
//!
//! - **Data model**: [`Rule`] and [`Dataset`] trees with structural equality
//! - **Tree Builder**: trees rebuilt from a store snapshot or from the file tree
//! - **Tree Serializer**: the on-disk rule folder layout
//! - **Reconciler**: insert / update / skip pass followed by a delete pass
//! - **SyncEngine**: the `extract` and `commit` drivers
//!
//! # Architecture
//!
//! ```text
//!                 arcade-cli
//!                     |
//!                arcade-core
//!        +-------+----+-----+---------+
//!        |       |          |         |
//!      build  reconcile   sync      store
//!        |                            |
//!        +---------- arcade-fs -------+
//! ```
//!
//! # Example
//!
//! ```ignore
//! use arcade_core::{JsonStore, SyncEngine};
//! use arcade_fs::NormalizedPath;
//!
//! let store = JsonStore::open(&NormalizedPath::new("parcels.json"))?;
//! let mut engine = SyncEngine::new(store, NormalizedPath::new("rules"))?;
//! let report = engine.commit()?;
//! println!("{} mutation(s)", report.summary.mutations());
//! ```

pub mod build;
pub mod config;
pub mod error;
pub mod model;
pub mod reconcile;
pub mod report;
pub mod store;
pub mod sync;

pub use build::{RuleTree, from_file_tree, from_store};
pub use config::ManagerConfig;
pub use error::{Error, Result};
pub use model::{Dataset, Node, Rule, RuleId, RuleKind, TriggerEvent, WriteOptions};
pub use reconcile::{Action, ReconcileOutcome, ReconcileSummary, Reconciler, RuleIndex};
pub use report::{Diagnostic, Diagnostics, Severity};
pub use store::{BackingStore, JsonStore, RuleMutation, RuleScript, SchemaNode, StoreError};
pub use sync::{SyncEngine, SyncOptions, SyncReport};
