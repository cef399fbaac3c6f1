//! [`RecordingStore`]: a backing-store double.
//!
//! Wraps an in-memory [`JsonStore`] and journals every collaborator call.
//! Tests can make it reject mutations of named rules, report containers as
//! missing, or scrub script text from snapshots the way a lossy store does.

use std::cell::RefCell;
use std::collections::BTreeSet;

use arcade_core::store::StoreResult;
use arcade_core::{BackingStore, JsonStore, RuleMutation, RuleScript, SchemaNode, StoreError};
use arcade_fs::NormalizedPath;

/// Placeholder written over every script in a scrubbed snapshot
pub const SCRUBBED: &str = "<scrubbed>";

/// One journaled collaborator call
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreCall {
    Snapshot { target: String },
    Describe { container: String },
    Exists { container: String },
    Insert { container: String, id: i64, name: String },
    Update { container: String, id: i64, name: String },
    Delete { container: String, name: String },
}

impl StoreCall {
    pub fn is_mutation(&self) -> bool {
        matches!(
            self,
            Self::Insert { .. } | Self::Update { .. } | Self::Delete { .. }
        )
    }
}

/// Backing-store double with a call journal and failure injection.
#[derive(Debug)]
pub struct RecordingStore {
    inner: JsonStore,
    calls: RefCell<Vec<StoreCall>>,
    rejected: BTreeSet<String>,
    missing: BTreeSet<NormalizedPath>,
    scrub: bool,
}

impl RecordingStore {
    pub fn new(schema: SchemaNode) -> Self {
        Self {
            inner: JsonStore::in_memory(schema),
            calls: RefCell::new(Vec::new()),
            rejected: BTreeSet::new(),
            missing: BTreeSet::new(),
            scrub: false,
        }
    }

    /// Reject every mutation of the rule called `name`.
    pub fn reject(mut self, name: &str) -> Self {
        self.rejected.insert(name.to_string());
        self
    }

    /// Report `container` as absent even though the schema has it.
    pub fn hide_container(mut self, container: &str) -> Self {
        self.missing.insert(NormalizedPath::new(container));
        self
    }

    /// Replace script text in snapshots with [`SCRUBBED`].
    pub fn scrub_scripts(mut self) -> Self {
        self.scrub = true;
        self
    }

    pub fn schema(&self) -> &SchemaNode {
        self.inner.schema()
    }

    /// Every call so far, in order.
    pub fn calls(&self) -> Vec<StoreCall> {
        self.calls.borrow().clone()
    }

    /// Insert, update and delete calls so far, in order.
    pub fn mutations(&self) -> Vec<StoreCall> {
        self.calls
            .borrow()
            .iter()
            .filter(|c| c.is_mutation())
            .cloned()
            .collect()
    }

    pub fn clear_calls(&self) {
        self.calls.borrow_mut().clear();
    }

    fn record(&self, call: StoreCall) {
        self.calls.borrow_mut().push(call);
    }

    fn check(&self, container: &NormalizedPath, name: &str) -> StoreResult<()> {
        if self.missing.contains(container) {
            return Err(StoreError::container_not_found(container));
        }
        if self.rejected.contains(name) {
            return Err(StoreError::Rejected {
                message: format!("Rule '{name}' rejected by test store"),
            });
        }
        Ok(())
    }
}

fn scrub(node: &mut SchemaNode) {
    for rule in &mut node.attribute_rules {
        rule.script_expression = SCRUBBED.to_string();
    }
    for child in &mut node.datasets {
        scrub(child);
    }
}

impl BackingStore for RecordingStore {
    fn name(&self) -> String {
        self.inner.name()
    }

    fn snapshot_schema(&self, target: &NormalizedPath) -> StoreResult<SchemaNode> {
        self.record(StoreCall::Snapshot {
            target: target.to_string(),
        });
        let mut snapshot = self.inner.snapshot_schema(target)?;
        if self.scrub {
            scrub(&mut snapshot);
        }
        Ok(snapshot)
    }

    fn describe_rules(&self, container: &NormalizedPath) -> StoreResult<Vec<RuleScript>> {
        self.record(StoreCall::Describe {
            container: container.to_string(),
        });
        self.inner.describe_rules(container)
    }

    fn exists(&self, container: &NormalizedPath) -> bool {
        self.record(StoreCall::Exists {
            container: container.to_string(),
        });
        !self.missing.contains(container) && self.inner.exists(container)
    }

    fn insert_rule(&mut self, container: &NormalizedPath, rule: &RuleMutation) -> StoreResult<()> {
        self.record(StoreCall::Insert {
            container: container.to_string(),
            id: rule.id,
            name: rule.name.clone(),
        });
        self.check(container, &rule.name)?;
        self.inner.insert_rule(container, rule)
    }

    fn update_rule(&mut self, container: &NormalizedPath, rule: &RuleMutation) -> StoreResult<()> {
        self.record(StoreCall::Update {
            container: container.to_string(),
            id: rule.id,
            name: rule.name.clone(),
        });
        self.check(container, &rule.name)?;
        self.inner.update_rule(container, rule)
    }

    fn delete_rule(&mut self, container: &NormalizedPath, name: &str) -> StoreResult<()> {
        self.record(StoreCall::Delete {
            container: container.to_string(),
            name: name.to_string(),
        });
        self.check(container, name)?;
        self.inner.delete_rule(container, name)
    }

    fn scrubs_scripts(&self) -> bool {
        self.scrub
    }
}
