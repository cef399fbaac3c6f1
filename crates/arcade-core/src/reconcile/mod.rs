//! Reconciliation of a desired tree against the backing store
//!
//! Two passes over freshly built inputs:
//!
//! 1. **Apply**: walk the desired tree depth-first (children before a
//!    container's own rules) and insert, update or skip each rule by
//!    comparing it with the current index.
//! 2. **Delete**: every id in the current index but not in the desired tree
//!    is deleted from the container it was read from.
//!
//! Deletes run only after the whole apply pass, so a rule whose name changed
//! but whose id did not is updated in place, never deleted and recreated.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use arcade_fs::NormalizedPath;
use serde::{Deserialize, Serialize};

use crate::Result;
use crate::build::RuleTree;
use crate::model::{Rule, RuleId};
use crate::report::Diagnostics;
use crate::store::{BackingStore, container_label};

/// Current rules keyed by id; each rule's `parent` names its container.
pub type RuleIndex = BTreeMap<RuleId, Rule>;

/// What reconciliation decided for one rule
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Action {
    Skip,
    Insert,
    Update,
    Delete,
}

impl Action {
    fn verb(&self) -> &'static str {
        match self {
            Self::Skip => "skip",
            Self::Insert => "insert",
            Self::Update => "update",
            Self::Delete => "delete",
        }
    }

    fn past_tense(&self) -> &'static str {
        match self {
            Self::Skip => "Skipped",
            Self::Insert => "Inserted",
            Self::Update => "Updated",
            Self::Delete => "Deleted",
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.verb().to_uppercase())
    }
}

/// Per-action counts of one reconciliation run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReconcileSummary {
    pub skipped: usize,
    pub inserted: usize,
    pub updated: usize,
    pub deleted: usize,
    /// Mutations the store rejected
    pub failed: usize,
    /// Desired containers absent from the store
    pub missing_containers: usize,
}

impl ReconcileSummary {
    fn record(&mut self, action: Action) {
        match action {
            Action::Skip => self.skipped += 1,
            Action::Insert => self.inserted += 1,
            Action::Update => self.updated += 1,
            Action::Delete => self.deleted += 1,
        }
    }

    /// Number of successful (or, in a dry run, planned) mutations.
    pub fn mutations(&self) -> usize {
        self.inserted + self.updated + self.deleted
    }
}

/// Mutable state threaded through one reconciliation run.
pub struct ApplyContext<'a> {
    store: &'a mut dyn BackingStore,
    diagnostics: &'a mut Diagnostics,
    dry_run: bool,
    summary: ReconcileSummary,
    actions: Vec<String>,
}

impl<'a> ApplyContext<'a> {
    pub fn new(store: &'a mut dyn BackingStore, diagnostics: &'a mut Diagnostics, dry_run: bool) -> Self {
        Self {
            store,
            diagnostics,
            dry_run,
            summary: ReconcileSummary::default(),
            actions: Vec::new(),
        }
    }

    pub fn container_exists(&self, container: &NormalizedPath) -> bool {
        self.store.exists(container)
    }

    pub fn diagnostics(&mut self) -> &mut Diagnostics {
        self.diagnostics
    }

    pub(crate) fn record_missing_container(&mut self) {
        self.summary.missing_containers += 1;
    }

    /// Carry out `action` for `rule` in `container`.
    ///
    /// A rejected mutation is reported at ERROR and counted; it never
    /// stops the run.
    pub(crate) fn apply(&mut self, action: Action, rule: &Rule, container: &NormalizedPath) {
        if action == Action::Skip {
            tracing::debug!(rule = %rule.name, id = rule.id, "Unchanged");
            self.summary.record(action);
            return;
        }

        let label = container_label(container);
        if self.dry_run {
            self.actions.push(format!(
                "[dry-run] Would {} rule {} in {}",
                action.verb(),
                rule.name,
                label
            ));
            self.summary.record(action);
            return;
        }

        match mutate(self.store, action, rule, container) {
            Ok(()) => {
                let message = format!("{} rule {} in {}", action.past_tense(), rule.name, label);
                tracing::info!("{}", message);
                self.actions.push(message);
                self.summary.record(action);
            }
            Err(e) => {
                self.diagnostics.error(format!(
                    "Failed to {} rule {} in {}\n{}",
                    action.verb(),
                    rule.name,
                    label,
                    e
                ));
                self.summary.failed += 1;
            }
        }
    }

    fn finish(self) -> ReconcileOutcome {
        ReconcileOutcome {
            summary: self.summary,
            actions: self.actions,
        }
    }
}

fn mutate(
    store: &mut dyn BackingStore,
    action: Action,
    rule: &Rule,
    container: &NormalizedPath,
) -> Result<()> {
    match action {
        Action::Skip => {}
        Action::Insert => store.insert_rule(container, &rule.mutation()?)?,
        Action::Update => store.update_rule(container, &rule.mutation()?)?,
        Action::Delete => store.delete_rule(container, &rule.name)?,
    }
    Ok(())
}

/// Result of [`Reconciler::run`]
#[derive(Debug, Clone, Default)]
pub struct ReconcileOutcome {
    pub summary: ReconcileSummary,
    /// One line per applied (or planned) mutation, in order
    pub actions: Vec<String>,
}

/// Drives both reconciliation passes against one store.
pub struct Reconciler<'a> {
    store: &'a mut dyn BackingStore,
    dry_run: bool,
}

impl<'a> Reconciler<'a> {
    pub fn new(store: &'a mut dyn BackingStore) -> Self {
        Self {
            store,
            dry_run: false,
        }
    }

    /// Decide everything but call no mutation primitive.
    pub fn dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    /// Reconcile `desired` against the `current` index.
    pub fn run(
        &mut self,
        desired: &RuleTree,
        current: &RuleIndex,
        diagnostics: &mut Diagnostics,
    ) -> ReconcileOutcome {
        let mut ctx = ApplyContext::new(&mut *self.store, diagnostics, self.dry_run);

        desired.root.reconcile(current, &mut ctx);

        let to_delete = deletion_set(current, &desired.ids());
        for id in &to_delete {
            if let Some(rule) = current.get(id) {
                let container = rule.parent.clone().unwrap_or_default();
                rule.reconcile(&container, current, &to_delete, &mut ctx);
            }
        }

        ctx.finish()
    }
}

/// `current − desired`, over ids only.
pub fn deletion_set(current: &RuleIndex, desired: &BTreeSet<RuleId>) -> BTreeSet<RuleId> {
    current
        .keys()
        .filter(|id| !desired.contains(id))
        .copied()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Dataset;
    use crate::report::Severity;
    use crate::store::{JsonStore, SchemaNode};
    use pretty_assertions::assert_eq;

    fn rule(id: RuleId, name: &str, container: &str) -> Rule {
        Rule {
            id,
            name: name.to_string(),
            parent: Some(NormalizedPath::new(container)),
            ..Rule::default()
        }
    }

    fn current_store(rules: &[Rule]) -> JsonStore {
        let mut root = SchemaNode::new("db");
        let mut parcels = SchemaNode::new("Parcels");
        parcels.attribute_rules = rules.to_vec();
        root.datasets.push(parcels);
        JsonStore::in_memory(root)
    }

    fn desired(rules: Vec<Rule>) -> RuleTree {
        let mut root = Dataset::new("repo", NormalizedPath::root());
        let mut parcels = Dataset::new("Parcels", NormalizedPath::new("Parcels"));
        parcels.rules = rules;
        root.datasets.push(parcels);
        RuleTree::from_root(root).unwrap()
    }

    fn index(rules: &[Rule]) -> RuleIndex {
        rules.iter().map(|r| (r.id, r.clone())).collect()
    }

    #[test]
    fn test_deletion_set_is_current_minus_desired() {
        let current = index(&[rule(1, "a", "P"), rule(2, "b", "P"), rule(3, "c", "P")]);
        let desired = BTreeSet::from([1, 3, 4]);
        assert_eq!(deletion_set(&current, &desired), BTreeSet::from([2]));
    }

    #[test]
    fn test_run_applies_each_action_kind() {
        let existing = vec![rule(1, "Keep", "Parcels"), rule(2, "Drop", "Parcels"), rule(3, "Old", "Parcels")];
        let mut store = current_store(&existing);
        let tree = desired(vec![
            rule(1, "Keep", "Parcels"),
            rule(3, "New Name", "Parcels"),
            rule(4, "Fresh", "Parcels"),
        ]);
        let mut diagnostics = Diagnostics::new();

        let outcome = Reconciler::new(&mut store).run(&tree, &index(&existing), &mut diagnostics);

        assert_eq!(
            outcome.summary,
            ReconcileSummary { skipped: 1, inserted: 1, updated: 1, deleted: 1, failed: 0, missing_containers: 0 }
        );
        let names: Vec<_> = store.schema().datasets[0].attribute_rules.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["Keep", "New Name", "Fresh"]);
        // Delete is the last action
        assert!(outcome.actions.last().unwrap().starts_with("Deleted rule Drop"));
    }

    #[test]
    fn test_dry_run_leaves_store_untouched() {
        let existing = vec![rule(1, "Keep", "Parcels")];
        let mut store = current_store(&existing);
        let before = store.schema().clone();
        let tree = desired(vec![rule(2, "Fresh", "Parcels")]);
        let mut diagnostics = Diagnostics::new();

        let outcome = Reconciler::new(&mut store)
            .dry_run(true)
            .run(&tree, &index(&existing), &mut diagnostics);

        assert_eq!(store.schema(), &before);
        assert_eq!(outcome.summary.mutations(), 2);
        assert!(outcome.actions.iter().all(|a| a.starts_with("[dry-run] Would")));
    }

    #[test]
    fn test_rejected_mutation_is_reported_and_run_continues() {
        // Same name under a new id: the insert collides with the rule that is
        // only deleted afterwards
        let existing = vec![rule(1, "Area", "Parcels")];
        let mut store = current_store(&existing);
        let tree = desired(vec![rule(2, "Area", "Parcels"), rule(3, "Other", "Parcels")]);
        let mut diagnostics = Diagnostics::new();

        let outcome = Reconciler::new(&mut store).run(&tree, &index(&existing), &mut diagnostics);

        assert_eq!(outcome.summary.failed, 1);
        assert_eq!(outcome.summary.inserted, 1);
        assert_eq!(outcome.summary.deleted, 1);
        assert_eq!(diagnostics.count(Severity::Error), 1);
        let error = &diagnostics
            .entries()
            .iter()
            .find(|d| d.severity == Severity::Error)
            .unwrap()
            .message;
        assert!(error.contains("Area") && error.contains("Parcels"), "got: {error}");
    }
}
