//! Dataset entity: one node of the container hierarchy

use std::collections::{BTreeMap, BTreeSet};

use arcade_fs::{NormalizedPath, io, sanitize_component};

use super::WriteOptions;
use super::rule::{Rule, RuleId};
use crate::reconcile::{Action, ApplyContext, RuleIndex};
use crate::report::Diagnostics;
use crate::store::container_label;
use crate::{Error, Result};

/// A container owning nested containers and rules.
///
/// `path` is the container address relative to the snapshot target and
/// mirrors the directory nesting of the file tree. Two containers may share
/// a name, never a path.
#[derive(Debug, Clone, Default)]
pub struct Dataset {
    pub name: String,
    pub path: NormalizedPath,
    pub datasets: Vec<Dataset>,
    pub rules: Vec<Rule>,
}

/// Immediate child found by [`Dataset::lookup`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Node<'a> {
    Dataset(&'a Dataset),
    Rule(&'a Rule),
}

/// Structural equality: name, path, children and rules, independent of
/// child order. Rule equality already ignores `parent`.
impl PartialEq for Dataset {
    fn eq(&self, other: &Self) -> bool {
        if self.name != other.name
            || self.path != other.path
            || self.datasets.len() != other.datasets.len()
            || self.rules.len() != other.rules.len()
        {
            return false;
        }

        let mut ours: Vec<_> = self.datasets.iter().collect();
        let mut theirs: Vec<_> = other.datasets.iter().collect();
        ours.sort_by(|a, b| a.path.cmp(&b.path));
        theirs.sort_by(|a, b| a.path.cmp(&b.path));
        if ours != theirs {
            return false;
        }

        let mut ours: Vec<_> = self.rules.iter().collect();
        let mut theirs: Vec<_> = other.rules.iter().collect();
        ours.sort_by_key(|r| r.id);
        theirs.sort_by_key(|r| r.id);
        ours == theirs
    }
}

impl Dataset {
    pub fn new(name: impl Into<String>, path: NormalizedPath) -> Self {
        Self {
            name: name.into(),
            path,
            datasets: Vec::new(),
            rules: Vec::new(),
        }
    }

    /// Filesystem-legal rendering of the dataset name.
    ///
    /// Emits one WARNING per replaced character.
    pub fn safe_name(&self, diagnostics: &mut Diagnostics) -> String {
        let sanitized = sanitize_component(&self.name);
        for c in &sanitized.replaced {
            diagnostics.warning(format!(
                "Dataset {} contains illegal character '{}', replacing with '_'",
                self.name, c
            ));
        }
        sanitized.value
    }

    /// Find an immediate child dataset or rule by name.
    ///
    /// Datasets are searched before rules.
    pub fn lookup(&self, key: &str) -> Result<Node<'_>> {
        if let Some(dataset) = self.datasets.iter().find(|d| d.name == key) {
            return Ok(Node::Dataset(dataset));
        }
        if let Some(rule) = self.rules.iter().find(|r| r.name == key) {
            return Ok(Node::Rule(rule));
        }
        Err(self.not_found(key))
    }

    /// Mutable access to an owned rule by name.
    pub fn lookup_rule_mut(&mut self, key: &str) -> Result<&mut Rule> {
        let container = self.name.clone();
        self.rules
            .iter_mut()
            .find(|r| r.name == key)
            .ok_or_else(|| Error::NotFound {
                key: key.to_string(),
                container,
            })
    }

    fn not_found(&self, key: &str) -> Error {
        Error::NotFound {
            key: key.to_string(),
            container: self.name.clone(),
        }
    }

    /// Visit this dataset and every descendant, parents before children.
    pub fn walk<'a>(&'a self, visit: &mut impl FnMut(&'a Dataset)) {
        visit(self);
        for child in &self.datasets {
            child.walk(visit);
        }
    }

    /// All rules in this subtree, in walk order.
    pub fn all_rules(&self) -> Vec<&Rule> {
        let mut rules = Vec::new();
        self.walk(&mut |dataset| rules.extend(dataset.rules.iter()));
        rules
    }

    /// Write this subtree below `root`.
    ///
    /// Nothing is written when two siblings map to the same folder, see
    /// [`Dataset::check_folder_names`].
    ///
    /// Child datasets land in `root/<child safe name>/`; owned rules go
    /// directly under `root`, each choosing its own folder. Every dataset
    /// directory is created even without rules so empty containers survive
    /// a round trip.
    pub fn write_file_tree(
        &self,
        root: &NormalizedPath,
        options: &WriteOptions,
        diagnostics: &mut Diagnostics,
        actions: &mut Vec<String>,
    ) -> Result<()> {
        self.check_folder_names()?;
        self.write_subtree(root, options, diagnostics, actions)
    }

    /// Fail when two siblings of any dataset in this subtree would share a
    /// folder once their names are sanitized.
    ///
    /// Child datasets and rules live side by side in one directory, so they
    /// share one namespace.
    pub fn check_folder_names(&self) -> Result<()> {
        let mut taken: BTreeMap<String, &str> = BTreeMap::new();
        let names = self
            .datasets
            .iter()
            .map(|d| d.name.as_str())
            .chain(self.rules.iter().map(|r| r.name.as_str()));
        for name in names {
            let folder = sanitize_component(name).value;
            if let Some(first) = taken.insert(folder.clone(), name) {
                return Err(Error::FolderNameCollision {
                    folder,
                    first: first.to_string(),
                    second: name.to_string(),
                    container: container_label(&self.path),
                });
            }
        }
        self.datasets.iter().try_for_each(Dataset::check_folder_names)
    }

    fn write_subtree(
        &self,
        root: &NormalizedPath,
        options: &WriteOptions,
        diagnostics: &mut Diagnostics,
        actions: &mut Vec<String>,
    ) -> Result<()> {
        if !options.dry_run {
            io::create_dir_all(root)?;
        }
        for dataset in &self.datasets {
            let child_root = root.join(&dataset.safe_name(diagnostics));
            dataset.write_subtree(&child_root, options, diagnostics, actions)?;
        }
        for rule in &self.rules {
            rule.write_file_record(root, options, diagnostics, actions)?;
        }
        Ok(())
    }

    /// Apply pass for this subtree.
    ///
    /// Children are reconciled before this dataset's own rules. The
    /// container is checked for existence on its own, regardless of what
    /// happened to its parent. Returns the number of rules in the subtree
    /// that needed a change; the INFO line for a container reports that
    /// subtree total.
    pub fn reconcile(&self, current: &RuleIndex, ctx: &mut ApplyContext<'_>) -> usize {
        let mut changed: usize = self
            .datasets
            .iter()
            .map(|child| child.reconcile(current, ctx))
            .sum();

        if self.rules.is_empty() {
            return changed;
        }

        if !ctx.container_exists(&self.path) {
            ctx.diagnostics().warning(format!(
                "{} does not exist in target database, skipping {} rule(s)",
                container_label(&self.path),
                self.rules.len()
            ));
            ctx.record_missing_container();
            return changed;
        }

        let no_deletions = BTreeSet::<RuleId>::new();
        let own = self
            .rules
            .iter()
            .map(|rule| rule.reconcile(&self.path, current, &no_deletions, ctx))
            .filter(|action| *action != Action::Skip)
            .count();

        changed += own;
        if changed > 0 {
            ctx.diagnostics().info(format!(
                "{} rule change(s) in {} and below",
                changed,
                container_label(&self.path)
            ));
        }
        changed
    }
}
