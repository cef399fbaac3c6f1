//! Tree Builder
//!
//! Rebuilds a [`RuleTree`] from scratch on every run, either from a backing
//! store snapshot ([`from_store`]) or from a rule repository on disk
//! ([`from_file_tree`]). Both directions go through [`RuleTree::from_root`],
//! which validates the tree before anything is reconciled.
//!
//! The root dataset of every tree is named after the last segment of its
//! address (empty for the store root), so a tree read back from disk
//! compares equal to the one it was extracted from.

mod files;
mod store;

pub use files::from_file_tree;
pub use store::from_store;

use std::collections::{BTreeMap, BTreeSet};

use arcade_fs::NormalizedPath;

use crate::model::{Dataset, RuleId};
use crate::reconcile::RuleIndex;
use crate::store::container_label;
use crate::{Error, Result};

/// A validated dataset tree together with its rule index.
#[derive(Debug, Clone)]
pub struct RuleTree {
    pub root: Dataset,
    /// Every rule of the tree keyed by id; `parent` is set on each entry
    pub index: RuleIndex,
}

impl RuleTree {
    /// Validate `root` and index its rules.
    ///
    /// Fails with [`Error::InvalidKind`] for an untranslatable rule kind,
    /// [`Error::DuplicateRuleId`] when two rules anywhere in the tree share
    /// an id and [`Error::DuplicateRuleName`] when two sibling rules share a
    /// name.
    pub fn from_root(root: Dataset) -> Result<Self> {
        let mut index = RuleIndex::new();
        let mut failure = None;

        root.walk(&mut |dataset| {
            if failure.is_none()
                && let Err(e) = index_dataset(dataset, &mut index)
            {
                failure = Some(e);
            }
        });

        if let Some(e) = failure {
            return Err(e);
        }

        tracing::debug!(rules = index.len(), "Validated rule tree");
        Ok(Self { root, index })
    }

    /// Ids of every rule in the tree.
    pub fn ids(&self) -> BTreeSet<RuleId> {
        self.index.keys().copied().collect()
    }

    pub fn rule_count(&self) -> usize {
        self.index.len()
    }
}

fn index_dataset(dataset: &Dataset, index: &mut RuleIndex) -> Result<()> {
    let mut siblings = BTreeMap::new();

    for rule in &dataset.rules {
        rule.translated_kind()?;

        if siblings.insert(rule.name.as_str(), rule.id).is_some() {
            return Err(Error::DuplicateRuleName {
                name: rule.name.clone(),
                container: container_label(&dataset.path),
            });
        }

        if let Some(existing) = index.get(&rule.id) {
            return Err(Error::DuplicateRuleId {
                id: rule.id,
                first: existing.name.clone(),
                second: rule.name.clone(),
            });
        }

        let mut indexed = rule.clone();
        indexed.parent = Some(dataset.path.clone());
        index.insert(rule.id, indexed);
    }

    Ok(())
}

/// Name of the root dataset addressed by `path`.
fn root_name(path: &NormalizedPath) -> String {
    path.file_name().unwrap_or_default().to_string()
}
