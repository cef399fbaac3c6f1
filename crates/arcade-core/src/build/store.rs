//! Tree construction from a backing store snapshot

use arcade_fs::NormalizedPath;

use super::{RuleTree, root_name};
use crate::Result;
use crate::model::Dataset;
use crate::store::{BackingStore, SchemaNode};

/// Build the current tree for `target` from the backing store.
///
/// The snapshot is converted first; when the store may scrub script text
/// from snapshots, a second depth-first pass overwrites every rule's script
/// with the authoritative body from [`BackingStore::describe_rules`].
pub fn from_store(store: &dyn BackingStore, target: &NormalizedPath) -> Result<RuleTree> {
    let snapshot = store.snapshot_schema(target)?;
    tracing::debug!(store = %store.name(), target = %target, "Read schema snapshot");

    let mut root = from_snapshot(&snapshot, target.clone());
    root.name = root_name(target);

    if store.scrubs_scripts() {
        patch_scripts(store, &mut root)?;
    }

    RuleTree::from_root(root)
}

fn from_snapshot(node: &SchemaNode, path: NormalizedPath) -> Dataset {
    let mut dataset = Dataset::new(node.name.clone(), path);

    dataset.datasets = node
        .datasets
        .iter()
        .map(|child| from_snapshot(child, dataset.path.join(&child.name)))
        .collect();

    dataset.rules = node
        .attribute_rules
        .iter()
        .map(|rule| {
            let mut rule = rule.clone();
            rule.parent = Some(dataset.path.clone());
            rule
        })
        .collect();

    dataset
}

fn patch_scripts(store: &dyn BackingStore, dataset: &mut Dataset) -> Result<()> {
    if !dataset.rules.is_empty() {
        for described in store.describe_rules(&dataset.path)? {
            dataset.lookup_rule_mut(&described.name)?.script_expression = described.script_expression;
        }
        tracing::debug!(container = %dataset.path, rules = dataset.rules.len(), "Recovered scripts");
    }

    for child in &mut dataset.datasets {
        patch_scripts(store, child)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Rule;
    use crate::store::JsonStore;
    use pretty_assertions::assert_eq;

    fn schema() -> SchemaNode {
        let mut root = SchemaNode::new("db");
        let mut network = SchemaNode::new("Network");
        let mut lines = SchemaNode::new("Lines");
        lines.attribute_rules.push(Rule {
            id: 3,
            name: "Length".into(),
            script_expression: "return 1;".into(),
            ..Rule::default()
        });
        network.datasets.push(lines);
        root.datasets.push(network);
        root
    }

    #[test]
    fn test_paths_follow_the_snapshot_nesting() {
        let store = JsonStore::in_memory(schema());
        let tree = from_store(&store, &NormalizedPath::root()).unwrap();

        let lines = &tree.root.datasets[0].datasets[0];
        assert_eq!(lines.path, NormalizedPath::new("Network/Lines"));
        assert_eq!(tree.index[&3].parent, Some(NormalizedPath::new("Network/Lines")));
        assert_eq!(tree.root.name, "");
    }

    #[test]
    fn test_target_subtree() {
        let store = JsonStore::in_memory(schema());
        let tree = from_store(&store, &NormalizedPath::new("Network")).unwrap();

        assert_eq!(tree.root.name, "Network");
        assert_eq!(tree.root.datasets[0].path, NormalizedPath::new("Network/Lines"));
    }

    #[test]
    fn test_missing_target_fails() {
        let store = JsonStore::in_memory(schema());
        assert!(from_store(&store, &NormalizedPath::new("Nowhere")).is_err());
    }
}
