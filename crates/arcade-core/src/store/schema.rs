//! Snapshot documents exchanged with the backing store

use arcade_fs::NormalizedPath;
use serde::{Deserialize, Serialize};

use crate::model::Rule;

/// One container of a schema snapshot, with its descendants.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SchemaNode {
    pub name: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub datasets: Vec<SchemaNode>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub attribute_rules: Vec<Rule>,
}

impl SchemaNode {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Resolve a container address relative to this node.
    pub fn find(&self, path: &NormalizedPath) -> Option<&SchemaNode> {
        path.segments().try_fold(self, |node, segment| {
            node.datasets.iter().find(|child| child.name == segment)
        })
    }

    /// Mutable variant of [`SchemaNode::find`].
    pub fn find_mut(&mut self, path: &NormalizedPath) -> Option<&mut SchemaNode> {
        path.segments().try_fold(self, |node, segment| {
            node.datasets.iter_mut().find(|child| child.name == segment)
        })
    }

    /// Visit every node with its address, parents first.
    pub fn walk_mut(&mut self, path: NormalizedPath, visit: &mut impl FnMut(&NormalizedPath, &mut SchemaNode)) {
        visit(&path, self);
        for child in &mut self.datasets {
            let child_path = path.join(&child.name);
            child.walk_mut(child_path, visit);
        }
    }
}

/// Entry of a per-container rule description.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RuleScript {
    pub name: String,
    pub script_expression: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tree() -> SchemaNode {
        let mut root = SchemaNode::new("db");
        let mut network = SchemaNode::new("Network");
        network.datasets.push(SchemaNode::new("Lines"));
        root.datasets.push(network);
        root
    }

    #[test]
    fn test_find_resolves_nested_paths() {
        let root = tree();
        assert_eq!(root.find(&NormalizedPath::root()).unwrap().name, "db");
        assert_eq!(root.find(&NormalizedPath::new("Network/Lines")).unwrap().name, "Lines");
        assert!(root.find(&NormalizedPath::new("Network/Points")).is_none());
    }

    #[test]
    fn test_walk_mut_reports_addresses() {
        let mut root = tree();
        let mut seen = Vec::new();
        root.walk_mut(NormalizedPath::root(), &mut |path, _| seen.push(path.to_string()));
        assert_eq!(seen, vec!["", "Network", "Network/Lines"]);
    }

    #[test]
    fn test_deserialize_report_shape() {
        let node: SchemaNode = serde_json::from_str(
            r#"{"name": "db", "datasets": [{"name": "Parcels", "attributeRules": [
                {"id": 1, "name": "Area", "type": "esriARTCalculation"}]}]}"#,
        )
        .unwrap();
        assert_eq!(node.datasets[0].attribute_rules[0].name, "Area");
    }
}
