//! Backing store kept as a single schema document on disk
//!
//! The document has the snapshot shape ([`SchemaNode`]) and is loaded
//! through [`ConfigStore`], so JSON, TOML and YAML databases all work.
//! Every successful mutation is persisted atomically.

use arcade_fs::{ConfigStore, NormalizedPath};

use super::{BackingStore, RuleMutation, RuleScript, SchemaNode, StoreError, StoreResult, container_label};
use crate::model::{Rule, RuleId};

/// Schema-document backing store
#[derive(Debug, Clone)]
pub struct JsonStore {
    schema: SchemaNode,
    /// Where the document is persisted; `None` keeps it in memory only
    path: Option<NormalizedPath>,
}

impl JsonStore {
    /// Open a database document.
    pub fn open(path: &NormalizedPath) -> StoreResult<Self> {
        let schema: SchemaNode = ConfigStore::new().load(path)?;
        tracing::debug!(database = %path, "Opened schema document");
        Ok(Self {
            schema,
            path: Some(path.clone()),
        })
    }

    /// Create a store that is never written to disk.
    pub fn in_memory(schema: SchemaNode) -> Self {
        Self { schema, path: None }
    }

    /// The current document.
    pub fn schema(&self) -> &SchemaNode {
        &self.schema
    }

    fn persist(&self) -> StoreResult<()> {
        if let Some(path) = &self.path {
            ConfigStore::new().save(path, &self.schema)?;
        }
        Ok(())
    }

    fn container_mut(&mut self, container: &NormalizedPath) -> StoreResult<&mut SchemaNode> {
        self.schema
            .find_mut(container)
            .ok_or_else(|| StoreError::container_not_found(container))
    }

    fn id_in_use(&mut self, id: RuleId) -> bool {
        let mut found = false;
        self.schema.walk_mut(NormalizedPath::root(), &mut |_, node| {
            found |= node.attribute_rules.iter().any(|r| r.id == id);
        });
        found
    }

    /// Remove the rule with `id` wherever it lives.
    fn take_rule(&mut self, id: RuleId) -> Option<Rule> {
        let mut taken = None;
        self.schema.walk_mut(NormalizedPath::root(), &mut |_, node| {
            if taken.is_none()
                && let Some(pos) = node.attribute_rules.iter().position(|r| r.id == id)
            {
                taken = Some(node.attribute_rules.remove(pos));
            }
        });
        taken
    }
}

impl BackingStore for JsonStore {
    fn name(&self) -> String {
        self.path
            .as_ref()
            .and_then(|p| p.file_name().map(str::to_string))
            .unwrap_or_else(|| self.schema.name.clone())
    }

    fn snapshot_schema(&self, target: &NormalizedPath) -> StoreResult<SchemaNode> {
        self.schema
            .find(target)
            .cloned()
            .ok_or_else(|| StoreError::container_not_found(target))
    }

    fn describe_rules(&self, container: &NormalizedPath) -> StoreResult<Vec<RuleScript>> {
        let node = self
            .schema
            .find(container)
            .ok_or_else(|| StoreError::container_not_found(container))?;
        Ok(node
            .attribute_rules
            .iter()
            .map(|r| RuleScript {
                name: r.name.clone(),
                script_expression: r.script_expression.clone(),
            })
            .collect())
    }

    fn exists(&self, container: &NormalizedPath) -> bool {
        self.schema.find(container).is_some()
    }

    /// Inserts under the requested id. Ids are unique across the whole
    /// document, including containers outside the current target.
    fn insert_rule(&mut self, container: &NormalizedPath, rule: &RuleMutation) -> StoreResult<()> {
        if self.id_in_use(rule.id) {
            return Err(StoreError::RuleIdInUse { id: rule.id });
        }

        let node = self.container_mut(container)?;
        if node.attribute_rules.iter().any(|r| r.name == rule.name) {
            return Err(StoreError::DuplicateRule {
                name: rule.name.clone(),
                container: container_label(container),
            });
        }
        node.attribute_rules.push(rule.to_record());
        self.persist()
    }

    /// Replaces the record with the same id, moving it into `container`
    /// when it currently lives elsewhere.
    fn update_rule(&mut self, container: &NormalizedPath, rule: &RuleMutation) -> StoreResult<()> {
        let node = self.container_mut(container)?;
        if node
            .attribute_rules
            .iter()
            .any(|r| r.name == rule.name && r.id != rule.id)
        {
            return Err(StoreError::DuplicateRule {
                name: rule.name.clone(),
                container: container_label(container),
            });
        }

        self.take_rule(rule.id)
            .ok_or(StoreError::RuleIdNotFound { id: rule.id })?;
        self.container_mut(container)?
            .attribute_rules
            .push(rule.to_record());
        self.persist()
    }

    fn delete_rule(&mut self, container: &NormalizedPath, name: &str) -> StoreResult<()> {
        let node = self.container_mut(container)?;
        let pos = node
            .attribute_rules
            .iter()
            .position(|r| r.name == name)
            .ok_or_else(|| StoreError::RuleNotFound {
                name: name.to_string(),
                container: container_label(container),
            })?;
        node.attribute_rules.remove(pos);
        self.persist()
    }

    fn scrubs_scripts(&self) -> bool {
        false
    }
}
