//! Normalized argument set for insert/update mutations

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::model::{NO_RESTRICTION, Rule, RuleId, RuleKind, TriggerEvent};

/// Arguments passed to [`super::BackingStore::insert_rule`] and
/// [`super::BackingStore::update_rule`].
///
/// Kinds and events are translated, and "no restriction" flags are `None`
/// rather than the store's negative sentinel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RuleMutation {
    pub id: RuleId,
    pub name: String,
    pub kind: RuleKind,
    pub events: BTreeSet<TriggerEvent>,
    pub triggering_fields: Vec<String>,
    pub script_expression: String,
    pub evaluation_order: i64,
    pub field_name: String,
    pub subtype: Option<i64>,
    pub description: String,
    pub error_number: Option<i64>,
    pub error_message: String,
    pub editable: bool,
    pub enabled: bool,
    pub references_external_service: bool,
    pub exclude_from_client_evaluation: bool,
    pub check_parameters: Value,
    pub category: i64,
    pub severity: Option<i64>,
    pub tags: String,
    pub batch: bool,
    pub required_client_version: String,
    pub creation_time: i64,
}

impl RuleMutation {
    /// The snapshot record a store reports back for this rule.
    ///
    /// Kinds and events take their canonical verbose names and absent
    /// flags become the negative sentinel again.
    pub fn to_record(&self) -> Rule {
        Rule {
            id: self.id,
            name: self.name.clone(),
            kind: self.kind.store_name().to_string(),
            evaluation_order: self.evaluation_order,
            field_name: self.field_name.clone(),
            subtype_code: self.subtype.unwrap_or(NO_RESTRICTION),
            description: self.description.clone(),
            error_number: self.error_number.unwrap_or(NO_RESTRICTION),
            error_message: self.error_message.clone(),
            user_editable: self.editable,
            is_enabled: self.enabled,
            references_external_service: self.references_external_service,
            exclude_from_client_evaluation: self.exclude_from_client_evaluation,
            script_expression: self.script_expression.clone(),
            triggering_events: self
                .events
                .iter()
                .map(|e| e.store_name().to_string())
                .collect(),
            check_parameters: self.check_parameters.clone(),
            category: self.category,
            severity: self.severity.unwrap_or(NO_RESTRICTION),
            tags: self.tags.clone(),
            batch: self.batch,
            required_geodatabase_client_version: self.required_client_version.clone(),
            creation_time: self.creation_time,
            triggering_fields: self.triggering_fields.clone(),
            parent: None,
        }
    }
}
