//! The `config.json` document of a rule folder
//!
//! Field-by-field mapping between [`Rule`] and its on-disk document. Every
//! rule field except `scriptExpression` (stored in its own file) and
//! `parent` (implied by the folder location) appears here, in snapshot
//! order and with snapshot key names. Adding a field to [`Rule`] means
//! adding it to both conversions below.

use arcade_fs::NormalizedPath;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::rule::{NO_RESTRICTION, Rule, RuleId};

fn no_restriction() -> i64 {
    NO_RESTRICTION
}

fn enabled() -> bool {
    true
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RuleConfig {
    pub id: RuleId,
    pub name: String,
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub evaluation_order: i64,
    #[serde(default)]
    pub field_name: String,
    #[serde(default = "no_restriction")]
    pub subtype_code: i64,
    #[serde(default)]
    pub description: String,
    #[serde(default = "no_restriction")]
    pub error_number: i64,
    #[serde(default)]
    pub error_message: String,
    #[serde(default = "enabled")]
    pub user_editable: bool,
    #[serde(default = "enabled")]
    pub is_enabled: bool,
    #[serde(default)]
    pub references_external_service: bool,
    #[serde(default)]
    pub exclude_from_client_evaluation: bool,
    #[serde(default)]
    pub triggering_events: Vec<String>,
    #[serde(default)]
    pub check_parameters: Value,
    #[serde(default)]
    pub category: i64,
    #[serde(default = "no_restriction")]
    pub severity: i64,
    #[serde(default)]
    pub tags: String,
    #[serde(default)]
    pub batch: bool,
    #[serde(default)]
    pub required_geodatabase_client_version: String,
    #[serde(default)]
    pub creation_time: i64,
    #[serde(default)]
    pub triggering_fields: Vec<String>,
}

impl From<&Rule> for RuleConfig {
    fn from(rule: &Rule) -> Self {
        Self {
            id: rule.id,
            name: rule.name.clone(),
            kind: rule.kind.clone(),
            evaluation_order: rule.evaluation_order,
            field_name: rule.field_name.clone(),
            subtype_code: rule.subtype_code,
            description: rule.description.clone(),
            error_number: rule.error_number,
            error_message: rule.error_message.clone(),
            user_editable: rule.user_editable,
            is_enabled: rule.is_enabled,
            references_external_service: rule.references_external_service,
            exclude_from_client_evaluation: rule.exclude_from_client_evaluation,
            triggering_events: rule.triggering_events.clone(),
            check_parameters: rule.check_parameters.clone(),
            category: rule.category,
            severity: rule.severity,
            tags: rule.tags.clone(),
            batch: rule.batch,
            required_geodatabase_client_version: rule.required_geodatabase_client_version.clone(),
            creation_time: rule.creation_time,
            triggering_fields: rule.triggering_fields.clone(),
        }
    }
}

impl RuleConfig {
    /// Combine the document with its script body.
    pub fn into_rule(self, script_expression: String, parent: Option<NormalizedPath>) -> Rule {
        Rule {
            id: self.id,
            name: self.name,
            kind: self.kind,
            evaluation_order: self.evaluation_order,
            field_name: self.field_name,
            subtype_code: self.subtype_code,
            description: self.description,
            error_number: self.error_number,
            error_message: self.error_message,
            user_editable: self.user_editable,
            is_enabled: self.is_enabled,
            references_external_service: self.references_external_service,
            exclude_from_client_evaluation: self.exclude_from_client_evaluation,
            script_expression,
            triggering_events: self.triggering_events,
            check_parameters: self.check_parameters,
            category: self.category,
            severity: self.severity,
            tags: self.tags,
            batch: self.batch,
            required_geodatabase_client_version: self.required_geodatabase_client_version,
            creation_time: self.creation_time,
            triggering_fields: self.triggering_fields,
            parent,
        }
    }
}
