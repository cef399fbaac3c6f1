//! Rule entity
//!
//! A Rule is the unit of synchronization: one attribute rule attached to a
//! container in the backing store, or one rule folder on disk. Identity is
//! the integer `id` assigned by the backing store.

use std::collections::BTreeSet;
use std::fmt;

use arcade_fs::{ArcadePath, ConfigStore, NormalizedPath, io, sanitize_component};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::WriteOptions;
use super::record::RuleConfig;
use crate::reconcile::{Action, ApplyContext, RuleIndex};
use crate::report::Diagnostics;
use crate::store::RuleMutation;
use crate::{Error, Result};

/// Backing-store assigned rule identity
pub type RuleId = i64;

/// Value the backing store uses for "no restriction" on numeric flags
pub const NO_RESTRICTION: i64 = -1;

fn no_restriction() -> i64 {
    NO_RESTRICTION
}

fn enabled() -> bool {
    true
}

/// Normalized rule kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum RuleKind {
    Calculation,
    Validation,
    Constraint,
}

impl RuleKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Calculation => "CALCULATION",
            Self::Validation => "VALIDATION",
            Self::Constraint => "CONSTRAINT",
        }
    }

    /// The verbose form the backing store reports in snapshots.
    pub fn store_name(&self) -> &'static str {
        match self {
            Self::Calculation => "esriARTCalculation",
            Self::Validation => "esriARTValidation",
            Self::Constraint => "esriARTConstraint",
        }
    }
}

impl fmt::Display for RuleKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Normalized triggering event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum TriggerEvent {
    Insert,
    Update,
    Delete,
}

impl TriggerEvent {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Insert => "INSERT",
            Self::Update => "UPDATE",
            Self::Delete => "DELETE",
        }
    }

    /// The verbose form the backing store reports in snapshots.
    pub fn store_name(&self) -> &'static str {
        match self {
            Self::Insert => "esriARTEInsert",
            Self::Update => "esriARTEUpdate",
            Self::Delete => "esriARTEDelete",
        }
    }
}

impl fmt::Display for TriggerEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A rule as reported by the backing store.
///
/// The serde form is the snapshot record (camelCase keys, `type` for the
/// kind, script body inline). The on-disk `config.json` uses
/// [`RuleConfig`] instead, which omits the script.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Rule {
    pub id: RuleId,
    pub name: String,
    /// Verbose kind string, e.g. `esriARTCalculation`
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
    pub script_expression: String,
    /// Raw event tokens, e.g. `esriARTEInsert`
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
    /// Address of the owning container. Not part of equality.
    #[serde(skip)]
    pub parent: Option<NormalizedPath>,
}

impl Default for Rule {
    fn default() -> Self {
        Self {
            id: 0,
            name: String::new(),
            kind: RuleKind::Calculation.store_name().to_string(),
            evaluation_order: 0,
            field_name: String::new(),
            subtype_code: NO_RESTRICTION,
            description: String::new(),
            error_number: NO_RESTRICTION,
            error_message: String::new(),
            user_editable: true,
            is_enabled: true,
            references_external_service: false,
            exclude_from_client_evaluation: false,
            script_expression: String::new(),
            triggering_events: Vec::new(),
            check_parameters: Value::Null,
            category: 0,
            severity: NO_RESTRICTION,
            tags: String::new(),
            batch: false,
            required_geodatabase_client_version: String::new(),
            creation_time: 0,
            triggering_fields: Vec::new(),
            parent: None,
        }
    }
}

/// Structural equality: every field except `parent`.
///
/// Kind and triggering events compare by their normalized meaning, so a
/// rule written back by the store in canonical form still matches the
/// document it came from.
impl PartialEq for Rule {
    fn eq(&self, other: &Self) -> bool {
        let same_kind = match (parse_kind(&self.kind), parse_kind(&other.kind)) {
            (Some(ours), Some(theirs)) => ours == theirs,
            _ => self.kind == other.kind,
        };

        self.id == other.id
            && self.name == other.name
            && same_kind
            && self.evaluation_order == other.evaluation_order
            && self.field_name == other.field_name
            && self.subtype_code == other.subtype_code
            && self.description == other.description
            && self.error_number == other.error_number
            && self.error_message == other.error_message
            && self.user_editable == other.user_editable
            && self.is_enabled == other.is_enabled
            && self.references_external_service == other.references_external_service
            && self.exclude_from_client_evaluation == other.exclude_from_client_evaluation
            && self.script_expression == other.script_expression
            && self.translated_events() == other.translated_events()
            && self.check_parameters == other.check_parameters
            && self.category == other.category
            && self.severity == other.severity
            && self.tags == other.tags
            && self.batch == other.batch
            && self.required_geodatabase_client_version
                == other.required_geodatabase_client_version
            && self.creation_time == other.creation_time
            && self.triggering_fields == other.triggering_fields
    }
}

impl Rule {
    /// Map the verbose kind string to a [`RuleKind`].
    pub fn translated_kind(&self) -> Result<RuleKind> {
        parse_kind(&self.kind).ok_or_else(|| Error::InvalidKind {
            rule: self.name.clone(),
            kind: self.kind.clone(),
        })
    }

    /// Map raw event tokens to the normalized event set.
    ///
    /// Unrecognized tokens are dropped.
    pub fn translated_events(&self) -> BTreeSet<TriggerEvent> {
        let mut events = BTreeSet::new();
        for token in &self.triggering_events {
            if token.contains("Insert") {
                events.insert(TriggerEvent::Insert);
            }
            if token.contains("Update") {
                events.insert(TriggerEvent::Update);
            }
            if token.contains("Delete") {
                events.insert(TriggerEvent::Delete);
            }
        }
        events
    }

    /// Filesystem-legal rendering of the rule name.
    ///
    /// Emits one WARNING per replaced character.
    pub fn safe_name(&self, diagnostics: &mut Diagnostics) -> String {
        let sanitized = sanitize_component(&self.name);
        for c in &sanitized.replaced {
            diagnostics.warning(format!(
                "Rule {} contains illegal character '{}', replacing with '_'",
                self.name, c
            ));
        }
        sanitized.value
    }

    /// Write `config.json` and the script body to `<parent_dir>/<safe name>/`.
    ///
    /// Returns the rule folder.
    pub fn write_file_record(
        &self,
        parent_dir: &NormalizedPath,
        options: &WriteOptions,
        diagnostics: &mut Diagnostics,
        actions: &mut Vec<String>,
    ) -> Result<NormalizedPath> {
        let safe_name = self.safe_name(diagnostics);
        let folder = parent_dir.join(&safe_name);
        let script_file = folder.join(&format!("{}.{}", safe_name, options.script_extension));
        let config_file = folder.join(ArcadePath::RuleConfig.as_str());

        if options.dry_run {
            actions.push(format!("[dry-run] Would write rule {} to {}", self.name, folder));
            return Ok(folder);
        }

        io::create_dir_all(&folder)?;
        io::write_text(&script_file, &self.script_expression)?;
        ConfigStore::new().save(&config_file, &RuleConfig::from(self))?;

        tracing::debug!(rule = %self.name, folder = %folder, "Wrote rule folder");
        actions.push(format!("Wrote rule {} to {}", self.name, folder));
        Ok(folder)
    }

    /// Rebuild a rule from its `config.json` and script file.
    pub fn read_file_record(
        config_file: &NormalizedPath,
        script_file: &NormalizedPath,
        parent: NormalizedPath,
    ) -> Result<Self> {
        let config: RuleConfig = ConfigStore::new().load(config_file)?;
        let script = io::read_text(script_file)?;
        Ok(config.into_rule(script, Some(parent)))
    }

    /// Normalized argument set for the mutation primitives.
    pub fn mutation(&self) -> Result<RuleMutation> {
        Ok(RuleMutation {
            id: self.id,
            name: self.name.clone(),
            kind: self.translated_kind()?,
            events: self.translated_events(),
            triggering_fields: self.triggering_fields.clone(),
            script_expression: self.script_expression.clone(),
            evaluation_order: self.evaluation_order,
            field_name: self.field_name.clone(),
            subtype: convert_flag(self.subtype_code),
            description: self.description.clone(),
            error_number: convert_flag(self.error_number),
            error_message: self.error_message.clone(),
            editable: self.user_editable,
            enabled: self.is_enabled,
            references_external_service: self.references_external_service,
            exclude_from_client_evaluation: self.exclude_from_client_evaluation,
            check_parameters: self.check_parameters.clone(),
            category: self.category,
            severity: convert_flag(self.severity),
            tags: self.tags.clone(),
            batch: self.batch,
            required_client_version: self.required_geodatabase_client_version.clone(),
            creation_time: self.creation_time,
        })
    }

    /// Decide what has to happen to this rule.
    ///
    /// Pure: looks only at the index and the deletion set.
    ///
    /// Structural equality alone does not make a rule unchanged here: a
    /// rule whose known container differs from the indexed one is updated
    /// even when structurally equal, so the store re-attaches it.
    pub fn decide(&self, current: &RuleIndex, marked_for_deletion: &BTreeSet<RuleId>) -> Action {
        if marked_for_deletion.contains(&self.id) {
            return Action::Delete;
        }
        match current.get(&self.id) {
            None => Action::Insert,
            Some(existing) if existing == self && !self.moved_from(existing) => Action::Skip,
            Some(_) => Action::Update,
        }
    }

    fn moved_from(&self, existing: &Rule) -> bool {
        matches!((&self.parent, &existing.parent), (Some(ours), Some(theirs)) if ours != theirs)
    }

    /// Decide and apply this rule's action against `container`.
    ///
    /// Mutation failures are reported through the context and never
    /// propagate; the decided action is returned either way.
    pub fn reconcile(
        &self,
        container: &NormalizedPath,
        current: &RuleIndex,
        marked_for_deletion: &BTreeSet<RuleId>,
        ctx: &mut ApplyContext<'_>,
    ) -> Action {
        let action = self.decide(current, marked_for_deletion);
        ctx.apply(action, self, container);
        action
    }
}

fn parse_kind(kind: &str) -> Option<RuleKind> {
    if kind.contains("Calculation") {
        Some(RuleKind::Calculation)
    } else if kind.contains("Validation") {
        Some(RuleKind::Validation)
    } else if kind.contains("Constraint") {
        Some(RuleKind::Constraint)
    } else {
        None
    }
}

/// Negative sentinel flags mean "no restriction".
fn convert_flag(flag: i64) -> Option<i64> {
    if flag < 0 { None } else { Some(flag) }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::Severity;
    use pretty_assertions::assert_eq;
    use rstest::rstest;
    use std::collections::BTreeMap;

    fn rule(id: RuleId, name: &str) -> Rule {
        Rule {
            id,
            name: name.to_string(),
            script_expression: "return $feature.height;".to_string(),
            triggering_events: vec!["esriARTEInsert".into(), "esriARTEUpdate".into()],
            ..Rule::default()
        }
    }

    #[rstest]
    #[case("esriARTCalculation", RuleKind::Calculation)]
    #[case("esriARTValidation", RuleKind::Validation)]
    #[case("esriARTConstraint", RuleKind::Constraint)]
    #[case("Calculation", RuleKind::Calculation)]
    fn test_translated_kind(#[case] kind: &str, #[case] expected: RuleKind) {
        let rule = Rule { kind: kind.to_string(), ..rule(1, "r") };
        assert_eq!(rule.translated_kind().unwrap(), expected);
    }

    #[rstest]
    #[case("esriARTUnknown")]
    #[case("")]
    #[case("calculation")]
    fn test_translated_kind_rejects_unknown(#[case] kind: &str) {
        let rule = Rule { kind: kind.to_string(), ..rule(1, "r") };
        let err = rule.translated_kind().unwrap_err();
        assert!(matches!(err, Error::InvalidKind { .. }), "got {err:?}");
    }

    #[test]
    fn test_translated_events_deduplicates_and_drops_unknown() {
        let rule = Rule {
            triggering_events: vec![
                "esriARTEUpdate".into(),
                "esriARTEInsert".into(),
                "esriARTEInsertUpdate".into(),
                "esriARTESomethingElse".into(),
            ],
            ..rule(1, "r")
        };

        let events: Vec<_> = rule.translated_events().into_iter().collect();
        assert_eq!(events, vec![TriggerEvent::Insert, TriggerEvent::Update]);
    }

    #[test]
    fn test_safe_name_warns_per_character_instance() {
        let mut diagnostics = Diagnostics::new();
        let rule = rule(1, "A/B:C");

        assert_eq!(rule.safe_name(&mut diagnostics), "A_B_C");
        assert_eq!(diagnostics.count(Severity::Warning), 2);
    }

    #[test]
    fn test_safe_name_repeated_character_warns_each_time() {
        let mut diagnostics = Diagnostics::new();
        let rule = rule(1, "a//b");

        assert_eq!(rule.safe_name(&mut diagnostics), "a__b");
        assert_eq!(diagnostics.count(Severity::Warning), 2);
    }

    #[test]
    fn test_equality_ignores_parent() {
        let a = Rule { parent: Some(NormalizedPath::new("Parcels")), ..rule(1, "r") };
        let b = Rule { parent: Some(NormalizedPath::new("Elsewhere")), ..rule(1, "r") };
        assert_eq!(a, b);

        let c = Rule { script_expression: "return 2;".into(), ..rule(1, "r") };
        assert_ne!(a, c);
    }

    #[test]
    fn test_equality_normalizes_kind_and_events() {
        let canonical = rule(1, "r");
        let loose = Rule {
            kind: "Calculation".into(),
            triggering_events: vec!["esriARTEUpdate".into(), "esriARTEInsert".into()],
            ..rule(1, "r")
        };
        assert_eq!(canonical, loose);

        let other_kind = Rule { kind: "esriARTValidation".into(), ..rule(1, "r") };
        assert_ne!(canonical, other_kind);
    }

    #[test]
    fn test_mutation_normalizes_sentinels() {
        let rule = Rule { error_number: 5, severity: -1, subtype_code: -1, ..rule(1, "r") };
        let mutation = rule.mutation().unwrap();

        assert_eq!(mutation.error_number, Some(5));
        assert_eq!(mutation.severity, None);
        assert_eq!(mutation.subtype, None);
        assert_eq!(mutation.kind, RuleKind::Calculation);
    }

    #[test]
    fn test_decide() {
        let current: RuleIndex = BTreeMap::from([(1, rule(1, "same")), (2, rule(2, "old name"))]);
        let none = BTreeSet::new();

        assert_eq!(rule(1, "same").decide(&current, &none), Action::Skip);
        assert_eq!(rule(2, "new name").decide(&current, &none), Action::Update);
        assert_eq!(rule(3, "fresh").decide(&current, &none), Action::Insert);
        assert_eq!(rule(1, "same").decide(&current, &BTreeSet::from([1])), Action::Delete);
    }

    #[test]
    fn test_decide_moved_rule_is_updated() {
        let indexed = Rule { parent: Some(NormalizedPath::new("Parcels")), ..rule(1, "same") };
        let current: RuleIndex = BTreeMap::from([(1, indexed)]);
        let moved = Rule { parent: Some(NormalizedPath::new("Roads")), ..rule(1, "same") };

        assert_eq!(moved.decide(&current, &BTreeSet::new()), Action::Update);
    }

    #[test]
    fn test_snapshot_record_defaults() {
        let rule: Rule = serde_json::from_value(serde_json::json!({
            "id": 4,
            "name": "Check Area",
            "type": "esriARTValidation"
        }))
        .unwrap();

        assert_eq!(rule.error_number, NO_RESTRICTION);
        assert!(rule.is_enabled);
        assert!(rule.parent.is_none());
        assert_eq!(rule.translated_kind().unwrap(), RuleKind::Validation);
    }
}
