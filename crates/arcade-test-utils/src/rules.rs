//! Rule and schema factories.

use arcade_core::{Rule, RuleId, RuleKind, SchemaNode, TriggerEvent};
use arcade_fs::NormalizedPath;

fn rule(id: RuleId, name: &str, kind: RuleKind) -> Rule {
    Rule {
        id,
        name: name.to_string(),
        kind: kind.store_name().to_string(),
        script_expression: format!("// {name}\nreturn $feature.id;"),
        triggering_events: vec![
            TriggerEvent::Insert.store_name().to_string(),
            TriggerEvent::Update.store_name().to_string(),
        ],
        ..Rule::default()
    }
}

/// A calculation rule with a script unique to `name`.
pub fn calculation(id: RuleId, name: &str) -> Rule {
    Rule {
        field_name: "VALUE".to_string(),
        ..rule(id, name, RuleKind::Calculation)
    }
}

/// A validation rule with an error number and message.
pub fn validation(id: RuleId, name: &str) -> Rule {
    Rule {
        error_number: 100 + id,
        error_message: format!("{name} failed"),
        severity: 3,
        ..rule(id, name, RuleKind::Validation)
    }
}

/// A constraint rule that fires on every edit.
pub fn constraint(id: RuleId, name: &str) -> Rule {
    Rule {
        triggering_events: vec![
            TriggerEvent::Insert.store_name().to_string(),
            TriggerEvent::Update.store_name().to_string(),
            TriggerEvent::Delete.store_name().to_string(),
        ],
        ..rule(id, name, RuleKind::Constraint)
    }
}

/// Build a snapshot document named `name` from `(container path, rules)`
/// pairs. Intermediate containers are created as needed; `""` is the root.
pub fn schema(name: &str, containers: &[(&str, Vec<Rule>)]) -> SchemaNode {
    let mut root = SchemaNode::new(name);

    for (path, rules) in containers {
        let path = NormalizedPath::new(path);
        let mut node = &mut root;
        for segment in path.segments() {
            let pos = match node.datasets.iter().position(|d| d.name == segment) {
                Some(pos) => pos,
                None => {
                    node.datasets.push(SchemaNode::new(segment));
                    node.datasets.len() - 1
                }
            };
            node = &mut node.datasets[pos];
        }
        node.attribute_rules.extend(rules.iter().cloned());
    }

    root
}
