//! Action-block classification
//!
//! Splits the references of an action step into the entities that gate it
//! (conditions) and the entities or rules it acts on (outputs), descending
//! into `choose`, `if`, `repeat`, `sequence` and `parallel` bodies.

use ha_core::Identifier;
use ha_script::{parse_call_target, service_name, CallTarget};
use indexmap::IndexSet;
use serde_json::{Map, Value};

use crate::extract::{extract_map_references, extract_references, target_references};

/// Conditions and outputs of one action block
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BlockRelations {
    pub conditions: IndexSet<Identifier>,
    pub outputs: IndexSet<Identifier>,
}

impl BlockRelations {
    pub fn is_empty(&self) -> bool {
        self.conditions.is_empty() && self.outputs.is_empty()
    }
}

/// Classify the references of an action step, or a list of steps
///
/// Shapes that are not steps contribute nothing.
pub fn classify_block(step: &Value) -> BlockRelations {
    let mut relations = BlockRelations::default();
    classify_into(step, &mut relations);
    relations
}

fn classify_into(block: &Value, relations: &mut BlockRelations) {
    match block {
        Value::Array(steps) => steps.iter().for_each(|step| classify_into(step, relations)),
        Value::Object(step) => classify_step(step, relations),
        Value::Null | Value::Bool(_) | Value::Number(_) | Value::String(_) => {}
    }
}

fn classify_step(step: &Map<String, Value>, relations: &mut BlockRelations) {
    // A condition step only gates the steps after it
    if step.contains_key("condition") {
        relations.conditions.extend(extract_map_references(step));
        return;
    }

    classify_control_flow(step, relations);
    classify_outputs(step, relations);
}

fn classify_control_flow(step: &Map<String, Value>, relations: &mut BlockRelations) {
    if let Some(choose) = step.get("choose") {
        for branch in as_steps(choose) {
            if let Some(conditions) = branch.get("conditions").or_else(|| branch.get("condition")) {
                relations.conditions.extend(extract_references(conditions));
            }
            if let Some(sequence) = branch.get("sequence") {
                classify_into(sequence, relations);
            }
        }
        if let Some(default) = step.get("default") {
            classify_into(default, relations);
        }
    }

    if let Some(condition) = step.get("if") {
        relations.conditions.extend(extract_references(condition));
        for body in ["then", "else"] {
            if let Some(body) = step.get(body) {
                classify_into(body, relations);
            }
        }
    }

    if let Some(repeat) = step.get("repeat").and_then(Value::as_object) {
        for guard in ["until", "while"] {
            if let Some(guard) = repeat.get(guard) {
                relations.conditions.extend(extract_references(guard));
            }
        }
        if let Some(sequence) = repeat.get("sequence") {
            classify_into(sequence, relations);
        }
    }

    for body in ["sequence", "parallel"] {
        if let Some(body) = step.get(body) {
            classify_into(body, relations);
        }
    }

    if let Some(template) = step.get("wait_template") {
        relations.conditions.extend(extract_references(template));
    }
}

fn classify_outputs(step: &Map<String, Value>, relations: &mut BlockRelations) {
    if let Some(call) = service_name(step).as_deref().and_then(parse_call_target) {
        relations.outputs.insert(match call {
            CallTarget::Script(id) => Identifier::ScriptCall(id),
            CallTarget::Automation(id) => Identifier::AutomationCall(id),
        });
    }

    if let Some(entities) = step.get("entity_id") {
        relations.outputs.extend(extract_references(entities));
    }
    if let Some(target) = step.get("target") {
        relations.outputs.extend(target_references(target));
    }
    if let Some(entities) = step.get("data").and_then(|data| data.get("entity_id")) {
        relations.outputs.extend(extract_references(entities));
    }
    if let Some(scene) = step.get("scene") {
        relations.outputs.extend(extract_references(scene));
    }
}

/// Branch mappings of a `choose`, accepting a single branch in place of a list
fn as_steps(value: &Value) -> Vec<&Map<String, Value>> {
    match value {
        Value::Array(items) => items.iter().filter_map(Value::as_object).collect(),
        Value::Object(map) => vec![map],
        _ => Vec::new(),
    }
}
