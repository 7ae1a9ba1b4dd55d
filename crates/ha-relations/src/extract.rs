//! Entity reference extraction
//!
//! Walks an arbitrary configuration value and collects every entity id it
//! names, whether directly (`entity_id: light.kitchen`) or inside a template
//! (`{{ states('sensor.temperature') }}`). Device and area ids are skipped.

use std::sync::OnceLock;

use ha_core::{contains_template, looks_like_entity_id, Identifier};
use indexmap::IndexSet;
use regex::Regex;
use serde_json::{Map, Value};

/// Template call forms that name an entity as their first argument
static TEMPLATE_PATTERNS: OnceLock<[Regex; 3]> = OnceLock::new();

fn template_patterns() -> &'static [Regex; 3] {
    TEMPLATE_PATTERNS.get_or_init(|| {
        [
            r#"states\(\s*['"]([^'"]+)['"]\s*\)"#,
            r#"state_attr\(\s*['"]([^'"]+)['"]\s*,"#,
            r#"is_state\(\s*['"]([^'"]+)['"]\s*,"#,
        ]
        .map(|pattern| Regex::new(pattern).expect("template pattern is a valid regex"))
    })
}

/// Keys whose values name devices or areas rather than entities
const IGNORED_KEYS: [&str; 2] = ["device_id", "area_id"];

/// Collect every entity referenced anywhere in `value`
///
/// The result preserves first-seen order and holds no duplicates.
pub fn extract_references(value: &Value) -> IndexSet<Identifier> {
    let mut found = IndexSet::new();
    collect(value, &mut found);
    found
}

/// Entity ids named by the supported template call forms
///
/// Only `states('x')`, `state_attr('x', ...)` and `is_state('x', ...)` are
/// recognized; `states.domain.object` attribute access is not. Ids come
/// back in the order they appear in the template.
pub fn template_references(template: &str) -> Vec<String> {
    let mut matches: Vec<(usize, &str)> = template_patterns()
        .iter()
        .flat_map(|pattern| pattern.captures_iter(template))
        .filter_map(|captures| captures.get(1))
        .filter(|m| m.as_str().contains('.'))
        .map(|m| (m.start(), m.as_str()))
        .collect();
    matches.sort_by_key(|(start, _)| *start);

    let mut refs: Vec<String> = Vec::new();
    for (_, candidate) in matches {
        if !refs.iter().any(|r| r == candidate) {
            refs.push(candidate.to_string());
        }
    }
    refs
}

/// Collect every entity referenced by the values of a mapping
pub fn extract_map_references(map: &Map<String, Value>) -> IndexSet<Identifier> {
    let mut found = IndexSet::new();
    collect_map(map, &mut found);
    found
}

/// Entities named by a service call `target`
///
/// A mapping target contributes only its `entity_id`; any other shape is
/// scanned as a whole.
pub fn target_references(target: &Value) -> IndexSet<Identifier> {
    let mut found = IndexSet::new();
    collect_target(target, &mut found);
    found
}

fn collect(value: &Value, found: &mut IndexSet<Identifier>) {
    match value {
        Value::String(s) => collect_string(s, found),
        Value::Array(items) => items.iter().for_each(|item| collect(item, found)),
        Value::Object(map) => collect_map(map, found),
        Value::Null | Value::Bool(_) | Value::Number(_) => {}
    }
}

fn collect_string(s: &str, found: &mut IndexSet<Identifier>) {
    if looks_like_entity_id(s) {
        found.insert(Identifier::entity(s));
    } else if contains_template(s) {
        found.extend(template_references(s).into_iter().map(Identifier::Entity));
    }
}

fn collect_map(map: &Map<String, Value>, found: &mut IndexSet<Identifier>) {
    for (key, value) in map {
        match key.as_str() {
            key if IGNORED_KEYS.contains(&key) => {}
            "target" => collect_target(value, found),
            _ => collect(value, found),
        }
    }
}

fn collect_target(target: &Value, found: &mut IndexSet<Identifier>) {
    match target.as_object() {
        Some(target) => {
            if let Some(entities) = target.get("entity_id") {
                collect(entities, found);
            }
        }
        None => collect(target, found),
    }
}
