//! Helper entity dependencies
//!
//! Entities created through UI helpers (template sensors, utility meters,
//! statistics, min/max and group helpers) derive their state from other
//! entities. The source entities are read from the options of the config
//! entry that created the helper.

use std::sync::OnceLock;

use ha_core::Identifier;
use indexmap::IndexSet;
use regex::Regex;
use serde_json::Value;

use crate::extract::extract_references;
use crate::summary::RelationSet;

/// Helper platforms whose options name source entities
pub const HELPER_PLATFORMS: [&str; 5] = ["template", "utility_meter", "statistics", "min_max", "group"];

/// `states.domain.object` attribute access inside a template helper's state
static STATE_ACCESS: OnceLock<Regex> = OnceLock::new();

fn state_access_pattern() -> &'static Regex {
    STATE_ACCESS.get_or_init(|| {
        Regex::new(r"states\.([a-zA-Z0-9_]+\.[a-zA-Z0-9_]+)").expect("state access pattern is a valid regex")
    })
}

/// Entities a template helper's state reads
///
/// Covers the extractor's call forms plus `states.domain.object` access,
/// which template helpers commonly use.
fn template_state_references(state: &Value, found: &mut IndexSet<Identifier>) {
    found.extend(extract_references(state));
    if let Some(template) = state.as_str() {
        found.extend(
            state_access_pattern()
                .captures_iter(template)
                .filter_map(|captures| captures.get(1))
                .map(|m| Identifier::entity(m.as_str())),
        );
    }
}

/// Entities a helper of `platform` depends on, given its config entry options
///
/// Template helpers read their sources reactively and record them as
/// conditions; the others aggregate their sources and record them as
/// triggers. Unknown platforms have no dependencies.
pub fn helper_dependencies(platform: &str, options: &Value) -> RelationSet {
    let mut dependencies = RelationSet::default();
    match platform {
        "template" => {
            if let Some(state) = options.get("state") {
                template_state_references(state, &mut dependencies.conditions);
            }
        }
        "utility_meter" | "statistics" => {
            for key in ["source", "source_entity"] {
                if let Some(source) = options.get(key) {
                    dependencies.triggers.extend(extract_references(source));
                }
            }
        }
        "min_max" => {
            if let Some(sources) = options.get("entity_ids") {
                dependencies.triggers.extend(extract_references(sources));
            }
        }
        "group" => {
            if let Some(members) = options.get("entities") {
                dependencies.triggers.extend(extract_references(members));
            }
        }
        _ => {}
    }
    dependencies
}
