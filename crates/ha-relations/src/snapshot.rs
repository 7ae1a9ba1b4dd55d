//! Immutable input to a traversal
//!
//! A [`Snapshot`] holds every automation, script and known entity at the time
//! it was built. It is constructed once per request by the caller and only
//! read by the engine.

use ha_automation::Automation;
use ha_core::Identifier;
use ha_script::Script;
use indexmap::IndexMap;
use serde_json::Value;
use tracing::warn;

use crate::helpers::helper_dependencies;
use crate::summary::RelationSet;

/// Metadata for one entity
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EntityInfo {
    pub entity_id: String,
    pub friendly_name: Option<String>,
    /// Integration that provides the entity
    pub platform: Option<String>,
    /// Entities this one derives its state from (helpers only)
    pub depends_on: RelationSet,
}

impl EntityInfo {
    pub fn new(entity_id: impl Into<String>) -> Self {
        Self {
            entity_id: entity_id.into(),
            ..Default::default()
        }
    }

    pub fn with_friendly_name(mut self, friendly_name: impl Into<String>) -> Self {
        self.friendly_name = Some(friendly_name.into());
        self
    }

    pub fn with_platform(mut self, platform: impl Into<String>) -> Self {
        self.platform = Some(platform.into());
        self
    }

    /// Record the sources of a helper entity from its config entry options
    pub fn with_helper_options(mut self, platform: &str, options: &Value) -> Self {
        self.platform = Some(platform.to_string());
        self.depends_on = helper_dependencies(platform, options);
        self
    }

    pub fn is_helper(&self) -> bool {
        !self.depends_on.is_empty()
    }

    /// Friendly name, or the entity id when none is known
    pub fn display_name(&self) -> &str {
        self.friendly_name.as_deref().unwrap_or(&self.entity_id)
    }
}

/// Automations, scripts and entities in configuration order
#[derive(Debug, Clone, Default)]
pub struct Snapshot {
    automations: IndexMap<String, Automation>,
    scripts: IndexMap<String, Script>,
    entities: IndexMap<String, EntityInfo>,
}

impl Snapshot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an automation; a later automation with the same id replaces the earlier one
    pub fn insert_automation(&mut self, automation: Automation) {
        if let Some(previous) = self.automations.insert(automation.id.clone(), automation) {
            warn!("Duplicate automation id {}, keeping the last definition", previous.id);
        }
    }

    pub fn insert_script(&mut self, script: Script) {
        if let Some(previous) = self.scripts.insert(script.id.clone(), script) {
            warn!("Duplicate script id {}, keeping the last definition", previous.id);
        }
    }

    pub fn insert_entity(&mut self, entity: EntityInfo) {
        self.entities.insert(entity.entity_id.clone(), entity);
    }

    pub fn with_automation(mut self, automation: Automation) -> Self {
        self.insert_automation(automation);
        self
    }

    pub fn with_script(mut self, script: Script) -> Self {
        self.insert_script(script);
        self
    }

    pub fn with_entity(mut self, entity: EntityInfo) -> Self {
        self.insert_entity(entity);
        self
    }

    pub fn automations(&self) -> impl Iterator<Item = &Automation> {
        self.automations.values()
    }

    pub fn scripts(&self) -> impl Iterator<Item = &Script> {
        self.scripts.values()
    }

    pub fn entities(&self) -> impl Iterator<Item = &EntityInfo> {
        self.entities.values()
    }

    /// Look up an automation by id, falling back to a case-insensitive match
    pub fn automation(&self, id: &str) -> Option<&Automation> {
        self.automations.get(id).or_else(|| {
            self.automations
                .values()
                .find(|automation| automation.id.eq_ignore_ascii_case(id))
        })
    }

    /// Look up a script by id, falling back to a case-insensitive match
    pub fn script(&self, id: &str) -> Option<&Script> {
        self.scripts.get(id).or_else(|| {
            self.scripts
                .values()
                .find(|script| script.id.eq_ignore_ascii_case(id))
        })
    }

    pub fn entity(&self, entity_id: &str) -> Option<&EntityInfo> {
        self.entities.get(entity_id)
    }

    /// Helper entities that depend on `id`
    pub fn dependents_of<'a>(&'a self, id: &'a Identifier) -> impl Iterator<Item = &'a EntityInfo> {
        self.entities
            .values()
            .filter(move |entity| entity.depends_on.references(id))
    }

    pub fn automation_count(&self) -> usize {
        self.automations.len()
    }

    pub fn script_count(&self) -> usize {
        self.scripts.len()
    }

    pub fn entity_count(&self) -> usize {
        self.entities.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_lookup_is_case_insensitive_fallback() {
        let snapshot = Snapshot::new()
            .with_script(Script::new("S1"))
            .with_automation(Automation::new("Morning"));

        assert_eq!(snapshot.script("S1").map(|s| s.id.as_str()), Some("S1"));
        assert_eq!(snapshot.script("s1").map(|s| s.id.as_str()), Some("S1"));
        assert_eq!(snapshot.automation("morning").map(|a| a.id.as_str()), Some("Morning"));
        assert!(snapshot.script("s2").is_none());
    }

    #[test]
    fn test_duplicate_ids_keep_position_and_last_definition() {
        let snapshot = Snapshot::new()
            .with_automation(Automation::new("a").with_alias("first"))
            .with_automation(Automation::new("b"))
            .with_automation(Automation::new("a").with_alias("second"));

        let ids: Vec<&str> = snapshot.automations().map(|a| a.id.as_str()).collect();
        assert_eq!(ids, vec!["a", "b"]);
        assert_eq!(snapshot.automation("a").unwrap().display_name(), "second");
    }

    #[test]
    fn test_helper_entities() {
        let meter = EntityInfo::new("sensor.energy_daily")
            .with_friendly_name("Energy daily")
            .with_helper_options("utility_meter", &json!({"source": "sensor.energy"}));
        let snapshot = Snapshot::new()
            .with_entity(EntityInfo::new("sensor.energy"))
            .with_entity(meter);

        let source = Identifier::entity("sensor.energy");
        let dependents: Vec<&str> = snapshot
            .dependents_of(&source)
            .map(|e| e.entity_id.as_str())
            .collect();
        assert_eq!(dependents, vec!["sensor.energy_daily"]);
        assert!(snapshot.entity("sensor.energy_daily").unwrap().is_helper());
        assert!(!snapshot.entity("sensor.energy").unwrap().is_helper());
        assert_eq!(snapshot.entity("sensor.energy").unwrap().display_name(), "sensor.energy");
    }
}
