//! Display labels for graph nodes

use ha_core::ItemKind;

use crate::snapshot::Snapshot;
use crate::summary::Rule;

/// Resolves node labels from snapshot metadata
///
/// Missing metadata degrades to the raw id.
#[derive(Debug, Clone, Copy)]
pub struct LabelResolver<'a> {
    snapshot: &'a Snapshot,
}

impl<'a> LabelResolver<'a> {
    pub fn new(snapshot: &'a Snapshot) -> Self {
        Self { snapshot }
    }

    /// Label for the node `kind`/`id`
    ///
    /// Entities show their friendly name. Rules show `"{alias-or-id} ({id})"`.
    pub fn label_for(&self, kind: ItemKind, id: &str) -> String {
        match kind {
            ItemKind::Entity => self
                .snapshot
                .entity(id)
                .and_then(|entity| entity.friendly_name.clone())
                .unwrap_or_else(|| id.to_string()),
            ItemKind::Automation => self.rule_label(self.snapshot.automation(id).map(Rule::Automation), id),
            ItemKind::Script => self.rule_label(self.snapshot.script(id).map(Rule::Script), id),
        }
    }

    fn rule_label(&self, rule: Option<Rule<'_>>, id: &str) -> String {
        match rule {
            Some(rule) => format!("{} ({})", rule.display_name(), rule.id()),
            None => id.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::snapshot::EntityInfo;
    use ha_automation::Automation;
    use ha_script::Script;

    #[test]
    fn test_labels() {
        let snapshot = Snapshot::new()
            .with_entity(EntityInfo::new("light.hall").with_friendly_name("Hall light"))
            .with_entity(EntityInfo::new("light.nameless"))
            .with_automation(Automation::new("a1").with_alias("Motion light"))
            .with_automation(Automation::new("a2"))
            .with_script(Script::new("wake").with_alias("Wake up"));
        let labels = LabelResolver::new(&snapshot);

        assert_eq!(labels.label_for(ItemKind::Entity, "light.hall"), "Hall light");
        assert_eq!(labels.label_for(ItemKind::Entity, "light.nameless"), "light.nameless");
        assert_eq!(labels.label_for(ItemKind::Entity, "light.unknown"), "light.unknown");
        assert_eq!(labels.label_for(ItemKind::Automation, "a1"), "Motion light (a1)");
        assert_eq!(labels.label_for(ItemKind::Automation, "a2"), "a2 (a2)");
        assert_eq!(labels.label_for(ItemKind::Script, "wake"), "Wake up (wake)");
        assert_eq!(labels.label_for(ItemKind::Script, "gone"), "gone");
    }

    #[test]
    fn test_synthetic_trigger_label_is_raw() {
        let snapshot = Snapshot::new();
        let labels = LabelResolver::new(&snapshot);
        assert_eq!(
            labels.label_for(ItemKind::Entity, "time_trigger:at=07:00:00"),
            "time_trigger:at=07:00:00"
        );
    }
}
