//! Rule relation summaries
//!
//! Combines extraction and classification over the sections of one
//! automation or script into its trigger, condition and output sets.

use ha_automation::{synthetic_trigger, Automation};
use ha_core::{Identifier, ItemKind, Role};
use ha_script::Script;
use indexmap::IndexSet;

use crate::classify::classify_block;
use crate::extract::extract_references;

/// References of a rule grouped by role
///
/// The same identifier may appear under several roles.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RelationSet {
    pub triggers: IndexSet<Identifier>,
    pub conditions: IndexSet<Identifier>,
    pub outputs: IndexSet<Identifier>,
}

impl RelationSet {
    /// Identifiers for one role; the root role has none
    pub fn role(&self, role: Role) -> Option<&IndexSet<Identifier>> {
        match role {
            Role::Trigger => Some(&self.triggers),
            Role::Condition => Some(&self.conditions),
            Role::Output => Some(&self.outputs),
            Role::Root => None,
        }
    }

    pub fn contains(&self, role: Role, id: &Identifier) -> bool {
        self.role(role).is_some_and(|ids| ids.contains(id))
    }

    /// Whether `id` appears under any role
    pub fn references(&self, id: &Identifier) -> bool {
        self.triggers.contains(id) || self.conditions.contains(id) || self.outputs.contains(id)
    }

    pub fn is_empty(&self) -> bool {
        self.triggers.is_empty() && self.conditions.is_empty() && self.outputs.is_empty()
    }

    /// Whether the outputs invoke the rule `kind`/`id`
    ///
    /// Call ids are lower-cased by the classifier, so the match ignores case.
    pub fn calls(&self, kind: ItemKind, id: &str) -> bool {
        self.outputs.iter().any(|output| match (output, kind) {
            (Identifier::ScriptCall(callee), ItemKind::Script)
            | (Identifier::AutomationCall(callee), ItemKind::Automation) => {
                callee.eq_ignore_ascii_case(id)
            }
            _ => false,
        })
    }
}

/// An automation or a script
#[derive(Debug, Clone, Copy)]
pub enum Rule<'a> {
    Automation(&'a Automation),
    Script(&'a Script),
}

impl<'a> Rule<'a> {
    pub fn kind(&self) -> ItemKind {
        match self {
            Rule::Automation(_) => ItemKind::Automation,
            Rule::Script(_) => ItemKind::Script,
        }
    }

    pub fn id(&self) -> &'a str {
        match self {
            Rule::Automation(automation) => &automation.id,
            Rule::Script(script) => &script.id,
        }
    }

    pub fn display_name(&self) -> &'a str {
        match self {
            Rule::Automation(automation) => automation.display_name(),
            Rule::Script(script) => script.display_name(),
        }
    }

    /// Identifier naming this rule as a graph subject
    pub fn subject(&self) -> Identifier {
        match self {
            Rule::Automation(automation) => Identifier::Automation(automation.id.clone()),
            Rule::Script(script) => Identifier::Script(script.id.clone()),
        }
    }
}

/// Summarize any rule
pub fn summarize(rule: Rule<'_>) -> RelationSet {
    match rule {
        Rule::Automation(automation) => summarize_automation(automation),
        Rule::Script(script) => summarize_script(script),
    }
}

/// Summarize an automation's triggers, conditions and outputs
pub fn summarize_automation(automation: &Automation) -> RelationSet {
    let mut relations = RelationSet::default();

    for trigger in &automation.triggers {
        relations.triggers.extend(extract_references(trigger));
        if let Some(synthetic) = synthetic_trigger(trigger) {
            relations.triggers.insert(Identifier::SyntheticTrigger(synthetic));
        }
    }

    for condition in &automation.conditions {
        relations.conditions.extend(extract_references(condition));
    }

    for action in &automation.actions {
        let block = classify_block(action);
        relations.conditions.extend(block.conditions);
        relations.outputs.extend(block.outputs);
    }

    relations
}

/// Summarize a script; scripts never have triggers
pub fn summarize_script(script: &Script) -> RelationSet {
    let mut relations = RelationSet::default();

    for condition in &script.conditions {
        relations.conditions.extend(extract_references(condition));
    }

    for step in &script.sequence {
        let block = classify_block(step);
        relations.conditions.extend(block.conditions);
        relations.outputs.extend(block.outputs);
    }

    relations
}
