//! Relation tree traversal
//!
//! Expands a starting item into a tree of related items. Every automation and
//! script is summarized once when the [`RelationGraph`] is built; expansion
//! then walks those summaries recursively.
//!
//! # Expansion
//!
//! - Entity: every rule that has the entity as a trigger, condition or output
//!   (one child per role), then helper entities depending on it, then its own
//!   helper sources.
//! - Automation / script: rules calling it (trigger role), then its own
//!   triggers, conditions and outputs. Calls in the outputs become
//!   automation / script nodes.
//!
//! Children are grouped trigger, condition, output and keep configuration
//! order within each group.
//!
//! # Termination
//!
//! An item already on the path from the root becomes a reference leaf. A node
//! at the depth bound becomes a plain leaf. The visited set is copied per
//! subtree, so the same item may appear under several parents.

use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

use ha_core::{Identifier, ItemKind, Role};
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use crate::error::{RelationsError, RelationsResult};
use crate::graph::GraphNode;
use crate::label::LabelResolver;
use crate::snapshot::Snapshot;
use crate::summary::{summarize, RelationSet, Rule};

/// Effective depth bound used when a caller asks for depth 0
pub const UNBOUNDED_DEPTH: u32 = 999;

const ROLE_GROUPS: [Role; 3] = [Role::Trigger, Role::Condition, Role::Output];

/// Which edges a traversal follows
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    /// Every edge
    #[default]
    Both,
    /// Only edges from items feeding the subject
    Upstream,
    /// Only edges to items the subject affects
    Downstream,
}

impl Direction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Direction::Both => "both",
            Direction::Upstream => "upstream",
            Direction::Downstream => "downstream",
        }
    }

    fn follows(&self, flow: Direction) -> bool {
        *self == Direction::Both || *self == flow
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Direction {
    type Err = RelationsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "both" => Ok(Direction::Both),
            "upstream" => Ok(Direction::Upstream),
            "downstream" => Ok(Direction::Downstream),
            other => Err(RelationsError::InvalidDirection(other.to_string())),
        }
    }
}

/// Validated traversal parameters
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TraversalOptions {
    max_depth: u32,
    direction: Direction,
}

impl TraversalOptions {
    /// Options for a requested depth
    ///
    /// Depth 0 means unbounded and maps to [`UNBOUNDED_DEPTH`]; negative
    /// depths are rejected.
    pub fn new(max_depth: i64) -> RelationsResult<Self> {
        let max_depth = match max_depth {
            d if d < 0 => return Err(RelationsError::InvalidDepth(d)),
            0 => UNBOUNDED_DEPTH,
            d => u32::try_from(d).unwrap_or(u32::MAX),
        };
        Ok(Self {
            max_depth,
            direction: Direction::Both,
        })
    }

    pub fn with_direction(mut self, direction: Direction) -> Self {
        self.direction = direction;
        self
    }

    pub fn max_depth(&self) -> u32 {
        self.max_depth
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }
}

/// Find everything related to an item, following edges both ways
///
/// `max_depth` of 0 means unbounded. An unknown item yields a single leaf
/// labelled with its raw id.
#[instrument(skip(snapshot), fields(automations = snapshot.automation_count(), scripts = snapshot.script_count()))]
pub fn find_relations(
    snapshot: &Snapshot,
    kind: ItemKind,
    id: &str,
    max_depth: i64,
) -> RelationsResult<GraphNode> {
    let options = TraversalOptions::new(max_depth)?;
    Ok(RelationGraph::new(snapshot).find(kind, id, &options))
}

/// Find everything related to an item with explicit options
#[instrument(skip(snapshot, options), fields(max_depth = options.max_depth(), direction = %options.direction()))]
pub fn find_relations_with(
    snapshot: &Snapshot,
    kind: ItemKind,
    id: &str,
    options: &TraversalOptions,
) -> GraphNode {
    RelationGraph::new(snapshot).find(kind, id, options)
}

/// One edge out of a node, before filtering by direction
struct Edge {
    target: Identifier,
    role: Role,
    flow: Direction,
}

impl Edge {
    fn upstream(target: Identifier, role: Role) -> Self {
        Self {
            target,
            role,
            flow: Direction::Upstream,
        }
    }

    fn downstream(target: Identifier, role: Role) -> Self {
        Self {
            target,
            role,
            flow: Direction::Downstream,
        }
    }
}

/// Summaries of every rule in a snapshot, ready for traversal
pub struct RelationGraph<'a> {
    snapshot: &'a Snapshot,
    labels: LabelResolver<'a>,
    /// Automations then scripts, in configuration order
    rules: Vec<(Rule<'a>, RelationSet)>,
}

impl<'a> RelationGraph<'a> {
    pub fn new(snapshot: &'a Snapshot) -> Self {
        let rules = snapshot
            .automations()
            .map(Rule::Automation)
            .chain(snapshot.scripts().map(Rule::Script))
            .map(|rule| (rule, summarize(rule)))
            .collect();

        Self {
            snapshot,
            labels: LabelResolver::new(snapshot),
            rules,
        }
    }

    /// Build the relation tree rooted at `kind`/`id`
    pub fn find(&self, kind: ItemKind, id: &str, options: &TraversalOptions) -> GraphNode {
        let subject = self.canonical(Identifier::from_node(kind, id));
        debug!(
            kind = %kind,
            id = %id,
            max_depth = options.max_depth,
            direction = %options.direction,
            "Building relations tree"
        );

        if !self.is_known(&subject) {
            debug!("Unknown {} {}, returning placeholder", kind, id);
            return GraphNode::leaf(kind, id, id, Role::Root);
        }

        self.expand(subject, Role::Root, &HashSet::new(), 0, options)
    }

    /// Relation summary of a rule, if the rule exists
    pub fn relations_of(&self, kind: ItemKind, id: &str) -> Option<&RelationSet> {
        self.rules
            .iter()
            .find(|(rule, _)| rule.kind() == kind && rule.id() == id)
            .map(|(_, relations)| relations)
    }

    /// Whether the root of a query names something the snapshot knows about
    fn is_known(&self, subject: &Identifier) -> bool {
        match subject {
            Identifier::Automation(id) => self.snapshot.automation(id).is_some(),
            Identifier::Script(id) => self.snapshot.script(id).is_some(),
            Identifier::Entity(entity_id) if self.snapshot.entity(entity_id).is_some() => true,
            entity => {
                self.rule_relations().any(|relations| relations.references(entity))
                    || self.snapshot.dependents_of(entity).next().is_some()
            }
        }
    }

    fn rule_relations(&self) -> impl Iterator<Item = &RelationSet> {
        self.rules.iter().map(|(_, relations)| relations)
    }

    /// Resolve calls to their rule and rule ids to their configured spelling
    fn canonical(&self, id: Identifier) -> Identifier {
        match id.into_subject() {
            Identifier::Automation(id) => match self.snapshot.automation(&id) {
                Some(automation) => Identifier::Automation(automation.id.clone()),
                None => Identifier::Automation(id),
            },
            Identifier::Script(id) => match self.snapshot.script(&id) {
                Some(script) => Identifier::Script(script.id.clone()),
                None => Identifier::Script(id),
            },
            other => other,
        }
    }

    fn expand(
        &self,
        subject: Identifier,
        role: Role,
        visited: &HashSet<String>,
        depth: u32,
        options: &TraversalOptions,
    ) -> GraphNode {
        let kind = subject.node_kind();
        let id = subject.node_id();
        let label = self.labels.label_for(kind, &id);
        let key = subject.visit_key();

        if visited.contains(&key) {
            return GraphNode::reference(kind, id, &label, role);
        }
        if depth >= options.max_depth {
            return GraphNode::leaf(kind, id, label, role);
        }

        let mut path = visited.clone();
        path.insert(key);

        let children = self
            .edges(&subject)
            .into_iter()
            .filter(|edge| options.direction.follows(edge.flow))
            .map(|edge| self.expand(edge.target, edge.role, &path, depth + 1, options))
            .collect();

        GraphNode {
            children,
            ..GraphNode::leaf(kind, id, label, role)
        }
    }

    fn edges(&self, subject: &Identifier) -> Vec<Edge> {
        match subject.node_kind() {
            ItemKind::Entity => self.entity_edges(subject),
            kind => self.rule_edges(kind, &subject.node_id()),
        }
    }

    fn entity_edges(&self, entity: &Identifier) -> Vec<Edge> {
        let own = match entity {
            Identifier::Entity(entity_id) => self.snapshot.entity(entity_id),
            _ => None,
        };

        let mut edges = Vec::new();
        for role in ROLE_GROUPS {
            // A rule writing to the entity feeds it; the entity feeds rules it triggers or gates
            let rule_edge = |target: Identifier| match role {
                Role::Output => Edge::upstream(target, role),
                _ => Edge::downstream(target, role),
            };

            for (rule, relations) in &self.rules {
                if relations.contains(role, entity) {
                    edges.push(rule_edge(rule.subject()));
                }
            }

            for dependent in self.snapshot.dependents_of(entity) {
                if dependent.depends_on.contains(role, entity) {
                    edges.push(Edge::downstream(
                        Identifier::entity(dependent.entity_id.clone()),
                        role,
                    ));
                }
            }
            if let Some(sources) = own.and_then(|info| info.depends_on.role(role)) {
                edges.extend(
                    sources
                        .iter()
                        .map(|source| Edge::upstream(source.clone(), role)),
                );
            }
        }
        edges
    }

    fn rule_edges(&self, kind: ItemKind, id: &str) -> Vec<Edge> {
        let mut edges = Vec::new();

        for (rule, relations) in &self.rules {
            if relations.calls(kind, id) {
                edges.push(Edge::upstream(rule.subject(), Role::Trigger));
            }
        }

        let Some(relations) = self.relations_of(kind, id) else {
            return edges;
        };

        edges.extend(
            relations
                .triggers
                .iter()
                .map(|trigger| Edge::upstream(trigger.clone(), Role::Trigger)),
        );
        edges.extend(
            relations
                .conditions
                .iter()
                .map(|condition| Edge::upstream(condition.clone(), Role::Condition)),
        );
        edges.extend(
            relations
                .outputs
                .iter()
                .map(|output| Edge::downstream(self.canonical(output.clone()), Role::Output)),
        );
        edges
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::snapshot::EntityInfo;
    use ha_automation::Automation;
    use serde_json::json;

    fn hall_snapshot() -> Snapshot {
        Snapshot::new()
            .with_automation(
                Automation::new("a1")
                    .with_alias("Hall motion")
                    .with_trigger(json!({"trigger": "state", "entity_id": "sensor.motion"}))
                    .with_condition(json!({"condition": "state", "entity_id": "sun.sun", "state": "below_horizon"}))
                    .with_action(json!({"action": "light.turn_on", "target": {"entity_id": "light.hall"}})),
            )
            .with_entity(EntityInfo::new("sensor.motion").with_friendly_name("Hall motion sensor"))
    }

    #[test]
    fn test_options() {
        assert_eq!(TraversalOptions::new(0).unwrap().max_depth(), UNBOUNDED_DEPTH);
        assert_eq!(TraversalOptions::new(4).unwrap().max_depth(), 4);
        assert_eq!(
            TraversalOptions::new(-1),
            Err(RelationsError::InvalidDepth(-1))
        );
        assert_eq!(
            TraversalOptions::new(-1).unwrap_err().to_string(),
            "depth must be 0 or positive"
        );
        assert_eq!(TraversalOptions::new(1).unwrap().direction(), Direction::Both);
    }

    #[test]
    fn test_direction_parse() {
        assert_eq!("upstream".parse::<Direction>().unwrap(), Direction::Upstream);
        assert_eq!(Direction::Downstream.to_string(), "downstream");
        assert!(matches!(
            "sideways".parse::<Direction>(),
            Err(RelationsError::InvalidDirection(_))
        ));
    }

    #[test]
    fn test_depth_one_gives_leaf_children() {
        let snapshot = hall_snapshot();
        let root = find_relations(&snapshot, ItemKind::Automation, "a1", 1).unwrap();

        assert_eq!(root.label, "Hall motion (a1)");
        assert_eq!(root.children.len(), 3);
        assert!(root.children.iter().all(|child| child.children.is_empty()));
        assert!(root.children.iter().all(|child| !child.is_reference));
        assert_eq!(root.children[0].label, "Hall motion sensor");
    }

    #[test]
    fn test_rule_children_grouped_by_role() {
        let snapshot = hall_snapshot();
        let root = find_relations(&snapshot, ItemKind::Automation, "a1", 2).unwrap();

        let roles: Vec<Role> = root.children.iter().map(|c| c.relationship).collect();
        assert_eq!(roles, vec![Role::Trigger, Role::Condition, Role::Output]);
        let ids: Vec<&str> = root.children.iter().map(|c| c.id.as_str()).collect();
        assert_eq!(ids, vec!["sensor.motion", "sun.sun", "light.hall"]);

        // Each entity leads straight back to a1, which is already on the path
        for child in &root.children {
            assert_eq!(child.children.len(), 1);
            assert!(child.children[0].is_reference);
            assert_eq!(child.children[0].label, "Hall motion (a1) (already shown above)");
        }
    }

    #[test]
    fn test_unknown_root() {
        let snapshot = hall_snapshot();
        let root = find_relations(&snapshot, ItemKind::Entity, "light.nowhere", 3).unwrap();
        assert_eq!(root, GraphNode::leaf(ItemKind::Entity, "light.nowhere", "light.nowhere", Role::Root));
    }

    #[test]
    fn test_referenced_entity_is_known() {
        let snapshot = hall_snapshot();
        let root = find_relations(&snapshot, ItemKind::Entity, "light.hall", 2).unwrap();
        assert_eq!(root.children.len(), 1);
        assert_eq!(root.children[0].relationship, Role::Output);
        assert_eq!(root.children[0].id, "a1");
    }

    #[test]
    fn test_upstream_and_downstream() {
        let snapshot = hall_snapshot();
        let graph = RelationGraph::new(&snapshot);

        let upstream = TraversalOptions::new(1).unwrap().with_direction(Direction::Upstream);
        let root = graph.find(ItemKind::Automation, "a1", &upstream);
        let ids: Vec<&str> = root.children.iter().map(|c| c.id.as_str()).collect();
        assert_eq!(ids, vec!["sensor.motion", "sun.sun"]);

        let downstream = TraversalOptions::new(1).unwrap().with_direction(Direction::Downstream);
        let root = graph.find(ItemKind::Automation, "a1", &downstream);
        let ids: Vec<&str> = root.children.iter().map(|c| c.id.as_str()).collect();
        assert_eq!(ids, vec!["light.hall"]);

        let root = graph.find(ItemKind::Entity, "light.hall", &downstream);
        assert!(root.children.is_empty());
        let root = graph.find(ItemKind::Entity, "light.hall", &upstream);
        assert_eq!(root.children.len(), 1);
    }

    #[test]
    fn test_relations_of() {
        let snapshot = hall_snapshot();
        let graph = RelationGraph::new(&snapshot);
        assert!(graph.relations_of(ItemKind::Automation, "a1").is_some());
        assert!(graph.relations_of(ItemKind::Script, "a1").is_none());
        assert!(graph.relations_of(ItemKind::Entity, "sensor.motion").is_none());
    }
}
