//! Structural properties of relation trees over generated automation chains

use std::collections::HashSet;

use ha_automation::Automation;
use ha_core::ItemKind;
use ha_relations::{find_relations, GraphNode, Snapshot};
use proptest::prelude::*;
use serde_json::json;

/// Automations `link0..linkN` where `link{i}` is triggered by
/// `input_boolean.b{i}` and turns on `input_boolean.b{i+1}`
///
/// With `cyclic`, the last link turns on `input_boolean.b0` instead.
fn chain(links: usize, cyclic: bool) -> Snapshot {
    let mut snapshot = Snapshot::new();
    for i in 0..links {
        let next = if cyclic && i + 1 == links { 0 } else { i + 1 };
        snapshot.insert_automation(
            Automation::new(format!("link{i}"))
                .with_trigger(json!({"trigger": "state", "entity_id": format!("input_boolean.b{i}")}))
                .with_action(json!({
                    "action": "input_boolean.turn_on",
                    "target": {"entity_id": format!("input_boolean.b{next}")}
                })),
        );
    }
    snapshot
}

fn key(node: &GraphNode) -> String {
    format!("{}:{}", node.kind, node.id)
}

fn check_references(node: &GraphNode, ancestors: &mut HashSet<String>) -> Result<(), TestCaseError> {
    let key = key(node);
    prop_assert_eq!(node.is_reference, ancestors.contains(&key), "node {}", key);
    if node.is_reference {
        prop_assert!(node.children.is_empty());
        return Ok(());
    }

    ancestors.insert(key.clone());
    for child in &node.children {
        check_references(child, ancestors)?;
    }
    ancestors.remove(&key);
    Ok(())
}

proptest! {
    #[test]
    fn prop_query_is_deterministic(links in 1usize..6, cyclic: bool, depth in 0i64..8) {
        let snapshot = chain(links, cyclic);
        let first = find_relations(&snapshot, ItemKind::Entity, "input_boolean.b0", depth).unwrap();
        let second = find_relations(&snapshot, ItemKind::Entity, "input_boolean.b0", depth).unwrap();
        prop_assert_eq!(first, second);
    }

    #[test]
    fn prop_depth_is_bounded(links in 1usize..6, cyclic: bool, depth in 1i64..8) {
        let snapshot = chain(links, cyclic);
        let root = find_relations(&snapshot, ItemKind::Entity, "input_boolean.b0", depth).unwrap();
        prop_assert!(root.depth() as i64 <= depth);
    }

    #[test]
    fn prop_acyclic_chain_depth(links in 1usize..6, depth in 0i64..16) {
        let snapshot = chain(links, false);
        let root = find_relations(&snapshot, ItemKind::Entity, "input_boolean.b0", depth).unwrap();

        // The final entity links back to its writer, which is always a reference
        let full = 2 * links as i64 + 1;
        let expected = if depth == 0 { full } else { depth.min(full) };
        prop_assert_eq!(root.depth() as i64, expected);
    }

    #[test]
    fn prop_references_repeat_ancestors(links in 1usize..6, cyclic: bool, start in 0usize..6) {
        let snapshot = chain(links, cyclic);
        let id = format!("link{}", start % links);
        let root = find_relations(&snapshot, ItemKind::Automation, &id, 0).unwrap();
        check_references(&root, &mut HashSet::new())?;
    }
}
