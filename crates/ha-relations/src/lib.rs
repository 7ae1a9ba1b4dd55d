//! Relation analysis for Home Assistant configuration
//!
//! Answers "what is connected to this item?" for entities, automations and
//! scripts. Each rule is reduced to the entities it reacts to, checks and
//! affects; the [`traversal`] module then expands any starting item into a
//! tree of related items.
//!
//! # Example
//!
//! ```
//! use ha_automation::Automation;
//! use ha_core::ItemKind;
//! use ha_relations::{find_relations, Snapshot};
//! use serde_json::json;
//!
//! let snapshot = Snapshot::new().with_automation(
//!     Automation::new("porch")
//!         .with_trigger(json!({"trigger": "state", "entity_id": "binary_sensor.door"}))
//!         .with_action(json!({"action": "light.turn_on", "entity_id": "light.porch"})),
//! );
//!
//! let tree = find_relations(&snapshot, ItemKind::Entity, "binary_sensor.door", 2).unwrap();
//! assert_eq!(tree.children[0].id, "porch");
//! assert_eq!(tree.children[0].children[1].id, "light.porch");
//! ```

pub mod classify;
pub mod error;
pub mod extract;
pub mod graph;
pub mod helpers;
pub mod label;
pub mod snapshot;
pub mod summary;
pub mod traversal;

pub use classify::{classify_block, BlockRelations};
pub use error::{RelationsError, RelationsResult};
pub use extract::{extract_map_references, extract_references, target_references, template_references};
pub use graph::{GraphNode, REFERENCE_SUFFIX};
pub use helpers::{helper_dependencies, HELPER_PLATFORMS};
pub use label::LabelResolver;
pub use snapshot::{EntityInfo, Snapshot};
pub use summary::{summarize, summarize_automation, summarize_script, RelationSet, Rule};
pub use traversal::{
    find_relations, find_relations_with, Direction, RelationGraph, TraversalOptions, UNBOUNDED_DEPTH,
};
