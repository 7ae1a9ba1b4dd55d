//! Relation tree nodes

use ha_core::{ItemKind, Role};
use serde::{Deserialize, Serialize};

/// Suffix appended to the label of a node already shown on the current path
pub const REFERENCE_SUFFIX: &str = " (already shown above)";

/// One node of a relation tree
///
/// Serializes with the field names `kind`, `id`, `label`, `relationship`,
/// `children` and `isReference`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GraphNode {
    pub kind: ItemKind,
    pub id: String,
    pub label: String,
    /// Role of the edge from the parent to this node
    pub relationship: Role,
    pub children: Vec<GraphNode>,
    /// Set when the node repeats an ancestor; such nodes have no children
    pub is_reference: bool,
}

impl GraphNode {
    /// A node without children
    pub fn leaf(kind: ItemKind, id: impl Into<String>, label: impl Into<String>, relationship: Role) -> Self {
        Self {
            kind,
            id: id.into(),
            label: label.into(),
            relationship,
            children: Vec::new(),
            is_reference: false,
        }
    }

    /// A leaf standing in for an ancestor on the current path
    pub fn reference(kind: ItemKind, id: impl Into<String>, label: &str, relationship: Role) -> Self {
        Self {
            is_reference: true,
            ..Self::leaf(kind, id, format!("{label}{REFERENCE_SUFFIX}"), relationship)
        }
    }

    /// Number of edges on the longest path from this node to a leaf
    pub fn depth(&self) -> usize {
        self.children
            .iter()
            .map(|child| child.depth() + 1)
            .max()
            .unwrap_or(0)
    }

    /// Total number of nodes in this subtree
    pub fn node_count(&self) -> usize {
        1 + self.children.iter().map(GraphNode::node_count).sum::<usize>()
    }

    /// Children attached through `role`
    pub fn children_with(&self, role: Role) -> impl Iterator<Item = &GraphNode> {
        self.children
            .iter()
            .filter(move |child| child.relationship == role)
    }

    /// First child with the given kind and id
    pub fn child(&self, kind: ItemKind, id: &str) -> Option<&GraphNode> {
        self.children
            .iter()
            .find(|child| child.kind == kind && child.id == id)
    }
}
