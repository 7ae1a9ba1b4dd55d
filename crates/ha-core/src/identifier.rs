//! Identifiers for graph nodes and relation edges

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

use crate::trigger_kind::SyntheticTrigger;
use crate::{AUTOMATION_DOMAIN, SCRIPT_DOMAIN};

/// Error type for parsing kinds and synthetic trigger keys
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ParseKindError {
    #[error("unknown item kind: {0} (expected entity, automation or script)")]
    UnknownItem(String),

    #[error("unknown trigger kind: {0}")]
    UnknownTrigger(String),

    #[error("not a synthetic trigger key: {0}")]
    InvalidSyntheticTrigger(String),
}

/// Kind of item a graph node stands for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ItemKind {
    Entity,
    Automation,
    Script,
}

impl ItemKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ItemKind::Entity => "entity",
            ItemKind::Automation => "automation",
            ItemKind::Script => "script",
        }
    }
}

impl fmt::Display for ItemKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ItemKind {
    type Err = ParseKindError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "entity" => Ok(ItemKind::Entity),
            "automation" => Ok(ItemKind::Automation),
            "script" => Ok(ItemKind::Script),
            other => Err(ParseKindError::UnknownItem(other.to_string())),
        }
    }
}

/// Role of an edge relative to the node it hangs under
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Root,
    Trigger,
    Condition,
    Output,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Root => "root",
            Role::Trigger => "trigger",
            Role::Condition => "condition",
            Role::Output => "output",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Endpoint of a relation edge
///
/// `ScriptCall` and `AutomationCall` are produced when an action block invokes
/// another rule. They resolve to [`ItemKind::Script`] and
/// [`ItemKind::Automation`] nodes respectively, while `Automation` and `Script`
/// name the rule itself.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Identifier {
    Entity(String),
    Automation(String),
    Script(String),
    SyntheticTrigger(SyntheticTrigger),
    ScriptCall(String),
    AutomationCall(String),
}

impl Identifier {
    pub fn entity(entity_id: impl Into<String>) -> Self {
        Identifier::Entity(entity_id.into())
    }

    /// Identifier for a node of the given kind
    ///
    /// Entity ids in synthetic trigger form are parsed back into
    /// [`Identifier::SyntheticTrigger`].
    pub fn from_node(kind: ItemKind, id: &str) -> Self {
        match kind {
            ItemKind::Entity => match id.parse::<SyntheticTrigger>() {
                Ok(trigger) => Identifier::SyntheticTrigger(trigger),
                Err(_) => Identifier::Entity(id.to_string()),
            },
            ItemKind::Automation => Identifier::Automation(id.to_string()),
            ItemKind::Script => Identifier::Script(id.to_string()),
        }
    }

    /// Kind of node this identifier resolves to
    pub fn node_kind(&self) -> ItemKind {
        match self {
            Identifier::Entity(_) | Identifier::SyntheticTrigger(_) => ItemKind::Entity,
            Identifier::Automation(_) | Identifier::AutomationCall(_) => ItemKind::Automation,
            Identifier::Script(_) | Identifier::ScriptCall(_) => ItemKind::Script,
        }
    }

    /// Id of the node this identifier resolves to
    pub fn node_id(&self) -> String {
        match self {
            Identifier::SyntheticTrigger(trigger) => trigger.to_string(),
            Identifier::Entity(id)
            | Identifier::Automation(id)
            | Identifier::Script(id)
            | Identifier::ScriptCall(id)
            | Identifier::AutomationCall(id) => id.clone(),
        }
    }

    /// Key used to detect revisits along a traversal path
    pub fn visit_key(&self) -> String {
        format!("{}:{}", self.node_kind(), self.node_id())
    }

    /// Replace call markers with the rule they call
    pub fn into_subject(self) -> Self {
        match self {
            Identifier::ScriptCall(id) => Identifier::Script(id),
            Identifier::AutomationCall(id) => Identifier::Automation(id),
            other => other,
        }
    }

    pub fn is_call(&self) -> bool {
        matches!(self, Identifier::ScriptCall(_) | Identifier::AutomationCall(_))
    }
}

impl fmt::Display for Identifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Identifier::Entity(id) => f.write_str(id),
            Identifier::SyntheticTrigger(trigger) => fmt::Display::fmt(trigger, f),
            Identifier::Automation(id) | Identifier::AutomationCall(id) => {
                write!(f, "{AUTOMATION_DOMAIN}.{id}")
            }
            Identifier::Script(id) | Identifier::ScriptCall(id) => {
                write!(f, "{SCRIPT_DOMAIN}.{id}")
            }
        }
    }
}
