//! Automation definitions
//!
//! An automation ties together triggers, conditions, and actions. Only the
//! structure is modelled here; the sections stay raw configuration values and
//! are interpreted by whoever walks them.

use ha_core::into_list;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use thiserror::Error;

/// Automation errors
#[derive(Debug, Error)]
pub enum AutomationError {
    #[error("Automation has no id: {0}")]
    MissingId(String),

    #[error("Invalid automation configuration: {0}")]
    InvalidConfig(String),
}

/// Result type for automation operations
pub type AutomationResult<T> = Result<T, AutomationError>;

/// Automation configuration from YAML
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AutomationConfig {
    /// Unique ID; numeric ids are read as their decimal text
    #[serde(default, deserialize_with = "string_or_number")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    /// Human-readable name
    #[serde(skip_serializing_if = "Option::is_none")]
    pub alias: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Triggers that start the automation (a list, a single entry, or absent)
    #[serde(default, alias = "trigger")]
    pub triggers: Value,

    /// Conditions that must be met
    #[serde(default, alias = "condition")]
    pub conditions: Value,

    /// Actions to execute
    #[serde(default, alias = "action")]
    pub actions: Value,
}

/// Deserialize an id that may be written as a string or a number
fn string_or_number<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawId {
        Text(String),
        Number(serde_json::Number),
    }

    Ok(Option::<RawId>::deserialize(deserializer)?.map(|raw| match raw {
        RawId::Text(s) => s,
        RawId::Number(n) => n.to_string(),
    }))
}

/// A normalized automation
#[derive(Debug, Clone, PartialEq)]
pub struct Automation {
    /// Unique identifier
    pub id: String,

    /// Human-readable name
    pub alias: Option<String>,

    pub description: Option<String>,

    pub triggers: Vec<Value>,

    pub conditions: Vec<Value>,

    pub actions: Vec<Value>,
}

impl Automation {
    /// Create from config
    ///
    /// Automations without an id cannot be addressed and are rejected.
    pub fn from_config(config: AutomationConfig) -> AutomationResult<Self> {
        let id = config
            .id
            .filter(|id| !id.is_empty())
            .ok_or_else(|| {
                AutomationError::MissingId(config.alias.clone().unwrap_or_else(|| "<unnamed>".into()))
            })?;

        Ok(Self {
            id,
            alias: config.alias,
            description: config.description,
            triggers: into_list(config.triggers),
            conditions: into_list(config.conditions),
            actions: into_list(config.actions),
        })
    }

    /// Parse one entry of automations.yaml
    pub fn from_value(value: Value) -> AutomationResult<Self> {
        let config: AutomationConfig = serde_json::from_value(value)
            .map_err(|e| AutomationError::InvalidConfig(e.to_string()))?;
        Self::from_config(config)
    }

    /// Create a bare automation, mostly useful for building fixtures
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            alias: None,
            description: None,
            triggers: Vec::new(),
            conditions: Vec::new(),
            actions: Vec::new(),
        }
    }

    pub fn with_alias(mut self, alias: impl Into<String>) -> Self {
        self.alias = Some(alias.into());
        self
    }

    pub fn with_trigger(mut self, trigger: Value) -> Self {
        self.triggers.push(trigger);
        self
    }

    pub fn with_condition(mut self, condition: Value) -> Self {
        self.conditions.push(condition);
        self
    }

    pub fn with_action(mut self, action: Value) -> Self {
        self.actions.push(action);
        self
    }

    /// Get display name (alias or ID)
    pub fn display_name(&self) -> &str {
        self.alias.as_deref().unwrap_or(&self.id)
    }
}
