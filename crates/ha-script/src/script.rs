//! Script definition
//!
//! A Script is a named sequence of actions that can be called as a service.
//! scripts.yaml maps each script id to its configuration.

use ha_core::{into_list, SCRIPT_DOMAIN};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

/// Script errors
#[derive(Debug, Error)]
pub enum ScriptError {
    #[error("Invalid script configuration for {id}: {reason}")]
    InvalidConfig { id: String, reason: String },
}

/// Result type for script operations
pub type ScriptResult<T> = Result<T, ScriptError>;

/// Script configuration from YAML
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ScriptConfig {
    /// Script alias (human-readable name)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub alias: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,

    /// Conditions checked before the sequence runs
    #[serde(default, alias = "condition")]
    pub conditions: Value,

    /// Action sequence
    #[serde(default, alias = "actions", alias = "action")]
    pub sequence: Value,
}

/// A loaded script
#[derive(Debug, Clone, PartialEq)]
pub struct Script {
    /// Script ID (object part, e.g., "turn_on_lights" from "script.turn_on_lights")
    pub id: String,

    /// Human-readable name
    pub alias: Option<String>,

    pub description: Option<String>,

    pub conditions: Vec<Value>,

    pub sequence: Vec<Value>,
}

impl Script {
    /// Create from config
    pub fn from_config(id: impl Into<String>, config: ScriptConfig) -> Self {
        Self {
            id: id.into(),
            alias: config.alias,
            description: config.description,
            conditions: into_list(config.conditions),
            sequence: into_list(config.sequence),
        }
    }

    /// Parse the configuration of one scripts.yaml entry
    pub fn from_value(id: impl Into<String>, value: Value) -> ScriptResult<Self> {
        let id = id.into();
        let config: ScriptConfig =
            serde_json::from_value(value).map_err(|e| ScriptError::InvalidConfig {
                id: id.clone(),
                reason: e.to_string(),
            })?;
        Ok(Self::from_config(id, config))
    }

    /// Create a bare script, mostly useful for building fixtures
    pub fn new(id: impl Into<String>) -> Self {
        Self::from_config(id, ScriptConfig::default())
    }

    pub fn with_alias(mut self, alias: impl Into<String>) -> Self {
        self.alias = Some(alias.into());
        self
    }

    pub fn with_condition(mut self, condition: Value) -> Self {
        self.conditions.push(condition);
        self
    }

    pub fn with_step(mut self, step: Value) -> Self {
        self.sequence.push(step);
        self
    }

    /// Get display name (alias or ID)
    pub fn display_name(&self) -> &str {
        self.alias.as_deref().unwrap_or(&self.id)
    }

    /// Entity id of the script entity
    pub fn entity_id(&self) -> String {
        format!("{SCRIPT_DOMAIN}.{}", self.id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_script_config() {
        let config: ScriptConfig = serde_json::from_str(
            r#"{
                "alias": "Turn on lights",
                "icon": "mdi:lightbulb",
                "mode": "restart",
                "sequence": [
                    {"action": "light.turn_on", "target": {"entity_id": "light.living_room"}}
                ]
            }"#,
        )
        .unwrap();

        let script = Script::from_config("turn_on_lights", config);
        assert_eq!(script.id, "turn_on_lights");
        assert_eq!(script.display_name(), "Turn on lights");
        assert_eq!(script.entity_id(), "script.turn_on_lights");
        assert_eq!(script.sequence.len(), 1);
        assert!(script.conditions.is_empty());
    }

    #[test]
    fn test_alternate_section_keys() {
        let script = Script::from_value(
            "guarded",
            json!({
                "condition": {"condition": "state", "entity_id": "input_boolean.guest", "state": "off"},
                "actions": [{"action": "lock.lock", "entity_id": "lock.front"}]
            }),
        )
        .unwrap();

        assert_eq!(script.conditions.len(), 1);
        assert_eq!(script.sequence.len(), 1);
        assert_eq!(script.display_name(), "guarded");
    }

    #[test]
    fn test_empty_script() {
        let script = Script::from_value("noop", json!({})).unwrap();
        assert!(script.sequence.is_empty());
    }

    #[test]
    fn test_invalid_script() {
        let result = Script::from_value("broken", json!("not a mapping"));
        assert!(matches!(result, Err(ScriptError::InvalidConfig { id, .. }) if id == "broken"));
    }
}
