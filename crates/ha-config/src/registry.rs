//! Shapes of the entity registry and config entries storage files
//!
//! Only the fields the relations engine reads are modelled; unknown fields are
//! ignored so newer storage versions still load.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Storage key of the entity registry
pub const ENTITY_REGISTRY_KEY: &str = "core.entity_registry";

/// Storage key of the config entries
pub const CONFIG_ENTRIES_KEY: &str = "core.config_entries";

/// `data` section of `core.entity_registry`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EntityRegistryData {
    #[serde(default)]
    pub entities: Vec<EntityRegistryEntry>,
}

/// One registered entity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EntityRegistryEntry {
    pub entity_id: String,
    #[serde(default)]
    pub unique_id: Option<String>,
    #[serde(default)]
    pub platform: Option<String>,
    #[serde(default)]
    pub config_entry_id: Option<String>,
    /// Name set by the user
    #[serde(default)]
    pub name: Option<String>,
    /// Name provided by the integration
    #[serde(default)]
    pub original_name: Option<String>,
}

impl EntityRegistryEntry {
    /// User-facing name: the user's override first, then the integration's
    pub fn friendly_name(&self) -> Option<&str> {
        self.name.as_deref().or(self.original_name.as_deref())
    }
}

/// `data` section of `core.config_entries`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ConfigEntriesData {
    #[serde(default)]
    pub entries: Vec<ConfigEntry>,
}

/// One config entry, as created by a config flow
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfigEntry {
    pub entry_id: String,
    pub domain: String,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub data: Value,
    #[serde(default)]
    pub options: Value,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_entity_registry_data() {
        let data: EntityRegistryData = serde_json::from_str(
            r#"{
                "entities": [
                    {
                        "entity_id": "sensor.energy_daily",
                        "unique_id": "01J0ABC",
                        "platform": "utility_meter",
                        "config_entry_id": "01J0ABC",
                        "name": null,
                        "original_name": "Energy daily",
                        "disabled_by": null
                    },
                    {"entity_id": "light.kitchen", "name": "Kitchen"}
                ],
                "deleted_entities": []
            }"#,
        )
        .unwrap();

        assert_eq!(data.entities.len(), 2);
        assert_eq!(data.entities[0].friendly_name(), Some("Energy daily"));
        assert_eq!(data.entities[1].friendly_name(), Some("Kitchen"));
        assert!(data.entities[1].platform.is_none());
    }

    #[test]
    fn test_parse_config_entries_data() {
        let data: ConfigEntriesData = serde_json::from_str(
            r#"{"entries": [{"entry_id": "abc", "domain": "min_max", "options": {"entity_ids": ["sensor.a"]}}]}"#,
        )
        .unwrap();

        assert_eq!(data.entries[0].domain, "min_max");
        assert_eq!(data.entries[0].options["entity_ids"][0], "sensor.a");
        assert!(data.entries[0].data.is_null());
    }
}
