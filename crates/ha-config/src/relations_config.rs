//! Integration settings
//!
//! Parses the optional `advancedrelations:` section from configuration.yaml.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::path::{Path, PathBuf};

use crate::error::{ConfigError, ConfigResult};
use crate::loader::YamlLoader;
use crate::CONFIGURATION_FILE;

/// Name of the configuration.yaml section holding these settings
pub const RELATIONS_SECTION: &str = "advancedrelations";

/// Depth used when a request does not name one
pub const DEFAULT_DEPTH: u32 = 3;

/// Settings from the `advancedrelations:` section
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelationsConfig {
    /// Depth used when a request omits one (0 means unbounded)
    #[serde(default = "default_depth")]
    pub default_depth: u32,

    /// Directory with the built panel assets, served when set
    #[serde(default)]
    pub panel_dir: Option<PathBuf>,
}

fn default_depth() -> u32 {
    DEFAULT_DEPTH
}

impl Default for RelationsConfig {
    fn default() -> Self {
        Self {
            default_depth: DEFAULT_DEPTH,
            panel_dir: None,
        }
    }
}

impl RelationsConfig {
    /// Extract the settings from a loaded configuration.yaml document
    ///
    /// A missing or empty section yields the defaults.
    pub fn from_configuration(configuration: &Value) -> ConfigResult<Self> {
        match configuration.get(RELATIONS_SECTION) {
            None | Some(Value::Null) => Ok(Self::default()),
            Some(section) => {
                serde_json::from_value(section.clone()).map_err(|e| ConfigError::InvalidValue {
                    key: RELATIONS_SECTION.to_string(),
                    reason: e.to_string(),
                })
            }
        }
    }

    /// Load the settings from `<config_dir>/configuration.yaml`
    pub fn load(config_dir: impl AsRef<Path>) -> ConfigResult<Self> {
        let config_dir = config_dir.as_ref();
        let mut loader = YamlLoader::new(config_dir)?;
        match loader.load_optional_file(CONFIGURATION_FILE)? {
            Some(configuration) => Self::from_configuration(&configuration),
            None => Ok(Self::default()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_defaults_without_section() {
        let config = RelationsConfig::from_configuration(&json!({"homeassistant": {}})).unwrap();
        assert_eq!(config, RelationsConfig::default());
        assert_eq!(config.default_depth, 3);

        let config =
            RelationsConfig::from_configuration(&json!({"advancedrelations": null})).unwrap();
        assert_eq!(config.default_depth, 3);
    }

    #[test]
    fn test_section_values() {
        let config = RelationsConfig::from_configuration(&json!({
            "advancedrelations": {"default_depth": 0, "panel_dir": "/srv/panel"}
        }))
        .unwrap();
        assert_eq!(config.default_depth, 0);
        assert_eq!(config.panel_dir, Some(PathBuf::from("/srv/panel")));
    }

    #[test]
    fn test_invalid_section() {
        let result = RelationsConfig::from_configuration(&json!({
            "advancedrelations": {"default_depth": -1}
        }));
        assert!(matches!(result, Err(ConfigError::InvalidValue { .. })));
    }

    #[test]
    fn test_load_from_configuration_yaml() {
        let dir = TempDir::new().unwrap();
        assert_eq!(
            RelationsConfig::load(dir.path()).unwrap(),
            RelationsConfig::default()
        );

        fs::write(
            dir.path().join("configuration.yaml"),
            "homeassistant:\n  name: Home\nautomation: !include automations.yaml\nadvancedrelations:\n  default_depth: 5\n",
        )
        .unwrap();
        fs::write(dir.path().join("automations.yaml"), "[]\n").unwrap();

        let config = RelationsConfig::load(dir.path()).unwrap();
        assert_eq!(config.default_depth, 5);
        assert!(config.panel_dir.is_none());
    }
}
