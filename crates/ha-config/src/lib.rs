//! Configuration directory loading for Advanced Relations
//!
//! Reads the parts of a Home Assistant configuration directory the relations
//! engine needs:
//!
//! - YAML files with Home Assistant's custom tags (`!include`,
//!   `!include_dir_list`, `!include_dir_merge_list`, `!include_dir_named`,
//!   `!include_dir_merge_named`, `!secret`, `!env_var`), produced as JSON values
//! - `.storage/` JSON files such as `core.entity_registry` and
//!   `core.config_entries`
//! - the `advancedrelations:` section of configuration.yaml
//!
//! # Example
//!
//! ```ignore
//! use ha_config::{load_yaml, RelationsConfig};
//!
//! let automations = load_yaml("/config", "automations.yaml")?;
//! let settings = RelationsConfig::load("/config")?;
//! ```

mod error;
mod loader;
mod registry;
mod relations_config;
mod secrets;
mod storage;

pub use error::{ConfigError, ConfigResult};
pub use loader::{load_yaml, load_yaml_string, YamlLoader};
pub use registry::{
    ConfigEntriesData, ConfigEntry, EntityRegistryData, EntityRegistryEntry, CONFIG_ENTRIES_KEY,
    ENTITY_REGISTRY_KEY,
};
pub use relations_config::{RelationsConfig, DEFAULT_DEPTH, RELATIONS_SECTION};
pub use secrets::Secrets;
pub use storage::{Storage, StorageFile};

/// Configuration values are produced as JSON values after tag processing
pub use serde_json::Value;

/// File holding UI-managed automations
pub const AUTOMATIONS_FILE: &str = "automations.yaml";

/// File holding UI-managed scripts
pub const SCRIPTS_FILE: &str = "scripts.yaml";

/// Main configuration file
pub const CONFIGURATION_FILE: &str = "configuration.yaml";
