//! Snapshot loading from a configuration directory
//!
//! Reads automations, scripts, the entity registry and config entries and
//! assembles them into a [`Snapshot`]. Entries that cannot be understood are
//! logged and skipped; only unreadable or unparseable files are errors.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use ha_automation::Automation;
use ha_config::{
    ConfigEntriesData, ConfigEntry, ConfigError, EntityRegistryData, Storage, Value, YamlLoader,
    AUTOMATIONS_FILE, CONFIG_ENTRIES_KEY, ENTITY_REGISTRY_KEY, SCRIPTS_FILE,
};
use ha_relations::{EntityInfo, Snapshot, HELPER_PLATFORMS};
use ha_script::Script;
use thiserror::Error;
use tracing::{debug, info, instrument, warn};

/// Errors raised while building a snapshot
#[derive(Debug, Error)]
pub enum LoadError {
    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// Result type for snapshot loading
pub type LoadResult<T> = Result<T, LoadError>;

/// Builds snapshots from one configuration directory
#[derive(Debug, Clone)]
pub struct SnapshotLoader {
    config_dir: PathBuf,
}

impl SnapshotLoader {
    pub fn new(config_dir: impl Into<PathBuf>) -> Self {
        Self {
            config_dir: config_dir.into(),
        }
    }

    pub fn config_dir(&self) -> &Path {
        &self.config_dir
    }

    /// Read the configuration directory into a fresh snapshot
    #[instrument(skip(self), fields(config_dir = %self.config_dir.display()))]
    pub fn load(&self) -> LoadResult<Snapshot> {
        let mut yaml = YamlLoader::new(&self.config_dir)?;
        let mut snapshot = Snapshot::new();

        if let Some(automations) = yaml.load_optional_file(AUTOMATIONS_FILE)? {
            load_automations(&mut snapshot, automations);
        }
        if let Some(scripts) = yaml.load_optional_file(SCRIPTS_FILE)? {
            load_scripts(&mut snapshot, scripts);
        }
        self.load_entities(&mut snapshot)?;

        info!(
            automations = snapshot.automation_count(),
            scripts = snapshot.script_count(),
            entities = snapshot.entity_count(),
            "Loaded relations snapshot"
        );
        Ok(snapshot)
    }

    fn load_entities(&self, snapshot: &mut Snapshot) -> LoadResult<()> {
        let storage = Storage::new(&self.config_dir);

        let Some(registry) = storage.load::<EntityRegistryData>(ENTITY_REGISTRY_KEY)? else {
            debug!("No entity registry found");
            return Ok(());
        };
        let config_entries = storage
            .load::<ConfigEntriesData>(CONFIG_ENTRIES_KEY)?
            .map(|file| file.data.entries)
            .unwrap_or_default();
        let entries: HashMap<&str, &ConfigEntry> = config_entries
            .iter()
            .map(|entry| (entry.entry_id.as_str(), entry))
            .collect();

        for registered in registry.data.entities {
            let mut entity = EntityInfo::new(registered.entity_id.as_str());
            if let Some(name) = registered.friendly_name() {
                entity = entity.with_friendly_name(name);
            }

            let helper_entry = find_entry(&entries, registered.config_entry_id.as_deref())
                .or_else(|| find_entry(&entries, registered.unique_id.as_deref()));

            entity = match (registered.platform.as_deref(), helper_entry) {
                (Some(platform), Some(entry))
                    if entry.domain == platform && HELPER_PLATFORMS.contains(&platform) =>
                {
                    entity.with_helper_options(platform, &entry.options)
                }
                (Some(platform), _) => entity.with_platform(platform),
                (None, _) => entity,
            };
            snapshot.insert_entity(entity);
        }
        Ok(())
    }
}

fn find_entry<'a>(entries: &HashMap<&str, &'a ConfigEntry>, entry_id: Option<&str>) -> Option<&'a ConfigEntry> {
    entries.get(entry_id?).copied()
}

fn load_automations(snapshot: &mut Snapshot, automations: Value) {
    let Value::Array(automations) = automations else {
        warn!("{} is not a list, ignoring it", AUTOMATIONS_FILE);
        return;
    };

    for (index, config) in automations.into_iter().enumerate() {
        match Automation::from_value(config) {
            Ok(automation) => snapshot.insert_automation(automation),
            Err(e) => warn!("Skipping automation #{} in {}: {}", index, AUTOMATIONS_FILE, e),
        }
    }
}

fn load_scripts(snapshot: &mut Snapshot, scripts: Value) {
    let Value::Object(scripts) = scripts else {
        warn!("{} is not a mapping, ignoring it", SCRIPTS_FILE);
        return;
    };

    for (id, config) in scripts {
        match Script::from_value(id, config) {
            Ok(script) => snapshot.insert_script(script),
            Err(e) => warn!("Skipping script in {}: {}", SCRIPTS_FILE, e),
        }
    }
}
