//! YAML configuration loader with custom tag support
//!
//! Documents are parsed with serde_yaml and converted to JSON values while
//! Home Assistant's tags are resolved:
//! - `!include path` - Include another YAML file
//! - `!include_dir_list dir` - Include all YAML files in a directory as a list
//! - `!include_dir_merge_list dir` - Merge lists from all YAML files in a directory
//! - `!include_dir_named dir` - Include all YAML files as a mapping keyed by filename
//! - `!include_dir_merge_named dir` - Merge mappings from all YAML files
//! - `!secret key` - Substitute from secrets.yaml
//! - `!env_var VAR [default]` - Environment variable substitution
//!
//! Unresolvable secrets and environment variables become `null` with a
//! warning. Any other tag (for example a blueprint `!input`) is dropped and its
//! inner value kept.

use crate::error::{ConfigError, ConfigResult};
use crate::secrets::Secrets;
use serde_json::{Map, Number, Value};
use serde_yaml::value::TaggedValue;
use serde_yaml::Value as YamlValue;
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, trace, warn};

/// YAML loader with support for Home Assistant custom tags
pub struct YamlLoader {
    /// Base directory for resolving relative paths
    config_dir: PathBuf,
    /// Secrets store
    secrets: Secrets,
    /// Files currently being loaded, for circular include detection
    include_stack: HashSet<PathBuf>,
}

impl YamlLoader {
    /// Create a new YAML loader for the given config directory
    pub fn new(config_dir: impl Into<PathBuf>) -> ConfigResult<Self> {
        let config_dir = config_dir.into();
        let secrets = Secrets::load(&config_dir)?;

        Ok(Self::with_secrets(config_dir, secrets))
    }

    /// Create a loader with pre-loaded secrets
    pub fn with_secrets(config_dir: impl Into<PathBuf>, secrets: Secrets) -> Self {
        Self {
            config_dir: config_dir.into(),
            secrets,
            include_stack: HashSet::new(),
        }
    }

    /// Load and process a YAML file
    pub fn load_file(&mut self, path: impl AsRef<Path>) -> ConfigResult<Value> {
        let path = self.resolve_path(path.as_ref());
        debug!("Loading YAML file: {:?}", path);

        if self.include_stack.contains(&path) {
            return Err(ConfigError::CircularInclude { path });
        }

        let content = fs::read_to_string(&path).map_err(|e| ConfigError::ReadFile {
            path: path.clone(),
            source: e,
        })?;

        self.include_stack.insert(path.clone());
        let result = self.load_string(&content, &path);
        self.include_stack.remove(&path);

        result
    }

    /// Load a YAML file if it exists
    ///
    /// A missing file yields `Ok(None)`; read and parse failures still error.
    pub fn load_optional_file(&mut self, path: impl AsRef<Path>) -> ConfigResult<Option<Value>> {
        let resolved = self.resolve_path(path.as_ref());
        if !resolved.is_file() {
            debug!("Optional YAML file not present: {:?}", resolved);
            return Ok(None);
        }
        self.load_file(resolved).map(Some)
    }

    /// Load and process YAML from a string
    pub fn load_string(&mut self, content: &str, source_path: &Path) -> ConfigResult<Value> {
        let value: YamlValue =
            serde_yaml::from_str(content).map_err(|e| ConfigError::ParseYaml {
                path: source_path.to_path_buf(),
                source: e,
            })?;

        self.convert(value, source_path)
    }

    /// Convert a YAML value to JSON, resolving custom tags
    fn convert(&mut self, value: YamlValue, source_path: &Path) -> ConfigResult<Value> {
        match value {
            YamlValue::Null => Ok(Value::Null),
            YamlValue::Bool(b) => Ok(Value::Bool(b)),
            YamlValue::Number(n) => Ok(convert_number(&n)),
            YamlValue::String(s) => Ok(Value::String(s)),
            YamlValue::Sequence(seq) => {
                let items: ConfigResult<Vec<Value>> = seq
                    .into_iter()
                    .map(|v| self.convert(v, source_path))
                    .collect();
                Ok(Value::Array(items?))
            }
            YamlValue::Mapping(map) => {
                let mut result = Map::new();
                for (k, v) in map {
                    let key = self.convert_key(k, source_path)?;
                    let value = self.convert(v, source_path)?;
                    result.insert(key, value);
                }
                Ok(Value::Object(result))
            }
            YamlValue::Tagged(tagged) => self.convert_tagged(*tagged, source_path),
        }
    }

    /// Mapping keys become strings the way Home Assistant's loader stringifies them
    fn convert_key(&mut self, key: YamlValue, source_path: &Path) -> ConfigResult<String> {
        match self.convert(key, source_path)? {
            Value::String(s) => Ok(s),
            Value::Null => Ok("null".to_string()),
            scalar @ (Value::Bool(_) | Value::Number(_)) => Ok(scalar.to_string()),
            other => Err(ConfigError::InvalidValue {
                key: other.to_string(),
                reason: format!("mapping key in {} must be a scalar", source_path.display()),
            }),
        }
    }

    fn convert_tagged(&mut self, tagged: TaggedValue, source_path: &Path) -> ConfigResult<Value> {
        let tag = tagged.tag.to_string();
        let value = tagged.value;

        trace!("Processing tag '{}' with value {:?}", tag, value);

        match tag.as_str() {
            "!include" => self.process_include(value, source_path),
            "!include_dir_list" => self.process_include_dir_list(value, source_path),
            "!include_dir_merge_list" => self.process_include_dir_merge_list(value, source_path),
            "!include_dir_named" => self.process_include_dir_named(value, source_path),
            "!include_dir_merge_named" => self.process_include_dir_merge_named(value, source_path),
            "!secret" => self.process_secret(value),
            "!env_var" => self.process_env_var(value),
            _ => {
                debug!("Unwrapping unsupported tag {}", tag);
                self.convert(value, source_path)
            }
        }
    }

    /// Process !include tag
    fn process_include(&mut self, value: YamlValue, source_path: &Path) -> ConfigResult<Value> {
        let include_path = self.value_to_path(&value, source_path)?;
        debug!("Including file: {:?}", include_path);
        self.load_file(&include_path)
    }

    /// Process !include_dir_list tag - include all YAML files as a list
    fn process_include_dir_list(
        &mut self,
        value: YamlValue,
        source_path: &Path,
    ) -> ConfigResult<Value> {
        let dir_path = self.value_to_path(&value, source_path)?;
        debug!("Including directory as list: {:?}", dir_path);

        let mut result = Vec::new();
        for file in self.get_yaml_files(&dir_path)? {
            result.push(self.load_file(&file)?);
        }

        Ok(Value::Array(result))
    }

    /// Process !include_dir_merge_list tag - merge lists from all YAML files
    fn process_include_dir_merge_list(
        &mut self,
        value: YamlValue,
        source_path: &Path,
    ) -> ConfigResult<Value> {
        let dir_path = self.value_to_path(&value, source_path)?;
        debug!("Including directory as merged list: {:?}", dir_path);

        let mut result = Vec::new();
        for file in self.get_yaml_files(&dir_path)? {
            match self.load_file(&file)? {
                Value::Array(items) => result.extend(items),
                Value::Null => {}
                other => result.push(other),
            }
        }

        Ok(Value::Array(result))
    }

    /// Process !include_dir_named tag - include all YAML files as a mapping
    fn process_include_dir_named(
        &mut self,
        value: YamlValue,
        source_path: &Path,
    ) -> ConfigResult<Value> {
        let dir_path = self.value_to_path(&value, source_path)?;
        debug!("Including directory as named mapping: {:?}", dir_path);

        let mut result = Map::new();
        for file in self.get_yaml_files(&dir_path)? {
            let name = file
                .file_stem()
                .and_then(|s| s.to_str())
                .unwrap_or_default()
                .to_string();
            let content = self.load_file(&file)?;
            result.insert(name, content);
        }

        Ok(Value::Object(result))
    }

    /// Process !include_dir_merge_named tag - merge mappings from all YAML files
    fn process_include_dir_merge_named(
        &mut self,
        value: YamlValue,
        source_path: &Path,
    ) -> ConfigResult<Value> {
        let dir_path = self.value_to_path(&value, source_path)?;
        debug!("Including directory as merged mapping: {:?}", dir_path);

        let mut result = Map::new();
        for file in self.get_yaml_files(&dir_path)? {
            if let Value::Object(map) = self.load_file(&file)? {
                result.extend(map);
            }
        }

        Ok(Value::Object(result))
    }

    /// Process !secret tag
    fn process_secret(&self, value: YamlValue) -> ConfigResult<Value> {
        let YamlValue::String(key) = value else {
            return Err(ConfigError::InvalidValue {
                key: "!secret".to_string(),
                reason: "secret key must be a string".to_string(),
            });
        };

        match self.secrets.get(&key) {
            Some(secret) => {
                debug!("Substituted secret: {}", key);
                Ok(secret.clone())
            }
            None => {
                warn!("Secret '{}' not found in {:?}, using null", key, self.secrets.path());
                Ok(Value::Null)
            }
        }
    }

    /// Process !env_var tag, which accepts an optional default after the name
    fn process_env_var(&self, value: YamlValue) -> ConfigResult<Value> {
        let YamlValue::String(spec) = value else {
            return Err(ConfigError::InvalidValue {
                key: "!env_var".to_string(),
                reason: "environment variable name must be a string".to_string(),
            });
        };

        let (var_name, default) = match spec.split_once(char::is_whitespace) {
            Some((name, default)) => (name, Some(default.trim())),
            None => (spec.as_str(), None),
        };

        match (std::env::var(var_name), default) {
            (Ok(env_value), _) => {
                debug!("Substituted env var: {}", var_name);
                Ok(Value::String(env_value))
            }
            (Err(_), Some(default)) => Ok(Value::String(default.to_string())),
            (Err(_), None) => {
                warn!("Environment variable '{}' not set, using null", var_name);
                Ok(Value::Null)
            }
        }
    }

    /// Convert a YAML value to a path, resolving relative to source file
    fn value_to_path(&self, value: &YamlValue, source_path: &Path) -> ConfigResult<PathBuf> {
        let YamlValue::String(path_str) = value else {
            return Err(ConfigError::InvalidIncludePath {
                path: format!("{:?}", value),
                reason: "path must be a string".to_string(),
            });
        };

        let base_dir = source_path.parent().unwrap_or(&self.config_dir);
        let resolved = if Path::new(path_str).is_absolute() {
            PathBuf::from(path_str)
        } else {
            base_dir.join(path_str)
        };

        Ok(resolved)
    }

    /// Resolve a path relative to the config directory
    fn resolve_path(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.config_dir.join(path)
        }
    }

    /// Get all YAML files in a directory, sorted by name
    fn get_yaml_files(&self, dir: &Path) -> ConfigResult<Vec<PathBuf>> {
        if !dir.is_dir() {
            return Err(ConfigError::DirectoryNotFound {
                path: dir.to_path_buf(),
            });
        }

        let mut files: Vec<PathBuf> = fs::read_dir(dir)
            .map_err(|e| ConfigError::ReadFile {
                path: dir.to_path_buf(),
                source: e,
            })?
            .filter_map(|entry| entry.ok())
            .map(|entry| entry.path())
            .filter(|path| {
                path.extension()
                    .map(|ext| ext == "yaml" || ext == "yml")
                    .unwrap_or(false)
            })
            .collect();

        files.sort();
        Ok(files)
    }

    /// Get a reference to the secrets store
    pub fn secrets(&self) -> &Secrets {
        &self.secrets
    }

    /// Get the config directory
    pub fn config_dir(&self) -> &Path {
        &self.config_dir
    }
}

/// Integers stay integers; floats JSON cannot represent fall back to their text form
fn convert_number(n: &serde_yaml::Number) -> Value {
    if let Some(i) = n.as_i64() {
        Value::Number(i.into())
    } else if let Some(u) = n.as_u64() {
        Value::Number(u.into())
    } else {
        n.as_f64()
            .and_then(Number::from_f64)
            .map(Value::Number)
            .unwrap_or_else(|| Value::String(n.to_string()))
    }
}

/// Load a YAML file with full tag processing
pub fn load_yaml(config_dir: impl Into<PathBuf>, file: impl AsRef<Path>) -> ConfigResult<Value> {
    let mut loader = YamlLoader::new(config_dir)?;
    loader.load_file(file)
}

/// Load a YAML string with tag processing
pub fn load_yaml_string(
    config_dir: impl Into<PathBuf>,
    content: &str,
    source_name: &str,
) -> ConfigResult<Value> {
    let config_dir = config_dir.into();
    let source_path = config_dir.join(source_name);
    let mut loader = YamlLoader::new(config_dir)?;
    loader.load_string(content, &source_path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::io::Write;
    use tempfile::TempDir;

    fn write_file(dir: &Path, name: &str, content: &str) {
        let path = dir.join(name);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        let mut file = fs::File::create(path).unwrap();
        file.write_all(content.as_bytes()).unwrap();
    }

    #[test]
    fn test_load_simple_yaml() {
        let dir = TempDir::new().unwrap();
        write_file(
            dir.path(),
            "config.yaml",
            r#"
key: value
number: 42
ratio: 0.5
list:
  - one
  - two
"#,
        );

        let value = load_yaml(dir.path(), "config.yaml").unwrap();
        assert_eq!(
            value,
            json!({"key": "value", "number": 42, "ratio": 0.5, "list": ["one", "two"]})
        );
    }

    #[test]
    fn test_empty_file_is_null() {
        let dir = TempDir::new().unwrap();
        write_file(dir.path(), "scripts.yaml", "");

        let value = load_yaml(dir.path(), "scripts.yaml").unwrap();
        assert!(value.is_null());
    }

    #[test]
    fn test_non_string_keys_are_stringified() {
        let dir = TempDir::new().unwrap();
        write_file(dir.path(), "config.yaml", "1: one\ntrue: yes_value\n");

        let value = load_yaml(dir.path(), "config.yaml").unwrap();
        assert_eq!(value["1"], json!("one"));
        assert_eq!(value["true"], json!("yes_value"));
    }

    #[test]
    fn test_include() {
        let dir = TempDir::new().unwrap();
        write_file(
            dir.path(),
            "included.yaml",
            "included_key: included_value\n",
        );
        write_file(
            dir.path(),
            "config.yaml",
            "main_key: main_value\nincluded: !include included.yaml\n",
        );

        let value = load_yaml(dir.path(), "config.yaml").unwrap();
        assert_eq!(value["main_key"], json!("main_value"));
        assert_eq!(value["included"]["included_key"], json!("included_value"));
    }

    #[test]
    fn test_secret() {
        let dir = TempDir::new().unwrap();
        write_file(dir.path(), "secrets.yaml", "my_password: secret123\nport: 8080\n");
        write_file(
            dir.path(),
            "config.yaml",
            "password: !secret my_password\nport: !secret port\n",
        );

        let value = load_yaml(dir.path(), "config.yaml").unwrap();
        assert_eq!(value["password"], json!("secret123"));
        assert_eq!(value["port"], json!(8080));
    }

    #[test]
    fn test_missing_secret_becomes_null() {
        let dir = TempDir::new().unwrap();
        write_file(dir.path(), "secrets.yaml", "existing: value\n");
        write_file(dir.path(), "config.yaml", "password: !secret nonexistent\n");

        let value = load_yaml(dir.path(), "config.yaml").unwrap();
        assert!(value["password"].is_null());
    }

    #[test]
    fn test_env_var() {
        let dir = TempDir::new().unwrap();
        std::env::set_var("TEST_HA_CONFIG_VAR", "env_value");
        write_file(
            dir.path(),
            "config.yaml",
            "from_env: !env_var TEST_HA_CONFIG_VAR\n",
        );

        let value = load_yaml(dir.path(), "config.yaml").unwrap();
        assert_eq!(value["from_env"], json!("env_value"));

        std::env::remove_var("TEST_HA_CONFIG_VAR");
    }

    #[test]
    fn test_env_var_default_and_missing() {
        let dir = TempDir::new().unwrap();
        write_file(
            dir.path(),
            "config.yaml",
            "with_default: !env_var TEST_HA_UNSET_VAR_1 fallback\nwithout: !env_var TEST_HA_UNSET_VAR_2\n",
        );

        let value = load_yaml(dir.path(), "config.yaml").unwrap();
        assert_eq!(value["with_default"], json!("fallback"));
        assert!(value["without"].is_null());
    }

    #[test]
    fn test_unknown_tag_is_unwrapped() {
        let dir = TempDir::new().unwrap();
        write_file(
            dir.path(),
            "automations.yaml",
            "- id: bp\n  trigger:\n    - platform: state\n      entity_id: !input motion_sensor\n",
        );

        let value = load_yaml(dir.path(), "automations.yaml").unwrap();
        assert_eq!(value[0]["trigger"][0]["entity_id"], json!("motion_sensor"));
    }

    #[test]
    fn test_include_dir_list() {
        let dir = TempDir::new().unwrap();
        write_file(
            dir.path(),
            "automations/auto1.yaml",
            "alias: Automation 1\n",
        );
        write_file(
            dir.path(),
            "automations/auto2.yaml",
            "alias: Automation 2\n",
        );
        write_file(
            dir.path(),
            "config.yaml",
            "automation: !include_dir_list automations\n",
        );

        let value = load_yaml(dir.path(), "config.yaml").unwrap();
        assert_eq!(
            value["automation"],
            json!([{"alias": "Automation 1"}, {"alias": "Automation 2"}])
        );
    }

    #[test]
    fn test_include_dir_merge_list() {
        let dir = TempDir::new().unwrap();
        write_file(
            dir.path(),
            "automations/auto1.yaml",
            "- alias: Automation 1\n- alias: Automation 2\n",
        );
        write_file(
            dir.path(),
            "automations/auto2.yaml",
            "- alias: Automation 3\n",
        );
        write_file(
            dir.path(),
            "config.yaml",
            "automation: !include_dir_merge_list automations\n",
        );

        let value = load_yaml(dir.path(), "config.yaml").unwrap();
        assert_eq!(value["automation"].as_array().unwrap().len(), 3);
    }

    #[test]
    fn test_include_dir_named() {
        let dir = TempDir::new().unwrap();
        write_file(dir.path(), "scripts/morning.yaml", "alias: Morning\n");
        write_file(dir.path(), "scripts/night.yaml", "alias: Night\n");
        write_file(
            dir.path(),
            "config.yaml",
            "script: !include_dir_named scripts\n",
        );

        let value = load_yaml(dir.path(), "config.yaml").unwrap();
        assert_eq!(value["script"]["morning"]["alias"], json!("Morning"));
        assert_eq!(value["script"]["night"]["alias"], json!("Night"));
    }

    #[test]
    fn test_include_dir_merge_named() {
        let dir = TempDir::new().unwrap();
        write_file(dir.path(), "scripts/a.yaml", "one:\n  alias: One\n");
        write_file(dir.path(), "scripts/b.yaml", "two:\n  alias: Two\n");
        write_file(
            dir.path(),
            "config.yaml",
            "script: !include_dir_merge_named scripts\n",
        );

        let value = load_yaml(dir.path(), "config.yaml").unwrap();
        let scripts = value["script"].as_object().unwrap();
        assert!(scripts.contains_key("one"));
        assert!(scripts.contains_key("two"));
    }

    #[test]
    fn test_missing_include_dir() {
        let dir = TempDir::new().unwrap();
        write_file(dir.path(), "config.yaml", "script: !include_dir_named nope\n");

        let result = load_yaml(dir.path(), "config.yaml");
        assert!(matches!(result, Err(ConfigError::DirectoryNotFound { .. })));
    }

    #[test]
    fn test_circular_include_detection() {
        let dir = TempDir::new().unwrap();
        write_file(dir.path(), "a.yaml", "include_b: !include b.yaml\n");
        write_file(dir.path(), "b.yaml", "include_a: !include a.yaml\n");

        let result = load_yaml(dir.path(), "a.yaml");
        assert!(matches!(result, Err(ConfigError::CircularInclude { .. })));
    }

    #[test]
    fn test_load_optional_file() {
        let dir = TempDir::new().unwrap();
        let mut loader = YamlLoader::new(dir.path()).unwrap();
        assert!(loader.load_optional_file("automations.yaml").unwrap().is_none());

        write_file(dir.path(), "automations.yaml", "[]\n");
        assert_eq!(
            loader.load_optional_file("automations.yaml").unwrap(),
            Some(json!([]))
        );
    }

    #[test]
    fn test_invalid_yaml() {
        let dir = TempDir::new().unwrap();
        write_file(dir.path(), "config.yaml", "key: [unclosed\n");

        let result = load_yaml(dir.path(), "config.yaml");
        assert!(matches!(result, Err(ConfigError::ParseYaml { .. })));
    }
}
