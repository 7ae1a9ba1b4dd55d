//! Secrets loader for Home Assistant configuration
//!
//! Loads secrets from secrets.yaml. Values keep their YAML type, so a secret
//! holding a port number substitutes as a number.

use crate::error::{ConfigError, ConfigResult};
use serde_json::Value;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Secrets store loaded from secrets.yaml
#[derive(Debug, Clone)]
pub struct Secrets {
    secrets: HashMap<String, Value>,
    /// Path to the secrets file
    path: PathBuf,
}

impl Secrets {
    /// Load secrets from a secrets.yaml file
    ///
    /// A missing file yields an empty store.
    pub fn load(config_dir: &Path) -> ConfigResult<Self> {
        let path = config_dir.join("secrets.yaml");

        if !path.exists() {
            debug!("No secrets.yaml found at {:?}, using empty secrets", path);
            return Ok(Self {
                secrets: HashMap::new(),
                path,
            });
        }

        let content = fs::read_to_string(&path).map_err(|e| ConfigError::ReadFile {
            path: path.clone(),
            source: e,
        })?;

        let secrets: Option<HashMap<String, serde_yaml::Value>> = serde_yaml::from_str(&content)
            .map_err(|e| ConfigError::ParseYaml {
                path: path.clone(),
                source: e,
            })?;

        let secrets = secrets
            .unwrap_or_default()
            .into_iter()
            .map(|(key, value)| {
                let value = serde_json::to_value(value).map_err(|e| ConfigError::InvalidValue {
                    key: key.clone(),
                    reason: e.to_string(),
                })?;
                Ok((key, value))
            })
            .collect::<ConfigResult<HashMap<String, Value>>>()?;

        debug!("Loaded {} secrets from {:?}", secrets.len(), path);

        Ok(Self { secrets, path })
    }

    /// Get a secret by key
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.secrets.get(key)
    }

    /// Check if a secret exists
    pub fn contains(&self, key: &str) -> bool {
        self.secrets.contains_key(key)
    }

    /// Get the path to the secrets file
    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn len(&self) -> usize {
        self.secrets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.secrets.is_empty()
    }
}

impl Default for Secrets {
    fn default() -> Self {
        Self {
            secrets: HashMap::new(),
            path: PathBuf::from("secrets.yaml"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::io::Write;
    use tempfile::TempDir;

    fn create_secrets_file(dir: &Path, content: &str) {
        let path = dir.join("secrets.yaml");
        let mut file = fs::File::create(path).unwrap();
        file.write_all(content.as_bytes()).unwrap();
    }

    #[test]
    fn test_load_secrets() {
        let dir = TempDir::new().unwrap();
        create_secrets_file(
            dir.path(),
            r#"
api_key: secret123
password: hunter2
port: 8080
enabled: true
"#,
        );

        let secrets = Secrets::load(dir.path()).unwrap();
        assert_eq!(secrets.get("api_key"), Some(&json!("secret123")));
        assert_eq!(secrets.get("password"), Some(&json!("hunter2")));
        assert_eq!(secrets.get("port"), Some(&json!(8080)));
        assert_eq!(secrets.get("enabled"), Some(&json!(true)));
        assert_eq!(secrets.len(), 4);
    }

    #[test]
    fn test_missing_secret() {
        let dir = TempDir::new().unwrap();
        create_secrets_file(dir.path(), "key: value\n");

        let secrets = Secrets::load(dir.path()).unwrap();
        assert!(secrets.get("nonexistent").is_none());
        assert!(secrets.contains("key"));
    }

    #[test]
    fn test_no_secrets_file() {
        let dir = TempDir::new().unwrap();
        let secrets = Secrets::load(dir.path()).unwrap();
        assert!(secrets.is_empty());
    }

    #[test]
    fn test_empty_secrets_file() {
        let dir = TempDir::new().unwrap();
        create_secrets_file(dir.path(), "");
        let secrets = Secrets::load(dir.path()).unwrap();
        assert!(secrets.is_empty());
    }
}
