//! Configuration file handling
//!
//! The configuration is a flat key/value mapping read from YAML (default)
//! or TOML. Loading never fails for the caller: a missing or malformed file
//! is logged and replaced by an empty configuration, and the missing keys
//! surface later through the typed accessors.

use serde_json::{Map, Value};
use std::path::Path;
use std::time::Duration;

use super::paths::config_path;
use super::{Error, Result};

/// Loaded configuration, read-only after load
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Config {
    values: Map<String, Value>,
}

impl Config {
    /// Build a configuration from an already-parsed mapping
    pub fn from_map(values: Map<String, Value>) -> Self {
        Self { values }
    }

    /// Load configuration, degrading to an empty mapping on any failure
    ///
    /// Uses `<project_root>/config/config.yaml` when no path is given.
    pub fn load(path: Option<&Path>) -> Self {
        let path = path.map(Path::to_path_buf).unwrap_or_else(config_path);
        match Self::try_load(&path) {
            Ok(config) => {
                tracing::info!("Loaded configuration from {}", path.display());
                config
            }
            Err(e) => {
                tracing::error!(
                    "Failed to load configuration from {}: {}",
                    path.display(),
                    e
                );
                Self::default()
            }
        }
    }

    /// Load configuration, reporting why it could not be used
    pub fn try_load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(Error::Config(format!(
                "configuration file not found: {}",
                path.display()
            )));
        }

        let content = std::fs::read_to_string(path).map_err(|e| {
            Error::Config(format!("failed to read '{}': {}", path.display(), e))
        })?;

        let value = match ConfigFormat::from_path(path) {
            ConfigFormat::Yaml => serde_yaml::from_str::<Value>(&content)
                .map_err(|e| Error::Config(format!("invalid YAML: {}", e)))?,
            ConfigFormat::Toml => toml::from_str::<Value>(&content)
                .map_err(|e| Error::Config(format!("invalid TOML: {}", e)))?,
        };

        match value {
            Value::Object(values) => Ok(Self { values }),
            other => Err(Error::Config(format!(
                "top level must be a mapping, found {}",
                type_name(&other)
            ))),
        }
    }

    /// Whether no keys were loaded
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Raw access to a configuration value
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.values.get(key)
    }

    /// Base URL every request path is appended to
    pub fn base_url(&self) -> Result<&str> {
        match self.values.get("base_url") {
            Some(Value::String(url)) => Ok(url),
            Some(other) => Err(Error::invalid_config(
                "base_url",
                format!("expected a string, found {}", type_name(other)),
            )),
            None => Err(Error::MissingConfigKey("base_url")),
        }
    }

    /// Request timeout, configured in (possibly fractional) seconds
    pub fn timeout(&self) -> Result<Duration> {
        let value = self
            .values
            .get("timeout")
            .ok_or(Error::MissingConfigKey("timeout"))?;
        let secs = value.as_f64().ok_or_else(|| {
            Error::invalid_config("timeout", format!("expected seconds, found {}", value))
        })?;
        Duration::try_from_secs_f64(secs)
            .map_err(|e| Error::invalid_config("timeout", e.to_string()))
    }

    /// Whether parameter expressions should have every space removed before parsing
    pub fn strip_param_spaces(&self) -> bool {
        self.values
            .get("strip_param_spaces")
            .and_then(Value::as_bool)
            .unwrap_or(false)
    }

    /// Number of rows to run at once
    pub fn concurrency(&self) -> usize {
        self.values
            .get("concurrency")
            .and_then(Value::as_u64)
            .map(|n| n.max(1) as usize)
            .unwrap_or(1)
    }

    /// Headers attached to every request
    pub fn default_headers(&self) -> Vec<(String, String)> {
        let Some(Value::Object(headers)) = self.values.get("headers") else {
            return Vec::new();
        };
        headers
            .iter()
            .map(|(name, value)| {
                let value = match value {
                    Value::String(s) => s.clone(),
                    other => other.to_string(),
                };
                (name.clone(), value)
            })
            .collect()
    }
}

/// On-disk configuration syntax
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ConfigFormat {
    Yaml,
    Toml,
}

impl ConfigFormat {
    fn from_path(path: &Path) -> Self {
        match path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase)
            .as_deref()
        {
            Some("toml") => ConfigFormat::Toml,
            _ => ConfigFormat::Yaml,
        }
    }
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "list",
        Value::Object(_) => "mapping",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use std::path::PathBuf;

    fn write_config(name: &str, content: &str) -> (tempfile::TempDir, PathBuf) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(name);
        let mut file = std::fs::File::create(&path).unwrap();
        file.write_all(content.as_bytes()).unwrap();
        (dir, path)
    }

    #[test]
    fn test_load_yaml_mapping() {
        let (_dir, path) = write_config(
            "config.yaml",
            "base_url: http://localhost:8080\ntimeout: 5\n",
        );
        let config = Config::load(Some(&path));
        assert_eq!(config.base_url().unwrap(), "http://localhost:8080");
        assert_eq!(config.timeout().unwrap(), Duration::from_secs(5));
    }

    #[test]
    fn test_load_toml_mapping() {
        let (_dir, path) = write_config(
            "config.toml",
            "base_url = \"https://api.example.com\"\ntimeout = 2.5\n",
        );
        let config = Config::try_load(&path).unwrap();
        assert_eq!(config.base_url().unwrap(), "https://api.example.com");
        assert_eq!(config.timeout().unwrap(), Duration::from_millis(2500));
    }

    #[test]
    fn test_top_level_list_degrades_to_empty() {
        let (_dir, path) = write_config("config.yaml", "- base_url\n- timeout\n");
        assert!(matches!(Config::try_load(&path), Err(Error::Config(_))));
        assert!(Config::load(Some(&path)).is_empty());
    }

    #[test]
    fn test_scalar_and_empty_documents_degrade() {
        let (_dir, path) = write_config("config.yaml", "just a string\n");
        assert!(Config::load(Some(&path)).is_empty());

        let (_dir, path) = write_config("config.yaml", "");
        assert!(Config::load(Some(&path)).is_empty());
    }

    #[test]
    fn test_malformed_yaml_degrades() {
        let (_dir, path) = write_config("config.yaml", "base_url: [unclosed\n");
        assert!(Config::load(Some(&path)).is_empty());
    }

    #[test]
    fn test_missing_file_degrades() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load(Some(&dir.path().join("nope.yaml")));
        assert!(config.is_empty());
        assert!(matches!(
            config.base_url(),
            Err(Error::MissingConfigKey("base_url"))
        ));
        assert!(matches!(
            config.timeout(),
            Err(Error::MissingConfigKey("timeout"))
        ));
    }

    #[test]
    fn test_invalid_timeout_is_reported() {
        let (_dir, path) = write_config("config.yaml", "timeout: soon\n");
        let config = Config::load(Some(&path));
        assert!(matches!(
            config.timeout(),
            Err(Error::InvalidConfigValue { key: "timeout", .. })
        ));
    }

    #[test]
    fn test_optional_settings() {
        let (_dir, path) = write_config(
            "config.yaml",
            "strip_param_spaces: true\nconcurrency: 4\nheaders:\n  X-Token: abc\n  X-Retry: 3\n",
        );
        let config = Config::load(Some(&path));
        assert!(config.strip_param_spaces());
        assert_eq!(config.concurrency(), 4);
        assert_eq!(
            config.default_headers(),
            vec![
                ("X-Token".to_string(), "abc".to_string()),
                ("X-Retry".to_string(), "3".to_string()),
            ]
        );
    }

    #[test]
    fn test_optional_settings_defaults() {
        let config = Config::default();
        assert!(!config.strip_param_spaces());
        assert_eq!(config.concurrency(), 1);
        assert!(config.default_headers().is_empty());
    }
}
