//! Configuration management.
//!
//! Configuration is read from a TOML document. Every section has defaults,
//! so an empty file (or no file at all) yields a usable configuration.
//! Environment variables override individual settings.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Environment variable overriding [`StorageConfig::path`].
pub const ENV_STORE_PATH: &str = "IG_STORE_PATH";

/// Environment variable overriding [`LoggingConfig::level`].
pub const ENV_LOG_LEVEL: &str = "IG_LOG_LEVEL";

/// Main configuration structure.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// Object store configuration.
    #[serde(default)]
    pub storage: StorageConfig,
    /// XML codec configuration.
    #[serde(default)]
    pub xml: XmlConfig,
    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Object store configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StorageConfig {
    /// File the in-memory store is persisted to between runs.
    #[serde(default = "default_store_path")]
    pub path: PathBuf,
    /// Write the store back after every mutating command.
    #[serde(default = "default_true")]
    pub autosave: bool,
    /// Reject saves that would duplicate a unique object name.
    #[serde(default = "default_true")]
    pub enforce_unique_names: bool,
}

/// XML codec configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct XmlConfig {
    /// Number of spaces per indentation level when writing.
    #[serde(default = "default_indent")]
    pub indent: usize,
    /// Write reference classes fully qualified (`sailpoint.object.Identity`).
    #[serde(default = "default_true")]
    pub qualified_class_names: bool,
}

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Default filter directive when `RUST_LOG` is not set.
    #[serde(default = "default_level")]
    pub level: String,
}

fn default_store_path() -> PathBuf {
    PathBuf::from("idgov-store.json")
}

const fn default_true() -> bool {
    true
}

const fn default_indent() -> usize {
    2
}

fn default_level() -> String {
    "info".to_string()
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            path: default_store_path(),
            autosave: true,
            enforce_unique_names: true,
        }
    }
}

impl Default for XmlConfig {
    fn default() -> Self {
        Self {
            indent: default_indent(),
            qualified_class_names: true,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_level(),
        }
    }
}

impl Config {
    /// Parses configuration from a TOML string.
    ///
    /// ## Errors
    ///
    /// Returns `Error::Config` if the document is not valid TOML or has
    /// values of the wrong type.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| Error::Config(format!("failed to parse config: {e}")))
    }

    /// Loads configuration from a file, falling back to defaults when the
    /// file does not exist.
    ///
    /// ## Errors
    ///
    /// Returns `Error::Config` if the file exists but cannot be read or parsed.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("failed to read {}: {e}", path.display())))?;
        Self::from_toml_str(&content)
    }

    /// Serializes the configuration to TOML.
    ///
    /// ## Errors
    ///
    /// Returns `Error::Config` if serialization fails.
    pub fn to_toml_string(&self) -> Result<String> {
        toml::to_string_pretty(self)
            .map_err(|e| Error::Config(format!("failed to serialize config: {e}")))
    }

    /// Applies overrides from the process environment.
    pub fn apply_env(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    /// Applies overrides from an arbitrary lookup function.
    pub fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(path) = lookup(ENV_STORE_PATH).filter(|p| !p.is_empty()) {
            self.storage.path = PathBuf::from(path);
        }
        if let Some(level) = lookup(ENV_LOG_LEVEL).filter(|l| !l.is_empty()) {
            self.logging.level = level;
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    #[test]
    fn empty_document_yields_defaults() {
        let config = Config::from_toml_str("").unwrap();
        assert_eq!(config, Config::default());
        assert!(config.storage.autosave);
        assert_eq!(config.xml.indent, 2);
    }

    #[test]
    fn partial_sections_keep_other_defaults() {
        let config = Config::from_toml_str(
            r#"
            [storage]
            path = "/tmp/objects.json"

            [xml]
            indent = 4
            "#,
        )
        .unwrap();

        assert_eq!(config.storage.path, PathBuf::from("/tmp/objects.json"));
        assert!(config.storage.enforce_unique_names);
        assert_eq!(config.xml.indent, 4);
        assert!(config.xml.qualified_class_names);
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn invalid_document_is_config_error() {
        let err = Config::from_toml_str("[storage]\nautosave = \"often\"").unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn overrides_replace_values() {
        let env: HashMap<&str, &str> =
            HashMap::from([(ENV_STORE_PATH, "/var/lib/ig.json"), (ENV_LOG_LEVEL, "debug")]);
        let mut config = Config::default();
        config.apply_overrides(|key| env.get(key).map(ToString::to_string));

        assert_eq!(config.storage.path, PathBuf::from("/var/lib/ig.json"));
        assert_eq!(config.logging.level, "debug");
    }

    #[test]
    fn missing_file_loads_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load(&dir.path().join("absent.toml")).unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn toml_round_trip() {
        let mut config = Config::default();
        config.logging.level = "warn".to_string();
        let text = config.to_toml_string().unwrap();
        assert_eq!(Config::from_toml_str(&text).unwrap(), config);
    }
}
