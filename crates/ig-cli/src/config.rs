//! CLI configuration.

use std::path::{Path, PathBuf};

use ig_core::config::{LoggingConfig, StorageConfig, XmlConfig};
use ig_core::Config;
use serde::{Deserialize, Serialize};

use crate::{CliError, CliResult};

/// Name recorded on audit events when no user is configured.
pub const DEFAULT_USER: &str = "spadmin";

/// Keys accepted by `igc config set`.
pub const SETTABLE_KEYS: [&str; 8] = [
    "user",
    "output_format",
    "storage.path",
    "storage.autosave",
    "storage.enforce_unique_names",
    "xml.indent",
    "xml.qualified_class_names",
    "logging.level",
];

/// CLI configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CliConfig {
    /// Name recorded as the source of changes.
    #[serde(default = "default_user")]
    pub user: String,

    /// Output format.
    #[serde(default)]
    pub output_format: OutputFormat,

    /// Object store settings.
    #[serde(default)]
    pub storage: StorageConfig,

    /// XML writer settings.
    #[serde(default)]
    pub xml: XmlConfig,

    /// Logging settings.
    #[serde(default)]
    pub logging: LoggingConfig,
}

fn default_user() -> String {
    DEFAULT_USER.to_string()
}

impl Default for CliConfig {
    fn default() -> Self {
        Self {
            user: default_user(),
            output_format: OutputFormat::default(),
            storage: StorageConfig::default(),
            xml: XmlConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl CliConfig {
    /// Loads configuration from the default file.
    pub fn load() -> CliResult<Self> {
        Self::load_from(&Self::config_path()?)
    }

    /// Loads configuration from `path`, or defaults if it doesn't exist.
    pub fn load_from(path: &Path) -> CliResult<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)?;
        toml::from_str(&content)
            .map_err(|e| CliError::Config(format!("failed to parse {}: {e}", path.display())))
    }

    /// Saves configuration to `path`.
    pub fn save_to(&self, path: &Path) -> CliResult<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = toml::to_string_pretty(self)
            .map_err(|e| CliError::Config(format!("failed to serialize config: {e}")))?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Gets the default configuration file path.
    pub fn config_path() -> CliResult<PathBuf> {
        let home = dirs_next::home_dir()
            .ok_or_else(|| CliError::Config("could not determine home directory".to_string()))?;
        Ok(home.join(".idgov").join("igc.toml"))
    }

    /// Builds the library configuration, with `IG_*` environment
    /// overrides applied.
    #[must_use]
    pub fn core(&self) -> Config {
        let mut config = Config {
            storage: self.storage.clone(),
            xml: self.xml.clone(),
            logging: self.logging.clone(),
        };
        config.apply_env();
        config
    }

    /// Sets one value by dotted key.
    pub fn set(&mut self, key: &str, value: &str) -> CliResult<()> {
        match key {
            "user" => self.user = value.to_string(),
            "output_format" => {
                self.output_format = <OutputFormat as clap::ValueEnum>::from_str(value, true)
                    .map_err(|_| invalid(key, value))?;
            }
            "storage.path" => self.storage.path = PathBuf::from(value),
            "storage.autosave" => self.storage.autosave = parse_bool(key, value)?,
            "storage.enforce_unique_names" => {
                self.storage.enforce_unique_names = parse_bool(key, value)?;
            }
            "xml.indent" => self.xml.indent = value.parse().map_err(|_| invalid(key, value))?,
            "xml.qualified_class_names" => self.xml.qualified_class_names = parse_bool(key, value)?,
            "logging.level" => self.logging.level = value.to_string(),
            _ => {
                return Err(CliError::InvalidArgument(format!(
                    "unknown key '{key}' (expected one of: {})",
                    SETTABLE_KEYS.join(", ")
                )))
            }
        }
        Ok(())
    }
}

fn parse_bool(key: &str, value: &str) -> CliResult<bool> {
    match value.to_ascii_lowercase().as_str() {
        "true" | "yes" | "on" | "1" => Ok(true),
        "false" | "no" | "off" | "0" => Ok(false),
        _ => Err(invalid(key, value)),
    }
}

fn invalid(key: &str, value: &str) -> CliError {
    CliError::InvalidArgument(format!("'{value}' is not a valid value for {key}"))
}

/// Output format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Human-readable tables; single objects as XML.
    #[default]
    Table,
    /// JSON format.
    Json,
    /// Quiet (minimal output).
    Quiet,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = CliConfig::load_from(&dir.path().join("igc.toml")).unwrap();
        assert_eq!(config, CliConfig::default());
        assert_eq!(config.user, "spadmin");
    }

    #[test]
    fn save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("igc.toml");

        let mut config = CliConfig::default();
        config.set("user", "alice").unwrap();
        config.set("output_format", "json").unwrap();
        config.set("storage.path", "/var/lib/idgov/store.json").unwrap();
        config.set("storage.autosave", "no").unwrap();
        config.set("xml.indent", "4").unwrap();
        config.save_to(&path).unwrap();

        let loaded = CliConfig::load_from(&path).unwrap();
        assert_eq!(loaded, config);
        assert_eq!(loaded.output_format, OutputFormat::Json);
        assert!(!loaded.storage.autosave);
        assert_eq!(loaded.xml.indent, 4);
    }

    #[test]
    fn partial_file_keeps_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("igc.toml");
        std::fs::write(&path, "user = \"bob\"\n\n[xml]\nindent = 0\n").unwrap();

        let config = CliConfig::load_from(&path).unwrap();
        assert_eq!(config.user, "bob");
        assert_eq!(config.xml.indent, 0);
        assert!(config.xml.qualified_class_names);
        assert!(config.storage.autosave);
    }

    #[test]
    fn bad_values_are_rejected() {
        let mut config = CliConfig::default();
        assert!(matches!(
            config.set("storage.autosave", "sometimes"),
            Err(CliError::InvalidArgument(_))
        ));
        assert!(config.set("xml.indent", "-1").is_err());
        assert!(config.set("realm", "master").is_err());
        assert_eq!(config, CliConfig::default());
    }
}
