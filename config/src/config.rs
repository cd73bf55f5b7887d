//! # Configuration Structures
//!
//! This module defines the configuration recognized by the project memory
//! store.
//!
//! All configuration structures:
//! - Use `serde` with camelCase keys (`history.maxEntries`, `syncOnSave`, ...)
//! - Use `validator` for input validation
//! - Fall back to documented defaults for every absent key

use pm_core::RetentionPolicy;
use serde::{Deserialize, Deserializer, Serialize};
use std::path::PathBuf;
use validator::Validate;

/// Default rules directory read by the external rule consumer.
pub const DEFAULT_RULES_DIR: &str = ".cursor/rules";

/// Default history directory, workspace-relative.
pub const DEFAULT_HISTORY_DIR: &str = ".cursor/project-memory-history";

/// Top-level configuration for the project memory store.
///
/// ## Usage
/// ```rust,no_run
/// use config::Config;
///
/// let config = Config::default();
/// assert!(config.history.enabled);
/// assert_eq!(config.history.retention().max_entries(), 20);
/// ```
///
/// ## Fields
/// - `mode`: `direct` (rule files are canonical) or `published` (role files
///   are canonical and the rule file is a generated summary)
/// - `memory_file_path` / `completed_file_path` / `summary_file_path`:
///   overrides for the mode's default locations
/// - `rules_dir`: directory the external rule consumer reads
/// - `sync_on_save`: republish the summary whenever a canonical document is
///   saved
/// - `history`, `global_memory`, `observability`: nested sections
#[derive(Debug, Clone, Serialize, Deserialize, Validate, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    #[serde(default = "default_mode")]
    #[validate(custom(function = "validate_mode"))]
    pub mode: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(custom(function = "validate_relative_path"))]
    pub memory_file_path: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(custom(function = "validate_relative_path"))]
    pub completed_file_path: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(custom(function = "validate_relative_path"))]
    pub summary_file_path: Option<String>,

    #[serde(default = "default_rules_dir")]
    #[validate(custom(function = "validate_relative_path"))]
    pub rules_dir: String,

    #[serde(default)]
    pub sync_on_save: bool,

    #[serde(default)]
    #[validate(nested)]
    pub history: HistoryConfig,

    #[serde(default)]
    #[validate(nested)]
    pub global_memory: GlobalMemoryConfig,

    #[serde(default)]
    #[validate(nested)]
    pub observability: ObservabilityConfig
}

impl Default for Config {
    fn default() -> Self {
        Self {
            mode: default_mode(),
            memory_file_path: None,
            completed_file_path: None,
            summary_file_path: None,
            rules_dir: default_rules_dir(),
            sync_on_save: false,
            history: HistoryConfig::default(),
            global_memory: GlobalMemoryConfig::default(),
            observability: ObservabilityConfig::default()
        }
    }
}

impl Config {
    pub fn is_published_mode(&self) -> bool {
        self.mode == "published"
    }
}

fn default_mode() -> String {
    "direct".to_string()
}

fn default_rules_dir() -> String {
    DEFAULT_RULES_DIR.to_string()
}

fn validate_mode(value: &str) -> Result<(), validator::ValidationError> {
    match value {
        "direct" | "published" => Ok(()),
        _ => Err(validator::ValidationError::new("Invalid store mode"))
    }
}

fn validate_relative_path(value: &str) -> Result<(), validator::ValidationError> {
    if value.trim().is_empty() {
        return Err(validator::ValidationError::new("Path must not be empty"));
    }
    if value.starts_with('/') || value.starts_with('\\') {
        return Err(validator::ValidationError::new(
            "Path must be workspace-relative"
        ));
    }
    if value.split(['/', '\\']).any(|segment| segment == "..") {
        return Err(validator::ValidationError::new(
            "Path must not contain parent segments"
        ));
    }
    Ok(())
}

/// History snapshot configuration.
///
/// ## Fields
/// - `enabled`: Capture a snapshot on every save of the memory document
///   (default: true)
/// - `max_entries`: Snapshots kept after pruning (default: 20; non-positive
///   or unparseable values mean the default)
/// - `dir`: Workspace-relative snapshot directory
#[derive(Debug, Clone, Serialize, Deserialize, Validate, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct HistoryConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,

    #[serde(
        default = "default_max_entries",
        deserialize_with = "deserialize_max_entries"
    )]
    pub max_entries: i64,

    #[serde(default = "default_history_dir")]
    #[validate(custom(function = "validate_relative_path"))]
    pub dir: String
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            max_entries: default_max_entries(),
            dir: default_history_dir()
        }
    }
}

impl HistoryConfig {
    pub fn retention(&self) -> RetentionPolicy {
        RetentionPolicy::from_configured(self.max_entries)
    }
}

fn default_true() -> bool {
    true
}

fn default_max_entries() -> i64 {
    pm_core::DEFAULT_MAX_HISTORY_ENTRIES as i64
}

fn default_history_dir() -> String {
    DEFAULT_HISTORY_DIR.to_string()
}

/// Accepts any value for `maxEntries`; anything that is not an integer
/// becomes the default instead of failing the whole file.
fn deserialize_max_entries<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: Deserializer<'de>
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Lenient {
        Int(i64),
        Float(f64),
        Text(String),
        Other(serde::de::IgnoredAny)
    }

    let value = match Lenient::deserialize(deserializer)? {
        Lenient::Int(n) => n,
        Lenient::Float(f) if f.is_finite() && f.fract() == 0.0 => f as i64,
        Lenient::Text(s) => s.trim().parse().unwrap_or_else(|_| default_max_entries()),
        Lenient::Float(_) | Lenient::Other(_) => default_max_entries()
    };
    Ok(value)
}

/// Global (workspace-independent) memory configuration.
///
/// ## Fields
/// - `enabled`: Offer the global memory document (default: true)
/// - `root`: Directory holding `global-memory.mdc` (default: platform data
///   directory)
#[derive(Debug, Clone, Serialize, Deserialize, Validate, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct GlobalMemoryConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub root: Option<PathBuf>
}

impl Default for GlobalMemoryConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            root: None
        }
    }
}

/// Observability configuration.
///
/// ## Fields
/// - `logging_level`: Log level (default: "info")
#[derive(Debug, Clone, Serialize, Deserialize, Validate, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ObservabilityConfig {
    #[serde(default = "default_logging_level")]
    #[validate(custom(function = "validate_logging_level"))]
    pub logging_level: String
}

fn default_logging_level() -> String {
    "info".to_string()
}

fn validate_logging_level(value: &str) -> Result<(), validator::ValidationError> {
    match value {
        "trace" | "debug" | "info" | "warn" | "error" => Ok(()),
        _ => Err(validator::ValidationError::new("Invalid logging level"))
    }
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            logging_level: default_logging_level()
        }
    }
}

/// Keys supplied by one configuration source.
///
/// Environment variables and command-line flags only name the keys they set;
/// a `None` field leaves the lower layer untouched, while a `Some` field wins
/// even when it equals the default.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConfigOverrides {
    pub mode: Option<String>,
    pub memory_file_path: Option<String>,
    pub completed_file_path: Option<String>,
    pub summary_file_path: Option<String>,
    pub rules_dir: Option<String>,
    pub sync_on_save: Option<bool>,
    pub history_enabled: Option<bool>,
    pub history_max_entries: Option<i64>,
    pub history_dir: Option<String>,
    pub global_memory_enabled: Option<bool>,
    pub global_memory_root: Option<PathBuf>,
    pub logging_level: Option<String>
}

impl ConfigOverrides {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

/// Every key of a complete configuration, as supplied by a file.
impl From<Config> for ConfigOverrides {
    fn from(config: Config) -> Self {
        Self {
            mode: Some(config.mode),
            memory_file_path: config.memory_file_path,
            completed_file_path: config.completed_file_path,
            summary_file_path: config.summary_file_path,
            rules_dir: Some(config.rules_dir),
            sync_on_save: Some(config.sync_on_save),
            history_enabled: Some(config.history.enabled),
            history_max_entries: Some(config.history.max_entries),
            history_dir: Some(config.history.dir),
            global_memory_enabled: Some(config.global_memory.enabled),
            global_memory_root: config.global_memory.root,
            logging_level: Some(config.observability.logging_level)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.mode, "direct");
        assert!(!config.is_published_mode());
        assert_eq!(config.rules_dir, ".cursor/rules");
        assert!(!config.sync_on_save);
        assert!(config.history.enabled);
        assert_eq!(config.history.max_entries, 20);
        assert!(config.global_memory.enabled);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_empty_document_yields_defaults() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_camel_case_keys() {
        let config: Config = toml::from_str(
            r#"
mode = "published"
memoryFilePath = "notes/MEMORY.md"
syncOnSave = true

[history]
maxEntries = 5

[globalMemory]
enabled = false
"#
        )
        .unwrap();
        assert!(config.is_published_mode());
        assert_eq!(config.memory_file_path.as_deref(), Some("notes/MEMORY.md"));
        assert!(config.sync_on_save);
        assert_eq!(config.history.retention().max_entries(), 5);
        assert!(!config.global_memory.enabled);
    }

    #[test]
    fn test_invalid_max_entries_falls_back_to_default() {
        for raw in ["maxEntries = \"lots\"", "maxEntries = 2.5", "maxEntries = [1]"] {
            let config: Config = toml::from_str(&format!("[history]\n{raw}\n")).unwrap();
            assert_eq!(config.history.retention().max_entries(), 20, "{raw}");
        }
    }

    #[test]
    fn test_non_positive_max_entries_uses_default_retention() {
        let config: Config = toml::from_str("[history]\nmaxEntries = -3\n").unwrap();
        assert_eq!(config.history.max_entries, -3);
        assert_eq!(config.history.retention().max_entries(), 20);
    }

    #[test]
    fn test_validate_rejects_bad_mode() {
        let mut config = Config::default();
        config.mode = "mirror".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_escaping_paths() {
        let mut config = Config::default();
        config.memory_file_path = Some("../outside.md".to_string());
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.history.dir = "/tmp/history".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_overrides_from_config_carry_every_key() {
        let overrides = ConfigOverrides::from(Config::default());
        assert_eq!(overrides.mode.as_deref(), Some("direct"));
        assert_eq!(overrides.sync_on_save, Some(false));
        assert_eq!(overrides.history_enabled, Some(true));
        assert_eq!(overrides.history_max_entries, Some(20));
        assert!(overrides.memory_file_path.is_none());
        assert!(ConfigOverrides::default().is_empty());
        assert!(!overrides.is_empty());
    }

    #[test]
    fn test_validate_rejects_bad_logging_level() {
        let mut config = Config::default();
        config.observability.logging_level = "verbose".to_string();
        assert!(config.validate().is_err());
    }
}
