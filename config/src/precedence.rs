//! # Configuration Precedence
//!
//! Merges configuration from multiple sources with precedence rules.
//!
//! # Precedence Order
//! 1. CLI arguments (highest priority)
//! 2. Environment variables
//! 3. Configuration file
//! 4. Default values (lowest priority)

use crate::config::{Config, ConfigOverrides};
use crate::file_loader::{ConfigFileError, find_config_file, load_from_file};
use crate::loader::load_from_env;
use crate::validation::validate;
use std::path::{Path, PathBuf};

/// Result of [`load_layered`].
#[derive(Debug, Clone, PartialEq)]
pub struct LoadedConfig {
    pub config: Config,
    /// The configuration file that contributed, if any.
    pub file: Option<PathBuf>,
}

/// Load and validate the effective configuration for a workspace.
///
/// The file is `explicit_file` when given, otherwise the first of
/// [`crate::file_loader::CONFIG_FILE_CANDIDATES`] under `workspace_root`.
/// A missing file is not an error; an unparseable or invalid one is.
pub fn load_layered(
    workspace_root: Option<&Path>,
    explicit_file: Option<&Path>,
    cli_overrides: Option<ConfigOverrides>,
) -> Result<LoadedConfig, ConfigFileError> {
    let file = match explicit_file {
        Some(path) => Some(path.to_path_buf()),
        None => workspace_root.and_then(find_config_file),
    };

    let file_config = match &file {
        Some(path) => load_from_file(path)?,
        None => Config::default(),
    };
    let env_overrides =
        load_from_env().map_err(|e| ConfigFileError::Invalid(e.to_string()))?;

    let config = merge_configs(
        Config::default(),
        file_config,
        "file",
        env_overrides,
        "env",
        cli_overrides,
        "cli",
    );
    validate(&config).map_err(|problems| ConfigFileError::Invalid(problems.join("; ")))?;

    Ok(LoadedConfig { config, file })
}

/// Merge multiple configuration sources with precedence.
///
/// ## Usage
/// ```rust,no_run
/// use config::{Config, merge_configs, load_from_file, load_from_env};
/// use std::path::Path;
///
/// fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let defaults = Config::default();
///     let from_file = load_from_file(Path::new(".cursor/project-memory.toml"))?;
///     let from_env = load_from_env()?;
///
///     let _config = merge_configs(defaults, from_file, "file", from_env, "env", None, "cli");
///     Ok(())
/// }
/// ```
///
/// ## Merge Rule
/// The file is a complete configuration and replaces the defaults. The env
/// and CLI layers only carry the keys they set; each set key wins over every
/// lower layer, including when it names the default value.
pub fn merge_configs(
    defaults: Config,
    file_config: Config,
    file_source_name: &str,
    env_overrides: ConfigOverrides,
    env_source_name: &str,
    cli_overrides: Option<ConfigOverrides>,
    cli_source_name: &str,
) -> Config {
    let mut config = defaults;

    config = merge_with_logging(config, file_config.into(), file_source_name);
    config = merge_with_logging(config, env_overrides, env_source_name);

    if let Some(cli) = cli_overrides {
        config = merge_with_logging(config, cli, cli_source_name);
    }

    config
}

fn merge_with_logging(mut base: Config, overrides: ConfigOverrides, source_name: &str) -> Config {
    let mut changes = Vec::new();

    merge_field(&mut base.mode, overrides.mode, "mode", &mut changes);
    merge_field(
        &mut base.memory_file_path,
        overrides.memory_file_path.map(Some),
        "memoryFilePath",
        &mut changes,
    );
    merge_field(
        &mut base.completed_file_path,
        overrides.completed_file_path.map(Some),
        "completedFilePath",
        &mut changes,
    );
    merge_field(
        &mut base.summary_file_path,
        overrides.summary_file_path.map(Some),
        "summaryFilePath",
        &mut changes,
    );
    merge_field(&mut base.rules_dir, overrides.rules_dir, "rulesDir", &mut changes);
    merge_field(
        &mut base.sync_on_save,
        overrides.sync_on_save,
        "syncOnSave",
        &mut changes,
    );

    merge_field(
        &mut base.history.enabled,
        overrides.history_enabled,
        "history.enabled",
        &mut changes,
    );
    merge_field(
        &mut base.history.max_entries,
        overrides.history_max_entries,
        "history.maxEntries",
        &mut changes,
    );
    merge_field(
        &mut base.history.dir,
        overrides.history_dir,
        "history.dir",
        &mut changes,
    );

    merge_field(
        &mut base.global_memory.enabled,
        overrides.global_memory_enabled,
        "globalMemory.enabled",
        &mut changes,
    );
    merge_field(
        &mut base.global_memory.root,
        overrides.global_memory_root.map(Some),
        "globalMemory.root",
        &mut changes,
    );

    merge_field(
        &mut base.observability.logging_level,
        overrides.logging_level,
        "observability.loggingLevel",
        &mut changes,
    );

    if !changes.is_empty() {
        tracing::info!("Configuration from {}: {:?}", source_name, changes);
    }

    base
}

fn merge_field<T: PartialEq>(
    base: &mut T,
    candidate: Option<T>,
    key: &str,
    changes: &mut Vec<String>,
) {
    if let Some(value) = candidate {
        if value != *base {
            *base = value;
            changes.push(key.to_string());
        }
    }
}
