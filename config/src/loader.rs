//! # Environment Variable Loader
//!
//! Loads configuration from environment variables following 12-factor app
//! principles.
//!
//! # Naming Convention
//! All variables use the `PM_` prefix; nested keys are joined with `_`.

use crate::config::ConfigOverrides;
use std::env;
use std::path::PathBuf;

/// Load the configuration keys set through environment variables.
///
/// Unset variables leave the key unset; unparseable values are ignored with
/// a warning. A variable set to its default value still overrides the file.
///
/// ## Environment Variables
/// ### General Settings
/// - `PM_MODE`: Store mode (direct/published)
/// - `PM_MEMORY_FILE_PATH`: Canonical memory document path
/// - `PM_COMPLETED_FILE_PATH`: Canonical completed document path
/// - `PM_SUMMARY_FILE_PATH`: Published summary path
/// - `PM_RULES_DIR`: Rules directory
/// - `PM_SYNC_ON_SAVE`: Publish on save (true/false)
///
/// ### History Settings
/// - `PM_HISTORY_ENABLED`: Capture snapshots (true/false)
/// - `PM_HISTORY_MAX_ENTRIES`: Retention count
/// - `PM_HISTORY_DIR`: Snapshot directory
///
/// ### Global Memory Settings
/// - `PM_GLOBAL_MEMORY_ENABLED`: Offer global memory (true/false)
/// - `PM_GLOBAL_MEMORY_ROOT`: Directory holding the global document
///
/// ### Observability Settings
/// - `PM_LOG_LEVEL`: Logging level (trace/debug/info/warn/error)
pub fn load_from_env() -> Result<ConfigOverrides, Box<dyn std::error::Error>> {
    Ok(ConfigOverrides {
        mode: env::var("PM_MODE").ok(),
        memory_file_path: env::var("PM_MEMORY_FILE_PATH").ok(),
        completed_file_path: env::var("PM_COMPLETED_FILE_PATH").ok(),
        summary_file_path: env::var("PM_SUMMARY_FILE_PATH").ok(),
        rules_dir: env::var("PM_RULES_DIR").ok(),
        sync_on_save: parse_bool_env("PM_SYNC_ON_SAVE"),
        history_enabled: parse_bool_env("PM_HISTORY_ENABLED"),
        history_max_entries: parse_env("PM_HISTORY_MAX_ENTRIES"),
        history_dir: env::var("PM_HISTORY_DIR").ok(),
        global_memory_enabled: parse_bool_env("PM_GLOBAL_MEMORY_ENABLED"),
        global_memory_root: env::var("PM_GLOBAL_MEMORY_ROOT").ok().map(PathBuf::from),
        logging_level: env::var("PM_LOG_LEVEL").ok()
    })
}

fn parse_env<T>(key: &str) -> Option<T>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display
{
    let raw = env::var(key).ok()?;
    match raw.trim().parse::<T>() {
        Ok(value) => Some(value),
        Err(e) => {
            tracing::warn!("Ignoring unparseable {}={}: {}", key, raw, e);
            None
        }
    }
}

/// Accepts `true/false`, `1/0`, `yes/no` and `on/off`, case-insensitively.
fn parse_bool_env(key: &str) -> Option<bool> {
    let raw = env::var(key).ok()?;
    match raw.trim().to_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Some(true),
        "false" | "0" | "no" | "off" => Some(false),
        other => {
            tracing::warn!("Ignoring unrecognized boolean {}={}", key, other);
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    const VARS: &[&str] = &[
        "PM_MODE",
        "PM_MEMORY_FILE_PATH",
        "PM_COMPLETED_FILE_PATH",
        "PM_SUMMARY_FILE_PATH",
        "PM_RULES_DIR",
        "PM_SYNC_ON_SAVE",
        "PM_HISTORY_ENABLED",
        "PM_HISTORY_MAX_ENTRIES",
        "PM_HISTORY_DIR",
        "PM_GLOBAL_MEMORY_ENABLED",
        "PM_GLOBAL_MEMORY_ROOT",
        "PM_LOG_LEVEL",
    ];

    fn clear_env() {
        for var in VARS {
            unsafe {
                env::remove_var(var);
            }
        }
    }

    #[test]
    #[serial]
    fn test_load_from_env_unset_is_empty() {
        clear_env();
        let overrides = load_from_env().unwrap();
        assert!(overrides.is_empty());
    }

    #[test]
    #[serial]
    fn test_load_from_env_overrides() {
        clear_env();
        unsafe {
            env::set_var("PM_MODE", "published");
            env::set_var("PM_MEMORY_FILE_PATH", "MEMORY.md");
            env::set_var("PM_SYNC_ON_SAVE", "yes");
            env::set_var("PM_HISTORY_ENABLED", "0");
            env::set_var("PM_HISTORY_MAX_ENTRIES", "4");
            env::set_var("PM_GLOBAL_MEMORY_ROOT", "/srv/global");
        }

        let overrides = load_from_env().unwrap();
        assert_eq!(overrides.mode.as_deref(), Some("published"));
        assert_eq!(overrides.memory_file_path.as_deref(), Some("MEMORY.md"));
        assert_eq!(overrides.sync_on_save, Some(true));
        assert_eq!(overrides.history_enabled, Some(false));
        assert_eq!(overrides.history_max_entries, Some(4));
        assert_eq!(
            overrides.global_memory_root,
            Some(PathBuf::from("/srv/global"))
        );
        assert!(overrides.rules_dir.is_none());

        clear_env();
    }

    #[test]
    #[serial]
    fn test_load_from_env_keeps_default_valued_keys() {
        clear_env();
        unsafe {
            env::set_var("PM_SYNC_ON_SAVE", "false");
            env::set_var("PM_HISTORY_ENABLED", "true");
            env::set_var("PM_HISTORY_MAX_ENTRIES", "20");
        }

        let overrides = load_from_env().unwrap();
        assert_eq!(overrides.sync_on_save, Some(false));
        assert_eq!(overrides.history_enabled, Some(true));
        assert_eq!(overrides.history_max_entries, Some(20));

        clear_env();
    }

    #[test]
    #[serial]
    fn test_load_from_env_ignores_garbage() {
        clear_env();
        unsafe {
            env::set_var("PM_HISTORY_MAX_ENTRIES", "many");
            env::set_var("PM_SYNC_ON_SAVE", "sometimes");
        }

        let overrides = load_from_env().unwrap();
        assert!(overrides.history_max_entries.is_none());
        assert!(overrides.sync_on_save.is_none());

        clear_env();
    }
}
