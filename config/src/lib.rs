//! # Configuration System
//!
//! Configuration management for the project memory store.
//!
//! This crate provides:
//! - The configuration structures (`mode`, document path overrides,
//!   `syncOnSave`, `history.*`, `globalMemory.*`)
//! - Environment variable loading (`PM_*`)
//! - Configuration file loading (TOML/YAML under `.cursor/`)
//! - Configuration precedence (CLI > env > file > defaults)
//! - Configuration validation
//! - Hot reload of the configuration file

pub mod config;
pub mod file_loader;
pub mod hot_reload;
pub mod loader;
pub mod precedence;
pub mod validation;

pub use config::{
    Config, ConfigOverrides, DEFAULT_HISTORY_DIR, DEFAULT_RULES_DIR, GlobalMemoryConfig,
    HistoryConfig, ObservabilityConfig,
};
pub use file_loader::{
    CONFIG_FILE_CANDIDATES, ConfigFileError, find_config_file, load_from_file, load_from_toml,
    load_from_yaml,
};
pub use hot_reload::{ConfigReloadEvent, watch_config};
pub use loader::load_from_env;
pub use precedence::{LoadedConfig, load_layered, merge_configs};
pub use validation::{describe, validate};
pub use validator::Validate;
