//! Everything a command needs: the resolved roots, the effective
//! configuration and a [`ProjectMemory`] wired to the terminal.

use anyhow::Result;
use config::{ConfigOverrides, LoadedConfig, load_layered};
use context::{GlobalRootResolver, ResolvedValue, WorkspaceResolver};
use memory::ProjectMemory;
use std::path::PathBuf;
use std::sync::Arc;
use storage::FsDocumentStore;
use tracing::{debug, warn};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use crate::commands::GlobalArgs;
use crate::host::{DialoguerPicker, LoggingObserver, PrintRevealer, TerminalNotifier};
use crate::ux_error;

pub struct Session {
    pub workspace: Option<ResolvedValue<PathBuf>>,
    pub global_root: Option<ResolvedValue<PathBuf>>,
    pub config_file: Option<PathBuf>,
    pub memory: ProjectMemory,
    global: GlobalArgs
}

impl Session {
    pub fn open(global: &GlobalArgs) -> Result<Self> {
        let workspace = WorkspaceResolver::new()
            .with_explicit(global.workspace.clone())
            .resolve()
            .map_err(|e| {
                ux_error::from_workspace_error(&e).display();
                anyhow::Error::new(e)
            })?;

        let LoadedConfig { config, file } = load(global, workspace.as_ref())?;
        init_tracing(&config.observability.logging_level);

        match &workspace {
            Some(root) => debug!("Workspace {} ({})", root.value.display(), root.source),
            None => debug!("No workspace resolved")
        }

        let global_root = match GlobalRootResolver::new()
            .with_explicit(global.global_root.clone())
            .with_configured(config.global_memory.root.clone())
            .resolve()
        {
            Ok(root) => Some(root),
            Err(e) => {
                warn!("Global memory unavailable: {}", e);
                None
            }
        };

        let mut memory = ProjectMemory::new(config)
            .map_err(ux_error::report)?
            .with_notifier(Arc::new(TerminalNotifier))
            .with_picker(Arc::new(DialoguerPicker::detect()))
            .with_revealer(Arc::new(PrintRevealer))
            .with_observer(Arc::new(LoggingObserver));
        if let Some(root) = &workspace {
            memory = memory.with_workspace(Arc::new(FsDocumentStore::new(root.value.clone())));
        }
        if let Some(root) = &global_root {
            memory = memory.with_global_store(Arc::new(FsDocumentStore::new(root.value.clone())));
        }

        Ok(Self {
            workspace,
            global_root,
            config_file: file,
            memory,
            global: global.clone()
        })
    }

    /// Re-reads every configuration layer and applies the result.
    pub fn reload_config(&mut self) -> Result<()> {
        let LoadedConfig { config, .. } = load(&self.global, self.workspace.as_ref())?;
        self.memory.set_config(config).map_err(ux_error::report)
    }

    pub fn workspace_root(&self) -> Option<&PathBuf> {
        self.workspace.as_ref().map(|root| &root.value)
    }
}

fn load(global: &GlobalArgs, workspace: Option<&ResolvedValue<PathBuf>>) -> Result<LoadedConfig> {
    load_layered(
        workspace.map(|root| root.value.as_path()),
        global.config.as_deref(),
        Some(global.cli_overrides())
    )
    .map_err(|e| {
        ux_error::config_error(&e.to_string()).display();
        anyhow::Error::new(e)
    })
}

/// `RUST_LOG` wins over the configured level. Installing twice is a no-op.
fn init_tracing(level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    let _ = tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr).with_target(false))
        .with(filter)
        .try_init();
}

impl GlobalArgs {
    /// Configuration keys set by command-line flags.
    pub fn cli_overrides(&self) -> ConfigOverrides {
        ConfigOverrides {
            sync_on_save: self.sync_on_save.then_some(true),
            history_enabled: self.no_history.then_some(false),
            history_max_entries: self.max_entries,
            ..ConfigOverrides::default()
        }
    }
}
