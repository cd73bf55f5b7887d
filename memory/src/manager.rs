use config::Config;
use pm_core::{
    ChangeObserver, ChangeReason, Clock, DocumentKind, DocumentPath, DocumentStore, NoPicker,
    NoReveal, Notifier, PickItem, Picker, Revealer, SystemClock, TemplateDefinition,
    TracingNotifier, builtin_templates, default_for
};
use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, info};

use crate::assimilation::{AssimilationEngine, AssimilationReport};
use crate::error::{ProjectMemoryError, ProjectMemoryResult};
use crate::global::{CopyOutcome, GlobalMemoryBridge, GlobalOpen};
use crate::history::{HistoryEntry, HistoryLedger, SnapshotTaken};
use crate::layout::{StoreMode, WorkspaceLayout};
use crate::summary::{PublishedSummary, SummaryPublisher};
use crate::templates::{AppendedEntry, TemplateEngine};
use errors::{TemplateError, WorkspaceError};

pub const NO_WORKSPACE_MESSAGE: &str = "No workspace folder open.";

/// What the save handler did.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SaveOutcome {
    /// `None` when the saved path is not a canonical document.
    pub kind: Option<DocumentKind>,
    pub snapshot: Option<SnapshotTaken>,
    pub published: Option<PublishedSummary>
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RestoreOutcome {
    pub snapshot_id: String,
    pub target: DocumentPath,
    /// The snapshot capturing the restored content.
    pub captured: Option<SnapshotTaken>
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentStatus {
    pub role: String,
    pub path: DocumentPath,
    pub location: String,
    pub exists: bool,
    pub bytes: usize
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryStatus {
    pub enabled: bool,
    pub dir: DocumentPath,
    pub snapshots: usize,
    pub max_entries: usize
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GlobalStatus {
    pub enabled: bool,
    pub location: Option<String>
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusReport {
    pub mode: StoreMode,
    pub sync_on_save: bool,
    pub documents: Vec<DocumentStatus>,
    pub history: HistoryStatus,
    pub global: GlobalStatus
}

/// Facade the host calls. Every workspace operation checks for an open
/// workspace first and notifies change observers after it mutates anything.
pub struct ProjectMemory {
    config: Config,
    layout: WorkspaceLayout,
    workspace: Option<Arc<dyn DocumentStore>>,
    global_store: Option<Arc<dyn DocumentStore>>,
    clock: Arc<dyn Clock>,
    notifier: Arc<dyn Notifier>,
    picker: Arc<dyn Picker>,
    revealer: Arc<dyn Revealer>,
    observers: Vec<Arc<dyn ChangeObserver>>,
    templates: Vec<TemplateDefinition>
}

impl ProjectMemory {
    pub fn new(config: Config) -> ProjectMemoryResult<Self> {
        let layout = WorkspaceLayout::from_config(&config)?;
        Ok(Self {
            config,
            layout,
            workspace: None,
            global_store: None,
            clock: Arc::new(SystemClock),
            notifier: Arc::new(TracingNotifier),
            picker: Arc::new(NoPicker),
            revealer: Arc::new(NoReveal),
            observers: Vec::new(),
            templates: builtin_templates()
        })
    }

    /// Store rooted at the workspace. Without one every workspace operation
    /// fails with [`ProjectMemoryError::NoWorkspace`].
    pub fn with_workspace(mut self, store: Arc<dyn DocumentStore>) -> Self {
        self.workspace = Some(store);
        self
    }

    /// Store rooted at the global memory directory.
    pub fn with_global_store(mut self, store: Arc<dyn DocumentStore>) -> Self {
        self.global_store = Some(store);
        self
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn with_notifier(mut self, notifier: Arc<dyn Notifier>) -> Self {
        self.notifier = notifier;
        self
    }

    pub fn with_picker(mut self, picker: Arc<dyn Picker>) -> Self {
        self.picker = picker;
        self
    }

    pub fn with_revealer(mut self, revealer: Arc<dyn Revealer>) -> Self {
        self.revealer = revealer;
        self
    }

    pub fn with_observer(mut self, observer: Arc<dyn ChangeObserver>) -> Self {
        self.observers.push(observer);
        self
    }

    pub fn with_templates(mut self, templates: Vec<TemplateDefinition>) -> Self {
        if !templates.is_empty() {
            self.templates = templates;
        }
        self
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn layout(&self) -> &WorkspaceLayout {
        &self.layout
    }

    pub fn has_workspace(&self) -> bool {
        self.workspace.is_some()
    }

    pub fn templates(&self) -> &[TemplateDefinition] {
        &self.templates
    }

    /// Applies a new configuration, e.g. after the config file changed.
    pub fn set_config(&mut self, config: Config) -> ProjectMemoryResult<()> {
        self.layout = WorkspaceLayout::from_config(&config)?;
        self.config = config;
        info!("Configuration applied (mode: {})", self.layout.mode);
        self.invalidate(ChangeReason::ConfigurationChanged);
        Ok(())
    }

    /// Ensures both canonical documents exist, returning those created.
    pub async fn ensure_documents(&self) -> ProjectMemoryResult<Vec<DocumentPath>> {
        let store = self.workspace()?;
        let mut created = Vec::new();
        for (kind, path) in self.layout.canonical_documents() {
            if store.ensure_default(path, default_for(kind)).await? {
                info!("Created {}", path);
                created.push(path.clone());
            }
        }
        self.invalidate(ChangeReason::DocumentsEnsured);
        Ok(created)
    }

    /// Appends a templated entry to the memory document and reveals it.
    ///
    /// Without a template id the user is asked to pick one; cancelling falls
    /// back to the first template.
    pub async fn add_entry(&self, template_id: Option<&str>) -> ProjectMemoryResult<AppendedEntry> {
        let store = self.workspace()?;
        let engine = self.template_engine(store.clone());

        let chosen = match template_id {
            Some(id) => {
                if engine.find(id).is_none() {
                    return Err(TemplateError::UnknownTemplate { id: id.to_string() }.into());
                }
                Some(id.to_string())
            }
            None => self.pick_template().await
        };

        let memory = &self.layout.memory;
        store
            .ensure_default(memory, default_for(DocumentKind::Memory))
            .await?;
        let entry = engine.append_entry(memory, chosen.as_deref()).await?;

        self.revealer
            .reveal(&store.describe(memory), Some(entry.reveal_line))
            .await;
        self.invalidate(ChangeReason::EntryAppended);
        Ok(entry)
    }

    /// Save handler: snapshots the memory document and, with sync on save,
    /// republishes the summary when a canonical document was saved. Other
    /// paths are ignored.
    pub async fn on_document_saved(
        &self,
        path: &DocumentPath,
        content: &str
    ) -> ProjectMemoryResult<SaveOutcome> {
        let store = self.workspace()?;
        let outcome = self.save_pipeline(store, path, content).await?;
        if outcome.kind.is_some() {
            self.invalidate(ChangeReason::DocumentSaved);
        }
        Ok(outcome)
    }

    /// Snapshot and publish steps of a save, without notifying observers.
    async fn save_pipeline(
        &self,
        store: Arc<dyn DocumentStore>,
        path: &DocumentPath,
        content: &str
    ) -> ProjectMemoryResult<SaveOutcome> {
        let Some(kind) = self.layout.kind_of(path) else {
            debug!("Ignoring save of {}", path);
            return Ok(SaveOutcome::default());
        };

        let mut outcome = SaveOutcome {
            kind: Some(kind),
            ..SaveOutcome::default()
        };

        if kind == DocumentKind::Memory && !content.is_empty() {
            outcome.snapshot = self.history_ledger(store.clone()).snapshot(content).await?;
        }
        if self.config.sync_on_save {
            outcome.published = Some(self.summary_publisher(store).publish().await?);
        }
        Ok(outcome)
    }

    /// Runs the save handler on the current content of a canonical document.
    pub async fn save(&self, kind: DocumentKind) -> ProjectMemoryResult<SaveOutcome> {
        let store = self.workspace()?;
        let path = self.layout.document(kind).clone();
        let content = store.read(&path).await;
        self.on_document_saved(&path, &content).await
    }

    pub async fn history(&self) -> ProjectMemoryResult<Vec<HistoryEntry>> {
        let store = self.workspace()?;
        Ok(self.history_ledger(store).list_entries().await?)
    }

    /// Restores the memory document from a snapshot. The restored content
    /// goes through the save handler, so the restore is itself recorded.
    ///
    /// Returns `None` when there is no history or the user cancelled.
    pub async fn restore(
        &self,
        snapshot_id: Option<&str>
    ) -> ProjectMemoryResult<Option<RestoreOutcome>> {
        let store = self.workspace()?;
        let ledger = self.history_ledger(store.clone());

        let snapshot_id = match snapshot_id {
            Some(id) => id.to_string(),
            None => {
                let entries = ledger.list_entries().await?;
                if entries.is_empty() {
                    self.notifier.info(&format!(
                        "No history yet. Save {} to create history.",
                        self.layout.memory.file_name()
                    ));
                    return Ok(None);
                }
                let items: Vec<PickItem> = entries
                    .iter()
                    .map(|e| PickItem::new(e.label.clone()).with_description(e.id.clone()))
                    .collect();
                let Some(index) = self.picker.pick("Memory History", &items).await else {
                    debug!("Restore cancelled");
                    return Ok(None);
                };
                match entries.get(index) {
                    Some(entry) => entry.id.clone(),
                    None => return Ok(None)
                }
            }
        };

        let target = self.layout.memory.clone();
        let content = ledger.restore(&snapshot_id, &target).await?;
        let saved = self.save_pipeline(store.clone(), &target, &content).await?;

        self.notifier.info("Restored from history.");
        self.revealer.reveal(&store.describe(&target), None).await;
        self.invalidate(ChangeReason::HistoryRestored);

        Ok(Some(RestoreOutcome {
            snapshot_id,
            target,
            captured: saved.snapshot
        }))
    }

    /// Imports legacy documents after confirmation (skipped with
    /// `assume_yes`). Returns `None` when nothing was found or the user
    /// cancelled.
    pub async fn assimilate(
        &self,
        assume_yes: bool
    ) -> ProjectMemoryResult<Option<AssimilationReport>> {
        let store = self.workspace()?;
        let engine = AssimilationEngine::new(store, self.clock.clone(), self.layout.clone());

        let found = engine.discover().await;
        if found.is_empty() {
            self.notifier.info(
                "No existing memory files found at the workspace root (e.g. AI-MEMORY.md, COMPLETED-IMPLEMENTATIONS.md)."
            );
            return Ok(None);
        }

        let sources = found
            .iter()
            .map(|c| c.source.as_str())
            .collect::<Vec<_>>()
            .join(", ");

        if !assume_yes {
            let items = [
                PickItem::new("Import all")
                    .with_description(format!("Merge {sources} into the canonical documents")),
                PickItem::new("Cancel").with_description("Do nothing")
            ];
            let choice = self
                .picker
                .pick("Assimilate existing memory files", &items)
                .await;
            if choice != Some(0) {
                debug!("Assimilation cancelled");
                return Ok(None);
            }
        }

        let report = engine.assimilate(&found).await;
        for failure in &report.failed {
            self.notifier
                .warn(&format!("Could not import {}: {}", failure.source, failure.reason));
        }
        if report.imported.is_empty() {
            self.notifier.info("Nothing imported.");
        } else {
            let imported = report
                .imported
                .iter()
                .map(DocumentPath::as_str)
                .collect::<Vec<_>>()
                .join(", ");
            self.notifier.info(&format!(
                "Imported {imported} into {}.",
                self.layout.rules_dir
            ));
        }

        self.invalidate(ChangeReason::Assimilated);
        Ok(Some(report))
    }

    pub async fn publish(&self) -> ProjectMemoryResult<PublishedSummary> {
        let store = self.workspace()?;
        let summary = self.summary_publisher(store).publish().await?;
        self.notifier
            .info(&format!("Published summary to {}.", summary.path));
        self.invalidate(ChangeReason::SummaryPublished);
        Ok(summary)
    }

    /// Opens the global memory document, creating it with default content.
    /// Needs no workspace.
    pub async fn open_global(&self) -> ProjectMemoryResult<GlobalOpen> {
        if !self.config.global_memory.enabled {
            self.notifier.info("Global memory is disabled.");
            return Ok(GlobalOpen::Disabled);
        }

        let outcome = self.global_bridge()?.open().await?;
        if let GlobalOpen::Opened { location, .. } = &outcome {
            self.revealer.reveal(location, None).await;
        }
        self.invalidate(ChangeReason::GlobalMemoryOpened);
        Ok(outcome)
    }

    /// Copies the global memory document into the workspace rules
    /// directory.
    pub async fn copy_global_into_workspace(&self) -> ProjectMemoryResult<CopyOutcome> {
        if !self.config.global_memory.enabled {
            self.notifier.info("Global memory is disabled.");
            return Ok(CopyOutcome::Disabled);
        }
        let store = self.workspace()?;

        let outcome = self
            .global_bridge()?
            .copy_into_workspace(store.as_ref(), &self.layout.global_copy)
            .await?;
        match &outcome {
            CopyOutcome::EmptySource => self
                .notifier
                .info("Global memory is empty or missing. Open it first to add content."),
            CopyOutcome::Copied { target, .. } => {
                self.notifier
                    .info(&format!("Global memory copied to {target}."));
                self.invalidate(ChangeReason::GlobalMemoryCopied);
            }
            CopyOutcome::Disabled => {}
        }
        Ok(outcome)
    }

    /// Location of the global memory document, if one is configured.
    pub fn global_location(&self) -> Option<String> {
        self.global_bridge().ok().map(|bridge| bridge.location())
    }

    pub async fn status(&self) -> ProjectMemoryResult<StatusReport> {
        let store = self.workspace()?;

        let roles = [
            ("memory", &self.layout.memory),
            ("completed", &self.layout.completed),
            ("summary", &self.layout.summary),
            ("global copy", &self.layout.global_copy)
        ];
        let mut documents = Vec::with_capacity(roles.len());
        for (role, path) in roles {
            let exists = store.exists(path).await;
            let bytes = if exists {
                store.read(path).await.len()
            } else {
                0
            };
            documents.push(DocumentStatus {
                role: role.to_string(),
                path: path.clone(),
                location: store.describe(path),
                exists,
                bytes
            });
        }

        let ledger = self.history_ledger(store);
        let snapshots = ledger.list_entries().await?.len();

        Ok(StatusReport {
            mode: self.layout.mode,
            sync_on_save: self.config.sync_on_save,
            documents,
            history: HistoryStatus {
                enabled: ledger.is_enabled(),
                dir: ledger.dir().clone(),
                snapshots,
                max_entries: ledger.retention().max_entries()
            },
            global: GlobalStatus {
                enabled: self.config.global_memory.enabled,
                location: self
                    .config
                    .global_memory
                    .enabled
                    .then(|| self.global_location())
                    .flatten()
            }
        })
    }

    fn workspace(&self) -> ProjectMemoryResult<Arc<dyn DocumentStore>> {
        match &self.workspace {
            Some(store) => Ok(store.clone()),
            None => {
                debug!("Rejecting workspace operation without a workspace");
                self.notifier.warn(NO_WORKSPACE_MESSAGE);
                Err(ProjectMemoryError::NoWorkspace)
            }
        }
    }

    fn global_bridge(&self) -> ProjectMemoryResult<GlobalMemoryBridge> {
        let store = self
            .global_store
            .clone()
            .ok_or(ProjectMemoryError::Workspace(WorkspaceError::NoGlobalRoot))?;
        Ok(GlobalMemoryBridge::new(store)?.with_enabled(self.config.global_memory.enabled))
    }

    fn template_engine(&self, store: Arc<dyn DocumentStore>) -> TemplateEngine {
        TemplateEngine::new(store, self.clock.clone()).with_templates(self.templates.clone())
    }

    fn history_ledger(&self, store: Arc<dyn DocumentStore>) -> HistoryLedger {
        HistoryLedger::new(store, self.clock.clone(), self.layout.history_dir.clone())
            .with_enabled(self.config.history.enabled)
            .with_retention(self.config.history.retention())
    }

    fn summary_publisher(&self, store: Arc<dyn DocumentStore>) -> SummaryPublisher {
        SummaryPublisher::new(store, self.layout.clone())
    }

    async fn pick_template(&self) -> Option<String> {
        let items: Vec<PickItem> = self
            .templates
            .iter()
            .map(|t| PickItem::new(t.label.clone()).with_description(t.id.clone()))
            .collect();
        let index = self.picker.pick("Add Memory Entry", &items).await?;
        self.templates.get(index).map(|t| t.id.clone())
    }

    fn invalidate(&self, reason: ChangeReason) {
        debug!("Invalidating views: {}", reason);
        for observer in &self.observers {
            observer.invalidate(&reason);
        }
    }
}
