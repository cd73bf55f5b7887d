//! # Project Memory
//!
//! Engine for the workspace-scoped memory documents: templated entries,
//! snapshot history with retention, import of legacy documents, the
//! published summary and the global memory document.
//!
//! [`ProjectMemory`] is the facade hosts call. The components it composes
//! are usable on their own against any [`pm_core::DocumentStore`].

pub mod assimilation;
pub mod error;
pub mod global;
pub mod history;
pub mod layout;
pub mod manager;
pub mod summary;
pub mod telemetry;
pub mod templates;
pub mod watcher;

pub use assimilation::{AssimilationEngine, AssimilationReport, FailedImport};
pub use error::{ProjectMemoryError, ProjectMemoryResult};
pub use global::{CopyOutcome, GlobalMemoryBridge, GlobalOpen};
pub use history::{HistoryEntry, HistoryLedger, PruneReport, SnapshotTaken};
pub use layout::{StoreMode, WorkspaceLayout};
pub use manager::{
    DocumentStatus, GlobalStatus, HistoryStatus, NO_WORKSPACE_MESSAGE, ProjectMemory,
    RestoreOutcome, SaveOutcome, StatusReport
};
pub use summary::{PublishedSummary, SummaryPublisher};
pub use telemetry::MemoryTelemetry;
pub use templates::{AppendedEntry, TemplateEngine};
pub use watcher::{DocumentSaved, DocumentWatcher};
