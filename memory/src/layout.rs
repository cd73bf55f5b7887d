//! Where each document lives inside a workspace.
//!
//! In `direct` mode the rule files under the rules directory are canonical
//! and the summary goes to a separate rule file. In `published` mode the
//! role files at the workspace root are canonical and the summary is
//! published as the memory rule file.

use config::Config;
use errors::DocumentError;
use pm_core::{DocumentKind, DocumentPath};
use serde::Serialize;

use crate::error::{ProjectMemoryError, ProjectMemoryResult};

pub const MEMORY_RULE_FILE: &str = "project-memory.mdc";
pub const COMPLETED_RULE_FILE: &str = "project-completed.mdc";
pub const SUMMARY_RULE_FILE: &str = "project-summary.mdc";
pub const GLOBAL_MEMORY_FILE: &str = "global-memory.mdc";
pub const PUBLISHED_MEMORY_FILE: &str = "AI-MEMORY.md";
pub const PUBLISHED_COMPLETED_FILE: &str = "COMPLETED-IMPLEMENTATIONS.md";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum StoreMode {
    Direct,
    Published
}

impl std::fmt::Display for StoreMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StoreMode::Direct => write!(f, "direct"),
            StoreMode::Published => write!(f, "published")
        }
    }
}

/// Resolved workspace-relative locations of every document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkspaceLayout {
    pub mode: StoreMode,
    pub memory: DocumentPath,
    pub completed: DocumentPath,
    pub summary: DocumentPath,
    pub rules_dir: DocumentPath,
    pub history_dir: DocumentPath,
    /// Workspace copy of the global memory document.
    pub global_copy: DocumentPath
}

impl WorkspaceLayout {
    pub fn from_config(config: &Config) -> ProjectMemoryResult<Self> {
        let mode = if config.is_published_mode() {
            StoreMode::Published
        } else {
            StoreMode::Direct
        };
        let rules_dir = DocumentPath::new(&config.rules_dir)?;

        let (memory_default, completed_default, summary_default) = match mode {
            StoreMode::Direct => (
                rules_dir.join(MEMORY_RULE_FILE)?,
                rules_dir.join(COMPLETED_RULE_FILE)?,
                rules_dir.join(SUMMARY_RULE_FILE)?
            ),
            StoreMode::Published => (
                DocumentPath::new(PUBLISHED_MEMORY_FILE)?,
                DocumentPath::new(PUBLISHED_COMPLETED_FILE)?,
                rules_dir.join(MEMORY_RULE_FILE)?
            )
        };

        let layout = Self {
            mode,
            memory: override_or(config.memory_file_path.as_deref(), memory_default)?,
            completed: override_or(config.completed_file_path.as_deref(), completed_default)?,
            summary: override_or(config.summary_file_path.as_deref(), summary_default)?,
            global_copy: rules_dir.join(GLOBAL_MEMORY_FILE)?,
            history_dir: DocumentPath::new(&config.history.dir)?,
            rules_dir
        };
        layout.check_distinct()?;
        Ok(layout)
    }

    /// Canonical document for `kind`; the global kind maps to its
    /// workspace copy.
    pub fn document(&self, kind: DocumentKind) -> &DocumentPath {
        match kind {
            DocumentKind::Memory => &self.memory,
            DocumentKind::Completed => &self.completed,
            DocumentKind::Global => &self.global_copy
        }
    }

    /// Which canonical document `path` is, if any.
    pub fn kind_of(&self, path: &DocumentPath) -> Option<DocumentKind> {
        if *path == self.memory {
            Some(DocumentKind::Memory)
        } else if *path == self.completed {
            Some(DocumentKind::Completed)
        } else {
            None
        }
    }

    pub fn canonical_documents(&self) -> [(DocumentKind, &DocumentPath); 2] {
        [
            (DocumentKind::Memory, &self.memory),
            (DocumentKind::Completed, &self.completed)
        ]
    }

    fn check_distinct(&self) -> ProjectMemoryResult<()> {
        let generated = [("summary", &self.summary), ("global copy", &self.global_copy)];
        for (name, path) in generated {
            if *path == self.memory || *path == self.completed {
                return Err(ProjectMemoryError::InvalidLayout {
                    reason: format!("{name} path {path} collides with a canonical document")
                });
            }
        }
        if self.memory == self.completed {
            return Err(ProjectMemoryError::InvalidLayout {
                reason: format!(
                    "memory and completed documents share the path {}",
                    self.memory
                )
            });
        }
        Ok(())
    }
}

fn override_or(
    configured: Option<&str>,
    default: DocumentPath
) -> Result<DocumentPath, DocumentError> {
    configured.map_or(Ok(default), DocumentPath::new)
}
