use errors::DocumentError;
use pm_core::{DocumentKind, DocumentPath, DocumentStore};
use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, info};

use crate::layout::GLOBAL_MEMORY_FILE;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase", tag = "outcome")]
pub enum GlobalOpen {
    Disabled,
    Opened { location: String, body: String, created: bool }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase", tag = "outcome")]
pub enum CopyOutcome {
    Disabled,
    /// The global document is absent or blank; nothing was written.
    EmptySource,
    Copied { target: DocumentPath, bytes: usize }
}

/// Workspace-independent memory document and its copy into a workspace.
pub struct GlobalMemoryBridge {
    global_store: Arc<dyn DocumentStore>,
    document: DocumentPath,
    enabled: bool
}

impl GlobalMemoryBridge {
    pub fn new(global_store: Arc<dyn DocumentStore>) -> Result<Self, DocumentError> {
        Ok(Self {
            global_store,
            document: DocumentPath::new(GLOBAL_MEMORY_FILE)?,
            enabled: true
        })
    }

    pub fn with_enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn location(&self) -> String {
        self.global_store.describe(&self.document)
    }

    /// Ensures the default content and returns the body.
    pub async fn open(&self) -> Result<GlobalOpen, DocumentError> {
        if !self.enabled {
            debug!("Global memory disabled");
            return Ok(GlobalOpen::Disabled);
        }

        let created = self
            .global_store
            .ensure_default(&self.document, DocumentKind::Global.default_content())
            .await?;
        if created {
            info!("Created global memory at {}", self.location());
        }

        Ok(GlobalOpen::Opened {
            location: self.location(),
            body: self.global_store.read(&self.document).await,
            created
        })
    }

    /// Replaces `target` in `workspace_store` with the global body verbatim.
    pub async fn copy_into_workspace(
        &self,
        workspace_store: &dyn DocumentStore,
        target: &DocumentPath
    ) -> Result<CopyOutcome, DocumentError> {
        if !self.enabled {
            debug!("Global memory disabled");
            return Ok(CopyOutcome::Disabled);
        }

        let body = self.global_store.read(&self.document).await;
        if body.trim().is_empty() {
            return Ok(CopyOutcome::EmptySource);
        }

        workspace_store.write(target, &body).await?;
        info!("Copied global memory into {}", target);
        Ok(CopyOutcome::Copied {
            target: target.clone(),
            bytes: body.len()
        })
    }
}
