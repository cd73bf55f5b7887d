use errors::DocumentError;
use pm_core::{DocumentPath, DocumentStore};
use serde::Serialize;
use std::sync::Arc;
use tracing::info;

use crate::layout::WorkspaceLayout;
use crate::telemetry::MemoryTelemetry;

const EMPTY_SECTION: &str = "_No content yet._";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PublishedSummary {
    pub path: DocumentPath,
    pub content: String,
    /// SHA-256 of `content`, hex encoded.
    pub hash: String
}

/// Rebuilds the generated summary rule from the canonical documents.
pub struct SummaryPublisher {
    store: Arc<dyn DocumentStore>,
    layout: WorkspaceLayout,
    telemetry: MemoryTelemetry
}

impl SummaryPublisher {
    pub fn new(store: Arc<dyn DocumentStore>, layout: WorkspaceLayout) -> Self {
        Self {
            store,
            layout,
            telemetry: MemoryTelemetry::new()
        }
    }

    /// Reads both documents fresh and replaces the summary in full.
    pub async fn publish(&self) -> Result<PublishedSummary, DocumentError> {
        let memory = self.store.read(&self.layout.memory).await;
        let completed = self.store.read(&self.layout.completed).await;
        let content = render(&memory, &completed);

        self.store.write(&self.layout.summary, &content).await?;
        self.telemetry.record_publish();
        info!("Published summary to {}", self.layout.summary);

        Ok(PublishedSummary {
            path: self.layout.summary.clone(),
            hash: utils::compute_content_hash(&content),
            content
        })
    }
}

/// The summary document for the given bodies. Pure.
pub fn render(memory: &str, completed: &str) -> String {
    format!(
        "---\n\
         description: Project memory summary (generated, do not edit)\n\
         alwaysApply: true\n\
         ---\n\
         # Project Memory\n\
         \n\
         Generated from the active memory and completed implementation documents.\n\
         \n\
         ## Active memory\n\
         \n\
         {}\n\
         \n\
         ## Completed implementations\n\
         \n\
         {}\n",
        section(memory),
        section(completed)
    )
}

fn section(body: &str) -> &str {
    let trimmed = body.trim();
    if trimmed.is_empty() { EMPTY_SECTION } else { trimmed }
}
