use pm_core::{
    AssimilationCandidate, Clock, DocumentPath, DocumentStore, builtin_candidates, default_for
};
use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::layout::WorkspaceLayout;
use crate::telemetry::MemoryTelemetry;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FailedImport {
    pub source: DocumentPath,
    pub reason: String
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AssimilationReport {
    /// Sources whose block was written, in order.
    pub imported: Vec<DocumentPath>,
    pub skipped_empty: Vec<DocumentPath>,
    pub failed: Vec<FailedImport>
}

/// Merges legacy free-form documents into the canonical documents.
pub struct AssimilationEngine {
    store: Arc<dyn DocumentStore>,
    clock: Arc<dyn Clock>,
    layout: WorkspaceLayout,
    candidates: Vec<AssimilationCandidate>,
    telemetry: MemoryTelemetry
}

impl AssimilationEngine {
    pub fn new(
        store: Arc<dyn DocumentStore>,
        clock: Arc<dyn Clock>,
        layout: WorkspaceLayout
    ) -> Self {
        Self {
            store,
            clock,
            layout,
            candidates: builtin_candidates(),
            telemetry: MemoryTelemetry::new()
        }
    }

    pub fn with_candidates(mut self, candidates: Vec<AssimilationCandidate>) -> Self {
        self.candidates = candidates;
        self
    }

    /// Candidates that exist and are not themselves the target document.
    pub async fn discover(&self) -> Vec<AssimilationCandidate> {
        let mut found = Vec::new();
        for candidate in &self.candidates {
            if candidate.source == *self.layout.document(candidate.target) {
                debug!("Skipping {}: it is the canonical document", candidate.source);
                continue;
            }
            if self.store.exists(&candidate.source).await {
                found.push(candidate.clone());
            }
        }
        found
    }

    /// Appends one labeled block per non-blank candidate. Sources are never
    /// modified and existing canonical content is never truncated.
    pub async fn assimilate(&self, found: &[AssimilationCandidate]) -> AssimilationReport {
        let date = utils::format_date(self.clock.now());
        let mut report = AssimilationReport::default();

        for candidate in found {
            let source = &candidate.source;
            let content = match self.store.try_read(source).await {
                Ok(content) => content.unwrap_or_default(),
                Err(e) => {
                    warn!("Could not read {}: {}", source, e);
                    report.failed.push(FailedImport {
                        source: source.clone(),
                        reason: e.to_string()
                    });
                    continue;
                }
            };
            if content.trim().is_empty() {
                debug!("Skipping empty {}", source);
                report.skipped_empty.push(source.clone());
                continue;
            }

            let target = self.layout.document(candidate.target);
            let mut existing = match self.store.try_read(target).await {
                Ok(Some(body)) if !body.is_empty() => body,
                Ok(_) => default_for(candidate.target).to_string(),
                Err(e) => {
                    warn!("Could not read {} before importing {}: {}", target, source, e);
                    report.failed.push(FailedImport {
                        source: source.clone(),
                        reason: e.to_string()
                    });
                    continue;
                }
            };

            if !existing.ends_with('\n') {
                existing.push('\n');
            }
            existing.push_str(&import_block(source, &date, &content));

            match self.store.write(target, &existing).await {
                Ok(()) => {
                    info!("Imported {} into {}", source, target);
                    report.imported.push(source.clone());
                }
                Err(e) => {
                    warn!("Could not write {} while importing {}: {}", target, source, e);
                    report.failed.push(FailedImport {
                        source: source.clone(),
                        reason: e.to_string()
                    });
                }
            }
        }

        self.telemetry.record_assimilated(report.imported.len());
        report
    }
}

pub fn import_block(source: &DocumentPath, date: &str, content: &str) -> String {
    format!(
        "\n## Imported from {} ({})\n\n{}\n\n",
        source,
        date,
        content.trim()
    )
}
