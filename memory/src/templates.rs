use errors::TemplateError;
use pm_core::{
    Clock, DATE_PLACEHOLDER, DocumentKind, DocumentPath, DocumentStore, TemplateDefinition,
    builtin_templates, default_for
};
use std::sync::Arc;
use tracing::{debug, info};

use crate::telemetry::MemoryTelemetry;

/// Result of appending an entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppendedEntry {
    pub template_id: String,
    pub body: String,
    /// Zero-based line to place the cursor on.
    pub reveal_line: usize
}

/// Expands entry templates and appends them to documents.
pub struct TemplateEngine {
    store: Arc<dyn DocumentStore>,
    clock: Arc<dyn Clock>,
    templates: Vec<TemplateDefinition>,
    telemetry: MemoryTelemetry
}

impl TemplateEngine {
    pub fn new(store: Arc<dyn DocumentStore>, clock: Arc<dyn Clock>) -> Self {
        Self {
            store,
            clock,
            templates: builtin_templates(),
            telemetry: MemoryTelemetry::new()
        }
    }

    /// Replace the template set. An empty set keeps the built-ins.
    pub fn with_templates(mut self, templates: Vec<TemplateDefinition>) -> Self {
        if !templates.is_empty() {
            self.templates = templates;
        }
        self
    }

    pub fn templates(&self) -> &[TemplateDefinition] {
        &self.templates
    }

    pub fn find(&self, id: &str) -> Option<&TemplateDefinition> {
        self.templates.iter().find(|t| t.id == id)
    }

    /// Replaces every date placeholder with today's UTC date.
    pub fn expand(&self, template: &TemplateDefinition) -> String {
        let date = utils::format_date(self.clock.now());
        template.body.replace(DATE_PLACEHOLDER, &date)
    }

    /// Appends the expanded template to the end of `doc`.
    ///
    /// With no template id the first template is used. An unknown id fails
    /// before anything is read or written.
    pub async fn append_entry(
        &self,
        doc: &DocumentPath,
        template_id: Option<&str>
    ) -> Result<AppendedEntry, TemplateError> {
        let template = self.resolve(template_id)?;

        let mut body = self.store.read(doc).await;
        if body.trim().is_empty() {
            debug!("Bootstrapping empty document {}", doc);
            body = default_for(DocumentKind::Memory).to_string();
        }
        body.push_str(&self.expand(template));

        self.store.write(doc, &body).await?;
        self.telemetry.record_entry_appended(&template.id);
        info!("Appended '{}' entry to {}", template.id, doc);

        Ok(AppendedEntry {
            template_id: template.id.clone(),
            reveal_line: utils::last_line_index(&body),
            body
        })
    }

    fn resolve(&self, template_id: Option<&str>) -> Result<&TemplateDefinition, TemplateError> {
        match template_id {
            Some(id) => self.find(id).ok_or_else(|| TemplateError::UnknownTemplate {
                id: id.to_string()
            }),
            None => self
                .templates
                .first()
                .ok_or_else(|| TemplateError::UnknownTemplate {
                    id: String::new()
                })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use storage::InMemoryDocumentStore;
    use testing::{FlakyStore, ManualClock};

    fn doc() -> DocumentPath {
        DocumentPath::new(".cursor/rules/project-memory.mdc").unwrap()
    }

    fn engine(store: Arc<dyn DocumentStore>) -> TemplateEngine {
        TemplateEngine::new(store, Arc::new(ManualClock::fixed()))
    }

    #[test]
    fn test_expand_replaces_every_placeholder() {
        let engine = engine(Arc::new(InMemoryDocumentStore::new()));
        let template = TemplateDefinition::new("x", "X", "{{date}} and {{date}} {{other}}");
        assert_eq!(engine.expand(&template), "2026-10-16 and 2026-10-16 {{other}}");
    }

    #[tokio::test]
    async fn test_append_to_missing_document_bootstraps_default() {
        let store = Arc::new(InMemoryDocumentStore::new());
        let engine = engine(store.clone());

        let entry = engine.append_entry(&doc(), None).await.unwrap();

        let expected = format!(
            "{}\n## 2026-10-16\n- \n",
            default_for(DocumentKind::Memory)
        );
        assert_eq!(entry.body, expected);
        assert_eq!(entry.template_id, "dated");
        assert_eq!(store.read(&doc()).await, expected);
        assert_eq!(entry.reveal_line, expected.split('\n').count() - 1);
    }

    #[tokio::test]
    async fn test_append_keeps_prior_content_as_prefix() {
        let store = Arc::new(InMemoryDocumentStore::new());
        store.write(&doc(), "# Mine\nnotes").await.unwrap();
        let engine = engine(store.clone());

        let entry = engine.append_entry(&doc(), Some("bugfix")).await.unwrap();
        assert_eq!(
            entry.body,
            "# Mine\nnotes\n## Bugfix: 2026-10-16\n- Issue: \n- Fix: \n"
        );
    }

    #[tokio::test]
    async fn test_unknown_template_writes_nothing() {
        let inner = Arc::new(InMemoryDocumentStore::new());
        let store = Arc::new(FlakyStore::new(inner));
        let engine = engine(store.clone());

        let result = engine.append_entry(&doc(), Some("haiku")).await;
        assert!(matches!(
            result,
            Err(TemplateError::UnknownTemplate { ref id }) if id == "haiku"
        ));
        assert_eq!(store.writes(), 0);
    }

    #[tokio::test]
    async fn test_custom_template_set() {
        let store = Arc::new(InMemoryDocumentStore::new());
        let engine = engine(store).with_templates(vec![TemplateDefinition::new(
            "standup",
            "Standup",
            "\n### {{date}} standup\n"
        )]);

        assert_eq!(engine.templates().len(), 1);
        let entry = engine.append_entry(&doc(), None).await.unwrap();
        assert!(entry.body.ends_with("\n### 2026-10-16 standup\n"));
    }
}
