use errors::DocumentError;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Placeholder replaced by the current date during template expansion.
pub const DATE_PLACEHOLDER: &str = "{{date}}";

/// Default retention for history snapshots.
pub const DEFAULT_MAX_HISTORY_ENTRIES: usize = 20;

/// Role of a canonical document.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, EnumString, Display,
)]
#[serde(rename_all = "camelCase")]
#[strum(serialize_all = "camelCase")]
pub enum DocumentKind {
    Memory,
    Completed,
    Global,
}

impl DocumentKind {
    pub fn default_content(self) -> &'static str {
        default_for(self)
    }
}

/// Content written the first time a document of `kind` is ensured.
pub fn default_for(kind: DocumentKind) -> &'static str {
    match kind {
        DocumentKind::Memory => {
            "# Project Memory (active)\n\nUse this context for project-specific decisions, patterns, and ongoing work.\n\n"
        }
        DocumentKind::Completed => {
            "# Project Memory (completed implementations)\n\nReference for historical context and proven patterns.\n\n"
        }
        DocumentKind::Global => {
            "# Global Memory (cross-workspace)\n\nSnippets and patterns you want to reuse across projects.\n\n"
        }
    }
}

/// Root-relative logical path of a document or directory.
///
/// Segments are split on `/` and `\`; empty and `.` segments are dropped.
/// Parent (`..`) segments and absolute paths are rejected so a document can
/// never resolve outside its root.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct DocumentPath(String);

impl DocumentPath {
    pub fn new(raw: &str) -> Result<Self, DocumentError> {
        if raw.starts_with('/') || raw.starts_with('\\') || has_drive_prefix(raw) {
            return Err(DocumentError::invalid_path(raw, "absolute paths are not allowed"));
        }

        let mut segments = Vec::new();
        for segment in raw.split(['/', '\\']) {
            match segment {
                "" | "." => {}
                ".." => {
                    return Err(DocumentError::invalid_path(
                        raw,
                        "parent segments are not allowed"
                    ));
                }
                other => segments.push(other),
            }
        }

        if segments.is_empty() {
            return Err(DocumentError::invalid_path(raw, "path is empty"));
        }

        Ok(Self(segments.join("/")))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn segments(&self) -> impl Iterator<Item = &str> {
        self.0.split('/')
    }

    pub fn file_name(&self) -> &str {
        self.0.rsplit('/').next().unwrap_or(&self.0)
    }

    pub fn parent(&self) -> Option<DocumentPath> {
        self.0
            .rsplit_once('/')
            .map(|(parent, _)| DocumentPath(parent.to_string()))
    }

    pub fn join(&self, child: &str) -> Result<DocumentPath, DocumentError> {
        DocumentPath::new(&format!("{}/{}", self.0, child))
    }
}

fn has_drive_prefix(raw: &str) -> bool {
    let bytes = raw.as_bytes();
    bytes.len() >= 2 && bytes[0].is_ascii_alphabetic() && bytes[1] == b':'
}

impl std::fmt::Display for DocumentPath {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for DocumentPath {
    type Err = DocumentError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl TryFrom<String> for DocumentPath {
    type Error = DocumentError;
    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(&value)
    }
}

impl From<DocumentPath> for String {
    fn from(value: DocumentPath) -> Self {
        value.0
    }
}

/// Named entry template. Bodies may contain any number of
/// [`DATE_PLACEHOLDER`] tokens.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TemplateDefinition {
    pub id: String,
    pub label: String,
    pub body: String,
}

impl TemplateDefinition {
    pub fn new(id: impl Into<String>, label: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
            body: body.into(),
        }
    }
}

/// The built-in entry templates. The first one is the fallback when no
/// template is chosen.
pub fn builtin_templates() -> Vec<TemplateDefinition> {
    vec![
        TemplateDefinition::new("dated", "Dated entry", "\n## {{date}}\n- \n"),
        TemplateDefinition::new("bugfix", "Bugfix", "\n## Bugfix: {{date}}\n- Issue: \n- Fix: \n"),
        TemplateDefinition::new(
            "decision",
            "Decision",
            "\n## Decision: {{date}}\n- Context: \n- Decision: \n",
        ),
        TemplateDefinition::new(
            "feature",
            "Feature",
            "\n## Feature: {{date}}\n- What: \n- Notes: \n",
        ),
        TemplateDefinition::new(
            "meeting",
            "Meeting notes",
            "\n## Meeting: {{date}}\n- Attendees: \n- Notes: \n",
        ),
    ]
}

/// A legacy free-form document that can be merged into a canonical document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssimilationCandidate {
    pub source: DocumentPath,
    pub target: DocumentKind,
}

/// Legacy documents probed at the workspace root.
pub fn builtin_candidates() -> Vec<AssimilationCandidate> {
    [
        ("AI-MEMORY.md", DocumentKind::Memory),
        ("COMPLETED-IMPLEMENTATIONS.md", DocumentKind::Completed),
    ]
    .into_iter()
    .map(|(path, target)| AssimilationCandidate {
        source: DocumentPath(path.to_string()),
        target,
    })
    .collect()
}

/// Maximum number of history snapshots kept.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RetentionPolicy(usize);

impl RetentionPolicy {
    /// Non-positive values fall back to the default.
    pub fn from_configured(value: i64) -> Self {
        if value <= 0 {
            Self::default()
        } else {
            Self(usize::try_from(value).unwrap_or(DEFAULT_MAX_HISTORY_ENTRIES))
        }
    }

    pub fn max_entries(self) -> usize {
        self.0
    }
}

impl Default for RetentionPolicy {
    fn default() -> Self {
        Self(DEFAULT_MAX_HISTORY_ENTRIES)
    }
}

/// What a mutating operation changed; passed to change observers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
#[strum(serialize_all = "kebab-case")]
pub enum ChangeReason {
    DocumentsEnsured,
    EntryAppended,
    DocumentSaved,
    HistoryRestored,
    Assimilated,
    SummaryPublished,
    GlobalMemoryOpened,
    GlobalMemoryCopied,
    ConfigurationChanged,
}

/// One choice offered to a picker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PickItem {
    pub label: String,
    pub description: Option<String>,
}

impl PickItem {
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            description: None,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_document_path_normalizes_separators() {
        let path = DocumentPath::new(".cursor\\rules//./project-memory.mdc").unwrap();
        assert_eq!(path.as_str(), ".cursor/rules/project-memory.mdc");
        assert_eq!(
            path.segments().collect::<Vec<_>>(),
            vec![".cursor", "rules", "project-memory.mdc"]
        );
        assert_eq!(path.file_name(), "project-memory.mdc");
        assert_eq!(path.parent().unwrap().as_str(), ".cursor/rules");
    }

    #[test]
    fn test_document_path_rejects_traversal() {
        assert!(DocumentPath::new("../../etc/passwd").is_err());
        assert!(DocumentPath::new("notes/../../x.md").is_err());
        assert!(DocumentPath::new("/etc/passwd").is_err());
        assert!(DocumentPath::new("C:\\Windows").is_err());
        assert!(DocumentPath::new("").is_err());
        assert!(DocumentPath::new("./").is_err());
    }

    #[test]
    fn test_document_path_serde_validates() {
        let ok: DocumentPath = serde_json::from_str("\"a/b.md\"").unwrap();
        assert_eq!(ok.as_str(), "a/b.md");
        assert!(serde_json::from_str::<DocumentPath>("\"../b.md\"").is_err());
    }

    #[test]
    fn test_retention_policy_defaults_non_positive() {
        assert_eq!(RetentionPolicy::from_configured(0).max_entries(), 20);
        assert_eq!(RetentionPolicy::from_configured(-5).max_entries(), 20);
        assert_eq!(RetentionPolicy::from_configured(3).max_entries(), 3);
    }

    #[test]
    fn test_builtin_templates_order_and_placeholder() {
        let templates = builtin_templates();
        let ids: Vec<_> = templates.iter().map(|t| t.id.as_str()).collect();
        assert_eq!(ids, vec!["dated", "bugfix", "decision", "feature", "meeting"]);
        assert!(templates.iter().all(|t| t.body.contains(DATE_PLACEHOLDER)));
    }

    #[test]
    fn test_document_kind_parses_camel_case() {
        assert_eq!("memory".parse::<DocumentKind>().unwrap(), DocumentKind::Memory);
        assert_eq!(DocumentKind::Completed.to_string(), "completed");
    }
}
