use async_trait::async_trait;
use dashmap::DashMap;
use errors::DocumentError;
use pm_core::{DocumentPath, DocumentStore};
use std::collections::BTreeSet;

/// Documents kept in a concurrent map keyed by their normalized path.
#[derive(Debug, Default)]
pub struct InMemoryDocumentStore {
    documents: DashMap<String, String>
}

impl InMemoryDocumentStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }
}

#[async_trait]
impl DocumentStore for InMemoryDocumentStore {
    async fn try_read(&self, path: &DocumentPath) -> Result<Option<String>, DocumentError> {
        Ok(self.documents.get(path.as_str()).map(|body| body.clone()))
    }

    async fn write(&self, path: &DocumentPath, text: &str) -> Result<(), DocumentError> {
        self.documents
            .insert(path.as_str().to_string(), text.to_string());
        Ok(())
    }

    async fn exists(&self, path: &DocumentPath) -> bool {
        self.documents.contains_key(path.as_str())
    }

    async fn list(&self, dir: &DocumentPath) -> Result<Vec<String>, DocumentError> {
        let prefix = format!("{}/", dir.as_str());
        let names: BTreeSet<String> = self
            .documents
            .iter()
            .filter_map(|entry| {
                let rest = entry.key().strip_prefix(&prefix)?;
                (!rest.contains('/')).then(|| rest.to_string())
            })
            .collect();
        Ok(names.into_iter().collect())
    }

    async fn delete(&self, path: &DocumentPath) -> Result<(), DocumentError> {
        self.documents.remove(path.as_str());
        Ok(())
    }

    fn describe(&self, path: &DocumentPath) -> String {
        format!("memory:///{}", path.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn doc(path: &str) -> DocumentPath {
        DocumentPath::new(path).unwrap()
    }

    #[tokio::test]
    async fn test_write_then_read() {
        let store = InMemoryDocumentStore::new();
        assert!(store.is_empty());

        store.write(&doc("a/b.md"), "body").await.unwrap();
        assert_eq!(store.read(&doc("a/b.md")).await, "body");
        assert!(store.exists(&doc("a/b.md")).await);
        assert_eq!(store.len(), 1);
    }

    #[tokio::test]
    async fn test_list_only_direct_children() {
        let store = InMemoryDocumentStore::new();
        store.write(&doc("h/2.mdc"), "").await.unwrap();
        store.write(&doc("h/1.mdc"), "").await.unwrap();
        store.write(&doc("h/deep/3.mdc"), "").await.unwrap();
        store.write(&doc("hx/4.mdc"), "").await.unwrap();

        let names = store.list(&doc("h")).await.unwrap();
        assert_eq!(names, vec!["1.mdc".to_string(), "2.mdc".to_string()]);
    }

    #[tokio::test]
    async fn test_delete_and_missing_reads() {
        let store = InMemoryDocumentStore::new();
        store.write(&doc("x.md"), "x").await.unwrap();
        store.delete(&doc("x.md")).await.unwrap();
        store.delete(&doc("x.md")).await.unwrap();

        assert_eq!(store.try_read(&doc("x.md")).await.unwrap(), None);
        assert_eq!(store.read(&doc("x.md")).await, "");
    }
}
