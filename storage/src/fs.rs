use async_trait::async_trait;
use errors::DocumentError;
use pm_core::{DocumentPath, DocumentStore};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Documents stored as UTF-8 files under a root directory.
#[derive(Debug, Clone)]
pub struct FsDocumentStore {
    root: PathBuf
}

impl FsDocumentStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn resolve(&self, path: &DocumentPath) -> PathBuf {
        path.segments()
            .fold(self.root.clone(), |acc, segment| acc.join(segment))
    }

    /// Creates the root if needed, then each missing ancestor one segment at
    /// a time. A segment that already exists (possibly created concurrently)
    /// is not an error.
    async fn create_parents(&self, path: &DocumentPath) -> Result<(), DocumentError> {
        tokio::fs::create_dir_all(&self.root)
            .await
            .map_err(|e| DocumentError::io(self.root.display().to_string(), e))?;

        let Some(parent) = path.parent() else {
            return Ok(());
        };

        let mut current = self.root.clone();
        for segment in parent.segments() {
            current.push(segment);
            match tokio::fs::create_dir(&current).await {
                Ok(()) => debug!("Created directory {}", current.display()),
                Err(e) if e.kind() == ErrorKind::AlreadyExists => {}
                Err(e) => return Err(DocumentError::io(current.display().to_string(), e))
            }
        }
        Ok(())
    }
}

#[async_trait]
impl DocumentStore for FsDocumentStore {
    async fn try_read(&self, path: &DocumentPath) -> Result<Option<String>, DocumentError> {
        let full = self.resolve(path);
        match tokio::fs::read_to_string(&full).await {
            Ok(body) => Ok(Some(body)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(DocumentError::io(full.display().to_string(), e))
        }
    }

    async fn write(&self, path: &DocumentPath, text: &str) -> Result<(), DocumentError> {
        self.create_parents(path).await?;
        let full = self.resolve(path);
        tokio::fs::write(&full, text)
            .await
            .map_err(|e| DocumentError::io(full.display().to_string(), e))
    }

    async fn exists(&self, path: &DocumentPath) -> bool {
        tokio::fs::try_exists(self.resolve(path))
            .await
            .unwrap_or(false)
    }

    async fn list(&self, dir: &DocumentPath) -> Result<Vec<String>, DocumentError> {
        let full = self.resolve(dir);
        let mut entries = match tokio::fs::read_dir(&full).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(DocumentError::io(full.display().to_string(), e))
        };

        let mut names = Vec::new();
        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(|e| DocumentError::io(full.display().to_string(), e))?
        {
            let is_file = entry
                .file_type()
                .await
                .map(|t| t.is_file())
                .unwrap_or(false);
            if !is_file {
                continue;
            }
            if let Some(name) = entry.file_name().to_str() {
                names.push(name.to_string());
            }
        }
        names.sort();
        Ok(names)
    }

    async fn delete(&self, path: &DocumentPath) -> Result<(), DocumentError> {
        let full = self.resolve(path);
        match tokio::fs::remove_file(&full).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(DocumentError::io(full.display().to_string(), e))
        }
    }

    fn describe(&self, path: &DocumentPath) -> String {
        self.resolve(path).display().to_string()
    }
}
