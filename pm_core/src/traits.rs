//! Collaborator traits for the project memory store

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use errors::DocumentError;

use crate::types::{ChangeReason, DocumentPath, PickItem};

/// Text document storage rooted at a single namespace.
///
/// Absence is a well-formed empty state: `read` never fails and `list` on a
/// missing directory yields nothing.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Returns `Ok(None)` when the document does not exist.
    async fn try_read(&self, path: &DocumentPath) -> Result<Option<String>, DocumentError>;

    /// Replaces the full body, creating missing ancestor directories.
    async fn write(&self, path: &DocumentPath, text: &str) -> Result<(), DocumentError>;

    async fn exists(&self, path: &DocumentPath) -> bool;

    /// Names of the entries directly under `dir`.
    async fn list(&self, dir: &DocumentPath) -> Result<Vec<String>, DocumentError>;

    /// Deleting an absent document is a no-op.
    async fn delete(&self, path: &DocumentPath) -> Result<(), DocumentError>;

    /// Host-facing location of `path` (filesystem path, URI, ...).
    fn describe(&self, path: &DocumentPath) -> String;

    async fn read(&self, path: &DocumentPath) -> String {
        match self.try_read(path).await {
            Ok(body) => body.unwrap_or_default(),
            Err(e) => {
                tracing::debug!("Treating unreadable document {} as empty: {}", path, e);
                String::new()
            }
        }
    }

    /// Writes `default_text` only when the current body is empty. Returns
    /// whether a write happened.
    async fn ensure_default(
        &self,
        path: &DocumentPath,
        default_text: &str,
    ) -> Result<bool, DocumentError> {
        if self.read(path).await.is_empty() {
            self.write(path, default_text).await?;
            Ok(true)
        } else {
            Ok(false)
        }
    }
}

/// Source of the current instant.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// User-facing notification channel.
pub trait Notifier: Send + Sync {
    fn info(&self, message: &str);
    fn warn(&self, message: &str);
}

/// User-facing single-choice picker. `None` means the user cancelled.
#[async_trait]
pub trait Picker: Send + Sync {
    async fn pick(&self, title: &str, items: &[PickItem]) -> Option<usize>;
}

/// Shows a document to the user with the cursor on `line` (zero-based).
#[async_trait]
pub trait Revealer: Send + Sync {
    async fn reveal(&self, location: &str, line: Option<usize>);
}

/// Notified after every mutating operation so views can rebuild.
pub trait ChangeObserver: Send + Sync {
    fn invalidate(&self, reason: &ChangeReason);
}

/// Notifier that only logs.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingNotifier;

impl Notifier for TracingNotifier {
    fn info(&self, message: &str) {
        tracing::info!("{}", message);
    }

    fn warn(&self, message: &str) {
        tracing::warn!("{}", message);
    }
}

/// Picker for non-interactive hosts; always cancels.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoPicker;

#[async_trait]
impl Picker for NoPicker {
    async fn pick(&self, _title: &str, _items: &[PickItem]) -> Option<usize> {
        None
    }
}

/// Revealer for hosts without an editor.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoReveal;

#[async_trait]
impl Revealer for NoReveal {
    async fn reveal(&self, _location: &str, _line: Option<usize>) {}
}
