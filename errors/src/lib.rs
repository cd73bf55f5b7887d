//! # Project Memory Errors
//!
//! Error taxonomy shared by the project memory crates.
//!
//! Absence of a document or directory is never represented here: stores
//! report it as an empty body. Partial failures are collected into reports by
//! the batch operations that encounter them, so the variants below only cover
//! conditions that stop a single operation.

use thiserror::Error;

/// Document store errors
#[derive(Debug, Error)]
pub enum DocumentError {
    #[error("Invalid document path '{path}': {reason}")]
    InvalidPath { path: String, reason: String },

    #[error("I/O error on '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error
    }
}

impl DocumentError {
    pub fn io(path: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source
        }
    }

    pub fn invalid_path(path: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidPath {
            path: path.into(),
            reason: reason.into()
        }
    }
}

/// Template expansion errors
#[derive(Debug, Error)]
pub enum TemplateError {
    #[error("Unknown template: {id}")]
    UnknownTemplate { id: String },

    #[error(transparent)]
    Document(#[from] DocumentError)
}

/// History ledger errors
#[derive(Debug, Error)]
pub enum HistoryError {
    #[error("Snapshot not found: {id}")]
    SnapshotNotFound { id: String },

    #[error(transparent)]
    Document(#[from] DocumentError)
}

/// Workspace discovery errors
#[derive(Debug, Error)]
pub enum WorkspaceError {
    #[error("No workspace found from {searched_from}")]
    NotFound { searched_from: String },

    #[error("Workspace path is not a directory: {path}")]
    NotADirectory { path: String },

    #[error("No global storage directory could be determined")]
    NoGlobalRoot
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_document_error_display_names_path() {
        let err = DocumentError::invalid_path("../x.md", "parent segments are not allowed");
        assert_eq!(
            err.to_string(),
            "Invalid document path '../x.md': parent segments are not allowed"
        );
    }

    #[test]
    fn test_history_error_wraps_document_error() {
        let err: HistoryError =
            DocumentError::invalid_path("/abs.md", "absolute paths are not allowed").into();
        assert!(matches!(err, HistoryError::Document(DocumentError::InvalidPath { .. })));
        assert_eq!(
            err.to_string(),
            "Invalid document path '/abs.md': absolute paths are not allowed"
        );
    }
}
