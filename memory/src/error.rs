use errors::{DocumentError, HistoryError, TemplateError, WorkspaceError};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ProjectMemoryError {
    #[error("No workspace folder open.")]
    NoWorkspace,

    #[error(transparent)]
    Document(#[from] DocumentError),

    #[error(transparent)]
    Template(#[from] TemplateError),

    #[error(transparent)]
    History(#[from] HistoryError),

    #[error(transparent)]
    Workspace(#[from] WorkspaceError),

    #[error("Invalid layout: {reason}")]
    InvalidLayout { reason: String }
}

impl ProjectMemoryError {
    /// Whether the operation stopped before touching any document.
    pub fn is_precondition(&self) -> bool {
        matches!(
            self,
            ProjectMemoryError::NoWorkspace
                | ProjectMemoryError::Workspace(_)
                | ProjectMemoryError::InvalidLayout { .. }
                | ProjectMemoryError::Template(TemplateError::UnknownTemplate { .. })
                | ProjectMemoryError::History(HistoryError::SnapshotNotFound { .. })
        )
    }
}

pub type ProjectMemoryResult<T> = Result<T, ProjectMemoryError>;
