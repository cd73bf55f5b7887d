use colored::Colorize;
use errors::{DocumentError, HistoryError, TemplateError, WorkspaceError};
use memory::ProjectMemoryError;

#[derive(Debug)]
pub struct UxError {
    pub what: String,
    pub why: Option<String>,
    pub how_to_fix: Vec<String>,
    pub suggested_command: Option<String>
}

impl UxError {
    pub fn new(what: impl Into<String>) -> Self {
        Self {
            what: what.into(),
            why: None,
            how_to_fix: Vec::new(),
            suggested_command: None
        }
    }

    pub fn why(mut self, reason: impl Into<String>) -> Self {
        self.why = Some(reason.into());
        self
    }

    pub fn fix(mut self, suggestion: impl Into<String>) -> Self {
        self.how_to_fix.push(suggestion.into());
        self
    }

    pub fn suggest(mut self, cmd: impl Into<String>) -> Self {
        self.suggested_command = Some(cmd.into());
        self
    }

    pub fn display(&self) {
        eprintln!();
        eprintln!("{} {}", "error:".red().bold(), self.what.white().bold());

        if let Some(why) = &self.why {
            eprintln!("       {}", why.dimmed());
        }

        if !self.how_to_fix.is_empty() {
            eprintln!();
            eprintln!("{}", "How to fix:".yellow().bold());
            for (i, fix) in self.how_to_fix.iter().enumerate() {
                eprintln!("  {}. {}", i + 1, fix);
            }
        }

        if let Some(cmd) = &self.suggested_command {
            eprintln!();
            eprintln!("{}", "Try this:".green().bold());
            eprintln!("  $ {}", cmd.cyan());
        }
        eprintln!();
    }
}

impl std::fmt::Display for UxError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.what)
    }
}

impl std::error::Error for UxError {}

pub fn no_workspace() -> UxError {
    UxError::new("No workspace folder open.")
        .why("No .cursor directory or git repository was found above the current directory")
        .fix("Run the command inside your project")
        .fix("Or pass --workspace <dir> (or set PROJECT_MEMORY_WORKSPACE)")
        .suggest("project-memory init")
}

pub fn workspace_not_a_directory(path: &str) -> UxError {
    UxError::new(format!("Workspace is not a directory: {}", path))
        .why("The explicit workspace must be an existing directory")
        .fix("Check the --workspace value or PROJECT_MEMORY_WORKSPACE")
}

pub fn no_global_root() -> UxError {
    UxError::new("No global memory directory available")
        .why("The platform data directory could not be determined")
        .fix("Pass --global-root <dir>")
        .fix("Or set globalMemory.root in the configuration file")
        .suggest("project-memory --global-root ~/.project-memory global open")
}

pub fn config_error(message: &str) -> UxError {
    UxError::new(format!("Configuration error: {}", message))
        .why("The configuration file or PM_* environment variables hold invalid values")
        .fix("Check .cursor/project-memory.toml")
        .fix("Re-initialize with defaults")
        .suggest("project-memory init --force")
}

pub fn unknown_template(id: &str) -> UxError {
    UxError::new(format!("Unknown template: '{}'", id))
        .why("Entries can only be appended from a known template")
        .fix("Pick one of the listed template ids")
        .suggest("project-memory templates")
}

pub fn snapshot_not_found(id: &str) -> UxError {
    UxError::new(format!("Snapshot not found: {}", id))
        .why("The snapshot id doesn't exist or has been pruned")
        .fix("List the available snapshots")
        .fix("Raise history.maxEntries to keep more snapshots")
        .suggest("project-memory history")
}

pub fn invalid_layout(reason: &str) -> UxError {
    UxError::new(format!("Invalid document layout: {}", reason))
        .why("Each document role needs its own path")
        .fix("Change memoryFilePath, completedFilePath or summaryFilePath")
}

pub fn document_error(err: &DocumentError) -> UxError {
    match err {
        DocumentError::InvalidPath { path, reason } => {
            UxError::new(format!("Invalid document path: '{}'", path))
                .why(reason.clone())
                .fix("Use a workspace-relative path without '..' segments")
        }
        DocumentError::Io { path, source } => UxError::new(format!("Cannot access {}", path))
            .why(source.to_string())
            .fix("Check the file permissions")
            .fix("Make sure the directory is writable")
    }
}

pub fn from_memory_error(err: &ProjectMemoryError) -> UxError {
    match err {
        ProjectMemoryError::NoWorkspace => no_workspace(),
        ProjectMemoryError::Document(e)
        | ProjectMemoryError::Template(TemplateError::Document(e))
        | ProjectMemoryError::History(HistoryError::Document(e)) => document_error(e),
        ProjectMemoryError::Template(TemplateError::UnknownTemplate { id }) => unknown_template(id),
        ProjectMemoryError::History(HistoryError::SnapshotNotFound { id }) => snapshot_not_found(id),
        ProjectMemoryError::Workspace(e) => from_workspace_error(e),
        ProjectMemoryError::InvalidLayout { reason } => invalid_layout(reason)
    }
}

pub fn from_workspace_error(err: &WorkspaceError) -> UxError {
    match err {
        WorkspaceError::NotFound { .. } => no_workspace(),
        WorkspaceError::NotADirectory { path } => workspace_not_a_directory(path),
        WorkspaceError::NoGlobalRoot => no_global_root()
    }
}

/// Displays the error with its fix and converts it for `?`.
pub fn report(err: ProjectMemoryError) -> anyhow::Error {
    from_memory_error(&err).display();
    anyhow::Error::new(err)
}
