//! Workspace and global root discovery.
//!
//! The workspace root is resolved with precedence:
//! 1. Explicit override (`--workspace`)
//! 2. Environment variable (`PROJECT_MEMORY_WORKSPACE`)
//! 3. Nearest ancestor holding a `.cursor/` directory
//! 4. Enclosing git repository work directory
//!
//! The global root is resolved with precedence:
//! 1. Explicit override (`--global-root`)
//! 2. Configuration (`globalMemory.root`)
//! 3. Environment variable (`PROJECT_MEMORY_GLOBAL_DIR`)
//! 4. `<platform data dir>/project-memory`

use std::env;
use std::path::{Path, PathBuf};

use errors::WorkspaceError;
use git2::Repository;
use tracing::{debug, trace};

use crate::types::{ContextSource, ResolvedValue};

/// Environment variable naming the workspace root.
pub const WORKSPACE_ENV: &str = "PROJECT_MEMORY_WORKSPACE";

/// Environment variable naming the global memory root.
pub const GLOBAL_DIR_ENV: &str = "PROJECT_MEMORY_GLOBAL_DIR";

/// Directory whose presence marks a workspace root.
pub const MARKER_DIR: &str = ".cursor";

/// Subdirectory of the platform data directory used for global memory.
pub const GLOBAL_DIR_NAME: &str = "project-memory";

/// Resolves the workspace root from multiple sources with precedence.
///
/// # Example
///
/// ```rust,ignore
/// use context::WorkspaceResolver;
///
/// let workspace = WorkspaceResolver::new().resolve()?;
/// if let Some(root) = workspace {
///     println!("Workspace: {} (from {})", root.value.display(), root.source);
/// }
/// ```
#[derive(Debug, Clone)]
pub struct WorkspaceResolver {
    start_dir: PathBuf,
    explicit: Option<PathBuf>,
    skip_git: bool,
    skip_env: bool,
    max_search_depth: usize,
    /// Never treated as a workspace even when it holds the marker directory.
    excluded: Option<PathBuf>
}

impl Default for WorkspaceResolver {
    fn default() -> Self {
        Self::new()
    }
}

impl WorkspaceResolver {
    /// Create a new resolver starting from current directory.
    #[must_use]
    pub fn new() -> Self {
        Self {
            start_dir: env::current_dir().unwrap_or_else(|_| PathBuf::from(".")),
            explicit: None,
            skip_git: false,
            skip_env: false,
            max_search_depth: 10,
            // The editor keeps its per-user settings in `~/.cursor`.
            excluded: dirs::home_dir()
        }
    }

    /// Create a resolver starting from a specific directory.
    #[must_use]
    pub fn from_dir(dir: impl Into<PathBuf>) -> Self {
        Self {
            start_dir: dir.into(),
            ..Self::new()
        }
    }

    /// Explicit workspace root (highest precedence).
    #[must_use]
    pub fn with_explicit(mut self, root: Option<PathBuf>) -> Self {
        self.explicit = root;
        self
    }

    /// Skip git detection (for testing or non-git environments).
    #[must_use]
    pub fn skip_git(mut self) -> Self {
        self.skip_git = true;
        self
    }

    /// Skip environment variable detection.
    #[must_use]
    pub fn skip_env(mut self) -> Self {
        self.skip_env = true;
        self
    }

    /// Set maximum number of directories inspected for the marker.
    #[must_use]
    pub fn with_max_search_depth(mut self, depth: usize) -> Self {
        self.max_search_depth = depth;
        self
    }

    #[must_use]
    pub fn with_excluded(mut self, dir: Option<PathBuf>) -> Self {
        self.excluded = dir;
        self
    }

    /// Resolve the workspace root. `Ok(None)` means no workspace is open.
    ///
    /// # Errors
    ///
    /// Returns an error if an explicit or environment-supplied root is not an
    /// existing directory.
    pub fn resolve(&self) -> Result<Option<ResolvedValue<PathBuf>>, WorkspaceError> {
        if let Some(explicit) = &self.explicit {
            return require_dir(explicit).map(|p| Some(ResolvedValue::explicit(p)));
        }

        if !self.skip_env
            && let Some(raw) = env::var_os(WORKSPACE_ENV).filter(|v| !v.is_empty())
        {
            let path = require_dir(Path::new(&raw))?;
            return Ok(Some(ResolvedValue::new(
                path,
                ContextSource::EnvVar(WORKSPACE_ENV.to_string())
            )));
        }

        if let Some(root) = self.find_marker_root() {
            let marker = root.join(MARKER_DIR);
            return Ok(Some(ResolvedValue::new(root, ContextSource::MarkerDir(marker))));
        }

        if !self.skip_git
            && let Some(root) = self.find_git_root()
        {
            return Ok(Some(ResolvedValue::new(root, ContextSource::GitRepository)));
        }

        debug!("No workspace found from {:?}", self.start_dir);
        Ok(None)
    }

    /// Like [`resolve`](Self::resolve), but a missing workspace is an error.
    ///
    /// # Errors
    ///
    /// Returns [`WorkspaceError::NotFound`] when no source yields a root.
    pub fn resolve_required(&self) -> Result<ResolvedValue<PathBuf>, WorkspaceError> {
        self.resolve()?.ok_or_else(|| WorkspaceError::NotFound {
            searched_from: self.start_dir.display().to_string()
        })
    }

    /// Walk up from the start directory looking for the marker directory.
    fn find_marker_root(&self) -> Option<PathBuf> {
        let mut current = self.start_dir.clone();
        let mut depth = 0;

        loop {
            let is_excluded = self.excluded.as_deref() == Some(current.as_path());
            if !is_excluded && current.join(MARKER_DIR).is_dir() {
                debug!("Found {} in {:?}", MARKER_DIR, current);
                return Some(current);
            }

            depth += 1;
            if depth >= self.max_search_depth {
                break;
            }

            match current.parent() {
                Some(parent) if parent != current => {
                    current = parent.to_path_buf();
                }
                _ => break
            }
        }

        trace!(
            "No {} found after searching {} levels",
            MARKER_DIR, self.max_search_depth
        );
        None
    }

    /// Find git repository work directory.
    fn find_git_root(&self) -> Option<PathBuf> {
        Repository::discover(&self.start_dir)
            .ok()
            .and_then(|repo| repo.workdir().map(normalize_workdir))
    }
}

/// Resolves the directory holding the global memory document.
#[derive(Debug, Clone, Default)]
pub struct GlobalRootResolver {
    explicit: Option<PathBuf>,
    configured: Option<PathBuf>,
    skip_env: bool
}

impl GlobalRootResolver {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_explicit(mut self, root: Option<PathBuf>) -> Self {
        self.explicit = root;
        self
    }

    /// Root from `globalMemory.root`.
    #[must_use]
    pub fn with_configured(mut self, root: Option<PathBuf>) -> Self {
        self.configured = root;
        self
    }

    #[must_use]
    pub fn skip_env(mut self) -> Self {
        self.skip_env = true;
        self
    }

    /// Resolve the global root. The directory need not exist yet.
    ///
    /// # Errors
    ///
    /// Returns [`WorkspaceError::NoGlobalRoot`] when no source applies and
    /// the platform has no data directory.
    pub fn resolve(&self) -> Result<ResolvedValue<PathBuf>, WorkspaceError> {
        if let Some(explicit) = &self.explicit {
            return Ok(ResolvedValue::explicit(explicit.clone()));
        }

        if let Some(configured) = &self.configured {
            return Ok(ResolvedValue::new(configured.clone(), ContextSource::Config));
        }

        if !self.skip_env
            && let Some(raw) = env::var_os(GLOBAL_DIR_ENV).filter(|v| !v.is_empty())
        {
            return Ok(ResolvedValue::new(
                PathBuf::from(raw),
                ContextSource::EnvVar(GLOBAL_DIR_ENV.to_string())
            ));
        }

        dirs::data_dir()
            .map(|dir| {
                ResolvedValue::new(dir.join(GLOBAL_DIR_NAME), ContextSource::PlatformDataDir)
            })
            .ok_or(WorkspaceError::NoGlobalRoot)
    }
}

fn require_dir(path: &Path) -> Result<PathBuf, WorkspaceError> {
    if path.is_dir() {
        Ok(path.to_path_buf())
    } else {
        Err(WorkspaceError::NotADirectory {
            path: path.display().to_string()
        })
    }
}

/// `workdir()` carries a trailing separator.
fn normalize_workdir(path: &Path) -> PathBuf {
    path.components().collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use std::fs;
    use tempfile::TempDir;

    fn resolver(dir: &Path) -> WorkspaceResolver {
        WorkspaceResolver::from_dir(dir)
            .skip_env()
            .skip_git()
            .with_excluded(None)
    }

    #[test]
    fn test_explicit_root_wins() {
        let temp_dir = TempDir::new().unwrap();
        fs::create_dir_all(temp_dir.path().join(".cursor")).unwrap();
        let other = TempDir::new().unwrap();

        let resolved = resolver(temp_dir.path())
            .with_explicit(Some(other.path().to_path_buf()))
            .resolve()
            .unwrap()
            .unwrap();
        assert_eq!(resolved.value, other.path());
        assert_eq!(resolved.source, ContextSource::Explicit);
    }

    #[test]
    fn test_explicit_root_must_be_directory() {
        let temp_dir = TempDir::new().unwrap();
        let file = temp_dir.path().join("file.txt");
        fs::write(&file, "x").unwrap();

        let result = resolver(temp_dir.path()).with_explicit(Some(file)).resolve();
        assert!(matches!(result, Err(WorkspaceError::NotADirectory { .. })));
    }

    #[test]
    fn test_walks_up_to_marker_directory() {
        let temp_dir = TempDir::new().unwrap();
        fs::create_dir_all(temp_dir.path().join(".cursor/rules")).unwrap();
        let nested = temp_dir.path().join("src/deep/module");
        fs::create_dir_all(&nested).unwrap();

        let resolved = resolver(&nested).resolve().unwrap().unwrap();
        assert_eq!(resolved.value, temp_dir.path());
        assert!(matches!(resolved.source, ContextSource::MarkerDir(_)));
    }

    #[test]
    fn test_search_depth_is_bounded() {
        let temp_dir = TempDir::new().unwrap();
        fs::create_dir_all(temp_dir.path().join(".cursor")).unwrap();
        let nested = temp_dir.path().join("a/b/c");
        fs::create_dir_all(&nested).unwrap();

        let shallow = resolver(&nested).with_max_search_depth(2).resolve().unwrap();
        assert!(shallow.is_none());

        let deep = resolver(&nested).with_max_search_depth(4).resolve().unwrap();
        assert_eq!(deep.unwrap().value, temp_dir.path());
    }

    #[test]
    fn test_excluded_directory_is_skipped() {
        let temp_dir = TempDir::new().unwrap();
        fs::create_dir_all(temp_dir.path().join(".cursor")).unwrap();

        let resolved = resolver(temp_dir.path())
            .with_excluded(Some(temp_dir.path().to_path_buf()))
            .with_max_search_depth(1)
            .resolve()
            .unwrap();
        assert!(resolved.is_none());
    }

    #[test]
    fn test_git_repository_fallback() {
        let temp_dir = TempDir::new().unwrap();
        Repository::init(temp_dir.path()).unwrap();
        let nested = temp_dir.path().join("crates/x");
        fs::create_dir_all(&nested).unwrap();

        let resolved = WorkspaceResolver::from_dir(&nested)
            .skip_env()
            .with_excluded(None)
            .with_max_search_depth(1)
            .resolve()
            .unwrap()
            .unwrap();
        assert_eq!(
            resolved.value.canonicalize().unwrap(),
            temp_dir.path().canonicalize().unwrap()
        );
        assert_eq!(resolved.source, ContextSource::GitRepository);
    }

    #[test]
    fn test_resolve_required_reports_start_dir() {
        let temp_dir = TempDir::new().unwrap();
        let result = resolver(temp_dir.path())
            .with_max_search_depth(1)
            .resolve_required();
        assert!(matches!(result, Err(WorkspaceError::NotFound { .. })));
    }

    #[test]
    #[serial]
    fn test_env_workspace_beats_marker() {
        let temp_dir = TempDir::new().unwrap();
        fs::create_dir_all(temp_dir.path().join(".cursor")).unwrap();
        let other = TempDir::new().unwrap();

        unsafe {
            env::set_var(WORKSPACE_ENV, other.path());
        }
        let resolved = WorkspaceResolver::from_dir(temp_dir.path())
            .skip_git()
            .resolve();
        unsafe {
            env::remove_var(WORKSPACE_ENV);
        }

        let resolved = resolved.unwrap().unwrap();
        assert_eq!(resolved.value, other.path());
        assert_eq!(
            resolved.source,
            ContextSource::EnvVar(WORKSPACE_ENV.to_string())
        );
    }

    #[test]
    #[serial]
    fn test_global_root_precedence() {
        unsafe {
            env::set_var(GLOBAL_DIR_ENV, "/env/global");
        }

        let explicit = GlobalRootResolver::new()
            .with_explicit(Some(PathBuf::from("/cli/global")))
            .with_configured(Some(PathBuf::from("/config/global")))
            .resolve()
            .unwrap();
        let configured = GlobalRootResolver::new()
            .with_configured(Some(PathBuf::from("/config/global")))
            .resolve()
            .unwrap();
        let from_env = GlobalRootResolver::new().resolve().unwrap();

        unsafe {
            env::remove_var(GLOBAL_DIR_ENV);
        }

        assert_eq!(explicit.value, PathBuf::from("/cli/global"));
        assert_eq!(configured.value, PathBuf::from("/config/global"));
        assert_eq!(configured.source, ContextSource::Config);
        assert_eq!(from_env.value, PathBuf::from("/env/global"));
    }

    #[test]
    #[serial]
    fn test_global_root_defaults_to_data_dir() {
        let resolved = GlobalRootResolver::new().skip_env().resolve();
        match dirs::data_dir() {
            Some(dir) => {
                let resolved = resolved.unwrap();
                assert_eq!(resolved.value, dir.join(GLOBAL_DIR_NAME));
                assert_eq!(resolved.source, ContextSource::PlatformDataDir);
            }
            None => assert!(matches!(resolved, Err(WorkspaceError::NoGlobalRoot)))
        }
    }
}
