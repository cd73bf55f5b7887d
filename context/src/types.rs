use std::path::PathBuf;

/// Where a resolved value came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContextSource {
    Explicit,
    EnvVar(String),
    Config,
    /// Nearest ancestor holding the marker directory.
    MarkerDir(PathBuf),
    GitRepository,
    PlatformDataDir
}

impl std::fmt::Display for ContextSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ContextSource::Explicit => write!(f, "explicit"),
            ContextSource::EnvVar(name) => write!(f, "env:{name}"),
            ContextSource::Config => write!(f, "config"),
            ContextSource::MarkerDir(path) => write!(f, "marker:{}", path.display()),
            ContextSource::GitRepository => write!(f, "git-repository"),
            ContextSource::PlatformDataDir => write!(f, "platform-data-dir")
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedValue<T> {
    pub value: T,
    pub source: ContextSource
}

impl<T> ResolvedValue<T> {
    pub fn new(value: T, source: ContextSource) -> Self {
        Self { value, source }
    }

    pub fn explicit(value: T) -> Self {
        Self::new(value, ContextSource::Explicit)
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> ResolvedValue<U> {
        ResolvedValue::new(f(self.value), self.source)
    }
}
