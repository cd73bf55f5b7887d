use async_trait::async_trait;
use chrono::{DateTime, Duration, TimeZone, Utc};
use errors::DocumentError;
use parking_lot::Mutex;
use pm_core::{
    ChangeObserver, ChangeReason, Clock, DocumentPath, DocumentStore, Notifier, PickItem, Picker,
    Revealer
};
use std::collections::{HashSet, VecDeque};
use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};
use storage::FsDocumentStore;
use tempfile::TempDir;

/// Clock that only moves when told to.
#[derive(Debug)]
pub struct ManualClock {
    now: Mutex<DateTime<Utc>>
}

impl ManualClock {
    pub fn new(start: DateTime<Utc>) -> Self {
        Self {
            now: Mutex::new(start)
        }
    }

    /// 2026-10-16T12:34:56.789Z
    pub fn fixed() -> Self {
        let start = Utc
            .with_ymd_and_hms(2026, 10, 16, 12, 34, 56)
            .single()
            .unwrap_or_default()
            + Duration::milliseconds(789);
        Self::new(start)
    }

    pub fn advance(&self, by: Duration) {
        *self.now.lock() += by;
    }

    pub fn set(&self, to: DateTime<Utc>) {
        *self.now.lock() = to;
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        *self.now.lock()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notification {
    Info(String),
    Warn(String)
}

#[derive(Debug, Default)]
pub struct RecordingNotifier {
    messages: Mutex<Vec<Notification>>
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn messages(&self) -> Vec<Notification> {
        self.messages.lock().clone()
    }

    pub fn infos(&self) -> Vec<String> {
        self.messages
            .lock()
            .iter()
            .filter_map(|m| match m {
                Notification::Info(text) => Some(text.clone()),
                Notification::Warn(_) => None
            })
            .collect()
    }

    pub fn warnings(&self) -> Vec<String> {
        self.messages
            .lock()
            .iter()
            .filter_map(|m| match m {
                Notification::Warn(text) => Some(text.clone()),
                Notification::Info(_) => None
            })
            .collect()
    }
}

impl Notifier for RecordingNotifier {
    fn info(&self, message: &str) {
        self.messages
            .lock()
            .push(Notification::Info(message.to_string()));
    }

    fn warn(&self, message: &str) {
        self.messages
            .lock()
            .push(Notification::Warn(message.to_string()));
    }
}

/// Picker that replays scripted answers in order; an exhausted script
/// cancels. Every prompt is recorded.
#[derive(Debug, Default)]
pub struct ScriptedPicker {
    answers: Mutex<VecDeque<Option<usize>>>,
    prompts: Mutex<Vec<(String, Vec<PickItem>)>>
}

impl ScriptedPicker {
    pub fn new(answers: impl IntoIterator<Item = Option<usize>>) -> Self {
        Self {
            answers: Mutex::new(answers.into_iter().collect()),
            prompts: Mutex::new(Vec::new())
        }
    }

    pub fn cancelling() -> Self {
        Self::default()
    }

    pub fn prompts(&self) -> Vec<(String, Vec<PickItem>)> {
        self.prompts.lock().clone()
    }
}

#[async_trait]
impl Picker for ScriptedPicker {
    async fn pick(&self, title: &str, items: &[PickItem]) -> Option<usize> {
        self.prompts
            .lock()
            .push((title.to_string(), items.to_vec()));
        self.answers
            .lock()
            .pop_front()
            .flatten()
            .filter(|index| *index < items.len())
    }
}

#[derive(Debug, Default)]
pub struct RecordingRevealer {
    reveals: Mutex<Vec<(String, Option<usize>)>>
}

impl RecordingRevealer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reveals(&self) -> Vec<(String, Option<usize>)> {
        self.reveals.lock().clone()
    }
}

#[async_trait]
impl Revealer for RecordingRevealer {
    async fn reveal(&self, location: &str, line: Option<usize>) {
        self.reveals.lock().push((location.to_string(), line));
    }
}

#[derive(Debug, Default)]
pub struct RecordingObserver {
    reasons: Mutex<Vec<ChangeReason>>
}

impl RecordingObserver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reasons(&self) -> Vec<ChangeReason> {
        self.reasons.lock().clone()
    }

    pub fn count(&self) -> usize {
        self.reasons.lock().len()
    }
}

impl ChangeObserver for RecordingObserver {
    fn invalidate(&self, reason: &ChangeReason) {
        self.reasons.lock().push(*reason);
    }
}

/// Which store operation a fault applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Fault {
    Read,
    Write,
    List,
    Delete
}

/// Wraps a store and fails the configured operations for chosen paths.
pub struct FlakyStore {
    inner: Arc<dyn DocumentStore>,
    faults: Mutex<HashSet<(Fault, String)>>,
    write_count: AtomicU32
}

impl FlakyStore {
    pub fn new(inner: Arc<dyn DocumentStore>) -> Self {
        Self {
            inner,
            faults: Mutex::new(HashSet::new()),
            write_count: AtomicU32::new(0)
        }
    }

    /// Fail `fault` on `path` (normalized logical path) from now on.
    pub fn fail(&self, fault: Fault, path: &str) {
        let key = DocumentPath::new(path)
            .map(String::from)
            .unwrap_or_else(|_| path.to_string());
        self.faults.lock().insert((fault, key));
    }

    pub fn heal(&self) {
        self.faults.lock().clear();
    }

    /// Successful writes since creation.
    pub fn writes(&self) -> u32 {
        self.write_count.load(Ordering::SeqCst)
    }

    fn check(&self, fault: Fault, path: &DocumentPath) -> Result<(), DocumentError> {
        if self
            .faults
            .lock()
            .contains(&(fault, path.as_str().to_string()))
        {
            return Err(DocumentError::io(
                path.as_str(),
                std::io::Error::other(format!("injected {fault:?} failure"))
            ));
        }
        Ok(())
    }
}

#[async_trait]
impl DocumentStore for FlakyStore {
    async fn try_read(&self, path: &DocumentPath) -> Result<Option<String>, DocumentError> {
        self.check(Fault::Read, path)?;
        self.inner.try_read(path).await
    }

    async fn write(&self, path: &DocumentPath, text: &str) -> Result<(), DocumentError> {
        self.check(Fault::Write, path)?;
        self.inner.write(path, text).await?;
        self.write_count.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn exists(&self, path: &DocumentPath) -> bool {
        self.inner.exists(path).await
    }

    async fn list(&self, dir: &DocumentPath) -> Result<Vec<String>, DocumentError> {
        self.check(Fault::List, dir)?;
        self.inner.list(dir).await
    }

    async fn delete(&self, path: &DocumentPath) -> Result<(), DocumentError> {
        self.check(Fault::Delete, path)?;
        self.inner.delete(path).await
    }

    fn describe(&self, path: &DocumentPath) -> String {
        self.inner.describe(path)
    }
}

/// Temporary workspace and global roots with filesystem stores over them.
pub struct TempWorkspace {
    workspace: TempDir,
    global: TempDir
}

impl TempWorkspace {
    /// # Panics
    ///
    /// Panics if the temporary directories cannot be created.
    #[allow(clippy::expect_used)]
    pub fn new() -> Self {
        Self {
            workspace: TempDir::new().expect("create temp workspace"),
            global: TempDir::new().expect("create temp global root")
        }
    }

    pub fn root(&self) -> &Path {
        self.workspace.path()
    }

    pub fn global_root(&self) -> &Path {
        self.global.path()
    }

    pub fn store(&self) -> Arc<FsDocumentStore> {
        Arc::new(FsDocumentStore::new(self.root()))
    }

    pub fn global_store(&self) -> Arc<FsDocumentStore> {
        Arc::new(FsDocumentStore::new(self.global_root()))
    }

    /// Write a workspace file directly, bypassing any store.
    ///
    /// # Panics
    ///
    /// Panics on I/O failure.
    #[allow(clippy::expect_used)]
    pub fn write(&self, relative: &str, body: &str) {
        let path = self.root().join(relative);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).expect("create parent directories");
        }
        std::fs::write(path, body).expect("write workspace file");
    }

    /// Read a workspace file directly; missing files read as empty.
    pub fn read(&self, relative: &str) -> String {
        std::fs::read_to_string(self.root().join(relative)).unwrap_or_default()
    }
}

impl Default for TempWorkspace {
    fn default() -> Self {
        Self::new()
    }
}
