//! Append-only snapshot history of the active memory document.
//!
//! Snapshot names are fixed-width UTC timestamps
//! (`YYYY-MM-DDTHH-MM-SS-mmmZ.mdc`), so plain string order is time order.

use chrono::{DateTime, Duration, Utc};
use errors::{DocumentError, HistoryError};
use pm_core::{Clock, DocumentPath, DocumentStore, RetentionPolicy};
use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::telemetry::MemoryTelemetry;

pub const SNAPSHOT_EXTENSION: &str = ".mdc";

const NAME_FORMAT: &str = "%Y-%m-%dT%H-%M-%S-%3fZ";
const LABEL_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.3f UTC";

/// Attempts made to find a free name when several snapshots land in the
/// same millisecond.
const MAX_NAME_ATTEMPTS: i64 = 1000;

/// File name of the snapshot taken at `instant`.
pub fn snapshot_name(instant: DateTime<Utc>) -> String {
    format!("{}{}", instant.format(NAME_FORMAT), SNAPSHOT_EXTENSION)
}

/// Inverse of [`snapshot_name`]; accepts the id with or without extension.
pub fn parse_snapshot_name(name: &str) -> Option<DateTime<Utc>> {
    let stem = name.strip_suffix(SNAPSHOT_EXTENSION).unwrap_or(name);
    let bytes = stem.as_bytes();
    if bytes.len() != 24 || bytes[13] != b'-' || bytes[16] != b'-' || bytes[19] != b'-' {
        return None;
    }

    let mut rfc3339 = stem.to_string();
    rfc3339.replace_range(13..14, ":");
    rfc3339.replace_range(16..17, ":");
    rfc3339.replace_range(19..20, ".");
    DateTime::parse_from_rfc3339(&rfc3339)
        .ok()
        .map(|t| t.with_timezone(&Utc))
}

/// One stored snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryEntry {
    /// Snapshot id (file name without extension).
    pub id: String,
    pub label: String,
    pub taken_at: Option<DateTime<Utc>>,
    pub path: DocumentPath
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PruneReport {
    pub kept: usize,
    pub deleted: Vec<String>,
    pub failed: Vec<String>
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SnapshotTaken {
    pub id: String,
    pub path: DocumentPath,
    pub prune: PruneReport
}

/// Writes snapshots and enforces the retention policy.
pub struct HistoryLedger {
    store: Arc<dyn DocumentStore>,
    clock: Arc<dyn Clock>,
    dir: DocumentPath,
    enabled: bool,
    retention: RetentionPolicy,
    telemetry: MemoryTelemetry
}

impl HistoryLedger {
    pub fn new(store: Arc<dyn DocumentStore>, clock: Arc<dyn Clock>, dir: DocumentPath) -> Self {
        Self {
            store,
            clock,
            dir,
            enabled: true,
            retention: RetentionPolicy::default(),
            telemetry: MemoryTelemetry::new()
        }
    }

    pub fn with_enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    pub fn with_retention(mut self, retention: RetentionPolicy) -> Self {
        self.retention = retention;
        self
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn retention(&self) -> RetentionPolicy {
        self.retention
    }

    pub fn dir(&self) -> &DocumentPath {
        &self.dir
    }

    /// Stores `content` as a new snapshot, then prunes. Returns `None` when
    /// history is disabled.
    pub async fn snapshot(&self, content: &str) -> Result<Option<SnapshotTaken>, HistoryError> {
        if !self.enabled {
            debug!("History disabled, skipping snapshot");
            return Ok(None);
        }

        let name = self.free_name().await?;
        let path = self.dir.join(&name)?;
        self.store.write(&path, content).await?;
        self.telemetry.record_snapshot();
        info!("Saved history snapshot {}", path);

        let prune = self.prune().await;
        Ok(Some(SnapshotTaken {
            id: stem(&name).to_string(),
            path,
            prune
        }))
    }

    /// Deletes the oldest snapshots beyond the retention count.
    ///
    /// A listing failure leaves everything in place. A failed delete is
    /// recorded and the remaining deletions still run.
    pub async fn prune(&self) -> PruneReport {
        let names = match self.snapshot_names().await {
            Ok(names) => names,
            Err(e) => {
                warn!("Could not list history directory {}: {}", self.dir, e);
                return PruneReport::default();
            }
        };

        let max = self.retention.max_entries();
        let mut report = PruneReport {
            kept: names.len().min(max),
            ..PruneReport::default()
        };

        for name in names.iter().skip(max) {
            let result = match self.dir.join(name) {
                Ok(path) => self.store.delete(&path).await,
                Err(e) => Err(e)
            };
            match result {
                Ok(()) => {
                    debug!("Pruned snapshot {}", name);
                    report.deleted.push(name.clone());
                }
                Err(e) => {
                    warn!("Failed to prune snapshot {}: {}", name, e);
                    report.failed.push(name.clone());
                }
            }
        }

        self.telemetry
            .record_pruned(report.deleted.len(), report.failed.len());
        report
    }

    /// Snapshots, most recent first.
    pub async fn list_entries(&self) -> Result<Vec<HistoryEntry>, HistoryError> {
        let names = self.snapshot_names().await?;
        names
            .into_iter()
            .map(|name| -> Result<HistoryEntry, HistoryError> {
                let taken_at = parse_snapshot_name(&name);
                let id = stem(&name).to_string();
                Ok(HistoryEntry {
                    label: taken_at
                        .map(|t| t.format(LABEL_FORMAT).to_string())
                        .unwrap_or_else(|| id.clone()),
                    taken_at,
                    path: self.dir.join(&name)?,
                    id
                })
            })
            .collect()
    }

    pub async fn read(&self, snapshot_id: &str) -> Result<String, HistoryError> {
        let path = self.snapshot_path(snapshot_id)?;
        self.store
            .try_read(&path)
            .await?
            .ok_or_else(|| HistoryError::SnapshotNotFound {
                id: snapshot_id.to_string()
            })
    }

    /// Overwrites `target` with the snapshot content verbatim and returns it.
    pub async fn restore(
        &self,
        snapshot_id: &str,
        target: &DocumentPath
    ) -> Result<String, HistoryError> {
        let content = self.read(snapshot_id).await?;
        self.store.write(target, &content).await?;
        info!("Restored {} from snapshot {}", target, snapshot_id);
        Ok(content)
    }

    /// `.mdc` names in the history directory, sorted descending.
    async fn snapshot_names(&self) -> Result<Vec<String>, DocumentError> {
        let mut names: Vec<String> = self
            .store
            .list(&self.dir)
            .await?
            .into_iter()
            .filter(|name| name.ends_with(SNAPSHOT_EXTENSION))
            .collect();
        names.sort_unstable_by(|a, b| b.cmp(a));
        Ok(names)
    }

    fn snapshot_path(&self, snapshot_id: &str) -> Result<DocumentPath, HistoryError> {
        let not_found = || HistoryError::SnapshotNotFound {
            id: snapshot_id.to_string()
        };
        let stem = stem(snapshot_id);
        if stem.is_empty() || stem.contains(['/', '\\']) {
            return Err(not_found());
        }
        self.dir
            .join(&format!("{stem}{SNAPSHOT_EXTENSION}"))
            .map_err(|_| not_found())
    }

    /// A name for "now" that is not taken yet; same-millisecond collisions
    /// move forward one millisecond at a time so names stay fixed-width and
    /// ordered.
    async fn free_name(&self) -> Result<String, DocumentError> {
        let now = self.clock.now();
        for offset in 0..MAX_NAME_ATTEMPTS {
            let name = snapshot_name(now + Duration::milliseconds(offset));
            if !self.store.exists(&self.dir.join(&name)?).await {
                return Ok(name);
            }
        }
        Ok(snapshot_name(now + Duration::milliseconds(MAX_NAME_ATTEMPTS)))
    }
}

fn stem(name: &str) -> &str {
    name.strip_suffix(SNAPSHOT_EXTENSION).unwrap_or(name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use proptest::prelude::*;
    use storage::InMemoryDocumentStore;
    use testing::{Fault, FlakyStore, ManualClock};

    fn dir() -> DocumentPath {
        DocumentPath::new(".cursor/project-memory-history").unwrap()
    }

    fn ledger(store: Arc<dyn DocumentStore>, clock: Arc<ManualClock>) -> HistoryLedger {
        HistoryLedger::new(store, clock, dir())
    }

    #[test]
    fn test_snapshot_name_format() {
        let clock = ManualClock::fixed();
        assert_eq!(snapshot_name(clock.now()), "2026-10-16T12-34-56-789Z.mdc");
    }

    #[test]
    fn test_parse_snapshot_name_round_trip() {
        let clock = ManualClock::fixed();
        let name = snapshot_name(clock.now());
        assert_eq!(parse_snapshot_name(&name), Some(clock.now()));
        assert_eq!(parse_snapshot_name("notes"), None);
        assert_eq!(parse_snapshot_name("2026-10-16T12:34:56.789Z"), None);
    }

    proptest! {
        #[test]
        fn prop_name_order_matches_time_order(a in 0i64..4_102_444_800_000, b in 0i64..4_102_444_800_000) {
            let ta = Utc.timestamp_millis_opt(a).single().unwrap();
            let tb = Utc.timestamp_millis_opt(b).single().unwrap();
            prop_assert_eq!(snapshot_name(ta).cmp(&snapshot_name(tb)), ta.cmp(&tb));
        }
    }

    #[tokio::test]
    async fn test_disabled_history_writes_nothing() {
        let store = Arc::new(InMemoryDocumentStore::new());
        let ledger = ledger(store.clone(), Arc::new(ManualClock::fixed())).with_enabled(false);

        assert_eq!(ledger.snapshot("content").await.unwrap(), None);
        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn test_retention_keeps_most_recent() {
        let store = Arc::new(InMemoryDocumentStore::new());
        let clock = Arc::new(ManualClock::fixed());
        let ledger =
            ledger(store.clone(), clock.clone()).with_retention(RetentionPolicy::from_configured(3));

        let mut ids = Vec::new();
        for i in 0..5 {
            let taken = ledger.snapshot(&format!("v{i}")).await.unwrap().unwrap();
            ids.push(taken.id);
            clock.advance(Duration::seconds(1));
        }

        let entries = ledger.list_entries().await.unwrap();
        let listed: Vec<_> = entries.iter().map(|e| e.id.clone()).collect();
        assert_eq!(listed, vec![ids[4].clone(), ids[3].clone(), ids[2].clone()]);
        assert_eq!(ledger.read(&ids[4]).await.unwrap(), "v4");
        assert!(matches!(
            ledger.read(&ids[0]).await,
            Err(HistoryError::SnapshotNotFound { .. })
        ));
    }

    #[tokio::test]
    async fn test_same_millisecond_snapshots_get_distinct_names() {
        let store = Arc::new(InMemoryDocumentStore::new());
        let ledger = ledger(store, Arc::new(ManualClock::fixed()));

        let first = ledger.snapshot("a").await.unwrap().unwrap();
        let second = ledger.snapshot("b").await.unwrap().unwrap();
        assert_ne!(first.id, second.id);
        assert!(second.id > first.id);
        assert_eq!(ledger.list_entries().await.unwrap()[0].id, second.id);
    }

    #[tokio::test]
    async fn test_prune_continues_past_failed_delete() {
        let inner = Arc::new(InMemoryDocumentStore::new());
        let store = Arc::new(FlakyStore::new(inner));
        let clock = Arc::new(ManualClock::fixed());
        let writer = ledger(store.clone(), clock.clone());

        let mut ids = Vec::new();
        for i in 0..4 {
            ids.push(writer.snapshot(&format!("v{i}")).await.unwrap().unwrap().id);
            clock.advance(Duration::seconds(1));
        }

        store.fail(
            Fault::Delete,
            &format!("{}/{}.mdc", dir(), ids[1])
        );
        let pruning = ledger(store.clone(), clock).with_retention(RetentionPolicy::from_configured(1));
        let report = pruning.prune().await;

        assert_eq!(report.kept, 1);
        assert_eq!(report.failed, vec![format!("{}.mdc", ids[1])]);
        assert_eq!(
            report.deleted,
            vec![format!("{}.mdc", ids[2]), format!("{}.mdc", ids[0])]
        );
    }

    #[tokio::test]
    async fn test_prune_listing_failure_is_quiet() {
        let inner = Arc::new(InMemoryDocumentStore::new());
        let store = Arc::new(FlakyStore::new(inner));
        store.fail(Fault::List, ".cursor/project-memory-history");

        let ledger = ledger(store, Arc::new(ManualClock::fixed()));
        assert_eq!(ledger.prune().await, PruneReport::default());
    }

    #[tokio::test]
    async fn test_list_ignores_foreign_files_and_labels_entries() {
        let store = Arc::new(InMemoryDocumentStore::new());
        store
            .write(&dir().join("README.md").unwrap(), "not a snapshot")
            .await
            .unwrap();
        let ledger = ledger(store, Arc::new(ManualClock::fixed()));
        ledger.snapshot("content").await.unwrap();

        let entries = ledger.list_entries().await.unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].label, "2026-10-16 12:34:56.789 UTC");
        assert_eq!(entries[0].id, "2026-10-16T12-34-56-789Z");
    }

    #[tokio::test]
    async fn test_restore_overwrites_target_verbatim() {
        let store = Arc::new(InMemoryDocumentStore::new());
        let ledger = ledger(store.clone(), Arc::new(ManualClock::fixed()));
        let target = DocumentPath::new(".cursor/rules/project-memory.mdc").unwrap();

        let taken = ledger.snapshot("  old body\n").await.unwrap().unwrap();
        store.write(&target, "new body").await.unwrap();

        let restored = ledger.restore(&taken.id, &target).await.unwrap();
        assert_eq!(restored, "  old body\n");
        assert_eq!(store.read(&target).await, "  old body\n");
    }

    #[tokio::test]
    async fn test_restore_unknown_or_escaping_id() {
        let store = Arc::new(InMemoryDocumentStore::new());
        let ledger = ledger(store, Arc::new(ManualClock::fixed()));
        let target = DocumentPath::new("x.md").unwrap();

        for id in ["2020-01-01T00-00-00-000Z", "../secrets", ""] {
            assert!(matches!(
                ledger.restore(id, &target).await,
                Err(HistoryError::SnapshotNotFound { .. })
            ));
        }
    }
}
