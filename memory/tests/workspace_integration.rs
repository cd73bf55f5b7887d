//! End-to-end flows over real filesystem stores.

use chrono::Duration;
use config::Config;
use memory::{DocumentWatcher, ProjectMemory};
use pm_core::{DocumentKind, DocumentPath, default_for};
use std::sync::Arc;
use testing::{ManualClock, RecordingNotifier, TempWorkspace};

const MEMORY: &str = ".cursor/rules/project-memory.mdc";
const HISTORY: &str = ".cursor/project-memory-history";

fn project_memory(ws: &TempWorkspace, config: Config, clock: Arc<ManualClock>) -> ProjectMemory {
    ProjectMemory::new(config)
        .unwrap()
        .with_workspace(ws.store())
        .with_global_store(ws.global_store())
        .with_clock(clock)
        .with_notifier(Arc::new(RecordingNotifier::new()))
}

#[tokio::test]
async fn test_entries_and_history_on_disk() {
    let ws = TempWorkspace::new();
    let clock = Arc::new(ManualClock::fixed());
    let memory = project_memory(&ws, Config::default(), clock.clone());

    memory.ensure_documents().await.unwrap();
    let entry = memory.add_entry(Some("feature")).await.unwrap();
    assert_eq!(ws.read(MEMORY), entry.body);

    memory.save(DocumentKind::Memory).await.unwrap();
    clock.advance(Duration::minutes(1));
    ws.write(MEMORY, "# rewritten\n");
    memory.save(DocumentKind::Memory).await.unwrap();

    let snapshots: Vec<_> = std::fs::read_dir(ws.root().join(HISTORY))
        .unwrap()
        .map(|e| e.unwrap().file_name().into_string().unwrap())
        .collect();
    assert_eq!(snapshots.len(), 2);
    assert!(snapshots.contains(&"2026-10-16T12-34-56-789Z.mdc".to_string()));
    assert!(snapshots.contains(&"2026-10-16T12-35-56-789Z.mdc".to_string()));

    let entries = memory.history().await.unwrap();
    assert_eq!(entries[0].id, "2026-10-16T12-35-56-789Z");
    assert_eq!(entries[1].label, "2026-10-16 12:34:56.789 UTC");
}

#[tokio::test]
async fn test_retention_applies_on_disk() {
    let ws = TempWorkspace::new();
    let clock = Arc::new(ManualClock::fixed());
    let mut config = Config::default();
    config.history.max_entries = 2;
    let memory = project_memory(&ws, config, clock.clone());
    let path = DocumentPath::new(MEMORY).unwrap();

    for round in 0..4 {
        memory
            .on_document_saved(&path, &format!("round {round}"))
            .await
            .unwrap();
        clock.advance(Duration::seconds(1));
    }

    let entries = memory.history().await.unwrap();
    assert_eq!(entries.len(), 2);
    let newest = std::fs::read_to_string(ws.root().join(entries[0].path.as_str())).unwrap();
    assert_eq!(newest, "round 3");
}

#[tokio::test]
async fn test_published_mode_round_trip() {
    let ws = TempWorkspace::new();
    let mut config = Config::default();
    config.mode = "published".to_string();
    config.sync_on_save = true;
    let memory = project_memory(&ws, config, Arc::new(ManualClock::fixed()));

    ws.write("AI-MEMORY.md", "# Notes\n- keep it small\n");
    let path = DocumentPath::new("AI-MEMORY.md").unwrap();
    let outcome = memory
        .on_document_saved(&path, "# Notes\n- keep it small\n")
        .await
        .unwrap();

    assert!(outcome.snapshot.is_some());
    let summary = ws.read(MEMORY);
    assert!(summary.contains("- keep it small"));
    assert!(summary.contains("_No content yet._"));

    // The legacy candidates are the canonical documents here.
    assert_eq!(memory.assimilate(true).await.unwrap(), None);
}

#[tokio::test]
async fn test_global_copy_uses_filesystem_roots() {
    let ws = TempWorkspace::new();
    let memory = project_memory(&ws, Config::default(), Arc::new(ManualClock::fixed()));

    memory.open_global().await.unwrap();
    assert_eq!(
        std::fs::read_to_string(ws.global_root().join("global-memory.mdc")).unwrap(),
        default_for(DocumentKind::Global)
    );

    memory.copy_global_into_workspace().await.unwrap();
    assert_eq!(
        ws.read(".cursor/rules/global-memory.mdc"),
        default_for(DocumentKind::Global)
    );
}

#[tokio::test]
async fn test_global_open_on_fresh_machine() {
    let ws = TempWorkspace::new();
    let fresh_root = ws.global_root().join("share").join("project-memory");
    let memory = project_memory(&ws, Config::default(), Arc::new(ManualClock::fixed()))
        .with_global_store(Arc::new(storage::FsDocumentStore::new(&fresh_root)));

    memory.open_global().await.unwrap();
    assert_eq!(
        std::fs::read_to_string(fresh_root.join("global-memory.mdc")).unwrap(),
        default_for(DocumentKind::Global)
    );
}

#[tokio::test]
async fn test_assimilate_one_of_two_legacy_files() {
    let ws = TempWorkspace::new();
    ws.write("AI-MEMORY.md", "legacy decisions\n");
    ws.write("COMPLETED-IMPLEMENTATIONS.md", "\n   \n");
    let memory = project_memory(&ws, Config::default(), Arc::new(ManualClock::fixed()));
    memory.ensure_documents().await.unwrap();
    let completed_before = ws.read(".cursor/rules/project-completed.mdc");

    let report = memory.assimilate(true).await.unwrap().unwrap();

    assert_eq!(report.imported, vec![DocumentPath::new("AI-MEMORY.md").unwrap()]);
    assert_eq!(
        report.skipped_empty,
        vec![DocumentPath::new("COMPLETED-IMPLEMENTATIONS.md").unwrap()]
    );
    let body = ws.read(MEMORY);
    assert!(body.starts_with(default_for(DocumentKind::Memory)));
    assert_eq!(body.matches("## Imported from").count(), 1);
    assert!(body.ends_with("## Imported from AI-MEMORY.md (2026-10-16)\n\nlegacy decisions\n\n"));
    assert_eq!(ws.read(".cursor/rules/project-completed.mdc"), completed_before);
    assert_eq!(ws.read("COMPLETED-IMPLEMENTATIONS.md"), "\n   \n");
}

#[tokio::test]
async fn test_watcher_feeds_save_handler() {
    let ws = TempWorkspace::new();
    let memory = project_memory(&ws, Config::default(), Arc::new(ManualClock::fixed()));
    memory.ensure_documents().await.unwrap();

    let path = DocumentPath::new(MEMORY).unwrap();
    let mut saves = DocumentWatcher::new(ws.root(), vec![path.clone()])
        .watch()
        .unwrap();
    ws.write(MEMORY, "# edited outside\n");

    let saved = loop {
        let saved = tokio::time::timeout(std::time::Duration::from_secs(5), saves.recv())
            .await
            .expect("Timeout waiting for save")
            .expect("Watcher stopped");
        if saved.content == "# edited outside\n" {
            break saved;
        }
    };
    let outcome = memory
        .on_document_saved(&saved.path, &saved.content)
        .await
        .unwrap();
    assert!(outcome.snapshot.is_some());
}
