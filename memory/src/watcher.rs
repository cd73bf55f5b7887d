//! Filesystem watch that turns external edits of the canonical documents
//! into save events for [`crate::ProjectMemory::on_document_saved`].

use notify::{EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use pm_core::DocumentPath;
use std::collections::{BTreeSet, HashMap};
use std::path::{Path, PathBuf};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

/// A watched document was written with new content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentSaved {
    pub path: DocumentPath,
    pub content: String
}

/// Watches documents under a workspace root.
///
/// Parent directories are watched non-recursively so editors that save by
/// renaming a temporary file are seen too. Repeated events carrying the same
/// content are collapsed.
pub struct DocumentWatcher {
    root: PathBuf,
    documents: Vec<DocumentPath>
}

impl DocumentWatcher {
    pub fn new(root: impl Into<PathBuf>, documents: Vec<DocumentPath>) -> Self {
        Self {
            root: root.into(),
            documents
        }
    }

    /// Starts watching. Missing parent directories are created so documents
    /// that appear later are still seen. Events stop when the receiver is
    /// dropped.
    pub fn watch(self) -> notify::Result<mpsc::Receiver<DocumentSaved>> {
        let root = self.root.canonicalize()?;
        let targets: Vec<(PathBuf, DocumentPath)> = self
            .documents
            .into_iter()
            .map(|doc| (root.join(doc.as_str()), doc))
            .collect();

        let (event_tx, mut event_rx) = mpsc::channel(100);
        let mut watcher = RecommendedWatcher::new(
            move |res| {
                let _ = event_tx.blocking_send(res);
            },
            notify::Config::default()
        )?;

        let dirs: BTreeSet<PathBuf> = targets
            .iter()
            .filter_map(|(abs, _)| abs.parent().map(Path::to_path_buf))
            .collect();
        for dir in &dirs {
            if !dir.is_dir() {
                std::fs::create_dir_all(dir)?;
                debug!("Created watched directory {:?}", dir);
            }
            watcher.watch(dir, RecursiveMode::NonRecursive)?;
            info!("Watching {:?}", dir);
        }

        let (tx, rx) = mpsc::channel(100);
        tokio::spawn(async move {
            let _watcher = watcher;
            let mut last_hash: HashMap<PathBuf, String> = HashMap::new();

            loop {
                tokio::select! {
                    _ = tx.closed() => {
                        debug!("Receiver dropped, stopping document watcher");
                        break;
                    }
                    event_result = event_rx.recv() => {
                        let Some(event_result) = event_result else {
                            break;
                        };
                        let event = match event_result {
                            Ok(event) => event,
                            Err(e) => {
                                warn!("Watch error: {}", e);
                                continue;
                            }
                        };
                        if !matches!(event.kind, EventKind::Create(_) | EventKind::Modify(_)) {
                            continue;
                        }

                        for changed in &event.paths {
                            let Some((abs, doc)) = targets.iter().find(|(abs, _)| abs == changed) else {
                                continue;
                            };
                            let content = match tokio::fs::read_to_string(abs).await {
                                Ok(content) => content,
                                Err(e) => {
                                    debug!("Skipping unreadable {:?}: {}", abs, e);
                                    continue;
                                }
                            };
                            let hash = utils::compute_content_hash(&content);
                            if last_hash.get(abs) == Some(&hash) {
                                continue;
                            }
                            last_hash.insert(abs.clone(), hash);

                            let saved = DocumentSaved {
                                path: doc.clone(),
                                content
                            };
                            if tx.send(saved).await.is_err() {
                                return;
                            }
                        }
                    }
                }
            }
        });

        Ok(rx)
    }
}
