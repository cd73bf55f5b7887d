use anyhow::{Result, anyhow};
use config::{ConfigReloadEvent, watch_config};
use memory::DocumentWatcher;
use tokio::sync::mpsc::Receiver;
use tracing::info;

use crate::output;
use crate::session::Session;
use crate::ux_error;

pub async fn run(mut session: Session) -> Result<()> {
    session
        .memory
        .ensure_documents()
        .await
        .map_err(ux_error::report)?;
    let Some(root) = session.workspace_root().cloned() else {
        ux_error::no_workspace().display();
        anyhow::bail!("No workspace folder open.");
    };

    let documents = session
        .memory
        .layout()
        .canonical_documents()
        .map(|(_, path)| path.clone())
        .to_vec();
    let mut saves = DocumentWatcher::new(&root, documents.clone())
        .watch()
        .map_err(|e| anyhow!("Failed to watch {}: {}", root.display(), e))?;

    let mut reloads = match &session.config_file {
        Some(path) => {
            let (_tx, rx) = watch_config(path)
                .await
                .map_err(|e| anyhow!("Failed to watch {}: {}", path.display(), e))?;
            Some(rx)
        }
        None => None
    };

    for doc in &documents {
        output::info(&format!("Watching {}", doc));
    }
    output::hint("Press Ctrl-C to stop.");

    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                info!("Stopping watch");
                break;
            }
            saved = saves.recv() => {
                let Some(saved) = saved else {
                    break;
                };
                match session.memory.on_document_saved(&saved.path, &saved.content).await {
                    Ok(outcome) => {
                        if let Some(snapshot) = outcome.snapshot {
                            output::success(&format!("Snapshot {}", snapshot.id));
                        }
                        if let Some(summary) = outcome.published {
                            output::success(&format!("Published {}", summary.path));
                        }
                    }
                    Err(e) => output::warn(&e.to_string())
                }
            }
            event = next_reload(&mut reloads) => {
                match event {
                    Some(ConfigReloadEvent::Reloaded(_)) => {
                        let before = session.memory.layout().clone();
                        match session.reload_config() {
                            Ok(()) => {
                                output::info("Configuration reloaded.");
                                if *session.memory.layout() != before {
                                    output::warn("Document paths changed; restart watch to follow them.");
                                }
                            }
                            Err(e) => output::warn(&e.to_string())
                        }
                    }
                    Some(ConfigReloadEvent::Error { error, .. }) => {
                        output::warn(&format!("Configuration not reloaded: {error}"));
                    }
                    Some(ConfigReloadEvent::Removed(path)) => {
                        output::warn(&format!("Configuration file removed: {}", path.display()));
                    }
                    Some(ConfigReloadEvent::Ready) => {}
                    None => reloads = None
                }
            }
        }
    }

    Ok(())
}

async fn next_reload(reloads: &mut Option<Receiver<ConfigReloadEvent>>) -> Option<ConfigReloadEvent> {
    match reloads {
        Some(rx) => rx.recv().await,
        None => std::future::pending().await
    }
}
