//! # Configuration Hot Reload
//!
//! Watches the configuration file and re-parses it whenever it changes, so
//! long-running hosts pick up new settings without restarting.

use crate::config::Config;
use crate::file_loader::load_from_file;
use crate::validation::validate;
use notify::{EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use std::path::{Path, PathBuf};
use tracing::{debug, error, info, warn};

/// Configuration reload event.
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigReloadEvent {
    Ready,

    /// File changed and parsed into a valid configuration
    Reloaded(Box<Config>),

    /// Configuration file was removed
    Removed(PathBuf),

    /// File changed but could not be loaded
    Error { path: PathBuf, error: String },
}

/// Watch a configuration file and emit reload events.
///
/// The parent directory is watched (non-recursively) so editors that save by
/// writing a temporary file and renaming it over the original are seen too.
/// Events for other files in that directory are ignored.
///
/// ## Usage
/// ```rust,no_run
/// use config::{hot_reload::ConfigReloadEvent, watch_config};
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let path = std::path::Path::new(".cursor/project-memory.toml");
///     let (_tx, mut rx) = watch_config(path).await?;
///
///     while let Some(event) = rx.recv().await {
///         if let ConfigReloadEvent::Reloaded(config) = event {
///             println!("history enabled: {}", config.history.enabled);
///         }
///     }
///     Ok(())
/// }
/// ```
pub async fn watch_config(
    config_path: &Path,
) -> Result<
    (
        tokio::sync::mpsc::Sender<ConfigReloadEvent>,
        tokio::sync::mpsc::Receiver<ConfigReloadEvent>,
    ),
    Box<dyn std::error::Error>,
> {
    if !config_path.exists() {
        return Err(Box::new(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            format!("Config file not found: {:?}", config_path),
        )));
    }

    let config_path = config_path.canonicalize()?;
    let watch_dir = config_path
        .parent()
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from("."));

    let (tx, rx) = tokio::sync::mpsc::channel(100);
    let tx_task = tx.clone();

    tokio::spawn(async move {
        let (event_tx, mut event_rx) = tokio::sync::mpsc::channel(100);
        let mut watcher = match RecommendedWatcher::new(
            move |res| {
                let _ = event_tx.blocking_send(res);
            },
            notify::Config::default(),
        ) {
            Ok(w) => w,
            Err(e) => {
                let error_msg = format!("Failed to create file watcher: {}", e);
                error!("{}", error_msg);
                let _ = tx_task
                    .send(ConfigReloadEvent::Error {
                        path: config_path,
                        error: error_msg,
                    })
                    .await;
                return;
            }
        };

        if let Err(e) = watcher.watch(&watch_dir, RecursiveMode::NonRecursive) {
            let error_msg = format!("Failed to watch config directory: {}", e);
            error!("{}", error_msg);
            let _ = tx_task
                .send(ConfigReloadEvent::Error {
                    path: config_path,
                    error: error_msg,
                })
                .await;
            return;
        }

        info!("Watching config file: {:?}", config_path);
        let _ = tx_task.send(ConfigReloadEvent::Ready).await;

        loop {
            tokio::select! {
                _ = tx_task.closed() => {
                    debug!("Receiver dropped, stopping watcher for {:?}", config_path);
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

                    if !event.paths.iter().any(|p| same_file(p, &config_path)) {
                        continue;
                    }

                    let reload_event = match event.kind {
                        EventKind::Create(_) | EventKind::Modify(_) => {
                            reload(&config_path)
                        }
                        EventKind::Remove(_) => {
                            warn!("Config file removed: {:?}", config_path);
                            ConfigReloadEvent::Removed(config_path.clone())
                        }
                        _ => {
                            debug!("Ignoring event: {:?}", event.kind);
                            continue;
                        }
                    };

                    if let Err(e) = tx_task.send(reload_event).await {
                        error!("Failed to send config reload event: {}", e);
                        break;
                    }
                }
            }
        }
    });

    Ok((tx, rx))
}

fn reload(path: &Path) -> ConfigReloadEvent {
    let result = load_from_file(path)
        .map_err(|e| e.to_string())
        .and_then(|config| {
            validate(&config)
                .map(|()| config)
                .map_err(|problems| problems.join("; "))
        });

    match result {
        Ok(config) => {
            info!("Config file reloaded: {:?}", path);
            ConfigReloadEvent::Reloaded(Box::new(config))
        }
        Err(error) => {
            warn!("Config file {:?} could not be reloaded: {}", path, error);
            ConfigReloadEvent::Error {
                path: path.to_path_buf(),
                error,
            }
        }
    }
}

fn same_file(candidate: &Path, target: &Path) -> bool {
    candidate == target
        || candidate
            .canonicalize()
            .map(|p| p == target)
            .unwrap_or_else(|_| candidate.file_name() == target.file_name())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tokio::time::Duration;

    async fn next_event(
        rx: &mut tokio::sync::mpsc::Receiver<ConfigReloadEvent>,
    ) -> ConfigReloadEvent {
        tokio::time::timeout(Duration::from_secs(5), rx.recv())
            .await
            .expect("Timeout waiting for event")
            .expect("No event received")
    }

    #[tokio::test]
    async fn test_watch_config_reloads_on_change() {
        let temp_dir = tempfile::tempdir().unwrap();
        let config_path = temp_dir.path().join("project-memory.toml");
        fs::write(&config_path, "syncOnSave = false\n").unwrap();

        let (_tx, mut rx) = watch_config(&config_path).await.unwrap();
        assert_eq!(next_event(&mut rx).await, ConfigReloadEvent::Ready);

        fs::write(&config_path, "syncOnSave = true\n").unwrap();

        loop {
            match next_event(&mut rx).await {
                ConfigReloadEvent::Reloaded(config) if config.sync_on_save => break,
                ConfigReloadEvent::Reloaded(_) => continue,
                other => panic!("Expected Reloaded event, got {:?}", other),
            }
        }
    }

    #[tokio::test]
    async fn test_watch_config_reports_parse_errors() {
        let temp_dir = tempfile::tempdir().unwrap();
        let config_path = temp_dir.path().join("project-memory.toml");
        fs::write(&config_path, "").unwrap();

        let (_tx, mut rx) = watch_config(&config_path).await.unwrap();
        assert_eq!(next_event(&mut rx).await, ConfigReloadEvent::Ready);

        fs::write(&config_path, "mode = \"mirror\"\n").unwrap();

        loop {
            match next_event(&mut rx).await {
                ConfigReloadEvent::Error { error, .. } => {
                    assert!(!error.is_empty());
                    break;
                }
                ConfigReloadEvent::Reloaded(_) => continue,
                other => panic!("Expected Error event, got {:?}", other),
            }
        }
    }

    #[tokio::test]
    async fn test_watch_config_ignores_sibling_files() {
        let temp_dir = tempfile::tempdir().unwrap();
        let config_path = temp_dir.path().join("project-memory.toml");
        fs::write(&config_path, "").unwrap();

        let (_tx, mut rx) = watch_config(&config_path).await.unwrap();
        assert_eq!(next_event(&mut rx).await, ConfigReloadEvent::Ready);

        fs::write(temp_dir.path().join("other.toml"), "x = 1").unwrap();

        let event = tokio::time::timeout(Duration::from_millis(500), rx.recv()).await;
        assert!(event.is_err(), "Unexpected event: {:?}", event);
    }

    #[tokio::test]
    async fn test_watch_config_nonexistent_file() {
        let temp_dir = tempfile::tempdir().unwrap();
        let config_path = temp_dir.path().join("nonexistent.toml");

        let result = watch_config(&config_path).await;
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("not found"));
    }

    #[test]
    fn test_reload_event_equality() {
        let path = PathBuf::from("/test/project-memory.toml");
        assert_eq!(
            ConfigReloadEvent::Removed(path.clone()),
            ConfigReloadEvent::Removed(path.clone())
        );
        assert_ne!(
            ConfigReloadEvent::Reloaded(Box::default()),
            ConfigReloadEvent::Removed(path)
        );
    }
}
