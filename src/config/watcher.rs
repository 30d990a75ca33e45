//! Configuration file watcher for hot reload.
//!
//! The parent directory is watched rather than the file itself: editors that
//! save by renaming a temp file over the original would otherwise detach the
//! watch after the first save.

use notify::{Config, Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::sync::mpsc;

use crate::config::loader::load_config;
use crate::config::schema::RouterConfig;

/// Monitors a configuration file and emits every valid new version.
pub struct ConfigWatcher {
    path: PathBuf,
    update_tx: mpsc::UnboundedSender<RouterConfig>,
}

impl ConfigWatcher {
    /// Returns the watcher and the receiver that validated configs arrive on.
    pub fn new(path: &Path) -> (Self, mpsc::UnboundedReceiver<RouterConfig>) {
        let (update_tx, update_rx) = mpsc::unbounded_channel();
        let watcher = Self {
            path: path.to_path_buf(),
            update_tx,
        };
        (watcher, update_rx)
    }

    /// Start watching in a background thread.
    ///
    /// The returned handle must be kept alive for as long as reloads are wanted.
    pub fn run(self) -> Result<RecommendedWatcher, notify::Error> {
        let tx = self.update_tx;
        let path = self.path.clone();
        let file_name = self.path.file_name().map(|n| n.to_os_string());

        let mut watcher = RecommendedWatcher::new(
            move |res: notify::Result<Event>| match res {
                Ok(event) if touches(&event, file_name.as_deref()) => {
                    tracing::info!(path = ?path, "Config file change detected, reloading");
                    match load_config(&path) {
                        Ok(config) => {
                            if tx.send(config).is_err() {
                                tracing::debug!("Config receiver dropped; ignoring change");
                            }
                        }
                        Err(e) => {
                            tracing::error!(
                                error = %e,
                                "Failed to reload config; keeping current routes"
                            );
                        }
                    }
                }
                Ok(_) => {}
                Err(e) => tracing::error!(error = ?e, "Watch error"),
            },
            Config::default().with_poll_interval(Duration::from_secs(2)),
        )?;

        let dir = match self.path.parent() {
            Some(dir) if !dir.as_os_str().is_empty() => dir.to_path_buf(),
            _ => PathBuf::from("."),
        };
        watcher.watch(&dir, RecursiveMode::NonRecursive)?;

        tracing::info!(path = ?self.path, "Config watcher started");
        Ok(watcher)
    }
}

/// True for a create/modify event on the watched file.
fn touches(event: &Event, file_name: Option<&std::ffi::OsStr>) -> bool {
    if !matches!(event.kind, EventKind::Create(_) | EventKind::Modify(_)) {
        return false;
    }
    match file_name {
        Some(name) => event.paths.iter().any(|p| p.file_name() == Some(name)),
        None => false,
    }
}
