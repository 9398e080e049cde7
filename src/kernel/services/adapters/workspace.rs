//! Workspace manager: one watch subscription for the workspace, one draining
//! thread, and the lifecycle of every open `ProblemSync`.

use super::file_watcher::{channel_watcher, normalize_notify_event, FsDelta};
use super::problem_sync::ProblemSync;
use crate::kernel::services::bus::SyncBusSender;
use crate::kernel::services::ports::{Result, SyncConfig, SyncError};
use crate::models::Problem;
use notify::{RecommendedWatcher, RecursiveMode, Watcher};
use std::path::{Path, PathBuf};
use std::sync::{mpsc, Arc, Mutex, MutexGuard, PoisonError};
use std::thread::JoinHandle;

struct WatchEntry {
    /// Watch key: the directory registered with the watcher.
    key: PathBuf,
    sync: Arc<ProblemSync>,
}

#[derive(Default)]
struct Registry {
    watcher: Option<RecommendedWatcher>,
    entries: Vec<WatchEntry>,
}

impl Registry {
    fn dispatch(&self, delta: FsDelta) -> bool {
        let Some(parent) = delta.path.parent() else {
            return false;
        };
        let Some(entry) = self.entries.iter().find(|entry| entry.key == parent) else {
            return false;
        };
        let Some(file_name) = delta.path.file_name() else {
            return false;
        };
        entry
            .sync
            .file_changed(delta.kind, &file_name.to_string_lossy())
    }
}

pub struct WorkspaceManager {
    root: PathBuf,
    config: Arc<SyncConfig>,
    bus: SyncBusSender,
    registry: Arc<Mutex<Registry>>,
    drain_thread: Option<JoinHandle<()>>,
}

impl WorkspaceManager {
    pub fn open(root: &Path, config: SyncConfig, bus: SyncBusSender) -> Result<Self> {
        config.validate()?;
        std::fs::create_dir_all(root).map_err(|e| SyncError::io(root, e))?;
        let root = root.canonicalize().map_err(|e| SyncError::io(root, e))?;

        let (tx, rx) = mpsc::channel();
        let watcher = channel_watcher(tx)?;
        let registry = Arc::new(Mutex::new(Registry {
            watcher: Some(watcher),
            entries: Vec::new(),
        }));
        let drain_thread = spawn_drain_thread(rx, Arc::clone(&registry))
            .map_err(|e| SyncError::io(&root, e))?;

        tracing::info!(root = %root.display(), "workspace opened");
        Ok(Self {
            root,
            config: Arc::new(config),
            bus,
            registry,
            drain_thread: Some(drain_thread),
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn config(&self) -> &SyncConfig {
        &self.config
    }

    /// Creates and seeds the problem directory, then starts watching it.
    pub fn add_problem(&self, problem: Problem) -> Result<Arc<ProblemSync>> {
        let sync = ProblemSync::new(&self.root, problem, Arc::clone(&self.config), self.bus.clone())?;
        let key = sync.directory().to_path_buf();
        if self.lock().entries.iter().any(|entry| entry.key == key) {
            return Err(SyncError::DuplicateProblem(key));
        }

        sync.initialize()?;
        let sync = Arc::new(sync);

        let mut registry = self.lock();
        if registry.entries.iter().any(|entry| entry.key == key) {
            return Err(SyncError::DuplicateProblem(key));
        }
        if let Some(watcher) = registry.watcher.as_mut() {
            watcher.watch(&key, RecursiveMode::NonRecursive)?;
        }
        registry.entries.push(WatchEntry {
            key: key.clone(),
            sync: Arc::clone(&sync),
        });
        tracing::info!(dir = %key.display(), tests = sync.test_count(), "problem opened");
        Ok(sync)
    }

    /// Stops watching the problem and optionally deletes its directory. Events
    /// already queued for it are dropped by the dispatcher.
    pub fn close_problem(&self, index: usize, delete: bool) -> Result<()> {
        let entry = {
            let mut registry = self.lock();
            let len = registry.entries.len();
            if index >= len {
                return Err(SyncError::IndexOutOfRange { index, len });
            }
            let entry = registry.entries.remove(index);
            if let Some(watcher) = registry.watcher.as_mut() {
                if let Err(e) = watcher.unwatch(&entry.key) {
                    tracing::debug!(dir = %entry.key.display(), error = %e, "unwatch failed");
                }
            }
            entry
        };

        tracing::info!(dir = %entry.key.display(), delete, "problem closed");
        if delete {
            entry.sync.delete_from_disk()?;
        }
        Ok(())
    }

    /// Closes every problem. The first deletion error is returned after all
    /// problems have been closed.
    pub fn close_all_problems(&self, delete: bool) -> Result<()> {
        let mut first_error = None;
        while self.problem_count() > 0 {
            if let Err(e) = self.close_problem(0, delete) {
                tracing::warn!(error = %e, "close problem failed");
                first_error.get_or_insert(e);
            }
        }
        first_error.map_or(Ok(()), Err)
    }

    pub fn problem_count(&self) -> usize {
        self.lock().entries.len()
    }

    pub fn problem(&self, index: usize) -> Option<Arc<ProblemSync>> {
        self.lock()
            .entries
            .get(index)
            .map(|entry| Arc::clone(&entry.sync))
    }

    pub fn problems(&self) -> Vec<Arc<ProblemSync>> {
        self.lock()
            .entries
            .iter()
            .map(|entry| Arc::clone(&entry.sync))
            .collect()
    }

    /// Whether any open problem changed its test set since it was last marked
    /// unchanged.
    pub fn regeneration_required(&self) -> bool {
        self.problems()
            .iter()
            .any(|sync| sync.regeneration_required())
    }

    /// Drops the watcher, which closes the event channel and lets the draining
    /// thread finish.
    pub fn stop(&mut self) {
        let watcher = self.lock().watcher.take();
        drop(watcher);
        if let Some(handle) = self.drain_thread.take() {
            if handle.join().is_err() {
                tracing::error!("workspace watcher thread panicked");
            }
        }
    }

    fn lock(&self) -> MutexGuard<'_, Registry> {
        lock_registry(&self.registry)
    }
}

impl Drop for WorkspaceManager {
    fn drop(&mut self) {
        self.stop();
    }
}

fn lock_registry(registry: &Mutex<Registry>) -> MutexGuard<'_, Registry> {
    registry.lock().unwrap_or_else(PoisonError::into_inner)
}

fn spawn_drain_thread(
    rx: mpsc::Receiver<notify::Result<notify::Event>>,
    registry: Arc<Mutex<Registry>>,
) -> std::io::Result<JoinHandle<()>> {
    std::thread::Builder::new()
        .name("probsync-watcher".to_string())
        .spawn(move || drain_events(rx, &registry))
}

/// Serially drains the watch channel until every sender is gone.
fn drain_events(rx: mpsc::Receiver<notify::Result<notify::Event>>, registry: &Mutex<Registry>) {
    while let Ok(res) = rx.recv() {
        let event = match res {
            Ok(event) => event,
            Err(e) => {
                tracing::warn!(error = %e, "watch error dropped");
                continue;
            }
        };
        let deltas = normalize_notify_event(event);
        if deltas.is_empty() {
            continue;
        }
        let registry = lock_registry(registry);
        for delta in deltas {
            registry.dispatch(delta);
        }
    }
    tracing::debug!("workspace watcher channel closed");
}

#[cfg(test)]
#[path = "../../../../tests/unit/kernel/services/adapters/workspace.rs"]
mod tests;
