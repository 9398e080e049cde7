//! Normalizes raw `notify` events into per-file `{kind, path}` deltas.

use crate::kernel::services::ports::FsEventKind;
use notify::event::{ModifyKind, RenameMode};
use notify::{Config, EventKind, RecommendedWatcher, Watcher};
use std::path::PathBuf;
use std::sync::mpsc;
use std::time::Duration;

pub(crate) const WATCHER_POLL_INTERVAL: Duration = Duration::from_millis(250);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FsDelta {
    pub kind: FsEventKind,
    pub path: PathBuf,
}

impl FsDelta {
    fn new(kind: FsEventKind, path: PathBuf) -> Self {
        Self { kind, path }
    }
}

/// Creates the watcher whose callback forwards every raw event into `tx`.
pub(crate) fn channel_watcher(
    tx: mpsc::Sender<notify::Result<notify::Event>>,
) -> notify::Result<RecommendedWatcher> {
    RecommendedWatcher::new(
        move |res: notify::Result<notify::Event>| {
            let _ = tx.send(res);
        },
        Config::default().with_poll_interval(WATCHER_POLL_INTERVAL),
    )
}

/// Rescan requests mean the backend overflowed and dropped events.
pub fn is_overflow(event: &notify::Event) -> bool {
    event.need_rescan()
}

pub fn normalize_notify_event(event: notify::Event) -> Vec<FsDelta> {
    if is_overflow(&event) {
        return Vec::new();
    }
    match event.kind {
        EventKind::Create(_) => event
            .paths
            .into_iter()
            .map(|path| FsDelta::new(FsEventKind::Created, path))
            .collect(),
        EventKind::Remove(_) => event
            .paths
            .into_iter()
            .map(|path| FsDelta::new(FsEventKind::Deleted, path))
            .collect(),
        EventKind::Modify(kind) => normalize_modify_event(kind, event.paths),
        _ => Vec::new(),
    }
}

fn normalize_modify_event(kind: ModifyKind, paths: Vec<PathBuf>) -> Vec<FsDelta> {
    match kind {
        ModifyKind::Name(RenameMode::Both) if paths.len() >= 2 => {
            let mut paths = paths.into_iter();
            let mut deltas = Vec::with_capacity(2);
            if let Some(from) = paths.next() {
                deltas.push(FsDelta::new(FsEventKind::Deleted, from));
            }
            if let Some(to) = paths.next() {
                deltas.push(FsDelta::new(FsEventKind::Created, to));
            }
            deltas
        }
        ModifyKind::Name(RenameMode::From) => paths
            .into_iter()
            .map(|path| FsDelta::new(FsEventKind::Deleted, path))
            .collect(),
        ModifyKind::Name(RenameMode::To) => paths
            .into_iter()
            .map(|path| FsDelta::new(FsEventKind::Created, path))
            .collect(),
        // Access time and permission churn carries no content.
        ModifyKind::Metadata(_) => Vec::new(),
        ModifyKind::Data(_) | ModifyKind::Any | ModifyKind::Other | ModifyKind::Name(_) => paths
            .into_iter()
            .map(|path| FsDelta::new(FsEventKind::Modified, path))
            .collect(),
    }
}
