use super::*;
use crate::kernel::services::bus::sync_bus;
use crate::kernel::services::ports::FsEventKind;
use notify::event::{CreateKind, RemoveKind};
use notify::EventKind;
use std::fs;

fn problem(id: &str) -> Problem {
    Problem::new(id, "", "cf", "Round 1").with_samples("sample", [("1\n", "2\n")])
}

fn raw_event(kind: EventKind, path: PathBuf) -> notify::Event {
    notify::Event {
        kind,
        paths: vec![path],
        attrs: Default::default(),
    }
}

/// Registry without a live watcher; events are fed by hand.
fn registry_with(root: &Path, ids: &[&str]) -> (Registry, Vec<Arc<ProblemSync>>) {
    let config = Arc::new(SyncConfig::default());
    let mut registry = Registry::default();
    let mut syncs = Vec::new();
    for id in ids {
        let sync = ProblemSync::new(root, problem(id), Arc::clone(&config), SyncBusSender::detached())
            .expect("create sync");
        sync.initialize().expect("initialize");
        let sync = Arc::new(sync);
        registry.entries.push(WatchEntry {
            key: sync.directory().to_path_buf(),
            sync: Arc::clone(&sync),
        });
        syncs.push(sync);
    }
    (registry, syncs)
}

#[test]
fn test_dispatch_routes_by_parent_directory() {
    let dir = tempfile::tempdir().expect("create tempdir");
    let (registry, syncs) = registry_with(dir.path(), &["A", "B"]);

    let orphan = syncs[1].directory().join("extra.in");
    fs::write(&orphan, "5\n").expect("write orphan");
    assert!(registry.dispatch(FsDelta {
        kind: FsEventKind::Created,
        path: orphan,
    }));
    assert_eq!(syncs[0].test_count(), 1);
    assert_eq!(syncs[1].test_count(), 2);
}

#[test]
fn test_dispatch_drops_events_outside_watched_directories() {
    let dir = tempfile::tempdir().expect("create tempdir");
    let (registry, syncs) = registry_with(dir.path(), &["A"]);

    let elsewhere = dir.path().join("cf").join("extra.in");
    fs::write(&elsewhere, "5\n").expect("write stray input");
    assert!(!registry.dispatch(FsDelta {
        kind: FsEventKind::Created,
        path: elsewhere,
    }));

    let nested = syncs[0].directory().join("sub").join("extra.in");
    assert!(!registry.dispatch(FsDelta {
        kind: FsEventKind::Created,
        path: nested,
    }));
    assert_eq!(syncs[0].test_count(), 1);
}

#[test]
fn test_drain_events_applies_deltas_until_channel_closes() {
    let dir = tempfile::tempdir().expect("create tempdir");
    let (registry, syncs) = registry_with(dir.path(), &["A"]);
    let registry = Arc::new(Mutex::new(registry));
    let problem_dir = syncs[0].directory().to_path_buf();

    let (tx, rx) = mpsc::channel();
    let handle = spawn_drain_thread(rx, Arc::clone(&registry)).expect("spawn drain thread");

    fs::write(problem_dir.join("extra.in"), "5\n").expect("write orphan");
    fs::remove_file(problem_dir.join("sample1.in")).expect("remove sample input");
    tx.send(Err(notify::Error::generic("overflowed")))
        .expect("send error");
    tx.send(Ok(raw_event(
        EventKind::Create(CreateKind::File),
        problem_dir.join("extra.in"),
    )))
    .expect("send create");
    tx.send(Ok(raw_event(
        EventKind::Remove(RemoveKind::File),
        problem_dir.join("sample1.in"),
    )))
    .expect("send remove");
    drop(tx);
    handle.join().expect("drain thread exits");

    let names: Vec<String> = syncs[0]
        .problem()
        .test_cases
        .iter()
        .map(|t| t.name().to_string())
        .collect();
    assert_eq!(names, vec!["extra"]);
    assert_eq!(
        fs::read_to_string(problem_dir.join("tests")).expect("read list"),
        "extra UNKNOWN\n"
    );
}

#[test]
fn test_open_rejects_invalid_config() {
    let dir = tempfile::tempdir().expect("create tempdir");
    let config = SyncConfig {
        input_extension: "ans".to_string(),
        ..SyncConfig::default()
    };
    let result = WorkspaceManager::open(dir.path(), config, SyncBusSender::detached());
    assert!(matches!(result, Err(SyncError::Config(_))));
}

#[test]
fn test_add_problem_rejects_duplicate_directory() {
    let dir = tempfile::tempdir().expect("create tempdir");
    let mut manager = WorkspaceManager::open(dir.path(), SyncConfig::default(), SyncBusSender::detached())
        .expect("open workspace");

    let sync = manager.add_problem(problem("A")).expect("add problem");
    assert!(sync.directory().join("sample1.in").is_file());
    assert!(sync.directory().starts_with(manager.root()));

    let duplicate = manager.add_problem(problem("A"));
    assert!(matches!(duplicate, Err(SyncError::DuplicateProblem(ref path)) if path == sync.directory()));
    assert_eq!(manager.problem_count(), 1);
    manager.stop();
}

#[test]
fn test_close_problem_stops_routing_and_optionally_deletes() {
    let dir = tempfile::tempdir().expect("create tempdir");
    let (bus, _events) = sync_bus();
    let mut manager = WorkspaceManager::open(dir.path(), SyncConfig::default(), bus).expect("open workspace");

    let kept = manager.add_problem(problem("A")).expect("add A");
    let deleted = manager.add_problem(problem("B")).expect("add B");
    assert_eq!(manager.problems().len(), 2);

    manager.close_problem(1, true).expect("close B");
    assert!(!deleted.directory().exists());
    assert_eq!(manager.problem_count(), 1);
    assert_eq!(
        manager.problem(0).expect("A still open").directory(),
        kept.directory()
    );
    assert!(matches!(
        manager.close_problem(1, false),
        Err(SyncError::IndexOutOfRange { index: 1, len: 1 })
    ));

    manager.close_all_problems(false).expect("close all");
    assert_eq!(manager.problem_count(), 0);
    assert!(kept.directory().join("tests").is_file());
    manager.stop();
}

#[test]
fn test_regeneration_required_covers_all_open_problems() {
    let dir = tempfile::tempdir().expect("create tempdir");
    let manager = WorkspaceManager::open(dir.path(), SyncConfig::default(), SyncBusSender::detached())
        .expect("open workspace");

    let a = manager.add_problem(problem("A")).expect("add A");
    let b = manager.add_problem(problem("B")).expect("add B");
    assert!(manager.regeneration_required());
    a.mark_unchanged();
    b.mark_unchanged();
    assert!(!manager.regeneration_required());

    b.delete_test_case(0).expect("delete from B");
    assert!(manager.regeneration_required());
}
