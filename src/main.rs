use probsync::kernel::services::adapters::{ensure_workspace_config, load_workspace_config};
use probsync::kernel::{sync_bus, SyncBusReceiver, WorkspaceManager};
use probsync::models::Problem;
use signal_hook::consts::{SIGINT, SIGTERM};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

mod logging;

const USAGE: &str = "usage: probsync <workspace> [problem.json ...]";

fn main() -> ExitCode {
    let mut args = std::env::args_os().skip(1);
    let Some(workspace) = args.next().map(PathBuf::from) else {
        eprintln!("{USAGE}");
        return ExitCode::FAILURE;
    };
    let problem_files: Vec<PathBuf> = args.map(PathBuf::from).collect();

    let logging = logging::init();
    if let Some(guard) = &logging {
        tracing::debug!(log_dir = %guard.log_dir().display(), "logging to file");
    }

    match run(&workspace, &problem_files) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(error = %e, "probsync failed");
            eprintln!("probsync: {e}");
            ExitCode::FAILURE
        }
    }
}

fn run(workspace: &Path, problem_files: &[PathBuf]) -> Result<(), Box<dyn std::error::Error>> {
    ensure_workspace_config(workspace)?;
    let config = load_workspace_config(workspace)?;
    let (bus, mut events) = sync_bus();
    let mut manager = WorkspaceManager::open(workspace, config, bus)?;

    for path in problem_files {
        match load_problem(path) {
            Ok(problem) => {
                if let Err(e) = manager.add_problem(problem) {
                    tracing::error!(path = %path.display(), error = %e, "add problem failed");
                }
            }
            Err(e) => tracing::error!(path = %path.display(), error = %e, "load problem failed"),
        }
    }

    let shutdown = Arc::new(AtomicBool::new(false));
    signal_hook::flag::register(SIGINT, Arc::clone(&shutdown))?;
    signal_hook::flag::register(SIGTERM, Arc::clone(&shutdown))?;

    while !shutdown.load(Ordering::Relaxed) {
        log_events(&mut events);
    }

    tracing::info!(problems = manager.problem_count(), "shutting down");
    manager.close_all_problems(false)?;
    manager.stop();
    Ok(())
}

fn load_problem(path: &Path) -> Result<Problem, Box<dyn std::error::Error>> {
    let data = std::fs::read_to_string(path)?;
    Ok(serde_json::from_str(&data)?)
}

fn log_events(events: &mut SyncBusReceiver) {
    if let Ok(event) = events.recv_timeout(Duration::from_millis(200)) {
        tracing::info!(?event, "sync event");
    }
}
