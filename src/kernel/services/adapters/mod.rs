//! Service adapters: filesystem and watcher implementations.

pub mod file_watcher;
pub mod paths;
pub mod problem_sync;
pub mod settings;
pub mod workspace;

pub use file_watcher::{normalize_notify_event, FsDelta};
pub use paths::{ensure_log_dir, get_log_dir};
pub use problem_sync::{ProblemSync, TestRow};
pub use settings::{ensure_workspace_config, load_workspace_config, workspace_config_path};
pub use workspace::WorkspaceManager;
