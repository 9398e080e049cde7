//! Synchronization core: problem mirrors and the workspace watch loop.

pub mod services;

pub use services::adapters::{ProblemSync, TestRow, WorkspaceManager};
pub use services::ports::{FsEventKind, Result, SyncConfig, SyncError, TestFileKind};
pub use services::{sync_bus, SyncBusReceiver, SyncBusSender, SyncEvent};
