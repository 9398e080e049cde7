//! Service ports: data contracts shared by the adapters.

pub mod config;
pub mod error;
pub mod watch;

pub use config::{SyncConfig, TestFileKind};
pub use error::{Result, SyncError};
pub use watch::FsEventKind;
