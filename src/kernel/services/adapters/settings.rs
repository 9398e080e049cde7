use crate::kernel::services::ports::{Result, SyncConfig, SyncError};
use std::io;
use std::path::{Path, PathBuf};

pub const WORKSPACE_CONFIG_FILE: &str = "probsync.json";

pub fn workspace_config_path(root: &Path) -> PathBuf {
    root.join(WORKSPACE_CONFIG_FILE)
}

/// Loads `<root>/probsync.json`. A missing file yields the defaults; fields
/// absent from the file keep their default values.
pub fn load_workspace_config(root: &Path) -> Result<SyncConfig> {
    let path = workspace_config_path(root);
    let data = match std::fs::read_to_string(&path) {
        Ok(data) => data,
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            tracing::info!(path = %path.display(), "no workspace config, using defaults");
            return Ok(SyncConfig::default());
        }
        Err(e) => return Err(SyncError::io(path, e)),
    };
    let config: SyncConfig = serde_json::from_str(&data)
        .map_err(|e| SyncError::Config(format!("{}: {}", path.display(), e)))?;
    config.validate()?;
    Ok(config)
}

/// Writes the default configuration if the workspace has none yet.
pub fn ensure_workspace_config(root: &Path) -> Result<PathBuf> {
    let path = workspace_config_path(root);
    if !root.exists() {
        std::fs::create_dir_all(root).map_err(|e| SyncError::io(root, e))?;
    }
    if !path.exists() {
        let content = serde_json::to_string_pretty(&SyncConfig::default())
            .unwrap_or_else(|_| "{}".to_string());
        std::fs::write(&path, content).map_err(|e| SyncError::io(&path, e))?;
    }
    Ok(path)
}

#[cfg(test)]
#[path = "../../../../tests/unit/kernel/services/adapters/settings.rs"]
mod tests;
