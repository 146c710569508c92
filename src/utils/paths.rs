//! Cross-Platform Path Utilities
//!
//! Resolves the Atlus data directory (~/.atlus/) and the files kept in it.

use std::path::{Path, PathBuf};

use crate::utils::error::{AppError, AppResult};

/// Get the user's home directory
pub fn home_dir() -> AppResult<PathBuf> {
    dirs::home_dir().ok_or_else(|| AppError::config("Could not determine home directory"))
}

/// Get the Atlus directory (~/.atlus/)
pub fn atlus_dir() -> AppResult<PathBuf> {
    Ok(home_dir()?.join(".atlus"))
}

/// Get the config file path (~/.atlus/config.json)
pub fn config_path() -> AppResult<PathBuf> {
    Ok(atlus_dir()?.join("config.json"))
}

/// Get the session file path (~/.atlus/session.json)
pub fn session_path() -> AppResult<PathBuf> {
    Ok(atlus_dir()?.join("session.json"))
}

/// Ensure a directory exists, creating it if necessary
pub fn ensure_dir(path: &Path) -> AppResult<()> {
    if !path.exists() {
        std::fs::create_dir_all(path)?;
    }
    Ok(())
}

/// Get the Atlus directory, creating if it doesn't exist
pub fn ensure_atlus_dir() -> AppResult<PathBuf> {
    let path = atlus_dir()?;
    ensure_dir(&path)?;
    Ok(path)
}
