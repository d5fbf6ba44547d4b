//! Path resolution for the Trellis home directory.

use std::path::PathBuf;

use crate::error::{Result, StorageError};

/// Environment variable overriding the Trellis home directory.
pub const HOME_ENV_VAR: &str = "TRELLIS_HOME";

/// Resolve the Trellis home directory.
///
/// `TRELLIS_HOME` wins when set and non-empty; otherwise `~/.trellis`.
pub fn trellis_home() -> Result<PathBuf> {
    if let Some(home) = std::env::var_os(HOME_ENV_VAR) {
        if !home.is_empty() {
            return Ok(PathBuf::from(home));
        }
    }

    dirs::home_dir()
        .map(|h| h.join(".trellis"))
        .ok_or(StorageError::HomeDirNotFound)
}
