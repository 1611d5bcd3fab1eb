//! Path management for casa configuration files.
//!
//! # Directory Structure
//!
//! ```text
//! ~/.config/casa/              # Config directory (platform config dir)
//! └── config.toml              # Client configuration
//! ```

use std::path::{Path, PathBuf};

const APP_DIR_NAME: &str = "casa";
const CONFIG_FILE_NAME: &str = "config.toml";

/// Errors that can occur during path resolution.
#[derive(Debug)]
pub enum PathError {
    /// Platform config directory could not be determined.
    ConfigDirNotFound,
}

impl std::fmt::Display for PathError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PathError::ConfigDirNotFound => write!(f, "Cannot find config directory"),
        }
    }
}

impl std::error::Error for PathError {}

/// Resolves where casa keeps its files.
///
/// `base_path` replaces the platform config directory, which keeps tests away
/// from the real home directory.
#[derive(Debug, Clone, Default)]
pub struct CasaPaths {
    base_path: Option<PathBuf>,
}

impl CasaPaths {
    pub fn new(base_path: Option<&Path>) -> Self {
        Self {
            base_path: base_path.map(Path::to_path_buf),
        }
    }

    /// Returns the casa configuration directory (e.g. `~/.config/casa/`).
    pub fn config_dir(&self) -> Result<PathBuf, PathError> {
        match &self.base_path {
            Some(base) => Ok(base.join(APP_DIR_NAME)),
            None => dirs::config_dir()
                .map(|dir| dir.join(APP_DIR_NAME))
                .ok_or(PathError::ConfigDirNotFound),
        }
    }

    /// Returns the path to the main configuration file.
    pub fn config_file(&self) -> Result<PathBuf, PathError> {
        Ok(self.config_dir()?.join(CONFIG_FILE_NAME))
    }
}
