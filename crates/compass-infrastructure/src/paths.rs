//! Unified path management for Compass files.
//!
//! # Directory Structure
//!
//! ```text
//! ~/.config/compass/           # Config directory
//! ├── config.toml              # Client configuration
//! └── logs/                    # Application logs
//!     └── compass.log.YYYY-MM-DD
//! ```

use std::path::{Path, PathBuf};

/// Errors that can occur during path resolution.
#[derive(Debug)]
pub enum PathError {
    /// Home/config directory could not be determined.
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

const APP_DIR: &str = "compass";

/// Resolves Compass file locations, optionally rooted at a custom directory
/// (used by tests and `--config-dir`).
#[derive(Debug, Clone, Default)]
pub struct CompassPaths {
    base_dir: Option<PathBuf>,
}

impl CompassPaths {
    pub fn new(base_dir: Option<&Path>) -> Self {
        Self {
            base_dir: base_dir.map(Path::to_path_buf),
        }
    }

    /// Returns the configuration directory.
    ///
    /// - `Ok(PathBuf)`: e.g. `~/.config/compass/`, or the custom base directory
    /// - `Err(PathError::ConfigDirNotFound)`: platform directory unavailable
    pub fn config_dir(&self) -> Result<PathBuf, PathError> {
        if let Some(base) = &self.base_dir {
            return Ok(base.clone());
        }
        dirs::config_dir()
            .map(|dir| dir.join(APP_DIR))
            .ok_or(PathError::ConfigDirNotFound)
    }

    pub fn config_file(&self) -> Result<PathBuf, PathError> {
        Ok(self.config_dir()?.join("config.toml"))
    }

    pub fn logs_dir(&self) -> Result<PathBuf, PathError> {
        Ok(self.config_dir()?.join("logs"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_custom_base_dir() {
        let paths = CompassPaths::new(Some(Path::new("/tmp/compass-test")));
        assert_eq!(
            paths.config_file().unwrap(),
            PathBuf::from("/tmp/compass-test/config.toml")
        );
        assert_eq!(
            paths.logs_dir().unwrap(),
            PathBuf::from("/tmp/compass-test/logs")
        );
    }
}
