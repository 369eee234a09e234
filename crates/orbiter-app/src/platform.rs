//! Platform directory resolution.
//!
//! Config and log files live under the OS configuration directory
//! (XDG on Linux, Known Folders on Windows, Library on macOS).

use std::io;
use std::path::{Path, PathBuf};

/// Errors that can occur while resolving or creating platform directories.
#[derive(Debug, thiserror::Error)]
pub enum PlatformError {
    /// The OS did not provide a configuration directory.
    #[error("could not determine OS configuration directory")]
    NoConfigDir,
    /// A directory could not be created.
    #[error("platform I/O error: {0}")]
    Io(#[from] io::Error),
}

/// Directories used by the orbiter binary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlatformDirs {
    /// Holds `config.ron`.
    pub config_dir: PathBuf,
    /// Holds the JSON log written by debug builds.
    pub log_dir: PathBuf,
}

const APP_NAME: &str = "orbiter";

impl PlatformDirs {
    /// Resolve the OS directories without touching the disk.
    pub fn resolve() -> Result<Self, PlatformError> {
        let base = dirs::config_dir().ok_or(PlatformError::NoConfigDir)?;
        Ok(Self::resolve_with_root(&base))
    }

    /// Resolve directories under a custom base path.
    pub fn resolve_with_root(root: &Path) -> Self {
        let app_dir = root.join(APP_NAME);
        Self {
            config_dir: app_dir.clone(),
            log_dir: app_dir.join("logs"),
        }
    }

    /// Use an explicit config directory (from `--config`); logs go beside it.
    pub fn with_config_dir(config_dir: PathBuf) -> Self {
        Self {
            log_dir: config_dir.join("logs"),
            config_dir,
        }
    }

    /// Create every directory on disk.
    pub fn create_dirs(&self) -> Result<(), PlatformError> {
        std::fs::create_dir_all(&self.config_dir)?;
        std::fs::create_dir_all(&self.log_dir)?;
        Ok(())
    }
}
