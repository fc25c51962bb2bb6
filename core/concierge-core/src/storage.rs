//! Storage configuration and path management for the concierge.
//!
//! All on-device files live under one root (default `~/.illora`). Tests point
//! the root at a temp directory with [`StorageConfig::with_root`].

use std::path::{Path, PathBuf};

use crate::error::{Result, SessionError};

/// Central configuration for all concierge storage paths.
#[derive(Debug, Clone)]
pub struct StorageConfig {
    /// Root directory for all concierge data (default: ~/.illora)
    root: PathBuf,
}

impl StorageConfig {
    /// Resolves the default root under the user's home directory.
    pub fn discover() -> Result<Self> {
        let home = dirs::home_dir().ok_or_else(|| SessionError::Config {
            path: PathBuf::from("~"),
            details: "Home directory not found".to_string(),
        })?;
        Ok(Self {
            root: home.join(".illora"),
        })
    }

    /// Creates a StorageConfig with a custom root directory.
    /// Used for testing with temp directories.
    pub fn with_root(root: PathBuf) -> Self {
        Self { root }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    // ─────────────────────────────────────────────────────────────────────────────
    // Files
    // ─────────────────────────────────────────────────────────────────────────────

    /// Path to device.json (the device persistence store).
    pub fn device_store_file(&self) -> PathBuf {
        self.root.join("device.json")
    }

    /// Path to concierge.toml (runtime configuration).
    pub fn config_file(&self) -> PathBuf {
        self.root.join("concierge.toml")
    }

    // ─────────────────────────────────────────────────────────────────────────────
    // Directories
    // ─────────────────────────────────────────────────────────────────────────────

    /// Path to logs/ directory (rolling shell logs).
    pub fn logs_dir(&self) -> PathBuf {
        self.root.join("logs")
    }

    /// Ensures the root directory and standard subdirectories exist.
    pub fn ensure_dirs(&self) -> std::io::Result<()> {
        fs_err::create_dir_all(&self.root)?;
        fs_err::create_dir_all(self.logs_dir())?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_paths_hang_off_root() {
        let config = StorageConfig::with_root(PathBuf::from("/tmp/illora"));
        assert_eq!(
            config.device_store_file(),
            PathBuf::from("/tmp/illora/device.json")
        );
        assert_eq!(
            config.config_file(),
            PathBuf::from("/tmp/illora/concierge.toml")
        );
        assert_eq!(config.logs_dir(), PathBuf::from("/tmp/illora/logs"));
    }

    #[test]
    fn test_ensure_dirs_creates_structure() {
        let temp = TempDir::new().unwrap();
        let root = temp.path().join("nested");
        let config = StorageConfig::with_root(root.clone());

        config.ensure_dirs().unwrap();

        assert!(root.exists());
        assert!(config.logs_dir().exists());
    }
}
