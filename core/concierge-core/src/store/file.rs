//! File-backed device store.
//!
//! # File Format
//!
//! ```json
//! {
//!   "version": 1,
//!   "entries": { "illora-logged-in": "true" }
//! }
//! ```
//!
//! Loading never fails on bad content: a missing, empty, corrupt or
//! wrong-version file reads as an empty store and is logged. Writes go through
//! a temp file + rename so a crash can't leave a truncated file behind.
//!
//! The file is the source of truth. Every operation re-reads it, so several
//! stores (or processes) opened on one path see each other's writes, and a
//! write only replaces the key it names.

use std::collections::HashMap;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};

use serde::{Deserialize, Serialize};
use tempfile::NamedTempFile;
use tracing::{debug, warn};

use super::DeviceStore;
use crate::error::StoreError;

const STORE_VERSION: u32 = 1;

#[derive(Debug, Serialize, Deserialize)]
struct StoreFile {
    version: u32,
    #[serde(default)]
    entries: HashMap<String, String>,
}

/// [`DeviceStore`] persisted as a JSON file.
///
/// Every `set`/`remove` reloads the file, applies one key and rewrites it.
#[derive(Debug)]
pub struct FileDeviceStore {
    path: PathBuf,
    entries: Mutex<HashMap<String, String>>,
}

impl FileDeviceStore {
    /// Opens the store at `path`. The file is created on first write.
    pub fn open(path: &Path) -> Result<Self, StoreError> {
        let entries = load_entries(path)?;
        debug!(path = %path.display(), entries = entries.len(), "Opened device store");
        Ok(Self {
            path: path.to_path_buf(),
            entries: Mutex::new(entries),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<String, String>> {
        self.entries
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Replaces the cached map with what is on disk now.
    fn refresh(&self, entries: &mut HashMap<String, String>) -> Result<(), StoreError> {
        *entries = load_entries(&self.path)?;
        Ok(())
    }

    fn save(&self, entries: &HashMap<String, String>) -> Result<(), StoreError> {
        let store_file = StoreFile {
            version: STORE_VERSION,
            entries: entries.clone(),
        };
        let content = serde_json::to_string_pretty(&store_file).map_err(StoreError::Encode)?;

        let parent_dir = match self.path.parent() {
            Some(dir) if !dir.as_os_str().is_empty() => dir,
            _ => Path::new("."),
        };
        fs_err::create_dir_all(parent_dir).map_err(|source| StoreError::Io {
            context: "create store directory".to_string(),
            source,
        })?;

        let mut temp_file = NamedTempFile::new_in(parent_dir).map_err(|source| StoreError::Io {
            context: "create temp store file".to_string(),
            source,
        })?;
        temp_file
            .write_all(content.as_bytes())
            .map_err(|source| StoreError::Io {
                context: "write temp store file".to_string(),
                source,
            })?;
        temp_file.flush().map_err(|source| StoreError::Io {
            context: "flush temp store file".to_string(),
            source,
        })?;
        temp_file
            .persist(&self.path)
            .map_err(|err| StoreError::Io {
                context: format!("persist {}", self.path.display()),
                source: err.error,
            })?;
        Ok(())
    }
}

impl DeviceStore for FileDeviceStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        let mut entries = self.lock();
        self.refresh(&mut entries)?;
        Ok(entries.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        let mut entries = self.lock();
        self.refresh(&mut entries)?;
        let previous = entries.insert(key.to_string(), value.to_string());
        if let Err(err) = self.save(&entries) {
            // Keep memory and disk in agreement.
            match previous {
                Some(old) => entries.insert(key.to_string(), old),
                None => entries.remove(key),
            };
            return Err(err);
        }
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StoreError> {
        let mut entries = self.lock();
        self.refresh(&mut entries)?;
        let Some(previous) = entries.remove(key) else {
            return Ok(());
        };
        if let Err(err) = self.save(&entries) {
            entries.insert(key.to_string(), previous);
            return Err(err);
        }
        Ok(())
    }
}

fn load_entries(path: &Path) -> Result<HashMap<String, String>, StoreError> {
    let content = match fs_err::read_to_string(path) {
        Ok(content) => content,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(HashMap::new()),
        Err(source) => {
            return Err(StoreError::Io {
                context: "read store file".to_string(),
                source,
            })
        }
    };

    if content.trim().is_empty() {
        warn!(path = %path.display(), "Empty device store file, starting fresh");
        return Ok(HashMap::new());
    }

    match serde_json::from_str::<StoreFile>(&content) {
        Ok(file) if file.version == STORE_VERSION => Ok(file.entries),
        Ok(file) => {
            warn!(
                path = %path.display(),
                version = file.version,
                expected = STORE_VERSION,
                "Unsupported device store version, starting fresh"
            );
            Ok(HashMap::new())
        }
        Err(err) => {
            warn!(path = %path.display(), error = %err, "Corrupt device store file, starting fresh");
            Ok(HashMap::new())
        }
    }
}
