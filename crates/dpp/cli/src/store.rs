//! Directory-backed record store

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use dpp_engine::RecordStore;
use dpp_types::DppError;
use tracing::debug;

/// One `<key>.json` file per record under a root directory.
///
/// Writes go to a sibling temporary file first and are renamed into place, so a reader
/// never observes a half-written record.
#[derive(Debug, Clone)]
pub struct DirectoryStore {
    root: PathBuf,
}

impl DirectoryStore {
    /// Open the store, creating the directory if needed.
    pub fn open(root: impl Into<PathBuf>) -> Result<Self, DppError> {
        let root = root.into();
        fs::create_dir_all(&root).map_err(|e| {
            DppError::Store(format!("cannot create {}: {}", root.display(), e))
        })?;
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn path_for(&self, key: &str) -> Result<PathBuf, DppError> {
        let well_formed = !key.is_empty()
            && !key.starts_with('.')
            && key
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'));
        if !well_formed {
            return Err(DppError::Store(format!(
                "key '{}' cannot be used as a file name",
                key
            )));
        }
        Ok(self.root.join(format!("{}.json", key)))
    }
}

impl RecordStore for DirectoryStore {
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>, DppError> {
        let path = self.path_for(key)?;
        match fs::read(&path) {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(DppError::Store(format!(
                "cannot read {}: {}",
                path.display(),
                e
            ))),
        }
    }

    fn put(&self, key: &str, value: Vec<u8>) -> Result<(), DppError> {
        let path = self.path_for(key)?;
        let staging = path.with_extension("json.tmp");
        fs::write(&staging, &value)
            .and_then(|_| fs::rename(&staging, &path))
            .map_err(|e| DppError::Store(format!("cannot write {}: {}", path.display(), e)))?;
        debug!(key, bytes = value.len(), "record written");
        Ok(())
    }
}
