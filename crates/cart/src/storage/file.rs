//! File-backed cart storage.

use std::fs::{self, File};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use tracing::debug;
use uuid::Uuid;

use crate::error::StorageError;
use crate::line_item::LineItem;

use super::{CartStorage, StorageKey};

/// Cart storage keeping one `<key>.json` file per cart in a directory.
///
/// The directory is created on the first write. Each write goes to a
/// temporary file in the same directory which is then renamed over the
/// record once its contents are synced to disk, so readers never observe a
/// partially written cart.
#[derive(Debug, Clone)]
pub struct FileStorage {
    dir: PathBuf,
}

impl FileStorage {
    #[must_use]
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path of the record stored under `key`.
    #[must_use]
    pub fn path_for(&self, key: &StorageKey) -> PathBuf {
        self.dir.join(format!("{key}.json"))
    }

    /// Write `bytes` to a new file at `path` and flush them to disk.
    fn write_synced(path: &Path, bytes: &[u8]) -> std::io::Result<()> {
        let mut file = File::create(path)?;
        file.write_all(bytes)?;
        file.sync_all()
    }

    fn io_error(path: &Path, source: std::io::Error) -> StorageError {
        StorageError::Io {
            path: path.to_path_buf(),
            source,
        }
    }
}

impl CartStorage for FileStorage {
    fn load(&self, key: &StorageKey) -> Result<Option<Vec<LineItem>>, StorageError> {
        let path = self.path_for(key);
        let bytes = match fs::read(&path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(Self::io_error(&path, e)),
        };

        let items = serde_json::from_slice(&bytes).map_err(|source| StorageError::Serialization {
            key: key.to_string(),
            source,
        })?;
        Ok(Some(items))
    }

    fn save(&self, key: &StorageKey, items: &[LineItem]) -> Result<(), StorageError> {
        let json = serde_json::to_vec_pretty(items).map_err(|source| StorageError::Serialization {
            key: key.to_string(),
            source,
        })?;

        fs::create_dir_all(&self.dir).map_err(|e| Self::io_error(&self.dir, e))?;

        let path = self.path_for(key);
        let tmp = self.dir.join(format!(".{key}.{}.tmp", Uuid::new_v4().simple()));
        if let Err(e) = Self::write_synced(&tmp, &json) {
            let _ = fs::remove_file(&tmp);
            return Err(Self::io_error(&tmp, e));
        }
        if let Err(e) = fs::rename(&tmp, &path) {
            let _ = fs::remove_file(&tmp);
            return Err(Self::io_error(&path, e));
        }

        debug!(path = %path.display(), bytes = json.len(), "Cart record written");
        Ok(())
    }

    fn remove(&self, key: &StorageKey) -> Result<(), StorageError> {
        let path = self.path_for(key);
        match fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(Self::io_error(&path, e)),
        }
    }
}
