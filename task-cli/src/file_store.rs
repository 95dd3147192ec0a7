use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use todo_list::{KeyValueStore, StorageError};

/// Keeps each storage slot as `<key>.json` inside one directory.
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    pub fn new(dir: impl AsRef<Path>) -> Self {
        Self {
            dir: dir.as_ref().to_path_buf(),
        }
    }

    pub fn slot_path(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.json"))
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        match fs::read_to_string(self.slot_path(key)) {
            Ok(contents) => Ok(Some(contents)),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(None),
            Err(err) => Err(StorageError::Read {
                key: key.to_string(),
                message: err.to_string(),
            }),
        }
    }

    /// Writes next to the slot and renames over it, so a crash never leaves
    /// a half-written list behind.
    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        let write_error = |err: std::io::Error| StorageError::Write {
            key: key.to_string(),
            message: err.to_string(),
        };
        fs::create_dir_all(&self.dir).map_err(write_error)?;
        let path = self.slot_path(key);
        let staging = path.with_extension("json.tmp");
        fs::write(&staging, value).map_err(write_error)?;
        fs::rename(&staging, &path).map_err(write_error)?;
        tracing::trace!(path = %path.display(), bytes = value.len(), "wrote storage slot");
        Ok(())
    }
}
