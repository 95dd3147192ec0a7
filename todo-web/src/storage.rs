//! Browser-side storage for the task list.

use gloo_storage::{LocalStorage, Storage};
use todo_list::{KeyValueStore, StorageError};

/// `window.localStorage`, one raw string per key.
///
/// Values are stored exactly as given (no extra JSON encoding), so the slot
/// stays readable by anything else that looks at it.
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalStorageStore;

impl KeyValueStore for LocalStorageStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        LocalStorage::raw()
            .get_item(key)
            .map_err(|err| StorageError::Read {
                key: key.to_string(),
                message: format!("{err:?}"),
            })
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        LocalStorage::raw()
            .set_item(key, value)
            .map_err(|err| StorageError::Write {
                key: key.to_string(),
                message: format!("{err:?}"),
            })
    }
}
