use crate::error::{StorageError, StoreError};
use crate::record::{TaskRecord, decode_stored};
use crate::task::{Task, TaskId};
use std::collections::{HashMap, HashSet};
use tracing::warn;

/// Slot name the task list is kept under unless told otherwise.
pub const DEFAULT_STORAGE_KEY: &str = "tasks";

/// A string-to-string blob store, such as browser local storage or a directory of files.
#[cfg_attr(test, mockall::automock)]
pub trait KeyValueStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;
    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError>;
}

/// In-process store, useful for tests and for embedding without any backing storage.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MemoryStore {
    slots: HashMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_slot(key: impl Into<String>, value: impl Into<String>) -> Self {
        let mut store = Self::new();
        store.slots.insert(key.into(), value.into());
        store
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.slots.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        self.slots.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// Reads and writes the whole task list as one JSON array in a single storage slot.
#[derive(Debug)]
pub struct Persistence<S> {
    storage: S,
    key: String,
}

impl<S: KeyValueStore> Persistence<S> {
    pub fn new(storage: S) -> Self {
        Self::with_key(storage, DEFAULT_STORAGE_KEY)
    }

    pub fn with_key(storage: S, key: impl Into<String>) -> Self {
        Self {
            storage,
            key: key.into(),
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    pub fn into_storage(self) -> S {
        self.storage
    }

    /// Overwrites the slot with the given list.
    pub fn save(&mut self, tasks: &[Task]) -> Result<(), StoreError> {
        let blob = serde_json::to_string(tasks).map_err(StoreError::Serialize)?;
        self.storage.set(&self.key, &blob)?;
        Ok(())
    }

    /// Reads the slot. An absent slot is an empty list.
    ///
    /// Records with blank text are dropped rather than failing the whole list.
    pub fn load(&self) -> Result<Vec<Task>, StoreError> {
        let Some(blob) = self.storage.get(&self.key)? else {
            return Ok(Vec::new());
        };
        let records = decode_stored(blob.as_bytes())?;
        Ok(restore_ids(records))
    }
}

/// Keeps every stored id that is usable and not already taken, and numbers
/// the remaining records after the highest kept id.
///
/// If the numbering would run past the end of the id space, the whole list is
/// renumbered from [`TaskId::FIRST`] in list order instead.
fn restore_ids(records: Vec<TaskRecord>) -> Vec<Task> {
    let mut taken = HashSet::new();
    let kept: Vec<Option<TaskId>> = records
        .iter()
        .map(|record| record.stored_id().filter(|id| taken.insert(*id)))
        .collect();
    let fresh = kept.iter().filter(|id| id.is_none()).count() as u64;
    let highest = taken.iter().max().map_or(0, |id| id.value());

    // The last id handed out here still needs a successor for the next create.
    if highest.checked_add(fresh.saturating_add(1)).is_none() {
        warn!(highest, "stored ids leave no room for new tasks, renumbering");
        return records
            .into_iter()
            .zip(TaskId::FIRST.value()..)
            .map(|(record, id)| record.into_task(TaskId::new(id)))
            .collect();
    }

    let mut next = highest + 1;
    records
        .into_iter()
        .zip(kept)
        .map(|(record, id)| {
            let id = id.unwrap_or_else(|| {
                let assigned = TaskId::new(next);
                next += 1;
                assigned
            });
            record.into_task(id)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ParseError;
    use crate::task::{Category, NewTask, Priority};
    use chrono::NaiveDate;

    fn sample_tasks() -> Vec<Task> {
        vec![
            Task::new(TaskId::new(1), NewTask::new("Buy milk")).unwrap(),
            Task::new(
                TaskId::new(4),
                NewTask::new("Ship release")
                    .category(Category::Work)
                    .priority(Priority::High)
                    .due(NaiveDate::from_ymd_opt(2024, 6, 1)),
            )
            .unwrap(),
        ]
    }

    #[test]
    fn load_of_absent_slot_is_empty() {
        let persistence = Persistence::new(MemoryStore::new());

        assert!(persistence.load().unwrap().is_empty());
    }

    #[test]
    fn save_then_load_round_trips() {
        let mut persistence = Persistence::new(MemoryStore::new());
        let mut tasks = sample_tasks();
        tasks[1].set_completed(true);

        persistence.save(&tasks).unwrap();

        assert_eq!(persistence.load().unwrap(), tasks);
    }

    #[test]
    fn save_overwrites_previous_contents() {
        let mut persistence = Persistence::new(MemoryStore::new());
        persistence.save(&sample_tasks()).unwrap();

        persistence.save(&[]).unwrap();

        assert_eq!(
            persistence.storage().get(DEFAULT_STORAGE_KEY).unwrap(),
            Some("[]".to_string())
        );
    }

    #[test]
    fn uses_configured_key() {
        let mut persistence = Persistence::with_key(MemoryStore::new(), "my-tasks");

        persistence.save(&sample_tasks()).unwrap();

        let storage = persistence.into_storage();
        assert!(storage.get("my-tasks").unwrap().is_some());
        assert!(storage.get(DEFAULT_STORAGE_KEY).unwrap().is_none());
    }

    #[test]
    fn load_reports_malformed_blob() {
        let persistence = Persistence::new(MemoryStore::with_slot(DEFAULT_STORAGE_KEY, "[{oops"));

        let result = persistence.load();

        assert!(matches!(result, Err(StoreError::Parse(ParseError::Json(_)))));
    }

    #[test]
    fn load_replaces_unusable_and_duplicate_ids() {
        let blob = r#"[
            {"id": 1714557600123.25, "text": "old", "category": "work", "priority": "low"},
            {"id": 5, "text": "five", "category": "work", "priority": "low"},
            {"id": "5", "text": "dupe", "category": "work", "priority": "low"},
            {"text": "no id", "category": "work", "priority": "low"}
        ]"#;
        let persistence = Persistence::new(MemoryStore::with_slot(DEFAULT_STORAGE_KEY, blob));

        let ids: Vec<u64> = persistence
            .load()
            .unwrap()
            .iter()
            .map(|task| task.id().value())
            .collect();

        assert_eq!(ids, vec![6, 5, 7, 8]);
    }

    #[test]
    fn load_renumbers_when_stored_ids_reach_the_end_of_the_id_space() {
        let blob = r#"[
            {"id": 18446744073709551615, "text": "a", "category": "work", "priority": "low"},
            {"text": "b", "category": "work", "priority": "low"},
            {"id": 3, "text": "c", "category": "work", "priority": "low"}
        ]"#;
        let persistence = Persistence::new(MemoryStore::with_slot(DEFAULT_STORAGE_KEY, blob));

        let ids: Vec<u64> = persistence
            .load()
            .unwrap()
            .iter()
            .map(|task| task.id().value())
            .collect();

        assert_eq!(ids, vec![1, 2, 3]);
    }

    #[test]
    fn load_renumbers_huge_fractional_ids() {
        let blob = r#"[
            {"id": 2.5e19, "text": "a", "category": "work", "priority": "low"},
            {"id": 2, "text": "b", "category": "work", "priority": "low"}
        ]"#;
        let persistence = Persistence::new(MemoryStore::with_slot(DEFAULT_STORAGE_KEY, blob));

        let ids: Vec<u64> = persistence
            .load()
            .unwrap()
            .iter()
            .map(|task| task.id().value())
            .collect();

        assert_eq!(ids, vec![3, 2]);
    }

    #[test]
    fn load_keeps_ids_just_below_the_end_of_the_id_space() {
        let blob = r#"[
            {"id": 18446744073709551613, "text": "a", "category": "work", "priority": "low"},
            {"text": "b", "category": "work", "priority": "low"}
        ]"#;
        let persistence = Persistence::new(MemoryStore::with_slot(DEFAULT_STORAGE_KEY, blob));

        let ids: Vec<u64> = persistence
            .load()
            .unwrap()
            .iter()
            .map(|task| task.id().value())
            .collect();

        assert_eq!(ids, vec![u64::MAX - 2, u64::MAX - 1]);
    }

    #[test]
    fn load_skips_records_with_blank_text() {
        let blob = r#"[
            {"id": 1, "text": "Keep me", "category": "work", "priority": "low"},
            {"id": 2, "text": "", "category": "personal", "priority": "medium"},
            {"id": 3, "text": "   ", "category": "other", "priority": "high"}
        ]"#;
        let persistence = Persistence::new(MemoryStore::with_slot(DEFAULT_STORAGE_KEY, blob));

        let tasks = persistence.load().unwrap();

        assert_eq!(tasks.len(), 1);
        assert_eq!(tasks[0].text(), "Keep me");
        assert_eq!(tasks[0].id(), TaskId::FIRST);
    }

    #[test]
    fn load_propagates_read_failure() {
        let mut storage = MockKeyValueStore::new();
        storage.expect_get().returning(|key| {
            Err(StorageError::Read {
                key: key.to_string(),
                message: "denied".to_string(),
            })
        });
        let persistence = Persistence::new(storage);

        let result = persistence.load();

        assert!(matches!(
            result,
            Err(StoreError::Storage(StorageError::Read { .. }))
        ));
    }
}
