use crate::error::{ReorderError, StoreError};
use crate::exchange;
use crate::filter::{TaskFilter, filter};
use crate::persistence::{KeyValueStore, Persistence};
use crate::stats::Stats;
use crate::task::{NewTask, Task, TaskId};
use std::collections::{HashMap, HashSet};
use tracing::{debug, info, warn};

/// Hands out ids that are never reused for the lifetime of a store.
///
/// `next` is `None` once the id space is used up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct IdSequence {
    next: Option<TaskId>,
}

impl IdSequence {
    fn after(tasks: &[Task]) -> Self {
        let next = match tasks.iter().map(Task::id).max() {
            Some(highest) => highest.successor(),
            None => Some(TaskId::FIRST),
        };
        Self { next }
    }

    fn peek(&self) -> Option<TaskId> {
        self.next
    }

    fn advance(&mut self) -> Option<TaskId> {
        let id = self.next?;
        self.next = id.successor();
        Some(id)
    }

    /// Whether `count` more ids can be handed out.
    fn has_room_for(&self, count: usize) -> bool {
        match (self.next, count) {
            (_, 0) => true,
            (None, _) => false,
            (Some(next), count) => next.value().checked_add(count as u64 - 1).is_some(),
        }
    }

    /// The sequence that is further along of the two.
    fn furthest(self, other: Self) -> Self {
        match (self.next, other.next) {
            (Some(mine), Some(theirs)) if theirs > mine => other,
            (Some(_), None) => other,
            _ => self,
        }
    }
}

/// Owner of the ordered task list.
///
/// Every mutation writes the full list back to storage before returning.
/// Blank text and unknown ids are not errors: the operation does nothing and
/// reports `Ok(None)` or `Ok(false)`.
#[derive(Debug)]
pub struct TaskStore<S> {
    tasks: Vec<Task>,
    ids: IdSequence,
    persistence: Persistence<S>,
}

impl<S: KeyValueStore> TaskStore<S> {
    /// Opens the store over the default slot.
    ///
    /// A slot that cannot be read or decoded is logged and treated as empty;
    /// it is overwritten by the next mutation.
    pub fn open(storage: S) -> Self {
        Self::from_persistence(Persistence::new(storage))
    }

    pub fn open_with_key(storage: S, key: impl Into<String>) -> Self {
        Self::from_persistence(Persistence::with_key(storage, key))
    }

    fn from_persistence(persistence: Persistence<S>) -> Self {
        let tasks = match persistence.load() {
            Ok(tasks) => tasks,
            Err(err) => {
                warn!(key = persistence.key(), error = %err, "discarding unreadable task list");
                Vec::new()
            }
        };
        debug!(key = persistence.key(), count = tasks.len(), "opened task store");
        Self {
            ids: IdSequence::after(&tasks),
            tasks,
            persistence,
        }
    }

    /// All tasks in list order.
    pub fn all(&self) -> &[Task] {
        &self.tasks
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    pub fn get(&self, id: TaskId) -> Option<&Task> {
        self.tasks.iter().find(|task| task.id() == id)
    }

    pub fn position(&self, id: TaskId) -> Option<usize> {
        self.tasks.iter().position(|task| task.id() == id)
    }

    pub fn storage(&self) -> &S {
        self.persistence.storage()
    }

    pub fn into_storage(self) -> S {
        self.persistence.into_storage()
    }

    pub fn filtered(&self, criteria: &TaskFilter) -> Vec<&Task> {
        filter(&self.tasks, criteria)
    }

    pub fn stats(&self) -> Stats {
        Stats::of(&self.tasks)
    }

    /// Appends a new task and returns it.
    #[tracing::instrument(skip(self))]
    pub fn create(&mut self, new_task: NewTask) -> Result<Option<Task>, StoreError> {
        let id = self.ids.peek().ok_or(StoreError::IdsExhausted)?;
        let Some(task) = Task::new(id, new_task) else {
            debug!("ignoring task with blank text");
            return Ok(None);
        };
        self.ids.advance();
        self.tasks.push(task.clone());
        self.persist()?;
        debug!(id = %task.id(), "created task");
        Ok(Some(task))
    }

    /// Applies `mutator` to the task with the given id.
    #[tracing::instrument(skip(self, mutator))]
    pub fn update(
        &mut self,
        id: TaskId,
        mutator: impl FnOnce(&mut Task),
    ) -> Result<bool, StoreError> {
        let Some(task) = self.tasks.iter_mut().find(|task| task.id() == id) else {
            debug!("no task to update");
            return Ok(false);
        };
        mutator(task);
        self.persist()?;
        debug!("updated task");
        Ok(true)
    }

    pub fn toggle_complete(&mut self, id: TaskId) -> Result<bool, StoreError> {
        self.update(id, Task::toggle_complete)
    }

    pub fn rename(&mut self, id: TaskId, new_text: &str) -> Result<bool, StoreError> {
        if new_text.trim().is_empty() {
            debug!(%id, "ignoring rename to blank text");
            return Ok(false);
        }
        self.update(id, |task| {
            task.set_text(new_text);
        })
    }

    #[tracing::instrument(skip(self))]
    pub fn delete(&mut self, id: TaskId) -> Result<bool, StoreError> {
        let before = self.tasks.len();
        self.tasks.retain(|task| task.id() != id);
        if self.tasks.len() == before {
            debug!("no task to delete");
            return Ok(false);
        }
        self.persist()?;
        debug!("deleted task");
        Ok(true)
    }

    /// Puts the tasks in the order given. `order` must name every task exactly
    /// once; otherwise nothing changes.
    #[tracing::instrument(skip(self))]
    pub fn reorder(&mut self, order: &[TaskId]) -> Result<(), StoreError> {
        let positions: HashMap<TaskId, usize> = self
            .tasks
            .iter()
            .enumerate()
            .map(|(index, task)| (task.id(), index))
            .collect();
        let mut seen = HashSet::with_capacity(order.len());
        for id in order {
            if !positions.contains_key(id) {
                return Err(ReorderError::Unknown(*id).into());
            }
            if !seen.insert(*id) {
                return Err(ReorderError::Duplicate(*id).into());
            }
        }
        if let Some(missing) = self.tasks.iter().find(|task| !seen.contains(&task.id())) {
            return Err(ReorderError::Missing(missing.id()).into());
        }

        let mut slots: Vec<Option<Task>> =
            std::mem::take(&mut self.tasks).into_iter().map(Some).collect();
        self.tasks = order
            .iter()
            .filter_map(|id| slots[positions[id]].take())
            .collect();
        self.persist()?;
        debug!("reordered tasks");
        Ok(())
    }

    /// Moves one task to `index`, clamped to the end of the list.
    pub fn move_to(&mut self, id: TaskId, index: usize) -> Result<bool, StoreError> {
        let Some(from) = self.position(id) else {
            debug!(%id, "no task to move");
            return Ok(false);
        };
        let mut order: Vec<TaskId> = self.tasks.iter().map(Task::id).collect();
        let moved = order.remove(from);
        order.insert(index.min(order.len()), moved);
        self.reorder(&order)?;
        Ok(true)
    }

    /// The whole list as a `tasks.json` document.
    pub fn export(&self) -> Result<Vec<u8>, StoreError> {
        exchange::export(&self.tasks).map_err(StoreError::Serialize)
    }

    /// Appends every task in `blob` with fresh ids, or nothing at all if the
    /// document is rejected.
    #[tracing::instrument(skip(self, blob), fields(bytes = blob.len()))]
    pub fn import_append(&mut self, blob: &[u8]) -> Result<Vec<TaskId>, StoreError> {
        let records = exchange::decode_import(blob)?;
        if !self.ids.has_room_for(records.len()) {
            return Err(StoreError::IdsExhausted);
        }
        let mut imported = Vec::with_capacity(records.len());
        for record in records {
            let id = self.ids.advance().ok_or(StoreError::IdsExhausted)?;
            self.tasks.push(record.into_task(id));
            imported.push(id);
        }
        self.persist()?;
        info!(count = imported.len(), "imported tasks");
        Ok(imported)
    }

    /// Replaces the list with what is currently in storage. On failure the
    /// list is left as it was.
    pub fn reload(&mut self) -> Result<(), StoreError> {
        let tasks = self.persistence.load()?;
        self.ids = self.ids.furthest(IdSequence::after(&tasks));
        self.tasks = tasks;
        Ok(())
    }

    fn persist(&mut self) -> Result<(), StoreError> {
        self.persistence
            .save(&self.tasks)
            .inspect_err(|err| warn!(error = %err, "failed to persist task list"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::StorageError;
    use crate::persistence::{DEFAULT_STORAGE_KEY, MemoryStore, MockKeyValueStore};
    use crate::task::{Category, Priority};

    fn store_with(texts: &[&str]) -> TaskStore<MemoryStore> {
        let mut store = TaskStore::open(MemoryStore::new());
        for text in texts {
            store.create(NewTask::new(*text)).unwrap();
        }
        store
    }

    fn ids(store: &TaskStore<MemoryStore>) -> Vec<u64> {
        store.all().iter().map(|task| task.id().value()).collect()
    }

    fn persisted(store: &TaskStore<MemoryStore>) -> Vec<Task> {
        Persistence::new(store.storage().clone()).load().unwrap()
    }

    #[test]
    fn can_open_empty_store() {
        let store = TaskStore::open(MemoryStore::new());

        assert!(store.is_empty());
    }

    #[test]
    fn can_create_task() {
        let mut store = TaskStore::open(MemoryStore::new());

        let task = store
            .create(
                NewTask::new("  Buy milk ")
                    .category(Category::Personal)
                    .priority(Priority::Low),
            )
            .unwrap()
            .unwrap();

        assert_eq!(task.id(), TaskId::FIRST);
        assert_eq!(task.text(), "Buy milk");
        assert_eq!(store.all(), &[task]);
    }

    #[test]
    fn create_persists_immediately() {
        let store = store_with(&["Buy milk"]);

        assert_eq!(persisted(&store), store.all());
    }

    #[test]
    fn cannot_create_task_with_blank_text() {
        let mut store = store_with(&["Buy milk"]);

        let created = store.create(NewTask::new("   ")).unwrap();

        assert_eq!(created, None);
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn blank_create_does_not_consume_an_id() {
        let mut store = TaskStore::open(MemoryStore::new());
        store.create(NewTask::new("")).unwrap();

        let task = store.create(NewTask::new("First")).unwrap().unwrap();

        assert_eq!(task.id(), TaskId::FIRST);
    }

    #[test]
    fn ids_are_not_reused_after_delete() {
        let mut store = store_with(&["one", "two", "three"]);
        store.delete(TaskId::new(3)).unwrap();

        let task = store.create(NewTask::new("four")).unwrap().unwrap();

        assert_eq!(task.id(), TaskId::new(4));
    }

    #[test]
    fn reopening_continues_after_highest_id() {
        let store = store_with(&["one", "two"]);
        let mut reopened = TaskStore::open(store.into_storage());

        let task = reopened.create(NewTask::new("three")).unwrap().unwrap();

        assert_eq!(task.id(), TaskId::new(3));
        assert_eq!(reopened.len(), 3);
    }

    #[test]
    fn update_applies_mutator_and_persists() {
        let mut store = store_with(&["Buy milk"]);

        let found = store
            .update(TaskId::FIRST, |task| task.set_priority(Priority::High))
            .unwrap();

        assert!(found);
        assert_eq!(store.all()[0].priority(), Priority::High);
        assert_eq!(persisted(&store)[0].priority(), Priority::High);
    }

    #[test]
    fn update_of_unknown_id_is_a_no_op() {
        let mut store = store_with(&["Buy milk"]);
        let before = store.all().to_vec();

        let found = store
            .update(TaskId::new(99), |task| task.set_completed(true))
            .unwrap();

        assert!(!found);
        assert_eq!(store.all(), before.as_slice());
    }

    #[test]
    fn toggle_complete_twice_restores_state() {
        let mut store = store_with(&["Buy milk"]);

        store.toggle_complete(TaskId::FIRST).unwrap();
        assert!(store.all()[0].is_completed());
        store.toggle_complete(TaskId::FIRST).unwrap();

        assert!(!store.all()[0].is_completed());
    }

    #[test]
    fn can_rename_task() {
        let mut store = store_with(&["Buy milk"]);

        assert!(store.rename(TaskId::FIRST, " Buy oat milk ").unwrap());

        assert_eq!(store.all()[0].text(), "Buy oat milk");
    }

    #[test]
    fn cannot_rename_to_blank_text() {
        let mut store = store_with(&["Buy milk"]);

        assert!(!store.rename(TaskId::FIRST, "  ").unwrap());

        assert_eq!(store.all()[0].text(), "Buy milk");
    }

    #[test]
    fn can_delete_task() {
        let mut store = store_with(&["one", "two", "three"]);

        assert!(store.delete(TaskId::new(2)).unwrap());

        assert_eq!(ids(&store), vec![1, 3]);
        assert_eq!(persisted(&store).len(), 2);
    }

    #[test]
    fn delete_of_unknown_id_is_a_no_op() {
        let mut store = store_with(&["one"]);

        assert!(!store.delete(TaskId::new(7)).unwrap());
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn can_reorder_with_permutation() {
        let mut store = store_with(&["one", "two", "three"]);

        store
            .reorder(&[TaskId::new(3), TaskId::new(1), TaskId::new(2)])
            .unwrap();

        assert_eq!(ids(&store), vec![3, 1, 2]);
        let persisted_ids: Vec<u64> = persisted(&store)
            .iter()
            .map(|task| task.id().value())
            .collect();
        assert_eq!(persisted_ids, vec![3, 1, 2]);
    }

    #[test]
    fn cannot_reorder_with_unknown_id() {
        let mut store = store_with(&["one", "two"]);

        let result = store.reorder(&[TaskId::new(2), TaskId::new(1), TaskId::new(9)]);

        assert!(matches!(
            result,
            Err(StoreError::Reorder(ReorderError::Unknown(id))) if id == TaskId::new(9)
        ));
        assert_eq!(ids(&store), vec![1, 2]);
    }

    #[test]
    fn cannot_reorder_with_duplicate_id() {
        let mut store = store_with(&["one", "two"]);

        let result = store.reorder(&[TaskId::new(2), TaskId::new(2)]);

        assert!(matches!(
            result,
            Err(StoreError::Reorder(ReorderError::Duplicate(id))) if id == TaskId::new(2)
        ));
        assert_eq!(ids(&store), vec![1, 2]);
    }

    #[test]
    fn cannot_reorder_with_missing_id() {
        let mut store = store_with(&["one", "two", "three"]);

        let result = store.reorder(&[TaskId::new(3), TaskId::new(1)]);

        assert!(matches!(
            result,
            Err(StoreError::Reorder(ReorderError::Missing(id))) if id == TaskId::new(2)
        ));
        assert_eq!(ids(&store), vec![1, 2, 3]);
    }

    #[test]
    fn can_move_task_forward_and_back() {
        let mut store = store_with(&["one", "two", "three", "four"]);

        assert!(store.move_to(TaskId::new(1), 2).unwrap());
        assert_eq!(ids(&store), vec![2, 3, 1, 4]);

        assert!(store.move_to(TaskId::new(4), 0).unwrap());
        assert_eq!(ids(&store), vec![4, 2, 3, 1]);
    }

    #[test]
    fn move_clamps_index_to_end() {
        let mut store = store_with(&["one", "two", "three"]);

        store.move_to(TaskId::new(1), 100).unwrap();

        assert_eq!(ids(&store), vec![2, 3, 1]);
    }

    #[test]
    fn move_of_unknown_id_is_a_no_op() {
        let mut store = store_with(&["one", "two"]);

        assert!(!store.move_to(TaskId::new(5), 0).unwrap());
        assert_eq!(ids(&store), vec![1, 2]);
    }

    #[test]
    fn import_appends_with_fresh_ids() {
        let mut store = store_with(&["one", "two"]);
        let blob = br#"[
            {"id": 1, "text": "imported a", "category": "work", "priority": "high"},
            {"id": 1, "text": "imported b", "category": "other", "priority": "low", "completed": true}
        ]"#;

        let imported = store.import_append(blob).unwrap();

        assert_eq!(imported, vec![TaskId::new(3), TaskId::new(4)]);
        assert_eq!(ids(&store), vec![1, 2, 3, 4]);
        assert_eq!(store.all()[3].text(), "imported b");
        assert!(store.all()[3].is_completed());
        assert_eq!(persisted(&store).len(), 4);
    }

    #[test]
    fn failed_import_leaves_store_untouched() {
        let mut store = store_with(&["one"]);
        let before = store.all().to_vec();

        let result = store.import_append(b"not json");

        assert!(matches!(result, Err(StoreError::Import(_))));
        assert_eq!(store.all(), before.as_slice());
        assert_eq!(persisted(&store), before);
    }

    #[test]
    fn import_is_all_or_nothing() {
        let mut store = store_with(&["one"]);
        let blob = br#"[
            {"text": "fine", "category": "work", "priority": "high"},
            {"text": "broken", "category": "work", "priority": "urgent"}
        ]"#;

        assert!(store.import_append(blob).is_err());
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn export_matches_current_order() {
        let mut store = store_with(&["one", "two"]);
        store.reorder(&[TaskId::new(2), TaskId::new(1)]).unwrap();

        let exported: serde_json::Value = serde_json::from_slice(&store.export().unwrap()).unwrap();

        assert_eq!(exported[0]["text"], "two");
        assert_eq!(exported[1]["text"], "one");
    }

    #[test]
    fn open_falls_back_to_empty_on_malformed_slot() {
        let mut store = TaskStore::open(MemoryStore::with_slot(DEFAULT_STORAGE_KEY, "{{{"));

        assert!(store.is_empty());

        store.create(NewTask::new("fresh start")).unwrap();
        assert_eq!(persisted(&store).len(), 1);
    }

    #[test]
    fn reload_picks_up_external_changes() {
        let mut store = store_with(&["one"]);
        let mut other = TaskStore::open(store.storage().clone());
        other.create(NewTask::new("two")).unwrap();
        store.persistence = Persistence::new(other.into_storage());

        store.reload().unwrap();

        assert_eq!(ids(&store), vec![1, 2]);
        let next = store.create(NewTask::new("three")).unwrap().unwrap();
        assert_eq!(next.id(), TaskId::new(3));
    }

    #[test]
    fn failed_reload_keeps_current_list() {
        let mut store = store_with(&["keep me"]);
        store.persistence = Persistence::new(MemoryStore::with_slot(DEFAULT_STORAGE_KEY, "nope"));

        assert!(store.reload().is_err());
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn ids_stay_distinct_after_loading_the_last_possible_id() {
        let slot = r#"[
            {"id": 18446744073709551615, "text": "a", "category": "work", "priority": "low"},
            {"text": "b", "category": "work", "priority": "low"}
        ]"#;
        let mut store = TaskStore::open(MemoryStore::with_slot(DEFAULT_STORAGE_KEY, slot));

        store.create(NewTask::new("c")).unwrap();

        assert_eq!(ids(&store), vec![1, 2, 3]);
    }

    #[test]
    fn cannot_create_once_ids_run_out() {
        let slot = r#"[{"id": 18446744073709551614, "text": "a", "category": "work", "priority": "low"}]"#;
        let mut store = TaskStore::open(MemoryStore::with_slot(DEFAULT_STORAGE_KEY, slot));

        let last = store.create(NewTask::new("b")).unwrap().unwrap();
        let result = store.create(NewTask::new("c"));

        assert_eq!(last.id(), TaskId::new(u64::MAX));
        assert!(matches!(result, Err(StoreError::IdsExhausted)));
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn cannot_import_more_tasks_than_ids_left() {
        let slot = r#"[{"id": 18446744073709551614, "text": "a", "category": "work", "priority": "low"}]"#;
        let mut store = TaskStore::open(MemoryStore::with_slot(DEFAULT_STORAGE_KEY, slot));
        let blob = br#"[
            {"text": "b", "category": "work", "priority": "low"},
            {"text": "c", "category": "work", "priority": "low"}
        ]"#;

        let result = store.import_append(blob);

        assert!(matches!(result, Err(StoreError::IdsExhausted)));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn blank_stored_task_does_not_cost_the_rest_of_the_list() {
        let slot = r#"[
            {"id": 1, "text": "Keep me", "category": "work", "priority": "low"},
            {"id": 2, "text": "", "category": "work", "priority": "low"}
        ]"#;
        let mut store = TaskStore::open(MemoryStore::with_slot(DEFAULT_STORAGE_KEY, slot));

        store.create(NewTask::new("new")).unwrap();

        let texts: Vec<String> = persisted(&store)
            .iter()
            .map(|task| task.text().to_string())
            .collect();
        assert_eq!(texts, vec!["Keep me", "new"]);
    }

    #[test]
    fn write_failure_is_reported() {
        let mut storage = MockKeyValueStore::new();
        storage.expect_get().returning(|_| Ok(None));
        storage.expect_set().returning(|key, _| {
            Err(StorageError::Write {
                key: key.to_string(),
                message: "quota exceeded".to_string(),
            })
        });
        let mut store = TaskStore::open(storage);

        let result = store.create(NewTask::new("Buy milk"));

        assert!(matches!(
            result,
            Err(StoreError::Storage(StorageError::Write { .. }))
        ));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn open_survives_read_failure() {
        let mut storage = MockKeyValueStore::new();
        storage.expect_get().returning(|key| {
            Err(StorageError::Read {
                key: key.to_string(),
                message: "denied".to_string(),
            })
        });

        let store = TaskStore::open(storage);

        assert!(store.is_empty());
    }

    #[test]
    fn no_op_operations_do_not_write() {
        let mut storage = MockKeyValueStore::new();
        storage.expect_get().returning(|_| Ok(None));
        storage.expect_set().never();
        let mut store = TaskStore::open(storage);

        store.create(NewTask::new(" ")).unwrap();
        store.toggle_complete(TaskId::new(1)).unwrap();
        store.rename(TaskId::new(1), "x").unwrap();
        store.delete(TaskId::new(1)).unwrap();
        store.move_to(TaskId::new(1), 0).unwrap();
    }
}
