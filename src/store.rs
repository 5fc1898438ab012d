// Task store: in-memory task list persisted through a key-value adapter

use crate::codec;
use crate::filter::Filter;
use crate::record::Record;
use crate::storage::KeyValueStore;
use crate::task::{Task, new_id};
use tracing::{debug, error, info};

/// Derived completion counts
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Counts {
    pub remaining: usize,
    pub completed: usize,
}

impl Counts {
    pub fn total(&self) -> usize {
        self.remaining + self.completed
    }
}

/// Single source of truth for the task list
///
/// Tasks are kept newest first. Every successful mutation writes the whole
/// list back to the storage adapter. Unknown ids and blank titles are silent
/// no-ops; a failed write is logged and leaves the in-memory list as is.
pub struct TaskStore<S: KeyValueStore> {
    storage: S,
    tasks: Vec<Task>,
    last_persist_ok: bool,
}

impl<S: KeyValueStore> TaskStore<S> {
    /// Load the task list from storage
    ///
    /// A missing or corrupt payload yields an empty list; this never fails.
    pub fn load(storage: S) -> Self {
        let bytes = storage.read(Task::storage_key());
        let tasks: Vec<Task> = codec::decode_list(bytes.as_deref());

        info!(count = tasks.len(), "Loaded tasks");

        Self {
            storage,
            tasks,
            last_persist_ok: true,
        }
    }

    // ========================================================================
    // Mutations
    // ========================================================================

    /// Add a task at the front of the list, returning its id
    ///
    /// Returns `None` without touching storage when the trimmed title is empty.
    pub fn add(&mut self, title: &str) -> Option<String> {
        let title = title.trim();
        if title.is_empty() {
            return None;
        }

        let mut task = Task::new(title);
        while self.contains(&task.id) {
            task.id = new_id();
        }

        let id = task.id.clone();
        debug!(id = %id, "Adding task");
        self.tasks.insert(0, task);
        self.persist();

        Some(id)
    }

    /// Flip the completion flag of a task. Returns false if the id is unknown.
    pub fn toggle(&mut self, id: &str) -> bool {
        let Some(task) = self.tasks.iter_mut().find(|t| t.id == id) else {
            return false;
        };

        task.completed = !task.completed;
        debug!(id, completed = task.completed, "Toggled task");
        self.persist();
        true
    }

    /// Remove a task. Returns false if the id is unknown.
    pub fn delete(&mut self, id: &str) -> bool {
        let Some(index) = self.tasks.iter().position(|t| t.id == id) else {
            return false;
        };

        self.tasks.remove(index);
        debug!(id, "Deleted task");
        self.persist();
        true
    }

    /// Replace a task's title
    ///
    /// The new title is trimmed. A blank title, an unchanged title, or an
    /// unknown id leaves everything untouched and returns false.
    pub fn update_title(&mut self, id: &str, new_title: &str) -> bool {
        let new_title = new_title.trim();
        if new_title.is_empty() {
            return false;
        }

        let Some(task) = self.tasks.iter_mut().find(|t| t.id == id) else {
            return false;
        };

        if task.title == new_title {
            return false;
        }

        task.title = new_title.to_string();
        debug!(id, "Updated task title");
        self.persist();
        true
    }

    /// Remove every completed task, returning how many were removed
    ///
    /// Always persists, even when nothing was removed.
    pub fn clear_completed(&mut self) -> usize {
        let before = self.tasks.len();
        self.tasks.retain(|t| !t.completed);
        let removed = before - self.tasks.len();

        debug!(removed, "Cleared completed tasks");
        self.persist();
        removed
    }

    // ========================================================================
    // Reads
    // ========================================================================

    /// Tasks visible under `filter`, in list order
    pub fn filtered(&self, filter: Filter) -> Vec<&Task> {
        self.tasks.iter().filter(|t| filter.matches(t)).collect()
    }

    pub fn counts(&self) -> Counts {
        let completed = self.tasks.iter().filter(|t| t.completed).count();
        Counts {
            remaining: self.tasks.len() - completed,
            completed,
        }
    }

    /// Full list, newest first
    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn get(&self, id: &str) -> Option<&Task> {
        self.tasks.iter().find(|t| t.id == id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.get(id).is_some()
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    /// Whether the most recent write reached storage
    pub fn last_persist_ok(&self) -> bool {
        self.last_persist_ok
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    pub fn storage_mut(&mut self) -> &mut S {
        &mut self.storage
    }

    // ========================================================================
    // Helper methods
    // ========================================================================

    fn persist(&mut self) {
        let key = Task::storage_key();
        let result = codec::encode_list(&self.tasks).and_then(|bytes| self.storage.write(key, &bytes));

        match result {
            Ok(()) => {
                debug!(key, count = self.tasks.len(), "Persisted tasks");
                self.last_persist_ok = true;
            }
            Err(e) => {
                error!(key, error = ?e, "Failed to persist tasks, change kept in memory only");
                self.last_persist_ok = false;
            }
        }
    }
}
