//! The todo list store.
//!
//! [`TodoListStore`] is the single authoritative list for one screen. Every
//! presentation adapter in [`crate::patterns`] drives one of these and
//! renders from its snapshots.

use crate::types::{TaskId, TaskRecord, TodoListError};
use composable_todo_core::environment::{IdGenerator, RandomIdGenerator};
use std::collections::BTreeSet;
use std::sync::Arc;
use uuid::Uuid;

/// Generator draws tried before falling back to random ids
const MAX_REDRAWS: usize = 16;

/// Ordered list of task records with append and positional removal
///
/// Insertion order is display order. Ids come from the store's
/// [`IdGenerator`] and are unique within the list.
///
/// # Example
///
/// ```
/// use todo_list::TodoListStore;
///
/// let mut store = TodoListStore::new();
/// store.add_task("buy milk");
/// store.add_task("walk dog");
/// let removed = store.remove_task(0)?;
///
/// assert_eq!(removed.text, "buy milk");
/// assert_eq!(store.texts(), vec!["walk dog"]);
/// # Ok::<(), todo_list::TodoListError>(())
/// ```
#[derive(Clone)]
pub struct TodoListStore {
    items: Vec<TaskRecord>,
    ids: Arc<dyn IdGenerator>,
}

impl TodoListStore {
    /// Creates an empty store that assigns random ids
    #[must_use]
    pub fn new() -> Self {
        Self::with_id_generator(Arc::new(RandomIdGenerator))
    }

    /// Creates an empty store that takes ids from `ids`
    #[must_use]
    pub fn with_id_generator(ids: Arc<dyn IdGenerator>) -> Self {
        Self {
            items: Vec::new(),
            ids,
        }
    }

    /// Appends a task and returns the created record
    ///
    /// Any text is accepted, including the empty string. Deciding whether
    /// input is worth adding belongs to the caller.
    pub fn add_task(&mut self, text: impl Into<String>) -> TaskRecord {
        let id = self.fresh_id();
        let record = TaskRecord::new(id, text.into());
        self.items.push(record.clone());

        tracing::debug!(id = %record.id, len = self.items.len(), "Task added");
        record
    }

    /// Removes and returns the task at `index`
    ///
    /// Later tasks shift down by one position.
    ///
    /// # Errors
    ///
    /// Returns [`TodoListError::OutOfRange`] when `index >= len`; the list is
    /// left untouched.
    pub fn remove_task(&mut self, index: usize) -> Result<TaskRecord, TodoListError> {
        self.check_index(index)?;
        let record = self.items.remove(index);

        tracing::debug!(id = %record.id, index, len = self.items.len(), "Task removed");
        Ok(record)
    }

    /// Removes every task at the given offsets in one step
    ///
    /// Offsets refer to positions before any removal. Duplicates are
    /// ignored. The removed records are returned in ascending position order.
    ///
    /// # Errors
    ///
    /// Returns [`TodoListError::OutOfRange`] for the largest invalid offset;
    /// nothing is removed in that case.
    pub fn remove_tasks(&mut self, offsets: &[usize]) -> Result<Vec<TaskRecord>, TodoListError> {
        let offsets: BTreeSet<usize> = offsets.iter().copied().collect();
        if let Some(&last) = offsets.last() {
            self.check_index(last)?;
        }

        let mut removed: Vec<TaskRecord> = offsets
            .iter()
            .rev()
            .map(|&index| self.items.remove(index))
            .collect();
        removed.reverse();

        tracing::debug!(count = removed.len(), len = self.items.len(), "Tasks removed");
        Ok(removed)
    }

    /// Copy of the current list in display order
    #[must_use]
    pub fn snapshot(&self) -> Vec<TaskRecord> {
        self.items.clone()
    }

    /// Read-only view of the current list
    #[must_use]
    pub fn as_slice(&self) -> &[TaskRecord] {
        &self.items
    }

    /// Task texts in display order
    #[must_use]
    pub fn texts(&self) -> Vec<&str> {
        self.items.iter().map(|record| record.text.as_str()).collect()
    }

    /// Task at `index`, if any
    #[must_use]
    pub fn get(&self, index: usize) -> Option<&TaskRecord> {
        self.items.get(index)
    }

    /// Number of tasks
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Whether the list is empty
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    fn check_index(&self, index: usize) -> Result<(), TodoListError> {
        let len = self.items.len();
        if index < len {
            Ok(())
        } else {
            tracing::warn!(index, len, "Rejected removal outside the list");
            Err(TodoListError::OutOfRange { index, len })
        }
    }

    /// Next generator id not already present in the list.
    ///
    /// A generator stuck on live ids is abandoned after [`MAX_REDRAWS`]
    /// attempts in favor of random ids.
    fn fresh_id(&self) -> TaskId {
        for _ in 0..MAX_REDRAWS {
            let id = TaskId::from_uuid(self.ids.generate());
            if !self.is_live(id) {
                return id;
            }
            tracing::warn!(%id, "Id generator repeated a live id, drawing again");
        }

        tracing::error!(attempts = MAX_REDRAWS, "Id generator keeps repeating, using random ids");
        loop {
            let id = TaskId::from_uuid(Uuid::new_v4());
            if !self.is_live(id) {
                return id;
            }
        }
    }

    fn is_live(&self, id: TaskId) -> bool {
        self.items.iter().any(|record| record.id == id)
    }
}

impl Default for TodoListStore {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for TodoListStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TodoListStore")
            .field("items", &self.items)
            .finish_non_exhaustive()
    }
}

impl PartialEq for TodoListStore {
    fn eq(&self, other: &Self) -> bool {
        self.items == other.items
    }
}

impl Eq for TodoListStore {}
