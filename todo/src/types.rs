//! Domain types for the todo list.
//!
//! A todo list is an ordered collection of task records. Records are only
//! ever appended or removed by position; their identity exists so that a
//! renderer can tell two rows with the same text apart.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

/// Unique identifier for a task record
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TaskId(Uuid);

impl TaskId {
    /// Creates a `TaskId` from a UUID
    #[must_use]
    pub const fn from_uuid(id: Uuid) -> Self {
        Self(id)
    }

    /// Returns the inner UUID
    #[must_use]
    pub const fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl std::fmt::Display for TaskId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A single todo entry
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskRecord {
    /// Identity used for list rendering; never changes after creation
    pub id: TaskId,
    /// Task description, stored exactly as entered
    pub text: String,
}

impl TaskRecord {
    /// Creates a task record
    #[must_use]
    pub const fn new(id: TaskId, text: String) -> Self {
        Self { id, text }
    }
}

/// Errors raised by the todo list
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum TodoListError {
    /// A removal targeted a position outside `0..len`
    #[error("Task index {index} out of range for list of length {len}")]
    OutOfRange {
        /// Requested position
        index: usize,
        /// Length of the list at the time of the request
        len: usize,
    },
}
